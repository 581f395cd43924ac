//! Container types and the yard footprint they need.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::YardError;

/// ISO container sizes handled by the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerType {
    #[serde(rename = "20")]
    Twenty,
    #[serde(rename = "20HC")]
    TwentyHighCube,
    #[serde(rename = "40")]
    Forty,
    #[serde(rename = "40HC")]
    FortyHighCube,
    #[serde(rename = "45")]
    FortyFive,
}

impl ContainerType {
    pub const ALL: [ContainerType; 5] = [
        Self::Twenty,
        Self::TwentyHighCube,
        Self::Forty,
        Self::FortyHighCube,
        Self::FortyFive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twenty => "20",
            Self::TwentyHighCube => "20HC",
            Self::Forty => "40",
            Self::FortyHighCube => "40HC",
            Self::FortyFive => "45",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Twenty => "20 ft Standard",
            Self::TwentyHighCube => "20 ft High Cube",
            Self::Forty => "40 ft Standard",
            Self::FortyHighCube => "40 ft High Cube",
            Self::FortyFive => "45 ft High Cube",
        }
    }

    /// Yard columns this container occupies.
    pub fn footprint(&self) -> ContainerFootprint {
        match self {
            Self::Twenty | Self::TwentyHighCube => ContainerFootprint::SingleColumn,
            Self::Forty | Self::FortyHighCube | Self::FortyFive => ContainerFootprint::DoubleColumn,
        }
    }

    /// Twenty-foot equivalent units.
    pub fn teu(&self) -> u32 {
        self.footprint().columns()
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContainerType {
    type Err = YardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| YardError::UnknownContainerType(s.to_string()))
    }
}

/// How many adjacent yard columns a container covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFootprint {
    /// 20ft-class.
    SingleColumn,
    /// 40ft, 40ft high cube and 45ft.
    DoubleColumn,
}

impl ContainerFootprint {
    pub const fn columns(&self) -> u32 {
        match self {
            Self::SingleColumn => 1,
            Self::DoubleColumn => 2,
        }
    }

    pub const fn is_single(&self) -> bool {
        matches!(self, Self::SingleColumn)
    }
}

impl fmt::Display for ContainerFootprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SingleColumn => f.write_str("single-column"),
            Self::DoubleColumn => f.write_str("double-column"),
        }
    }
}

impl From<ContainerType> for ContainerFootprint {
    fn from(container_type: ContainerType) -> Self {
        container_type.footprint()
    }
}
