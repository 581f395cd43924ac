//! Yard dimensions.

use serde::{Deserialize, Serialize};

use crate::error::YardError;
use crate::slot::Slot;

/// Capacity limits of one yard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDimensions")]
pub struct YardDimensions {
    max_rows: u32,
    max_columns: u32,
    max_tiers: u32,
}

impl YardDimensions {
    /// All three dimensions must be at least 1.
    pub fn new(max_rows: u32, max_columns: u32, max_tiers: u32) -> Result<Self, YardError> {
        for (field, value) in [
            ("max_rows", max_rows),
            ("max_columns", max_columns),
            ("max_tiers", max_tiers),
        ] {
            if value == 0 {
                return Err(YardError::InvalidDimension { field, value });
            }
        }

        Ok(Self {
            max_rows,
            max_columns,
            max_tiers,
        })
    }

    #[inline]
    pub fn max_rows(&self) -> u32 {
        self.max_rows
    }

    #[inline]
    pub fn max_columns(&self) -> u32 {
        self.max_columns
    }

    #[inline]
    pub fn max_tiers(&self) -> u32 {
        self.max_tiers
    }

    /// Number of single-column cells in the yard.
    pub fn total_capacity(&self) -> u64 {
        u64::from(self.max_rows) * u64::from(self.max_columns) * u64::from(self.max_tiers)
    }

    /// True if the whole slot lies inside the yard.
    pub fn contains(&self, slot: &Slot) -> bool {
        slot.row >= 1
            && slot.row <= self.max_rows
            && slot.tier >= 1
            && slot.tier <= self.max_tiers
            && slot.columns.end() <= self.max_columns
    }
}

#[derive(Deserialize)]
struct RawDimensions {
    max_rows: u32,
    max_columns: u32,
    max_tiers: u32,
}

impl TryFrom<RawDimensions> for YardDimensions {
    type Error = YardError;

    fn try_from(raw: RawDimensions) -> Result<Self, Self::Error> {
        Self::new(raw.max_rows, raw.max_columns, raw.max_tiers)
    }
}
