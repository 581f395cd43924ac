//! The `define_id!` macro.

use crate::{IdError, Ulid};

/// Splits `{prefix}_{ulid}` and checks the prefix. Shared by every id type.
#[doc(hidden)]
pub fn parse_prefixed(s: &str, expected: &'static str) -> Result<Ulid, IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }

    let (prefix, raw) = s.split_once('_').ok_or(IdError::MissingSeparator)?;
    if prefix != expected {
        return Err(IdError::WrongPrefix {
            expected,
            actual: prefix.to_string(),
        });
    }

    raw.parse::<Ulid>()
        .map_err(|e| IdError::MalformedUlid(e.to_string()))
}

/// Declares a `Copy` id newtype over a ULID, written as `{prefix}_{ulid}`
/// in `Display`, `FromStr` and serde.
#[macro_export]
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($crate::Ulid);

        impl $name {
            pub const PREFIX: &'static str = $prefix;

            #[must_use]
            pub fn new() -> Self {
                Self($crate::Ulid::new())
            }

            #[must_use]
            pub const fn ulid(&self) -> $crate::Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}_{}", Self::PREFIX, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $crate::parse_prefixed(s, Self::PREFIX).map(Self)
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
