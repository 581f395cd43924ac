//! Identifier parsing errors.

use thiserror::Error;

/// Why a string could not be parsed into a typed id.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("id cannot be empty")]
    Empty,

    #[error("id is missing the '_' separator")]
    MissingSeparator,

    #[error("wrong id prefix: expected '{expected}', got '{actual}'")]
    WrongPrefix {
        expected: &'static str,
        actual: String,
    },

    #[error("malformed ULID in id: {0}")]
    MalformedUlid(String),
}

impl IdError {
    /// True when the id belonged to a different resource type.
    pub fn is_prefix_error(&self) -> bool {
        matches!(self, IdError::WrongPrefix { .. })
    }
}
