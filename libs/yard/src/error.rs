//! Error types for yard layout and placement.

use thiserror::Error;

use crate::footprint::ContainerFootprint;
use crate::slot::ColumnSpan;

/// Errors building yard-level values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum YardError {
    /// A yard dimension was zero.
    #[error("yard {field} must be at least 1, got {value}")]
    InvalidDimension { field: &'static str, value: u32 },

    /// The container type string is not one the terminal handles.
    #[error("unknown container type: {0}")]
    UnknownContainerType(String),
}

/// A location that may not be written to the yard.
///
/// Every variant is recoverable by choosing another slot.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("row, column and tier must be specified for yard locations")]
    MissingCoordinates,

    #[error("{field} must be at least 1")]
    NonPositiveCoordinate { field: &'static str },

    #[error("row {row} exceeds the yard's {max_rows} rows")]
    RowOutOfBounds { row: u32, max_rows: u32 },

    #[error("column {column} exceeds the yard's {max_columns} columns")]
    ColumnOutOfBounds { column: u32, max_columns: u32 },

    #[error("tier {tier} exceeds the yard's {max_tiers} tiers")]
    TierOutOfBounds { tier: u32, max_tiers: u32 },

    #[error("column start {column_start} is greater than column end {column_end}")]
    InvertedColumns { column_start: u32, column_end: u32 },

    #[error("a {footprint} container spans {expected} column(s), got {width}")]
    SpanMismatch {
        footprint: ContainerFootprint,
        expected: u32,
        width: u32,
    },

    #[error("columns {columns} in row {row}, tier {tier} overlap an existing location at columns {existing}")]
    Overlap {
        row: u32,
        tier: u32,
        columns: ColumnSpan,
        existing: ColumnSpan,
    },

    #[error("columns {columns} in row {row}, tier {tier} are not supported by the tier below")]
    Unsupported {
        row: u32,
        tier: u32,
        columns: ColumnSpan,
    },
}

impl PlacementError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCoordinates => "missing_coordinates",
            Self::NonPositiveCoordinate { .. } => "coordinate_below_one",
            Self::RowOutOfBounds { .. } => "row_out_of_bounds",
            Self::ColumnOutOfBounds { .. } => "column_out_of_bounds",
            Self::TierOutOfBounds { .. } => "tier_out_of_bounds",
            Self::InvertedColumns { .. } => "inverted_columns",
            Self::SpanMismatch { .. } => "span_mismatch",
            Self::Overlap { .. } => "slot_occupied",
            Self::Unsupported { .. } => "slot_unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_message_names_both_spans() {
        let err = PlacementError::Overlap {
            row: 3,
            tier: 1,
            columns: ColumnSpan::new(2, 3).unwrap(),
            existing: ColumnSpan::new(3, 4).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2-3"));
        assert!(msg.contains("3-4"));
        assert_eq!(err.code(), "slot_occupied");
    }
}
