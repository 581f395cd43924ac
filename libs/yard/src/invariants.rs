//! Write-time validation of a single container location.

use crate::error::PlacementError;
use crate::footprint::ContainerFootprint;
use crate::grid::YardGrid;
use crate::slot::{ColumnSpan, Slot};

/// A location as submitted for insert or update.
///
/// Coordinates are optional because a container outside the yard has none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProposedLocation {
    pub row: Option<u32>,
    pub column_start: Option<u32>,
    pub column_end: Option<u32>,
    pub tier: Option<u32>,
    /// Footprint of the container being placed, when known.
    pub footprint: Option<ContainerFootprint>,
}

impl ProposedLocation {
    /// A location whose `column_end` follows from the container's footprint.
    pub fn for_footprint(
        row: u32,
        column_start: u32,
        tier: u32,
        footprint: ContainerFootprint,
    ) -> Self {
        Self {
            row: Some(row),
            column_start: Some(column_start),
            column_end: Some(derive_column_end(footprint, column_start)),
            tier: Some(tier),
            footprint: Some(footprint),
        }
    }
}

/// Last column covered by a container of `footprint` starting at `column_start`.
pub fn derive_column_end(footprint: ContainerFootprint, column_start: u32) -> u32 {
    column_start.saturating_add(footprint.columns() - 1)
}

/// Single source of truth for whether a location may be stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationValidator {
    require_support: bool,
}

impl LocationValidator {
    /// Bounds, span and overlap checks only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also reject locations that would not rest on the tier below.
    #[must_use]
    pub fn require_support(mut self, require: bool) -> Self {
        self.require_support = require;
        self
    }

    pub fn requires_support(&self) -> bool {
        self.require_support
    }

    /// Validates `proposed` against the yard it is going into.
    ///
    /// `yard` is `None` when the container is outside any yard, in which case
    /// nothing is checked and `Ok(None)` is returned. Otherwise the grid must
    /// hold every *other* location in the yard; when updating a stored record,
    /// pass [`YardGrid::excluding`] its current slot.
    pub fn validate(
        &self,
        proposed: &ProposedLocation,
        yard: Option<&YardGrid>,
    ) -> Result<Option<Slot>, PlacementError> {
        let Some(grid) = yard else {
            return Ok(None);
        };
        let dims = grid.dims();

        let (Some(row), Some(column_start), Some(column_end), Some(tier)) = (
            proposed.row,
            proposed.column_start,
            proposed.column_end,
            proposed.tier,
        ) else {
            return Err(PlacementError::MissingCoordinates);
        };

        for (field, value) in [
            ("row", row),
            ("column_start", column_start),
            ("column_end", column_end),
            ("tier", tier),
        ] {
            if value < 1 {
                return Err(PlacementError::NonPositiveCoordinate { field });
            }
        }

        if row > dims.max_rows() {
            return Err(PlacementError::RowOutOfBounds {
                row,
                max_rows: dims.max_rows(),
            });
        }

        if let Some(column) = [column_start, column_end]
            .into_iter()
            .find(|c| *c > dims.max_columns())
        {
            return Err(PlacementError::ColumnOutOfBounds {
                column,
                max_columns: dims.max_columns(),
            });
        }

        if tier > dims.max_tiers() {
            return Err(PlacementError::TierOutOfBounds {
                tier,
                max_tiers: dims.max_tiers(),
            });
        }

        let columns =
            ColumnSpan::new(column_start, column_end).ok_or(PlacementError::InvertedColumns {
                column_start,
                column_end,
            })?;

        if let Some(footprint) = proposed.footprint {
            if columns.width() != footprint.columns() {
                return Err(PlacementError::SpanMismatch {
                    footprint,
                    expected: footprint.columns(),
                    width: columns.width(),
                });
            }
        }

        if let Some(existing) = grid.overlapping(row, columns, tier) {
            return Err(PlacementError::Overlap {
                row,
                tier,
                columns,
                existing: existing.columns(),
            });
        }

        if self.require_support && !grid.supports(row, columns, tier) {
            return Err(PlacementError::Unsupported { row, tier, columns });
        }

        Ok(Some(Slot::new(row, columns, tier)))
    }
}
