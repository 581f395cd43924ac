//! Enumeration of free, supported slots.

use crate::footprint::ContainerFootprint;
use crate::grid::YardGrid;
use crate::slot::{AvailablePlace, ColumnSpan};

/// Every slot in the yard where a container of `footprint` could be set down.
///
/// Scans rows, then column starts, then tiers, so the order is stable for a
/// given grid. Column starts stop early enough that the footprint never runs
/// past the last column. A slot is reported iff it is free and supported.
pub fn available_places(grid: &YardGrid, footprint: ContainerFootprint) -> Vec<AvailablePlace> {
    let dims = grid.dims();
    let columns_needed = footprint.columns();

    let Some(last_start) = dims.max_columns().checked_sub(columns_needed - 1) else {
        return Vec::new();
    };

    let mut places = Vec::new();
    for row in 1..=dims.max_rows() {
        for column_start in 1..=last_start {
            let Some(columns) = ColumnSpan::starting_at(column_start, columns_needed) else {
                continue;
            };
            for tier in 1..=dims.max_tiers() {
                if grid.overlapping(row, columns, tier).is_none()
                    && grid.supports(row, columns, tier)
                {
                    places.push(AvailablePlace {
                        row,
                        column_start,
                        tier,
                    });
                }
            }
        }
    }
    places
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::ContainerFootprint::{DoubleColumn, SingleColumn};
    use crate::slot::OccupiedSlot;
    use crate::yard::YardDimensions;

    fn place(row: u32, column_start: u32, tier: u32) -> AvailablePlace {
        AvailablePlace {
            row,
            column_start,
            tier,
        }
    }

    #[test]
    fn test_empty_yard_only_ground() {
        let grid = YardGrid::empty(YardDimensions::new(5, 4, 3).unwrap());
        let places = available_places(&grid, SingleColumn);
        assert_eq!(places.len(), 20);
        assert!(places.iter().all(|p| p.tier == 1));
        assert_eq!(places.first(), Some(&place(1, 1, 1)));
        assert_eq!(places.last(), Some(&place(5, 4, 1)));
    }

    #[test]
    fn test_long_footprint_stays_in_bounds() {
        let grid = YardGrid::empty(YardDimensions::new(2, 4, 1).unwrap());
        let places = available_places(&grid, DoubleColumn);
        assert_eq!(places.len(), 6);
        assert!(places.iter().all(|p| p.column_start <= 3));
    }

    #[test]
    fn test_yard_narrower_than_footprint() {
        let grid = YardGrid::empty(YardDimensions::new(3, 1, 2).unwrap());
        assert!(available_places(&grid, DoubleColumn).is_empty());
        assert_eq!(available_places(&grid, SingleColumn).len(), 3);
    }

    #[test]
    fn test_occupied_cell_opens_tier_above() {
        let grid = YardGrid::new(
            YardDimensions::new(5, 4, 3).unwrap(),
            [OccupiedSlot::placed(1, 1, 1, SingleColumn).unwrap()],
        );
        let places = available_places(&grid, SingleColumn);
        assert!(!places.contains(&place(1, 1, 1)));
        assert!(places.contains(&place(1, 1, 2)));
        assert!(!places.contains(&place(1, 1, 3)));
        assert_eq!(places.len(), 20);
    }

    #[test]
    fn test_order_is_row_column_tier() {
        let grid = YardGrid::new(
            YardDimensions::new(1, 2, 2).unwrap(),
            [OccupiedSlot::placed(1, 1, 1, SingleColumn).unwrap()],
        );
        assert_eq!(
            available_places(&grid, SingleColumn),
            vec![place(1, 1, 2), place(1, 2, 1)]
        );
    }
}
