//! Occupancy view of one yard.

use std::collections::BTreeMap;

use crate::footprint::ContainerFootprint;
use crate::placement::{first_overlap, rests_on};
use crate::slot::{AvailablePlace, ColumnSpan, OccupiedSlot, Slot};
use crate::yard::YardDimensions;

/// Immutable occupancy of a yard, indexed by `(row, tier)`.
///
/// Built from the yard's dimensions and its current location records. The
/// grid never changes after construction; callers rebuild it per request so
/// no occupancy state outlives the snapshot it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YardGrid {
    dims: YardDimensions,
    levels: BTreeMap<(u32, u32), Vec<OccupiedSlot>>,
}

impl YardGrid {
    pub fn new<I>(dims: YardDimensions, records: I) -> Self
    where
        I: IntoIterator<Item = OccupiedSlot>,
    {
        let mut levels: BTreeMap<(u32, u32), Vec<OccupiedSlot>> = BTreeMap::new();
        for record in records {
            levels
                .entry((record.row(), record.tier()))
                .or_default()
                .push(record);
        }
        Self { dims, levels }
    }

    pub fn empty(dims: YardDimensions) -> Self {
        Self::new(dims, std::iter::empty())
    }

    #[inline]
    pub fn dims(&self) -> &YardDimensions {
        &self.dims
    }

    /// All records, ordered by row, then tier, then insertion order.
    pub fn records(&self) -> impl Iterator<Item = &OccupiedSlot> {
        self.levels.values().flatten()
    }

    pub fn occupied_count(&self) -> usize {
        self.levels.values().map(Vec::len).sum()
    }

    /// Number of single-column cells taken.
    pub fn occupied_cells(&self) -> u64 {
        self.records()
            .map(|o| u64::from(o.columns().width()))
            .sum()
    }

    pub fn free_cells(&self) -> u64 {
        self.dims.total_capacity().saturating_sub(self.occupied_cells())
    }

    fn level(&self, row: u32, tier: u32) -> &[OccupiedSlot] {
        self.levels
            .get(&(row, tier))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The record covering `(row, column, tier)`, if any.
    pub fn occupant_at(&self, row: u32, column: u32, tier: u32) -> Option<&OccupiedSlot> {
        self.level(row, tier)
            .iter()
            .find(|o| o.columns().contains(column))
    }

    /// The first record in the same row and tier whose span intersects `columns`.
    pub fn overlapping(&self, row: u32, columns: ColumnSpan, tier: u32) -> Option<&OccupiedSlot> {
        first_overlap(columns, self.level(row, tier))
    }

    /// Whether `columns` at `(row, tier)` would rest on the tier below.
    pub fn supports(&self, row: u32, columns: ColumnSpan, tier: u32) -> bool {
        tier <= 1 || rests_on(columns, self.level(row, tier - 1))
    }

    pub fn is_place_available(
        &self,
        row: u32,
        column_start: u32,
        tier: u32,
        footprint: ContainerFootprint,
    ) -> bool {
        ColumnSpan::for_footprint(column_start, footprint)
            .is_some_and(|columns| self.overlapping(row, columns, tier).is_none())
    }

    pub fn is_supported(
        &self,
        row: u32,
        column_start: u32,
        tier: u32,
        footprint: ContainerFootprint,
    ) -> bool {
        ColumnSpan::for_footprint(column_start, footprint)
            .is_some_and(|columns| self.supports(row, columns, tier))
    }

    /// A copy of the grid without the record at `slot`.
    ///
    /// Used when re-validating a location that is already stored, so it does
    /// not collide with itself.
    #[must_use]
    pub fn excluding(&self, slot: &Slot) -> Self {
        let mut levels = self.levels.clone();
        if let Some(level) = levels.get_mut(&(slot.row, slot.tier)) {
            if let Some(pos) = level.iter().position(|o| o.slot == *slot) {
                level.remove(pos);
            }
            if level.is_empty() {
                levels.remove(&(slot.row, slot.tier));
            }
        }
        Self {
            dims: self.dims,
            levels,
        }
    }

    /// Every legal empty slot for `footprint`. See [`crate::available_places`].
    pub fn available_places(&self, footprint: ContainerFootprint) -> Vec<AvailablePlace> {
        crate::search::available_places(self, footprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::ContainerFootprint::{DoubleColumn, SingleColumn};

    fn dims() -> YardDimensions {
        YardDimensions::new(5, 4, 3).unwrap()
    }

    #[test]
    fn test_occupant_lookup() {
        let long = OccupiedSlot::placed(2, 3, 1, DoubleColumn).unwrap();
        let grid = YardGrid::new(dims(), [long]);
        assert_eq!(grid.occupant_at(2, 4, 1), Some(&long));
        assert_eq!(grid.occupant_at(2, 2, 1), None);
        assert_eq!(grid.occupant_at(2, 4, 2), None);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.occupied_cells(), 2);
        assert_eq!(grid.free_cells(), 58);
    }

    #[test]
    fn test_excluding_removes_one_record() {
        let a = OccupiedSlot::placed(1, 1, 1, SingleColumn).unwrap();
        let b = OccupiedSlot::placed(1, 2, 1, SingleColumn).unwrap();
        let grid = YardGrid::new(dims(), [a, b]);

        let without_a = grid.excluding(&a.slot);
        assert_eq!(without_a.occupied_count(), 1);
        assert!(without_a.is_place_available(1, 1, 1, SingleColumn));
        assert!(!without_a.is_place_available(1, 2, 1, SingleColumn));

        // unknown slot is a no-op
        let missing = OccupiedSlot::placed(4, 1, 1, SingleColumn).unwrap();
        assert_eq!(grid.excluding(&missing.slot), grid);
    }

    #[test]
    fn test_grid_matches_free_functions() {
        let records = [
            OccupiedSlot::placed(2, 1, 1, SingleColumn).unwrap(),
            OccupiedSlot::placed(2, 2, 1, SingleColumn).unwrap(),
            OccupiedSlot::placed(3, 2, 1, DoubleColumn).unwrap(),
        ];
        let grid = YardGrid::new(dims(), records);

        for row in 1..=5 {
            for column in 1..=4 {
                for tier in 1..=3 {
                    for footprint in [SingleColumn, DoubleColumn] {
                        let n = footprint.columns();
                        assert_eq!(
                            grid.is_place_available(row, column, tier, footprint),
                            crate::is_place_available(row, column, tier, n, &records),
                        );
                        assert_eq!(
                            grid.is_supported(row, column, tier, footprint),
                            crate::is_supported(row, column, tier, n, &records),
                        );
                    }
                }
            }
        }
    }
}
