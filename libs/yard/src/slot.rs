//! Column spans, slots and occupancy records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::footprint::ContainerFootprint;

/// Inclusive column interval `[start, end]`.
///
/// # Invariants
/// `1 <= start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnSpan {
    start: u32,
    end: u32,
}

impl ColumnSpan {
    /// Returns `None` unless `1 <= start <= end`.
    pub fn new(start: u32, end: u32) -> Option<Self> {
        (start >= 1 && start <= end).then_some(Self { start, end })
    }

    /// The span of `width` columns beginning at `start`.
    pub fn starting_at(start: u32, width: u32) -> Option<Self> {
        let end = start.checked_add(width.checked_sub(1)?)?;
        Self::new(start, end)
    }

    pub fn for_footprint(start: u32, footprint: ContainerFootprint) -> Option<Self> {
        Self::starting_at(start, footprint.columns())
    }

    #[inline]
    pub fn start(&self) -> u32 {
        self.start
    }

    #[inline]
    pub fn end(&self) -> u32 {
        self.end
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.end - self.start + 1
    }

    /// Inclusive-bound intersection test.
    #[inline]
    pub fn overlaps(&self, other: ColumnSpan) -> bool {
        !(self.end < other.start || self.start > other.end)
    }

    #[inline]
    pub fn contains(&self, column: u32) -> bool {
        self.start <= column && column <= self.end
    }

    /// True if `other` lies entirely within `self`.
    #[inline]
    pub fn covers(&self, other: ColumnSpan) -> bool {
        self.start <= other.start && self.end >= other.end
    }
}

impl fmt::Display for ColumnSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A physical position in a yard: one row, a column span, one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot {
    pub row: u32,
    pub columns: ColumnSpan,
    pub tier: u32,
}

impl Slot {
    pub fn new(row: u32, columns: ColumnSpan, tier: u32) -> Self {
        Self { row, columns, tier }
    }
}

/// A slot currently taken by a container of a known footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedSlot {
    pub slot: Slot,
    pub footprint: ContainerFootprint,
}

impl OccupiedSlot {
    pub fn new(slot: Slot, footprint: ContainerFootprint) -> Self {
        Self { slot, footprint }
    }

    /// A container of `footprint` whose span starts at `column_start`.
    ///
    /// Returns `None` when the span would overflow or `column_start` is 0.
    pub fn placed(
        row: u32,
        column_start: u32,
        tier: u32,
        footprint: ContainerFootprint,
    ) -> Option<Self> {
        let columns = ColumnSpan::for_footprint(column_start, footprint)?;
        Some(Self::new(Slot::new(row, columns, tier), footprint))
    }

    #[inline]
    pub fn row(&self) -> u32 {
        self.slot.row
    }

    #[inline]
    pub fn tier(&self) -> u32 {
        self.slot.tier
    }

    #[inline]
    pub fn columns(&self) -> ColumnSpan {
        self.slot.columns
    }
}

/// Origin of a free slot, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AvailablePlace {
    pub row: u32,
    pub column_start: u32,
    pub tier: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case((2, 3), (3, 4), true)]
    #[case((1, 1), (1, 1), true)]
    #[case((1, 2), (3, 4), false)]
    #[case((5, 6), (3, 4), false)]
    #[case((3, 3), (2, 4), true)]
    fn test_overlaps_inclusive(
        #[case] a: (u32, u32),
        #[case] b: (u32, u32),
        #[case] expected: bool,
    ) {
        let a = ColumnSpan::new(a.0, a.1).unwrap();
        let b = ColumnSpan::new(b.0, b.1).unwrap();
        assert_eq!(a.overlaps(b), expected);
        assert_eq!(b.overlaps(a), expected);
    }

    #[test]
    fn test_span_construction() {
        assert!(ColumnSpan::new(0, 1).is_none());
        assert!(ColumnSpan::new(3, 2).is_none());
        assert!(ColumnSpan::starting_at(4, 0).is_none());
        assert!(ColumnSpan::starting_at(u32::MAX, 2).is_none());

        let span = ColumnSpan::for_footprint(7, ContainerFootprint::DoubleColumn).unwrap();
        assert_eq!((span.start(), span.end(), span.width()), (7, 8, 2));
        assert_eq!(span.to_string(), "7-8");
    }

    #[test]
    fn test_covers() {
        let long = ColumnSpan::new(3, 4).unwrap();
        assert!(long.covers(ColumnSpan::new(3, 3).unwrap()));
        assert!(long.covers(long));
        assert!(!long.covers(ColumnSpan::new(4, 5).unwrap()));
        assert!(long.contains(4));
        assert!(!long.contains(5));
    }
}
