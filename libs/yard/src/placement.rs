//! Free-slot and stacking-support checks.
//!
//! The public functions take the yard's full occupancy list and filter it by
//! row and tier themselves. [`YardGrid`](crate::YardGrid) calls the
//! crate-private variants with the matching `(row, tier)` bucket only.

use crate::slot::{ColumnSpan, OccupiedSlot};

/// True if the candidate footprint shares no column with any record in the
/// same row and tier.
///
/// `columns_needed` is 1 for 20ft-class containers and 2 for longer ones. A
/// footprint that cannot be formed (zero width, column 0) is never available.
pub fn is_place_available(
    row: u32,
    column_start: u32,
    tier: u32,
    columns_needed: u32,
    occupied: &[OccupiedSlot],
) -> bool {
    let Some(candidate) = ColumnSpan::starting_at(column_start, columns_needed) else {
        return false;
    };
    first_overlap(candidate, level(occupied, row, tier)).is_none()
}

/// True if the candidate footprint would rest on the tier below.
///
/// Ground tier is always supported. Higher tiers need either one record
/// beneath that spans the whole candidate, or, for a two-column candidate, two
/// single-column records beneath covering its two columns.
pub fn is_supported(
    row: u32,
    column_start: u32,
    tier: u32,
    columns_needed: u32,
    occupied: &[OccupiedSlot],
) -> bool {
    if tier <= 1 {
        return true;
    }
    let Some(candidate) = ColumnSpan::starting_at(column_start, columns_needed) else {
        return false;
    };
    rests_on(candidate, level(occupied, row, tier - 1))
}

fn level(
    occupied: &[OccupiedSlot],
    row: u32,
    tier: u32,
) -> impl Iterator<Item = &OccupiedSlot> + Clone {
    occupied
        .iter()
        .filter(move |o| o.row() == row && o.tier() == tier)
}

/// First record on this level whose span intersects `candidate`.
pub(crate) fn first_overlap<'a, I>(candidate: ColumnSpan, level: I) -> Option<&'a OccupiedSlot>
where
    I: IntoIterator<Item = &'a OccupiedSlot>,
{
    level.into_iter().find(|o| o.columns().overlaps(candidate))
}

/// Support test against the records one tier below `candidate`.
pub(crate) fn rests_on<'a, I>(candidate: ColumnSpan, below: I) -> bool
where
    I: IntoIterator<Item = &'a OccupiedSlot> + Clone,
{
    if below.clone().into_iter().any(|o| o.columns().covers(candidate)) {
        return true;
    }

    if candidate.width() != 2 {
        return false;
    }

    let short_covering = |column: u32| {
        below
            .clone()
            .into_iter()
            .any(|o| o.footprint.is_single() && o.columns().contains(column))
    };
    short_covering(candidate.start()) && short_covering(candidate.end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::footprint::ContainerFootprint::{DoubleColumn, SingleColumn};

    fn twenty(row: u32, column: u32, tier: u32) -> OccupiedSlot {
        OccupiedSlot::placed(row, column, tier, SingleColumn).unwrap()
    }

    fn forty(row: u32, column: u32, tier: u32) -> OccupiedSlot {
        OccupiedSlot::placed(row, column, tier, DoubleColumn).unwrap()
    }

    #[test]
    fn test_empty_yard_is_available() {
        assert!(is_place_available(1, 1, 1, 1, &[]));
        assert!(is_place_available(4, 7, 3, 2, &[]));
    }

    #[test]
    fn test_overlap_blocks_same_row_and_tier_only() {
        let occupied = [forty(3, 3, 1)];
        assert!(!is_place_available(3, 2, 1, 2, &occupied));
        assert!(!is_place_available(3, 4, 1, 1, &occupied));
        assert!(is_place_available(3, 1, 1, 2, &occupied));
        assert!(is_place_available(3, 5, 1, 1, &occupied));
        assert!(is_place_available(2, 3, 1, 2, &occupied));
        assert!(is_place_available(3, 3, 2, 2, &occupied));
    }

    #[test]
    fn test_zero_width_never_available() {
        assert!(!is_place_available(1, 1, 1, 0, &[]));
        assert!(!is_supported(1, 1, 2, 0, &[]));
    }

    #[test]
    fn test_ground_always_supported() {
        assert!(is_supported(1, 1, 1, 1, &[]));
        assert!(is_supported(9, 9, 1, 2, &[forty(9, 9, 2)]));
    }

    #[test]
    fn test_twenty_needs_box_beneath() {
        assert!(!is_supported(1, 1, 2, 1, &[]));
        assert!(is_supported(1, 1, 2, 1, &[twenty(1, 1, 1)]));
        assert!(!is_supported(1, 2, 2, 1, &[twenty(1, 1, 1)]));
        assert!(!is_supported(2, 1, 2, 1, &[twenty(1, 1, 1)]));
    }

    #[test]
    fn test_twenty_on_long_box() {
        let occupied = [forty(1, 3, 1)];
        assert!(is_supported(1, 3, 2, 1, &occupied));
        assert!(is_supported(1, 4, 2, 1, &occupied));
        assert!(!is_supported(1, 5, 2, 1, &occupied));
    }

    #[test]
    fn test_long_on_two_shorts() {
        let occupied = [twenty(1, 3, 1), twenty(1, 4, 1)];
        assert!(is_supported(1, 3, 2, 2, &occupied));
        assert!(!is_supported(1, 3, 2, 2, &occupied[..1]));
        assert!(!is_supported(1, 2, 2, 2, &occupied));
    }

    #[test]
    fn test_long_not_supported_by_two_offset_longs() {
        // [2,3] and [4,5] each touch the candidate [3,4], but neither is short.
        let occupied = [forty(1, 2, 1), forty(1, 4, 1)];
        assert!(!is_supported(1, 3, 2, 2, &occupied));
    }

    #[test]
    fn test_support_uses_tier_directly_below() {
        let occupied = [twenty(1, 1, 1)];
        assert!(!is_supported(1, 1, 3, 1, &occupied));
    }
}
