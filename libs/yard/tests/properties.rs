//! Property tests for the placement engine.

use proptest::prelude::*;
use quayside_yard::{
    available_places, is_supported, ColumnSpan, ContainerFootprint, LocationValidator,
    OccupiedSlot, ProposedLocation, Slot, YardDimensions, YardGrid,
};

fn arb_footprint() -> impl Strategy<Value = ContainerFootprint> {
    prop_oneof![
        Just(ContainerFootprint::SingleColumn),
        Just(ContainerFootprint::DoubleColumn),
    ]
}

fn arb_dims() -> impl Strategy<Value = YardDimensions> {
    (1u32..7, 1u32..7, 1u32..4).prop_map(|(r, c, t)| YardDimensions::new(r, c, t).unwrap())
}

/// Fills a yard by attempting placements in order, keeping only the ones the
/// validator accepts.
fn fill(dims: YardDimensions, attempts: &[(u32, u32, u32, ContainerFootprint)]) -> YardGrid {
    let validator = LocationValidator::new().require_support(true);
    let mut accepted: Vec<OccupiedSlot> = Vec::new();
    for &(row, column, tier, footprint) in attempts {
        let grid = YardGrid::new(dims, accepted.iter().copied());
        let proposed = ProposedLocation::for_footprint(row, column, tier, footprint);
        if let Ok(Some(slot)) = validator.validate(&proposed, Some(&grid)) {
            accepted.push(OccupiedSlot::new(slot, footprint));
        }
    }
    YardGrid::new(dims, accepted)
}

fn arb_attempts() -> impl Strategy<Value = Vec<(u32, u32, u32, ContainerFootprint)>> {
    prop::collection::vec((1u32..8, 1u32..8, 1u32..5, arb_footprint()), 0..60)
}

proptest! {
    #[test]
    fn bounds_fail_iff_out_of_range(
        dims in arb_dims(),
        row in 0u32..9,
        start in 0u32..9,
        width in 1u32..3,
        tier in 0u32..6,
    ) {
        let end = start + width - 1;
        let proposed = ProposedLocation {
            row: Some(row),
            column_start: Some(start),
            column_end: Some(end),
            tier: Some(tier),
            footprint: None,
        };
        let in_range = (1..=dims.max_rows()).contains(&row)
            && start >= 1
            && end <= dims.max_columns()
            && (1..=dims.max_tiers()).contains(&tier);

        let result = LocationValidator::new().validate(&proposed, Some(&YardGrid::empty(dims)));
        prop_assert_eq!(result.is_ok(), in_range);
    }

    #[test]
    fn accepted_placements_never_overlap(dims in arb_dims(), attempts in arb_attempts()) {
        let grid = fill(dims, &attempts);
        let records: Vec<_> = grid.records().copied().collect();
        for (i, a) in records.iter().enumerate() {
            for b in &records[i + 1..] {
                if a.row() == b.row() && a.tier() == b.tier() {
                    prop_assert!(!a.columns().overlaps(b.columns()), "{:?} overlaps {:?}", a, b);
                }
            }
        }
    }

    #[test]
    fn accepted_placements_are_supported(dims in arb_dims(), attempts in arb_attempts()) {
        let grid = fill(dims, &attempts);
        let records: Vec<_> = grid.records().copied().collect();
        for r in &records {
            prop_assert!(is_supported(
                r.row(),
                r.columns().start(),
                r.tier(),
                r.columns().width(),
                &records,
            ));
        }
    }

    #[test]
    fn search_agrees_with_validator(
        dims in arb_dims(),
        attempts in arb_attempts(),
        footprint in arb_footprint(),
    ) {
        let grid = fill(dims, &attempts);
        let validator = LocationValidator::new().require_support(true);
        let places = available_places(&grid, footprint);

        for place in &places {
            let proposed =
                ProposedLocation::for_footprint(place.row, place.column_start, place.tier, footprint);
            prop_assert!(validator.validate(&proposed, Some(&grid)).is_ok());
        }

        // Every accepted candidate inside the yard shows up in the search.
        for row in 1..=dims.max_rows() {
            for column in 1..=dims.max_columns() {
                for tier in 1..=dims.max_tiers() {
                    let proposed = ProposedLocation::for_footprint(row, column, tier, footprint);
                    if validator.validate(&proposed, Some(&grid)).is_ok() {
                        let found = places
                            .iter()
                            .any(|p| (p.row, p.column_start, p.tier) == (row, column, tier));
                        prop_assert!(found, "accepted slot missing from search: {row},{column},{tier}");
                    }
                }
            }
        }
    }

    #[test]
    fn search_is_deterministic(dims in arb_dims(), attempts in arb_attempts(), footprint in arb_footprint()) {
        let first = available_places(&fill(dims, &attempts), footprint);
        let second = available_places(&fill(dims, &attempts), footprint);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn ground_tier_always_supported(
        row in 1u32..50,
        column in 1u32..50,
        needed in 1u32..3,
        dims in arb_dims(),
        attempts in arb_attempts(),
    ) {
        let records: Vec<_> = fill(dims, &attempts).records().copied().collect();
        prop_assert!(is_supported(row, column, 1, needed, &records));
    }

    #[test]
    fn long_on_two_shorts_needs_both(has_left: bool, has_right: bool, row in 1u32..4) {
        let mut below = Vec::new();
        if has_left {
            below.push(OccupiedSlot::new(
                Slot::new(row, ColumnSpan::new(3, 3).unwrap(), 1),
                ContainerFootprint::SingleColumn,
            ));
        }
        if has_right {
            below.push(OccupiedSlot::new(
                Slot::new(row, ColumnSpan::new(4, 4).unwrap(), 1),
                ContainerFootprint::SingleColumn,
            ));
        }
        prop_assert_eq!(is_supported(row, 3, 2, 2, &below), has_left && has_right);
    }
}
