//! Yard scenarios as an operator would encounter them.

use quayside_yard::{
    available_places, AvailablePlace, ContainerFootprint, ContainerType, LocationValidator,
    OccupiedSlot, PlacementError, ProposedLocation, YardDimensions, YardGrid,
};

fn place(row: u32, column_start: u32, tier: u32) -> AvailablePlace {
    AvailablePlace {
        row,
        column_start,
        tier,
    }
}

fn yard(records: &[OccupiedSlot]) -> YardGrid {
    YardGrid::new(
        YardDimensions::new(5, 4, 3).unwrap(),
        records.iter().copied(),
    )
}

fn twenty_at(row: u32, column: u32, tier: u32) -> OccupiedSlot {
    OccupiedSlot::placed(row, column, tier, ContainerType::Twenty.footprint()).unwrap()
}

#[test]
fn empty_yard_offers_every_ground_cell() {
    let places = available_places(&yard(&[]), ContainerFootprint::SingleColumn);

    assert_eq!(places.len(), 5 * 4);
    assert!(places.iter().all(|p| p.tier == 1));
}

#[test]
fn single_twenty_opens_the_cell_above_it() {
    let places = available_places(&yard(&[twenty_at(1, 1, 1)]), ContainerFootprint::SingleColumn);

    assert!(!places.contains(&place(1, 1, 1)));
    assert!(places.contains(&place(1, 1, 2)));
    for row in 1..=5 {
        for column in 1..=4 {
            if (row, column) != (1, 1) {
                assert!(places.contains(&place(row, column, 1)));
            }
        }
    }
}

#[test]
fn forty_rests_on_two_twenties() {
    let grid = yard(&[twenty_at(2, 1, 1), twenty_at(2, 2, 1)]);
    let places = available_places(&grid, ContainerType::Forty.footprint());

    assert!(places.contains(&place(2, 1, 2)));
    assert!(!places.contains(&place(2, 1, 1)));
    // [2,3] would straddle an occupied and an empty column on the ground.
    assert!(!places.contains(&place(2, 2, 1)));
    assert!(places.contains(&place(2, 3, 1)));
    // half of [2,3] at tier 2 hangs over column 3
    assert!(!places.contains(&place(2, 2, 2)));
}

#[test]
fn repeated_search_is_identical() {
    let grid = yard(&[twenty_at(2, 1, 1), twenty_at(2, 2, 1), twenty_at(4, 4, 1)]);
    for footprint in [
        ContainerFootprint::SingleColumn,
        ContainerFootprint::DoubleColumn,
    ] {
        assert_eq!(
            available_places(&grid, footprint),
            available_places(&grid, footprint)
        );
    }
}

#[test]
fn enforcer_rejects_partial_overlap() {
    let existing = OccupiedSlot::placed(3, 3, 1, ContainerFootprint::DoubleColumn).unwrap();
    let grid = yard(&[existing]);
    let proposed = ProposedLocation::for_footprint(3, 2, 1, ContainerFootprint::DoubleColumn);

    let err = LocationValidator::new()
        .validate(&proposed, Some(&grid))
        .unwrap_err();
    assert!(matches!(err, PlacementError::Overlap { row: 3, tier: 1, .. }));
}

#[test]
fn stacking_a_twenty_over_empty_ground_is_rejected() {
    let validator = LocationValidator::new().require_support(true);
    let proposed = ProposedLocation::for_footprint(1, 1, 2, ContainerFootprint::SingleColumn);

    assert!(matches!(
        validator.validate(&proposed, Some(&yard(&[]))),
        Err(PlacementError::Unsupported { .. })
    ));
    assert!(validator
        .validate(&proposed, Some(&yard(&[twenty_at(1, 1, 1)])))
        .is_ok());
}
