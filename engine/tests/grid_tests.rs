//! Grid Tests - Levels, Snapping and Occupancy
//!
//! Tests for the multi-level grid index. Occupancy is driven through the
//! registry, which is the only writer of grid reservations.

use castle_crafter_engine::game::{Candidate, PartCatalog, PartSpec, PlacedEntityRegistry};
use castle_crafter_engine::world::{Cell, Footprint, GridConfig, GridIndex, Rotation};
use glam::Vec3;

fn registry() -> PlacedEntityRegistry {
    PlacedEntityRegistry::new(GridIndex::new(GridConfig::new(2.0)))
}

fn sorted(mut cells: Vec<Cell>) -> Vec<Cell> {
    cells.sort_by_key(|c| (c.level, c.x, c.z));
    cells
}

// ============================================================================
// Level Tests
// ============================================================================

#[test]
fn test_new_grid_has_ground_level() {
    let grid = GridIndex::new(GridConfig::default());
    assert_eq!(grid.level_count(), 1);
    assert_eq!(grid.y_for_level(0), 0.0);
    assert_eq!(grid.occupied_count(), 0);
}

#[test]
fn test_with_levels_sorts_and_merges() {
    let grid = GridIndex::with_levels(GridConfig::default(), &[6.0, 0.0, 3.0, 3.004]);
    assert_eq!(grid.level_heights(), vec![0.0, 3.0, 6.0]);
}

#[test]
fn test_add_level_within_epsilon_reuses_index() {
    let mut reg = registry();
    let first = reg.add_level(3.0);
    let second = reg.add_level(3.005);

    assert!(first.inserted);
    assert!(!second.inserted);
    assert_eq!(first.index, second.index);
    assert_eq!(reg.grid().level_count(), 2);
}

#[test]
fn test_add_level_keeps_heights_ascending() {
    let mut reg = registry();
    reg.add_level(6.0);
    let middle = reg.add_level(3.0);
    assert_eq!(middle.index, 1);
    assert_eq!(reg.grid().level_heights(), vec![0.0, 3.0, 6.0]);
}

#[test]
fn test_y_for_level_clamps() {
    let grid = GridIndex::with_levels(GridConfig::default(), &[0.0, 3.0]);
    assert_eq!(grid.y_for_level(1), 3.0);
    assert_eq!(grid.y_for_level(99), 3.0);
    assert_eq!(grid.clamp_level(-4), 0);
    assert_eq!(grid.clamp_level(7), 1);
}

// ============================================================================
// Snapping Tests
// ============================================================================

#[test]
fn test_snap_uses_level_height() {
    let grid = GridIndex::with_levels(GridConfig::new(2.0), &[0.0, 3.0]);
    let snapped = grid.snap(Vec3::new(2.9, 17.0, -0.8), 1);
    assert_eq!(snapped, Vec3::new(2.0, 3.0, 0.0));
}

#[test]
fn test_snap_is_idempotent() {
    let grid = GridIndex::new(GridConfig::new(1.5));
    let once = grid.snap(Vec3::new(7.3, 0.0, -4.1), 0);
    assert_eq!(grid.snap(once, 0), once);
}

#[test]
fn test_cell_center_round_trips_cell_at() {
    let grid = GridIndex::new(GridConfig::new(2.0));
    let cell = Cell::new(-3, 0, 5);
    assert_eq!(grid.cell_at(grid.cell_center(cell), 0), cell);
}

// ============================================================================
// Occupancy Tests
// ============================================================================

#[test]
fn test_two_by_one_floor_occupies_two_cells() {
    let catalog = PartCatalog::castle_set();
    let floor = catalog.get("floor_2x1").unwrap();
    let mut reg = registry();

    reg.register(floor, &Candidate::new(Vec3::ZERO, Rotation::ZERO, 0))
        .unwrap();

    assert_eq!(
        sorted(reg.grid().occupied_cells(0)),
        vec![Cell::new(0, 0, 0), Cell::new(1, 0, 0)]
    );
}

#[test]
fn test_quarter_turn_swaps_footprint_axes() {
    let grid = GridIndex::new(GridConfig::new(2.0));
    let cells = grid.covered_cells(Vec3::ZERO, Footprint::new(2, 1), Rotation::QUARTER, 0);
    assert_eq!(sorted(cells), vec![Cell::new(0, 0, 0), Cell::new(0, 0, 1)]);
}

#[test]
fn test_area_free_checks_each_level() {
    let catalog = PartCatalog::castle_set();
    let floor = catalog.get("floor_1x1").unwrap();
    let mut reg = registry();
    reg.add_level(3.0);

    reg.register(floor, &Candidate::new(Vec3::ZERO, Rotation::ZERO, 0))
        .unwrap();

    let grid = reg.grid();
    assert!(!grid.is_area_free(Vec3::ZERO, Footprint::new(1, 1), Rotation::ZERO, 0));
    assert!(grid.is_area_free(Vec3::ZERO, Footprint::new(1, 1), Rotation::ZERO, 1));
    assert!(!grid.is_area_free(Vec3::ZERO, Footprint::new(1, 1), Rotation::ZERO, 5));
}

#[test]
fn test_empty_footprint_reserves_nothing() {
    let mut reg = registry();
    let marker = PartSpec::floor("marker", 0, 0);

    reg.register(&marker, &Candidate::new(Vec3::ZERO, Rotation::ZERO, 0))
        .unwrap();
    reg.register(&marker, &Candidate::new(Vec3::ZERO, Rotation::ZERO, 0))
        .unwrap();

    assert_eq!(reg.len(), 2);
    assert_eq!(reg.grid().occupied_count(), 0);
    assert!(reg.grid().is_area_free(Vec3::ZERO, Footprint::new(0, 0), Rotation::ZERO, 9));
}
