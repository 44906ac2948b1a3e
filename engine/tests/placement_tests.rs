//! Placement Tests - Validation, Session and Builder Mode
//!
//! End-to-end placement flows through the public API: ghost preview,
//! commit, level raising, deletion and mode switching.

use castle_crafter_engine::game::{
    BuildConfig, BuildState, Candidate, CommitError, CommitPolicy, InvalidReason, PartCatalog,
    PartSpec, PlacedEntityRegistry, PlacementSession, PlacementValidator, RegistryEvent, Validity,
};
use castle_crafter_engine::input::{InputEvent, InteractionMode};
use castle_crafter_engine::physics::{ColliderWorld, Ray};
use castle_crafter_engine::world::{Cell, GridConfig, GridIndex, Rotation};
use glam::Vec3;

fn aim(x: f32, z: f32) -> InputEvent {
    InputEvent::PointerRay(Ray::downward(x, z, 40.0))
}

fn state() -> BuildState {
    BuildState::new(BuildConfig::default(), PartCatalog::castle_set()).unwrap()
}

// ============================================================================
// Validator Tests
// ============================================================================

#[test]
fn test_overlapping_floor_is_area_occupied() {
    let catalog = PartCatalog::castle_set();
    let floor = catalog.get("floor_2x1").unwrap();
    let world = ColliderWorld::with_ground(100.0);
    let validator = PlacementValidator::default();
    let mut reg = PlacedEntityRegistry::new(GridIndex::new(GridConfig::new(2.0)));

    reg.register(floor, &Candidate::new(Vec3::ZERO, Rotation::ZERO, 0))
        .unwrap();

    // Cell (1,0) overlaps the first floor's second cell
    let overlapping = Candidate::new(Vec3::new(2.0, 0.0, 0.0), Rotation::ZERO, 0);
    assert_eq!(
        validator.validate(&overlapping, floor, reg.grid(), &world),
        Validity::Invalid(InvalidReason::AreaOccupied)
    );

    let beside = Candidate::new(Vec3::new(4.0, 0.0, 0.0), Rotation::ZERO, 0);
    assert!(validator.validate(&beside, floor, reg.grid(), &world).is_valid());
    reg.register(floor, &beside).unwrap();
    assert_eq!(reg.grid().occupied_count(), 4);
}

#[test]
fn test_validator_does_not_mutate() {
    let catalog = PartCatalog::castle_set();
    let floor = catalog.get("floor_1x1").unwrap();
    let world = ColliderWorld::new();
    let mut reg = PlacedEntityRegistry::new(GridIndex::new(GridConfig::new(2.0)));
    reg.register(floor, &Candidate::new(Vec3::new(4.0, 0.0, 0.0), Rotation::ZERO, 0))
        .unwrap();
    let grid = reg.grid();

    let candidate = Candidate::new(Vec3::ZERO, Rotation::ZERO, 0);
    let first = PlacementValidator::default().validate(&candidate, floor, grid, &world);
    let second = PlacementValidator::default().validate(&candidate, floor, grid, &world);
    assert_eq!(first, Validity::Valid);
    assert_eq!(first, second);
    assert_eq!(grid.occupied_count(), 1);
    assert!(!grid.is_occupied(Cell::new(0, 0, 0)));
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_stairs_raise_level_and_snap_follows() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("stairs".into()));
    state.push_input(aim(0.0, 0.0));
    state.push_input(InputEvent::Commit);
    let report = state.tick();

    assert_eq!(report.committed.len(), 1);
    assert!(report
        .events
        .iter()
        .any(|e| matches!(e, RegistryEvent::LevelAdded { index: 1, .. })));

    let grid = state.registry.grid();
    assert_eq!(grid.level_count(), 2);
    assert_eq!(grid.snap(Vec3::new(0.4, 0.0, 0.4), 1).y, 3.0);
    assert_eq!(state.builder.session().working_level(), 1);
}

#[test]
fn test_second_stairs_reuse_raised_level() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("stairs".into()));
    state.push_input(aim(0.0, 0.0));
    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::ChangeLevel(-1));
    state.push_input(aim(8.0, 0.0));
    state.push_input(InputEvent::Commit);
    let report = state.tick();

    assert_eq!(report.committed.len(), 2);
    assert_eq!(state.registry.grid().level_count(), 2);
}

#[test]
fn test_lowering_part_keeps_working_floor() {
    let mut catalog = PartCatalog::castle_set();
    catalog
        .insert(PartSpec::floor("cellar_hatch", 1, 1).raising(-3.0))
        .unwrap();
    let mut state = BuildState::new(BuildConfig::default(), catalog).unwrap();
    state.push_input(InputEvent::SelectPart("cellar_hatch".into()));
    state.push_input(aim(0.0, 0.0));
    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::Commit);
    let report = state.tick();

    let grid = state.registry.grid();
    assert_eq!(grid.level_heights(), vec![-3.0, 0.0]);
    assert_eq!(state.builder.session().working_level(), 1);
    assert_eq!(state.registry.get(report.committed[0]).unwrap().level, 1);
    // The repeated commit sees the hatch on the renumbered ground floor
    assert_eq!(
        report.rejected,
        vec![CommitError::Invalid(InvalidReason::AreaOccupied)]
    );
}

#[test]
fn test_huge_rotate_input_wraps() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("crate".into()));
    state.push_input(InputEvent::Rotate(90));
    state.push_input(InputEvent::Rotate(i32::MAX));
    state.push_input(InputEvent::Rotate(i32::MIN));
    state.tick();

    let rotation = state.builder.session().preview().unwrap().rotation;
    assert!(rotation.degrees() < 360);
}

#[test]
fn test_commit_keeps_targeting_by_default() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("floor_1x1".into()));
    state.push_input(aim(0.0, 0.0));
    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::Commit);
    let report = state.tick();

    assert_eq!(report.committed.len(), 1);
    // The preview was revalidated after the first commit
    assert_eq!(
        report.rejected,
        vec![CommitError::Invalid(InvalidReason::AreaOccupied)]
    );
    assert!(state.builder.session().is_targeting());
}

#[test]
fn test_deselect_policy_returns_to_idle() {
    let config = BuildConfig {
        commit_policy: CommitPolicy::Deselect,
        ..BuildConfig::default()
    };
    let mut state = BuildState::new(config, PartCatalog::castle_set()).unwrap();
    state.push_input(InputEvent::SelectPart("crate".into()));
    state.push_input(aim(1.3, 2.2));
    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::Commit);
    let report = state.tick();

    assert_eq!(report.committed.len(), 1);
    assert_eq!(report.rejected, vec![CommitError::NotTargeting]);
    assert!(!state.builder.session().is_targeting());
}

#[test]
fn test_commit_before_any_pointer_has_no_candidate() {
    let mut session = PlacementSession::default();
    let mut reg = PlacedEntityRegistry::new(GridIndex::new(GridConfig::default()));
    let world = ColliderWorld::new();

    assert_eq!(session.commit(&mut reg, &world), Err(CommitError::NotTargeting));
    session.select_part(PartCatalog::castle_set().get("wall").unwrap().clone());
    assert_eq!(session.commit(&mut reg, &world), Err(CommitError::NoCandidate));
    assert!(reg.is_empty());
}

#[test]
fn test_wall_obstructs_crate() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("wall".into()));
    state.push_input(aim(6.0, 6.0));
    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::SelectPart("crate".into()));
    state.push_input(aim(6.0, 6.0));
    let report = state.tick();

    assert_eq!(report.committed.len(), 1);
    let preview = state.builder.session().preview().unwrap();
    assert_eq!(preview.validity, Validity::Invalid(InvalidReason::Obstructed));
}

#[test]
fn test_torch_aligns_to_wall_face() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("wall".into()));
    state.push_input(aim(8.0, 0.0));
    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::SelectPart("torch".into()));
    state.push_input(InputEvent::PointerRay(Ray::new(
        Vec3::new(0.0, 1.5, 0.0),
        Vec3::X,
    )));
    state.push_input(InputEvent::Commit);
    let report = state.tick();

    assert_eq!(report.committed.len(), 2);
    let torch = state.registry.get(report.committed[1]).unwrap();
    assert_eq!(torch.normal, Some(Vec3::NEG_X));
    assert!((torch.position.x - 6.9).abs() < 1e-4);
}

// ============================================================================
// Registry Tests
// ============================================================================

#[test]
fn test_remove_uses_stored_reservation() {
    let mut catalog = PartCatalog::castle_set();
    let mut reg = PlacedEntityRegistry::new(GridIndex::new(GridConfig::new(2.0)));
    let floor = catalog.get("floor_2x1").unwrap().clone();

    let id = reg
        .register(&floor, &Candidate::new(Vec3::ZERO, Rotation::ZERO, 0))
        .unwrap()
        .id;
    catalog.get_mut("floor_2x1").unwrap().footprint.width = 4;

    let removed = reg.remove(id).unwrap();
    assert_eq!(removed.reservation.unwrap().footprint.width, 2);
    assert_eq!(reg.grid().occupied_count(), 0);
    assert!(!reg.grid().is_occupied(Cell::new(1, 0, 0)));
}

#[test]
fn test_delete_at_frees_cells() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("floor_2x1".into()));
    state.push_input(aim(0.0, 0.0));
    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::Cancel);
    state.tick();
    assert_eq!(state.registry.grid().occupied_count(), 2);

    state.push_input(InputEvent::DeleteAt(Ray::downward(2.0, 0.0, 40.0)));
    let report = state.tick();

    assert_eq!(report.removed.len(), 1);
    assert!(state.registry.is_empty());
    assert_eq!(state.registry.grid().occupied_count(), 0);
    assert!(state.world.colliders().iter().all(|c| c.entity.is_none()));
}

// ============================================================================
// Mode Tests
// ============================================================================

#[test]
fn test_mode_switch_applies_before_build_input() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("floor_1x1".into()));
    state.push_input(aim(0.0, 0.0));
    state.tick();
    assert!(state.builder.session().is_targeting());

    state.push_input(InputEvent::Commit);
    state.push_input(InputEvent::SwitchMode(InteractionMode::FirstPerson));
    let report = state.tick();

    assert_eq!(report.mode_changed, Some(InteractionMode::FirstPerson));
    assert!(report.committed.is_empty());
    assert_eq!(report.ignored, 1);
    assert!(!state.builder.session().is_targeting());
    assert!(state.registry.is_empty());
}

#[test]
fn test_unknown_part_is_reported() {
    let mut state = state();
    state.push_input(InputEvent::SelectPart("drawbridge".into()));
    let report = state.tick();

    assert_eq!(report.unknown_parts, vec!["drawbridge".to_string()]);
    assert!(!state.builder.session().is_targeting());
}
