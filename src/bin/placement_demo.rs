//! Placement Demo
//!
//! Headless walk through the builder: lays a floor, raises a level with
//! stairs, hangs a torch on a wall, deletes a crate, toggles first-person
//! mode, then saves and reloads the castle.
//!
//! Run with `RUST_LOG=debug cargo run --bin placement_demo` to see every
//! validation decision.

use std::error::Error;

use castle_crafter_engine::game::{BuildConfig, BuildState, PartCatalog, TickReport};
use castle_crafter_engine::input::{InputEvent, InteractionMode};
use castle_crafter_engine::physics::{Ray, Vec3};

/// Height the pointer ray is cast from when looking straight down.
const EYE_HEIGHT: f32 = 40.0;

fn aim(x: f32, z: f32) -> InputEvent {
    InputEvent::PointerRay(Ray::downward(x, z, EYE_HEIGHT))
}

fn run_tick(state: &mut BuildState, label: &str, events: Vec<InputEvent>) -> TickReport {
    for event in events {
        state.push_input(event);
    }
    let report = state.tick();

    println!("--- {label} ---");
    if let Some(mode) = report.mode_changed {
        println!("  mode: {mode}");
    }
    for id in &report.committed {
        println!("  placed {id}");
    }
    for id in &report.removed {
        println!("  removed {id}");
    }
    for err in &report.rejected {
        println!("  rejected: {err}");
    }
    for name in &report.unknown_parts {
        println!("  unknown part: {name}");
    }
    if report.ignored > 0 {
        println!("  ignored {} build inputs", report.ignored);
    }
    if let Some(preview) = state.builder.session().preview() {
        println!(
            "  ghost: {} {} -> {}",
            preview.part.name, preview.rotation, preview.validity
        );
    }
    println!(
        "  {} parts, {} levels, working level {}",
        state.registry.len(),
        state.registry.grid().level_count(),
        state.builder.session().working_level()
    );
    report
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut state = BuildState::new(BuildConfig::default(), PartCatalog::castle_set())?;
    let cell = state.config.cell_size;

    println!("=== Castle Crafter placement demo ===");
    println!("Cell size: {cell:.1}m, parts: {}", state.catalog.len());

    run_tick(
        &mut state,
        "lay a 2x1 floor",
        vec![
            InputEvent::SelectPart("floor_2x1".into()),
            aim(0.0, 0.0),
            InputEvent::Commit,
        ],
    );

    run_tick(
        &mut state,
        "overlapping floor is rejected",
        vec![InputEvent::Rotate(90), aim(cell, 0.0), InputEvent::Commit],
    );

    run_tick(
        &mut state,
        "rotated floor next to it",
        vec![aim(2.0 * cell, 0.0), InputEvent::Commit],
    );

    run_tick(
        &mut state,
        "stairs raise a new level",
        vec![
            InputEvent::SelectPart("stairs".into()),
            aim(-2.0 * cell, 0.0),
            InputEvent::Commit,
        ],
    );

    run_tick(
        &mut state,
        "floor on the upper level",
        vec![
            InputEvent::SelectPart("floor_1x1".into()),
            aim(0.0, 0.0),
            InputEvent::Commit,
        ],
    );

    run_tick(
        &mut state,
        "wall back on the ground",
        vec![
            InputEvent::ChangeLevel(-1),
            InputEvent::SelectPart("wall".into()),
            aim(4.0 * cell, 0.0),
            InputEvent::Commit,
        ],
    );

    let toward_wall = Ray::new(Vec3::new(0.0, 1.5, 0.0), Vec3::X);
    run_tick(
        &mut state,
        "torch on the wall face",
        vec![
            InputEvent::SelectPart("torch".into()),
            InputEvent::PointerRay(toward_wall),
            InputEvent::Commit,
        ],
    );

    let crate_spot = Vec3::new(6.0 * cell + 0.3, 0.0, 3.0 * cell - 0.4);
    run_tick(
        &mut state,
        "free crate",
        vec![
            InputEvent::SelectPart("crate".into()),
            aim(crate_spot.x, crate_spot.z),
            InputEvent::Commit,
            InputEvent::Cancel,
        ],
    );

    run_tick(
        &mut state,
        "delete the crate",
        vec![InputEvent::DeleteAt(Ray::downward(
            crate_spot.x,
            crate_spot.z,
            EYE_HEIGHT,
        ))],
    );

    run_tick(
        &mut state,
        "first-person mode drops build input",
        vec![
            InputEvent::SelectPart("wall".into()),
            InputEvent::SwitchMode(InteractionMode::FirstPerson),
            aim(-6.0 * cell, 0.0),
            InputEvent::Commit,
        ],
    );

    run_tick(
        &mut state,
        "back to build mode",
        vec![InputEvent::SwitchMode(InteractionMode::Build)],
    );

    let snapshot = state.save();
    let json = serde_json::to_string_pretty(&snapshot)?;
    println!("=== Saved {} parts ({} bytes) ===", snapshot.parts.len(), json.len());

    let mut reloaded = BuildState::new(state.config.clone(), PartCatalog::castle_set())?;
    let (report, events) = reloaded.load(&serde_json::from_str(&json)?);
    println!(
        "=== Reloaded: {} restored, {} unknown, {} conflicting, {} events ===",
        report.restored,
        report.skipped_unknown,
        report.skipped_conflicts,
        events.len()
    );
    println!(
        "Occupied cells: {} before, {} after",
        state.registry.grid().occupied_count(),
        reloaded.registry.grid().occupied_count()
    );

    Ok(())
}
