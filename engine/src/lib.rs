//! Castle Crafter Engine Library
//!
//! Multi-level grid building: a placement session shows a ghost of the
//! selected part under the pointer, validates it live, and commits it into a
//! registry that owns grid occupancy and level creation.
//!
//! # Modules
//!
//! - [`world`] - Grid levels, cell occupancy, footprints and rotations
//! - [`physics`] - Rays, oriented boxes and the collider world queried during placement
//! - [`input`] - Interaction modes and the per-tick input event queue
//! - [`game`] - Part catalog, build config, placement builder and save snapshots
//!
//! # Example
//!
//! ```ignore
//! use castle_crafter_engine::game::{BuildConfig, BuildState, PartCatalog};
//! use castle_crafter_engine::input::InputEvent;
//! use castle_crafter_engine::physics::Ray;
//!
//! let mut state = BuildState::new(BuildConfig::default(), PartCatalog::castle_set())?;
//!
//! // Aim at the ground and drop a 2x1 floor
//! state.push_input(InputEvent::SelectPart("floor_2x1".into()));
//! state.push_input(InputEvent::PointerRay(Ray::downward(1.0, 1.0, 20.0)));
//! state.push_input(InputEvent::Commit);
//!
//! let report = state.tick();
//! assert_eq!(report.committed.len(), 1);
//! ```

pub mod input;
pub mod physics;
pub mod world;

// Game-specific modules (located in src/game/ directory)
#[path = "../../src/game/mod.rs"]
pub mod game;

// Re-export world types for convenience
pub use world::{Cell, EntityId, Footprint, GridConfig, GridIndex, Rotation};
// Re-export commonly used input types
pub use input::{InputEvent, InputQueue, InteractionMode};
// Re-export physics types
pub use physics::{ColliderWorld, LayerMask, Ray, WorldQuery};
