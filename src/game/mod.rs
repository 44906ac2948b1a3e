//! Game Module
//!
//! Castle building on top of the engine: part catalogs, build
//! configuration, the placement builder, and save snapshots.

pub mod builder;
pub mod config;
pub mod parts;
pub mod save;
pub mod state;

pub use builder::{
    BuildContext, BuilderMode, Candidate, CommitError, GhostPreview, InvalidReason,
    PlacedEntity, PlacedEntityRegistry, PlacementSession, PlacementValidator, RegisterError,
    RegistryEvent, RegistryListener, Reservation, SessionState, TickReport, Validity,
};
pub use config::{BuildConfig, CommitPolicy, ConfigError};
pub use parts::{PartCatalog, PartSpec, PlacementMode};
pub use save::{RestoreReport, SavedPart, WorldSnapshot};
pub use state::BuildState;
