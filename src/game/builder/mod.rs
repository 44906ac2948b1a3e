//! Builder Module
//!
//! Placement of modular building parts: legality checks, the ghost preview
//! session, the registry of committed parts, and the per-tick mode driver.

pub mod mode;
pub mod registry;
pub mod session;
pub mod validator;

pub use mode::{BuildContext, BuilderMode, TickReport};
pub use registry::{
    PlacedEntity, PlacedEntityRegistry, RegisterError, Registration, RegistryEvent,
    RegistryListener, Reservation,
};
pub use session::{CommitError, GhostPreview, PlacementSession, SessionState};
pub use validator::{
    Candidate, DEFAULT_OVERLAP_SHRINK, InvalidReason, PlacementValidator, Validity,
};
