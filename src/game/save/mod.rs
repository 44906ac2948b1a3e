//! Save Module
//!
//! Data-only world snapshots. Encoding and file handling belong to the caller.

pub mod snapshot;

pub use snapshot::{RestoreReport, SavedPart, WorldSnapshot, restore, snapshot};
