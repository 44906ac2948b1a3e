//! Parts Module
//!
//! Part type definitions and the catalog the builder selects from.

pub mod catalog;
pub mod part;

pub use catalog::PartCatalog;
pub use part::{DEFAULT_PART_HEIGHT, PartSpec, PlacementMode};
