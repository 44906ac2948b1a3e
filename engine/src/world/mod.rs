//! World Module
//!
//! Grid configuration, the multi-level occupancy index, footprint and
//! rotation math, and placed-entity identity.

pub mod entity;
pub mod footprint;
pub mod grid;

pub use entity::EntityId;
pub use footprint::{Cell, Footprint, Rotation};
pub use grid::{
    GridConfig, GridError, GridIndex, Level, LevelInsert, MIN_CELL_SIZE, snap_to_grid,
};
