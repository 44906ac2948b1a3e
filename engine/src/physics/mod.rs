//! Physics module
//!
//! Spatial queries the placement core relies on. The core never simulates
//! anything; it only asks "what does this ray hit" and "what overlaps this
//! box" through the [`query::WorldQuery`] trait.
//!
//! # Unit System
//!
//! **1 unit = 1 meter**, +Y is up.
//!
//! # Submodules
//!
//! - [`types`] - Core math types (Vec3, Quat) re-exported from glam, rays and layer masks
//! - [`collision`] - Ray-box intersection and oriented-box overlap tests
//! - [`query`] - The world query trait and an in-memory collider world

pub mod collision;
pub mod query;
pub mod types;

pub use collision::{BoxHit, OrientedBox, aabb_surface_normal, ray_aabb_intersect};
pub use query::{Collider, ColliderWorld, OverlapHit, RayHit, WorldQuery};
pub use types::{LayerMask, Quat, Ray, Vec3};
