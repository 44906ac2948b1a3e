//! Physics types
//!
//! Core math types re-exported from glam, plus rays and layer masks used by
//! world queries.

use std::ops::BitOr;

pub use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Half-line used for pointer picking and surface queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Normalized direction (zero if constructed from a zero vector)
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray pointing straight down onto (x, z) from `from_height`.
    pub fn downward(x: f32, z: f32, from_height: f32) -> Self {
        Self::new(Vec3::new(x, from_height, z), Vec3::NEG_Y)
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to the horizontal plane `y = height`.
    ///
    /// `None` when the ray is parallel to the plane or the plane is behind the origin.
    pub fn intersect_horizontal_plane(&self, height: f32) -> Option<f32> {
        if self.direction.y.abs() < 0.0001 {
            return None;
        }
        let t = (height - self.origin.y) / self.direction.y;
        if t < 0.0 { None } else { Some(t) }
    }
}

/// Collision layer bit set used to filter world queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    /// Surfaces a part may be placed onto
    pub const SUPPORT: LayerMask = LayerMask(1 << 0);
    /// Solid objects that block freeform placement
    pub const BLOCKING: LayerMask = LayerMask(1 << 1);
    /// Colliders belonging to committed placements
    pub const PLACED: LayerMask = LayerMask(1 << 2);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// True if the two masks share any layer.
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}
