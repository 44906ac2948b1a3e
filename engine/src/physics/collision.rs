//! Collision detection module
//!
//! Ray and box intersection primitives for placement queries.
//!
//! # Ray-AABB Intersection
//!
//! The slab method is used for ray-AABB intersection, which finds the
//! intersection points by computing entry and exit times for each axis.
//! Oriented boxes reuse it by moving the ray into the box's local frame.
//!
//! # Box-Box Overlap
//!
//! Oriented boxes are tested with the separating axis theorem over the 15
//! candidate axes (3 face axes per box plus 9 edge cross products).
//! Boxes that merely touch count as overlapping; callers that want to
//! ignore flush neighbours shrink the query box first.
//!
//! # Example
//!
//! ```ignore
//! use castle_crafter_engine::physics::{OrientedBox, Ray};
//! use glam::{Quat, Vec3};
//!
//! let wall = OrientedBox::new(Vec3::ZERO, Vec3::new(1.0, 1.5, 0.1), Quat::IDENTITY);
//! let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
//! if let Some(hit) = wall.ray_intersect(&ray) {
//!     println!("Hit at distance {}: {:?}", hit.distance, ray.at(hit.distance));
//! }
//! ```

use glam::{Quat, Vec3};

use super::types::Ray;

/// Added to rotation-matrix terms so near-parallel edges don't produce
/// a zero cross-product axis that falsely separates.
const SAT_EPSILON: f32 = 1e-6;

/// Performs ray-AABB intersection using the slab method.
///
/// # Returns
///
/// * `Some(t)` - Distance along the ray to the intersection point (t >= 0)
/// * `None` - No intersection or intersection is behind the ray origin
pub fn ray_aabb_intersect(
    ray_origin: Vec3,
    ray_dir: Vec3,
    aabb_min: Vec3,
    aabb_max: Vec3,
) -> Option<f32> {
    // Near-zero directions become huge inverse values so the slab test still works
    let inv_dir = Vec3::new(
        if ray_dir.x.abs() > 1e-10 { 1.0 / ray_dir.x } else { f32::MAX * ray_dir.x.signum() },
        if ray_dir.y.abs() > 1e-10 { 1.0 / ray_dir.y } else { f32::MAX * ray_dir.y.signum() },
        if ray_dir.z.abs() > 1e-10 { 1.0 / ray_dir.z } else { f32::MAX * ray_dir.z.signum() },
    );

    let t1 = (aabb_min.x - ray_origin.x) * inv_dir.x;
    let t2 = (aabb_max.x - ray_origin.x) * inv_dir.x;

    let mut t_min = t1.min(t2);
    let mut t_max = t1.max(t2);

    let t3 = (aabb_min.y - ray_origin.y) * inv_dir.y;
    let t4 = (aabb_max.y - ray_origin.y) * inv_dir.y;

    t_min = t_min.max(t3.min(t4));
    t_max = t_max.min(t3.max(t4));

    let t5 = (aabb_min.z - ray_origin.z) * inv_dir.z;
    let t6 = (aabb_max.z - ray_origin.z) * inv_dir.z;

    t_min = t_min.max(t5.min(t6));
    t_max = t_max.min(t5.max(t6));

    if t_max >= t_min && t_max >= 0.0 {
        if t_min >= 0.0 {
            Some(t_min)
        } else {
            // Ray starts inside the AABB
            Some(t_max)
        }
    } else {
        None
    }
}

/// Computes the outward normal of the AABB face closest to `point`.
pub fn aabb_surface_normal(point: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Vec3 {
    let center = (aabb_min + aabb_max) * 0.5;
    let half_extents = ((aabb_max - aabb_min) * 0.5).max(Vec3::splat(1e-6));
    let normalized = (point - center) / half_extents;
    let abs_normalized = normalized.abs();

    if abs_normalized.x >= abs_normalized.y && abs_normalized.x >= abs_normalized.z {
        Vec3::new(normalized.x.signum(), 0.0, 0.0)
    } else if abs_normalized.y >= abs_normalized.z {
        Vec3::new(0.0, normalized.y.signum(), 0.0)
    } else {
        Vec3::new(0.0, 0.0, normalized.z.signum())
    }
}

/// Where a ray struck a box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxHit {
    /// Distance from ray origin to hit point
    pub distance: f32,
    /// World-space outward normal of the face that was hit
    pub normal: Vec3,
}

/// Box with arbitrary orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub rotation: Quat,
}

impl OrientedBox {
    pub fn new(center: Vec3, half_extents: Vec3, rotation: Quat) -> Self {
        Self {
            center,
            half_extents,
            rotation,
        }
    }

    /// Axis-aligned box spanning `min..max`.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::new((min + max) * 0.5, (max - min) * 0.5, Quat::IDENTITY)
    }

    /// Same box with half extents multiplied by `factor`.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            half_extents: self.half_extents * factor,
            ..self
        }
    }

    /// The three local axes expressed in world space.
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::X,
            self.rotation * Vec3::Y,
            self.rotation * Vec3::Z,
        ]
    }

    /// Slab test in the box's local frame.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<BoxHit> {
        let inverse = self.rotation.inverse();
        let local_origin = inverse * (ray.origin - self.center);
        let local_dir = inverse * ray.direction;

        let t = ray_aabb_intersect(local_origin, local_dir, -self.half_extents, self.half_extents)?;
        let local_hit = local_origin + local_dir * t;
        let local_normal = aabb_surface_normal(local_hit, -self.half_extents, self.half_extents);

        Some(BoxHit {
            distance: t,
            normal: self.rotation * local_normal,
        })
    }

    /// Separating axis test. Touching faces count as overlap.
    pub fn overlaps(&self, other: &OrientedBox) -> bool {
        let a = self.axes();
        let b = other.axes();
        let ea = self.half_extents.to_array();
        let eb = other.half_extents.to_array();

        // Rotation expressing `other` in this box's frame
        let mut r = [[0.0f32; 3]; 3];
        let mut abs_r = [[0.0f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                r[i][j] = a[i].dot(b[j]);
                abs_r[i][j] = r[i][j].abs() + SAT_EPSILON;
            }
        }

        let offset = other.center - self.center;
        let t = [offset.dot(a[0]), offset.dot(a[1]), offset.dot(a[2])];

        // Face axes of self
        for i in 0..3 {
            let ra = ea[i];
            let rb = eb[0] * abs_r[i][0] + eb[1] * abs_r[i][1] + eb[2] * abs_r[i][2];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        // Face axes of other
        for j in 0..3 {
            let ra = ea[0] * abs_r[0][j] + ea[1] * abs_r[1][j] + ea[2] * abs_r[2][j];
            let rb = eb[j];
            let tj = t[0] * r[0][j] + t[1] * r[1][j] + t[2] * r[2][j];
            if tj.abs() > ra + rb {
                return false;
            }
        }

        // Edge cross products a[i] x b[j]
        for i in 0..3 {
            let (i1, i2) = ((i + 1) % 3, (i + 2) % 3);
            for j in 0..3 {
                let (j1, j2) = ((j + 1) % 3, (j + 2) % 3);
                let ra = ea[i1] * abs_r[i2][j] + ea[i2] * abs_r[i1][j];
                let rb = eb[j1] * abs_r[i][j2] + eb[j2] * abs_r[i][j1];
                let tv = t[i2] * r[i1][j] - t[i1] * r[i2][j];
                if tv.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }
}
