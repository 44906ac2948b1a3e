//! World queries
//!
//! The placement core never owns physics state. It asks a [`WorldQuery`]
//! for raycasts and box overlaps and treats the answers as a snapshot of
//! the current frame.
//!
//! [`ColliderWorld`] is a small brute-force implementation over oriented
//! boxes. It is what the tests and the demo binary run against; an engine
//! integration would implement the trait on top of its own physics scene.

use glam::Vec3;

use super::collision::OrientedBox;
use super::types::{LayerMask, Ray};
use crate::world::EntityId;

/// Closest surface struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    /// Outward surface normal at `point` (normalized)
    pub normal: Vec3,
    /// Distance from the ray origin to `point`
    pub distance: f32,
    /// Set when the surface belongs to a committed placement
    pub entity: Option<EntityId>,
}

/// One collider intersecting an overlap query volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapHit {
    pub entity: Option<EntityId>,
    pub is_trigger: bool,
}

/// Synchronous spatial query service.
pub trait WorldQuery {
    /// Closest hit within `max_distance` on any layer in `mask`.
    fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Every collider on a layer in `mask` that intersects `volume`.
    fn overlap_box(&self, volume: &OrientedBox, mask: LayerMask) -> Vec<OverlapHit>;
}

/// A static box collider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub shape: OrientedBox,
    pub layers: LayerMask,
    pub is_trigger: bool,
    pub entity: Option<EntityId>,
}

impl Collider {
    pub fn solid(shape: OrientedBox, layers: LayerMask) -> Self {
        Self {
            shape,
            layers,
            is_trigger: false,
            entity: None,
        }
    }

    pub fn trigger(shape: OrientedBox, layers: LayerMask) -> Self {
        Self {
            shape,
            layers,
            is_trigger: true,
            entity: None,
        }
    }

    /// Collider owned by a committed placement. `PLACED` is always added.
    pub fn placed(entity: EntityId, shape: OrientedBox, layers: LayerMask) -> Self {
        Self {
            shape,
            layers: layers | LayerMask::PLACED,
            is_trigger: false,
            entity: Some(entity),
        }
    }
}

/// In-memory world of box colliders.
#[derive(Debug, Clone, Default)]
pub struct ColliderWorld {
    colliders: Vec<Collider>,
}

impl ColliderWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// World with a thin support slab whose top face is `y = 0`.
    pub fn with_ground(half_size: f32) -> Self {
        let mut world = Self::new();
        world.add(Collider::solid(
            OrientedBox::from_min_max(
                Vec3::new(-half_size, -0.5, -half_size),
                Vec3::new(half_size, 0.0, half_size),
            ),
            LayerMask::SUPPORT,
        ));
        world
    }

    pub fn add(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    /// Add the collider of a committed placement.
    pub fn insert_entity(&mut self, entity: EntityId, shape: OrientedBox, layers: LayerMask) {
        self.add(Collider::placed(entity, shape, layers));
    }

    /// Remove every collider owned by `entity`; returns how many were removed.
    pub fn remove_entity(&mut self, entity: EntityId) -> usize {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.entity != Some(entity));
        before - self.colliders.len()
    }

    /// Drop every placed-entity collider, keeping static scenery.
    pub fn clear_entities(&mut self) {
        self.colliders.retain(|c| c.entity.is_none());
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }
}

impl WorldQuery for ColliderWorld {
    fn raycast(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        let mut closest: Option<RayHit> = None;
        let mut closest_dist = max_distance;

        for collider in self.colliders.iter().filter(|c| c.layers.intersects(mask)) {
            let Some(hit) = collider.shape.ray_intersect(ray) else {
                continue;
            };
            if hit.distance <= closest_dist {
                closest_dist = hit.distance;
                closest = Some(RayHit {
                    point: ray.at(hit.distance),
                    normal: hit.normal,
                    distance: hit.distance,
                    entity: collider.entity,
                });
            }
        }

        closest
    }

    fn overlap_box(&self, volume: &OrientedBox, mask: LayerMask) -> Vec<OverlapHit> {
        self.colliders
            .iter()
            .filter(|c| c.layers.intersects(mask) && c.shape.overlaps(volume))
            .map(|c| OverlapHit {
                entity: c.entity,
                is_trigger: c.is_trigger,
            })
            .collect()
    }
}
