//! Placement Validation
//!
//! Decides whether a candidate placement is legal. Validation is a pure
//! query over the grid and the world; it never mutates either.
//!
//! Strategy, in order:
//! 1. Candidates outside the buildable map are `OutOfRange`.
//! 2. Surface-aligned parts only need the surface hit that produced them.
//! 3. Grid floors need every footprint cell free on their level.
//! 4. Everything else needs a shrunken copy of its collision volume to
//!    overlap no solid blocking collider.

use std::fmt;

use glam::{Quat, Vec3};
use log::debug;
use thiserror::Error;

use crate::game::parts::PartSpec;
use crate::physics::{LayerMask, OrientedBox, WorldQuery};
use crate::world::{GridIndex, Rotation};

/// Shrink factor applied to collision volumes before overlap queries.
pub const DEFAULT_OVERLAP_SHRINK: f32 = 0.95;

/// Why a candidate is not placeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InvalidReason {
    #[error("no surface under the pointer")]
    NoSurfaceHit,
    #[error("grid area is occupied")]
    AreaOccupied,
    #[error("placement is obstructed")]
    Obstructed,
    #[error("placement is out of range")]
    OutOfRange,
}

/// Outcome of validating a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Validity {
    Valid,
    Invalid(InvalidReason),
    /// Nothing has been validated yet
    #[default]
    Unknown,
}

impl Validity {
    pub fn is_valid(self) -> bool {
        self == Validity::Valid
    }

    pub fn reason(self) -> Option<InvalidReason> {
        match self {
            Validity::Invalid(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validity::Valid => write!(f, "valid"),
            Validity::Invalid(reason) => write!(f, "invalid ({reason})"),
            Validity::Unknown => write!(f, "unknown"),
        }
    }
}

/// A concrete placement proposal: where, facing which way, on which level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub position: Vec3,
    pub rotation: Rotation,
    pub level: usize,
    /// Surface normal for surface-snapped candidates
    pub normal: Option<Vec3>,
}

impl Candidate {
    pub fn new(position: Vec3, rotation: Rotation, level: usize) -> Self {
        Self {
            position,
            rotation,
            level,
            normal: None,
        }
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Full orientation: facing into the surface when a normal is recorded,
    /// otherwise the yaw alone.
    pub fn orientation(&self) -> Quat {
        match self.normal {
            Some(normal) if normal.length_squared() > 0.0 => {
                Quat::from_rotation_arc(Vec3::Z, -normal.normalize())
            }
            _ => self.rotation.to_quat(),
        }
    }
}

/// Stateless legality checks for candidates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementValidator {
    overlap_shrink: f32,
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAP_SHRINK)
    }
}

impl PlacementValidator {
    pub fn new(overlap_shrink: f32) -> Self {
        Self { overlap_shrink }
    }

    pub fn overlap_shrink(&self) -> f32 {
        self.overlap_shrink
    }

    /// Collision volume used for the overlap check, already shrunk.
    pub fn query_volume(&self, candidate: &Candidate, part: &PartSpec, grid: &GridIndex) -> OrientedBox {
        part.bounds_at(candidate.position, candidate.rotation, grid.cell_size())
            .scaled(self.overlap_shrink)
    }

    pub fn validate<W: WorldQuery + ?Sized>(
        &self,
        candidate: &Candidate,
        part: &PartSpec,
        grid: &GridIndex,
        world: &W,
    ) -> Validity {
        let validity = self.check(candidate, part, grid, world);
        if let Validity::Invalid(reason) = validity {
            debug!(
                "[Validator] {} at {:?} (level {}, {}): {}",
                part.name, candidate.position, candidate.level, candidate.rotation, reason
            );
        }
        validity
    }

    fn check<W: WorldQuery + ?Sized>(
        &self,
        candidate: &Candidate,
        part: &PartSpec,
        grid: &GridIndex,
        world: &W,
    ) -> Validity {
        if !grid.config().is_within_map(candidate.position) {
            return Validity::Invalid(InvalidReason::OutOfRange);
        }

        if part.align_to_surface {
            return if candidate.normal.is_some() {
                Validity::Valid
            } else {
                Validity::Invalid(InvalidReason::NoSurfaceHit)
            };
        }

        if part.is_grid() && part.is_floor {
            let free = grid.is_area_free(
                candidate.position,
                part.footprint,
                candidate.rotation,
                candidate.level,
            );
            return if free {
                Validity::Valid
            } else {
                Validity::Invalid(InvalidReason::AreaOccupied)
            };
        }

        let volume = self.query_volume(candidate, part, grid);
        let blocked = world
            .overlap_box(&volume, LayerMask::BLOCKING)
            .iter()
            .any(|hit| !hit.is_trigger);
        if blocked {
            Validity::Invalid(InvalidReason::Obstructed)
        } else {
            Validity::Valid
        }
    }
}
