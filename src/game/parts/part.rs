//! Part Specifications
//!
//! A part type describes how a building piece is placed: which coordinate
//! strategy produces its candidate, whether it reserves grid cells, and
//! whether committing it creates a new level.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::physics::{LayerMask, OrientedBox};
use crate::world::{Footprint, Rotation};

/// Default vertical extent of a part (meters).
pub const DEFAULT_PART_HEIGHT: f32 = 3.0;

/// Coordinate strategy used to derive a candidate from the pointer ray.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementMode {
    /// Snap to cell centers on the working level
    #[default]
    Grid,
    /// Anywhere on the working level's plane
    FreePlane,
    /// On whatever surface the pointer ray hits
    Surface,
}

/// Static description of one placeable part type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PartSpec {
    /// Unique catalog name
    pub name: String,
    #[serde(default)]
    pub placement: PlacementMode,
    /// Floor-type parts reserve their footprint on the grid
    #[serde(default)]
    pub is_floor: bool,
    #[serde(default)]
    pub footprint: Footprint,
    /// Vertical extent used for the collision volume
    #[serde(default = "default_height")]
    pub height: f32,
    /// Stairs and ladders: committing adds a level this far above the working level
    #[serde(default)]
    pub raise_height: Option<f32>,
    /// Distance along the hit normal for surface placement
    #[serde(default)]
    pub surface_offset: f32,
    /// Face the hit normal and skip overlap checks
    #[serde(default)]
    pub align_to_surface: bool,
}

fn default_height() -> f32 {
    DEFAULT_PART_HEIGHT
}

impl PartSpec {
    /// A 1x1 grid part with default height.
    pub fn new(name: impl Into<String>, placement: PlacementMode) -> Self {
        Self {
            name: name.into(),
            placement,
            is_floor: false,
            footprint: Footprint::default(),
            height: DEFAULT_PART_HEIGHT,
            raise_height: None,
            surface_offset: 0.0,
            align_to_surface: false,
        }
    }

    /// Grid floor piece covering `width x depth` cells.
    pub fn floor(name: impl Into<String>, width: u32, depth: u32) -> Self {
        Self {
            is_floor: true,
            footprint: Footprint::new(width, depth),
            height: 0.25,
            ..Self::new(name, PlacementMode::Grid)
        }
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = footprint;
        self
    }

    pub fn raising(mut self, raise_height: f32) -> Self {
        self.raise_height = Some(raise_height);
        self
    }

    pub fn aligned_to_surface(mut self, surface_offset: f32) -> Self {
        self.placement = PlacementMode::Surface;
        self.align_to_surface = true;
        self.surface_offset = surface_offset;
        self
    }

    pub fn is_grid(&self) -> bool {
        self.placement == PlacementMode::Grid
    }

    /// True iff committing this part writes cells into the grid.
    pub fn reserves_cells(&self) -> bool {
        self.is_grid() && self.is_floor && !self.footprint.is_empty()
    }

    pub fn raises_level(&self) -> bool {
        self.raise_height.is_some()
    }

    /// Layers the committed part's collider lives on (besides `PLACED`).
    ///
    /// Floors are walked and built on but never block freeform placement;
    /// their legality comes from cell occupancy alone.
    pub fn collider_layers(&self) -> LayerMask {
        if self.is_floor {
            LayerMask::SUPPORT
        } else {
            LayerMask::SUPPORT | LayerMask::BLOCKING
        }
    }

    /// World-space collision volume of this part placed at `position`.
    ///
    /// Grid parts fill their rotated footprint's cells exactly, growing
    /// towards +X/+Z from the base cell center. Floors hang below the level
    /// plane so their top face is the walkable surface. Other parts are a
    /// box standing on `position`, yawed by `rotation`.
    pub fn bounds_at(&self, position: Vec3, rotation: Rotation, cell_size: f32) -> OrientedBox {
        let footprint = if self.footprint.is_empty() {
            Footprint::default()
        } else {
            self.footprint
        };
        let half_height = self.height * 0.5;

        if self.is_grid() {
            let rotated = footprint.rotated(rotation);
            let (w, d) = (rotated.width as f32, rotated.depth as f32);
            let y = if self.is_floor { -half_height } else { half_height };
            let center = position
                + Vec3::new((w - 1.0) * cell_size * 0.5, y, (d - 1.0) * cell_size * 0.5);
            let half = Vec3::new(w * cell_size * 0.5, half_height, d * cell_size * 0.5);
            OrientedBox::new(center, half, Quat::IDENTITY)
        } else {
            let half = Vec3::new(
                footprint.width as f32 * cell_size * 0.5,
                half_height,
                footprint.depth as f32 * cell_size * 0.5,
            );
            OrientedBox::new(position + Vec3::Y * half_height, half, rotation.to_quat())
        }
    }
}
