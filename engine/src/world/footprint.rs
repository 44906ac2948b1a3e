//! Footprints, Rotations and Cells
//!
//! Discrete building blocks for grid occupancy. A footprint is measured in
//! cells, a rotation is a yaw in whole degrees, and a cell is an integer
//! (x, level, z) triple.

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Width x depth of a floor part, in cells.
///
/// A footprint with a zero dimension reserves nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub depth: u32,
}

impl Default for Footprint {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Footprint {
    /// The "no reservation" footprint.
    pub const NONE: Footprint = Footprint { width: 0, depth: 0 };

    pub const fn new(width: u32, depth: u32) -> Self {
        Self { width, depth }
    }

    /// True when this footprint covers no cells at all.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.depth == 0
    }

    /// Number of cells covered.
    pub fn area(&self) -> u32 {
        self.width * self.depth
    }

    /// Footprint after applying `rotation`: odd quarter turns swap width and depth.
    pub fn rotated(self, rotation: Rotation) -> Self {
        if rotation.is_odd_quarter() {
            Self::new(self.depth, self.width)
        } else {
            self
        }
    }

    /// Cells covered when the rotated footprint is anchored at `base`.
    ///
    /// The footprint always extends towards +X and +Z from the base cell.
    pub fn cells(self, base: IVec2, rotation: Rotation) -> impl Iterator<Item = IVec2> {
        let Footprint { width, depth } = self.rotated(rotation);
        (0..width as i32).flat_map(move |dx| (0..depth as i32).map(move |dz| base + IVec2::new(dx, dz)))
    }
}

impl fmt::Display for Footprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.depth)
    }
}

/// Yaw rotation in whole degrees, always normalised into `[0, 360)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Rotation(u16);

impl Rotation {
    pub const ZERO: Rotation = Rotation(0);
    pub const QUARTER: Rotation = Rotation(90);
    pub const HALF: Rotation = Rotation(180);
    pub const THREE_QUARTERS: Rotation = Rotation(270);

    /// Build a rotation from any number of degrees (negative values wrap).
    pub fn from_degrees(degrees: i32) -> Self {
        Rotation(degrees.rem_euclid(360) as u16)
    }

    pub fn degrees(self) -> i32 {
        self.0 as i32
    }

    /// Add `delta` degrees, wrapping modulo 360.
    pub fn offset(self, delta: i32) -> Self {
        Self::from_degrees(self.degrees() + delta.rem_euclid(360))
    }

    /// Round to the nearest multiple of 90 degrees. Ties round up (45 -> 90).
    pub fn snapped_to_quarter(self) -> Self {
        let quarters = (self.degrees() + 45) / 90;
        Self::from_degrees(quarters * 90)
    }

    /// True for 90 and 270 (and any yaw that rounds to them).
    pub fn is_odd_quarter(self) -> bool {
        (self.snapped_to_quarter().0 / 90) % 2 == 1
    }

    pub fn radians(self) -> f32 {
        (self.0 as f32).to_radians()
    }

    /// Rotation about +Y by this yaw.
    pub fn to_quat(self) -> glam::Quat {
        glam::Quat::from_rotation_y(self.radians())
    }
}

impl From<i32> for Rotation {
    fn from(degrees: i32) -> Self {
        Rotation::from_degrees(degrees)
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> Self {
        rotation.degrees()
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// One occupied grid cell, tagged with its level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub level: usize,
    pub z: i32,
}

impl Cell {
    pub fn new(x: i32, level: usize, z: i32) -> Self {
        Self { x, level, z }
    }

    pub fn from_xz(xz: IVec2, level: usize) -> Self {
        Self::new(xz.x, level, xz.y)
    }

    pub fn xz(&self) -> IVec2 {
        IVec2::new(self.x, self.z)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}) @ level {}", self.x, self.z, self.level)
    }
}
