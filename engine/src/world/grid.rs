//! Grid Module
//!
//! Grid configuration and the multi-level occupancy index.
//!
//! ## Coordinates
//! - 1 unit = 1 meter
//! - A cell index is `round(world / cell_size)` on X and Z; cell `i` is
//!   centered on `i * cell_size`.
//! - Levels are horizontal tiers at absolute heights, addressed by index
//!   in ascending height order. Level 0 is the lowest tier.
//!
//! ## Ownership
//! `GridIndex` owns every level and the occupied cells on it. Only the
//! placed-entity registry writes reservations, so the mutating methods are
//! crate-private.

use std::collections::HashSet;

use glam::{IVec2, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::footprint::{Cell, Footprint, Rotation};

/// Smallest cell size accepted by configuration.
pub const MIN_CELL_SIZE: f32 = 0.1;

/// Grid and map configuration for world-space operations.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Horizontal size of one cell (meters)
    pub cell_size: f32,
    /// Two level heights closer than this are the same level
    pub level_epsilon: f32,
    /// Buildable bounds (-map_size to +map_size) on X and Z
    pub map_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            level_epsilon: 0.01,
            map_size: 5000.0,
        }
    }
}

impl GridConfig {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }

    /// Snap a position to the nearest cell center. Only X and Z are snapped.
    pub fn snap_to_grid(&self, pos: Vec3) -> Vec3 {
        snap_to_grid(pos, self.cell_size)
    }

    /// Whether X and Z both lie inside the buildable bounds.
    pub fn is_within_map(&self, pos: Vec3) -> bool {
        pos.x.abs() <= self.map_size && pos.z.abs() <= self.map_size
    }
}

/// Standalone function to snap a position to a grid.
pub fn snap_to_grid(pos: Vec3, grid_size: f32) -> Vec3 {
    Vec3::new(
        (pos.x / grid_size).round() * grid_size,
        pos.y,
        (pos.z / grid_size).round() * grid_size,
    )
}

/// Errors from reserving grid cells.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("level {0} does not exist")]
    UnknownLevel(usize),
    #[error("cell {cell} is already occupied")]
    AreaOccupied { cell: Cell },
}

/// A horizontal building tier and the cells reserved on it.
#[derive(Clone, Debug)]
pub struct Level {
    height: f32,
    occupied: HashSet<IVec2>,
}

impl Level {
    fn new(height: f32) -> Self {
        Self {
            height,
            occupied: HashSet::new(),
        }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied.len()
    }
}

/// Outcome of [`GridIndex::add_level`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelInsert {
    /// Index of the level at the requested height
    pub index: usize,
    /// False when an existing level within epsilon was reused
    pub inserted: bool,
}

/// Multi-level occupancy index.
///
/// Levels are strictly increasing and never closer than `level_epsilon`.
/// Inserting a level below existing ones shifts their indices up by one;
/// each level's occupied cells move with it.
#[derive(Clone, Debug)]
pub struct GridIndex {
    config: GridConfig,
    levels: Vec<Level>,
}

impl Default for GridIndex {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

impl GridIndex {
    /// Create an index with a single ground level at height 0.
    pub fn new(config: GridConfig) -> Self {
        Self::with_levels(config, &[0.0])
    }

    /// Create an index with the given level heights (any order, duplicates merged).
    ///
    /// An empty list falls back to a single ground level at height 0.
    pub fn with_levels(config: GridConfig, heights: &[f32]) -> Self {
        let mut grid = Self {
            config,
            levels: Vec::new(),
        };
        for &height in heights {
            grid.add_level(height);
        }
        if grid.levels.is_empty() {
            grid.levels.push(Level::new(0.0));
        }
        grid
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn cell_size(&self) -> f32 {
        self.config.cell_size
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// Level heights in ascending order.
    pub fn level_heights(&self) -> Vec<f32> {
        self.levels.iter().map(Level::height).collect()
    }

    /// Clamp a (possibly negative) level index into `[0, level_count - 1]`.
    pub fn clamp_level(&self, level: i64) -> usize {
        level.clamp(0, self.levels.len() as i64 - 1) as usize
    }

    /// Absolute height of `level`, clamped into the valid range. Never fails.
    pub fn y_for_level(&self, level: usize) -> f32 {
        let index = level.min(self.levels.len() - 1);
        self.levels[index].height
    }

    /// Index of the level within epsilon of `height`, if any.
    pub fn find_level(&self, height: f32) -> Option<usize> {
        self.levels
            .iter()
            .position(|l| (l.height - height).abs() < self.config.level_epsilon)
    }

    /// Add a level at `height`, or return the existing one within epsilon.
    pub(crate) fn add_level(&mut self, height: f32) -> LevelInsert {
        debug_assert!(height.is_finite(), "level height must be finite");

        if let Some(index) = self.find_level(height) {
            return LevelInsert {
                index,
                inserted: false,
            };
        }

        let index = self.levels.partition_point(|l| l.height < height);
        self.levels.insert(index, Level::new(height));
        LevelInsert {
            index,
            inserted: true,
        }
    }

    /// Cell (x, z) containing `pos`, rounded to the nearest cell index.
    pub fn world_to_cell(&self, pos: Vec3) -> IVec2 {
        let size = self.config.cell_size;
        IVec2::new((pos.x / size).round() as i32, (pos.z / size).round() as i32)
    }

    /// Level-tagged cell containing `pos`.
    pub fn cell_at(&self, pos: Vec3, level: usize) -> Cell {
        Cell::from_xz(self.world_to_cell(pos), level)
    }

    /// World position of a cell center on its level.
    pub fn cell_center(&self, cell: Cell) -> Vec3 {
        let size = self.config.cell_size;
        Vec3::new(
            cell.x as f32 * size,
            self.y_for_level(cell.level),
            cell.z as f32 * size,
        )
    }

    /// Snap `pos` to the nearest cell center with Y on `level`.
    pub fn snap(&self, pos: Vec3, level: usize) -> Vec3 {
        let snapped = self.config.snap_to_grid(pos);
        Vec3::new(snapped.x, self.y_for_level(level), snapped.z)
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.levels
            .get(cell.level)
            .is_some_and(|l| l.occupied.contains(&cell.xz()))
    }

    /// Cells covered by `footprint` rotated by `rotation`, anchored at the cell of `base_pos`.
    pub fn covered_cells(
        &self,
        base_pos: Vec3,
        footprint: Footprint,
        rotation: Rotation,
        level: usize,
    ) -> Vec<Cell> {
        let base = self.world_to_cell(base_pos);
        footprint
            .cells(base, rotation)
            .map(|xz| Cell::from_xz(xz, level))
            .collect()
    }

    /// First already-occupied cell under the footprint, if any.
    pub fn first_conflict(
        &self,
        base_pos: Vec3,
        footprint: Footprint,
        rotation: Rotation,
        level: usize,
    ) -> Option<Cell> {
        let occupied = &self.levels.get(level)?.occupied;
        let base = self.world_to_cell(base_pos);
        footprint
            .cells(base, rotation)
            .find(|xz| occupied.contains(xz))
            .map(|xz| Cell::from_xz(xz, level))
    }

    /// True iff no covered cell is occupied. An empty footprint is always free;
    /// a non-empty footprint on a level that does not exist is never free.
    pub fn is_area_free(
        &self,
        base_pos: Vec3,
        footprint: Footprint,
        rotation: Rotation,
        level: usize,
    ) -> bool {
        if footprint.is_empty() {
            return true;
        }
        if level >= self.levels.len() {
            return false;
        }
        self.first_conflict(base_pos, footprint, rotation, level)
            .is_none()
    }

    /// Reserve every covered cell. All-or-nothing: on error nothing is written.
    pub(crate) fn occupy_area(
        &mut self,
        base_pos: Vec3,
        footprint: Footprint,
        rotation: Rotation,
        level: usize,
    ) -> Result<(), GridError> {
        if footprint.is_empty() {
            return Ok(());
        }
        if level >= self.levels.len() {
            return Err(GridError::UnknownLevel(level));
        }
        if let Some(cell) = self.first_conflict(base_pos, footprint, rotation, level) {
            return Err(GridError::AreaOccupied { cell });
        }

        let base = self.world_to_cell(base_pos);
        let occupied = &mut self.levels[level].occupied;
        occupied.extend(footprint.cells(base, rotation));
        Ok(())
    }

    /// Release exactly the covered cells. Freeing unoccupied cells is a no-op.
    pub(crate) fn free_area(
        &mut self,
        base_pos: Vec3,
        footprint: Footprint,
        rotation: Rotation,
        level: usize,
    ) {
        if footprint.is_empty() {
            return;
        }
        let base = self.world_to_cell(base_pos);
        if let Some(l) = self.levels.get_mut(level) {
            for xz in footprint.cells(base, rotation) {
                l.occupied.remove(&xz);
            }
        }
    }

    /// Total occupied cells across all levels.
    pub fn occupied_count(&self) -> usize {
        self.levels.iter().map(Level::occupied_count).sum()
    }

    /// Occupied cells on `level`, in no particular order.
    pub fn occupied_cells(&self, level: usize) -> Vec<Cell> {
        self.levels
            .get(level)
            .map(|l| l.occupied.iter().map(|&xz| Cell::from_xz(xz, level)).collect())
            .unwrap_or_default()
    }
}
