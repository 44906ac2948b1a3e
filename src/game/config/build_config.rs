//! Build Configuration
//!
//! Every tunable of the placement core in one place. `Default` matches the
//! values the castle builder ships with; `from_json` lets a level override
//! any subset of them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{GridConfig, MIN_CELL_SIZE};

/// What the session does with the selected part after a successful commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Stay in targeting with the same part for rapid repeated placement
    #[default]
    KeepSelected,
    /// Return to idle after every commit
    Deselect,
}

/// Errors from loading or validating configuration and part catalogs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cell size {0} is below the minimum of {MIN_CELL_SIZE}")]
    InvalidCellSize(f32),
    #[error("level epsilon {0} must be positive and smaller than the cell size")]
    InvalidLevelEpsilon(f32),
    #[error("overlap shrink {0} must be in (0, 1]")]
    InvalidOverlapShrink(f32),
    #[error("distance {0} must be positive")]
    InvalidDistance(f32),
    #[error("level height {0} is not finite")]
    InvalidLevelHeight(f32),
    #[error("part '{0}' is defined more than once")]
    DuplicatePart(String),
}

/// Placement core configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Horizontal size of one grid cell (meters, >= 0.1)
    pub cell_size: f32,
    /// Heights closer than this belong to the same level
    pub level_epsilon: f32,
    /// Levels present before anything is built
    pub initial_levels: Vec<f32>,
    /// Scale applied to freeform collision volumes before the overlap query
    pub overlap_shrink: f32,
    /// Longest pointer ray that can produce a candidate
    pub max_placement_distance: f32,
    /// Longest ray the delete tool searches along
    pub delete_distance: f32,
    /// Half extent of the buildable area on X and Z
    pub map_size: f32,
    pub commit_policy: CommitPolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cell_size: 2.0,
            level_epsilon: 0.01,
            initial_levels: vec![0.0],
            overlap_shrink: 0.95,
            max_placement_distance: 500.0,
            delete_distance: 100.0,
            map_size: 5000.0,
            commit_policy: CommitPolicy::KeepSelected,
        }
    }
}

impl BuildConfig {
    /// Parse a (possibly partial) JSON object and validate the result.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: BuildConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_size >= MIN_CELL_SIZE) {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !(self.level_epsilon > 0.0 && self.level_epsilon < self.cell_size) {
            return Err(ConfigError::InvalidLevelEpsilon(self.level_epsilon));
        }
        if !(self.overlap_shrink > 0.0 && self.overlap_shrink <= 1.0) {
            return Err(ConfigError::InvalidOverlapShrink(self.overlap_shrink));
        }
        for distance in [self.max_placement_distance, self.delete_distance, self.map_size] {
            if !(distance > 0.0) {
                return Err(ConfigError::InvalidDistance(distance));
            }
        }
        if let Some(&height) = self.initial_levels.iter().find(|h| !h.is_finite()) {
            return Err(ConfigError::InvalidLevelHeight(height));
        }
        Ok(())
    }

    /// The grid-facing subset of this configuration.
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            cell_size: self.cell_size,
            level_epsilon: self.level_epsilon,
            map_size: self.map_size,
        }
    }
}
