//! World Snapshots
//!
//! Captures the live placements of a registry and rebuilds them later.
//! Loading always goes through `PlacedEntityRegistry::register`, so grid
//! occupancy is reconstructed from the parts rather than copied.

use glam::Vec3;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::game::builder::{Candidate, PlacedEntityRegistry};
use crate::game::parts::PartCatalog;
use crate::world::Rotation;

// ============================================================================
// TYPES
// ============================================================================

/// One saved placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedPart {
    /// Catalog name of the part type
    pub part: String,
    pub position: Vec3,
    pub rotation: Rotation,
    /// Index into `WorldSnapshot::levels`
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<Vec3>,
}

/// Everything needed to rebuild a world.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Level heights in ascending order
    pub levels: Vec<f32>,
    /// Placements in creation order
    pub parts: Vec<SavedPart>,
}

/// Outcome of [`restore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub restored: usize,
    /// Parts whose type is not in the catalog
    pub skipped_unknown: usize,
    /// Parts whose cells were already reserved (or whose level was missing)
    pub skipped_conflicts: usize,
}

// ============================================================================
// SAVE / LOAD
// ============================================================================

/// Snapshot the registry's live entities.
pub fn snapshot(registry: &PlacedEntityRegistry) -> WorldSnapshot {
    let parts: Vec<SavedPart> = registry
        .entities()
        .map(|entity| SavedPart {
            part: entity.part.clone(),
            position: entity.position,
            rotation: entity.rotation,
            level: entity.level,
            normal: entity.normal,
        })
        .collect();

    info!("[Save] {} parts on {} levels", parts.len(), registry.grid().level_count());
    WorldSnapshot {
        levels: registry.grid().level_heights(),
        parts,
    }
}

/// Replace the registry's contents with `snapshot`.
///
/// Every existing entity is removed first. Levels are re-added through
/// the registry, then each part is registered in order. Parts that cannot
/// be registered are skipped and counted.
pub fn restore(
    registry: &mut PlacedEntityRegistry,
    catalog: &PartCatalog,
    snapshot: &WorldSnapshot,
) -> RestoreReport {
    registry.clear();
    for &height in &snapshot.levels {
        registry.add_level(height);
    }

    let mut report = RestoreReport::default();
    for saved in &snapshot.parts {
        let Some(part) = catalog.get(&saved.part) else {
            warn!("[Load] missing part '{}'", saved.part);
            report.skipped_unknown += 1;
            continue;
        };

        // Saved level indices refer to the snapshot's level list
        let level = snapshot
            .levels
            .get(saved.level)
            .and_then(|&height| registry.grid().find_level(height))
            .unwrap_or(saved.level);

        let mut candidate = Candidate::new(saved.position, saved.rotation, level);
        candidate.normal = saved.normal;

        match registry.register(part, &candidate) {
            Ok(_) => report.restored += 1,
            Err(err) => {
                warn!("[Load] skipped '{}': {}", saved.part, err);
                report.skipped_conflicts += 1;
            }
        }
    }

    info!(
        "[Load] restored {} parts ({} unknown, {} conflicting)",
        report.restored, report.skipped_unknown, report.skipped_conflicts
    );
    report
}
