//! Build State
//!
//! Central state struct that holds the placement systems together and
//! drives them one tick at a time.

use log::info;

use crate::game::builder::{
    BuildContext, BuilderMode, PlacedEntityRegistry, RegistryEvent, TickReport,
};
use crate::game::config::{BuildConfig, ConfigError};
use crate::game::parts::PartCatalog;
use crate::game::save::{self, RestoreReport, WorldSnapshot};
use crate::input::{InputEvent, InputQueue};
use crate::physics::ColliderWorld;
use crate::world::GridIndex;

/// Half extent of the ground slab in the default collider world.
const GROUND_HALF_SIZE: f32 = 5000.0;

/// Central build state holding all systems
#[derive(Debug, Clone)]
pub struct BuildState {
    pub config: BuildConfig,
    pub catalog: PartCatalog,
    /// Committed placements and the grid
    pub registry: PlacedEntityRegistry,
    /// Physics mirror of the registry plus static scenery
    pub world: ColliderWorld,
    /// Mode and ghost preview
    pub builder: BuilderMode,
    /// Input collected since the last tick
    pub input: InputQueue,
}

impl BuildState {
    /// Validate `config` and set up an empty world with a ground plane.
    pub fn new(config: BuildConfig, catalog: PartCatalog) -> Result<Self, ConfigError> {
        Self::with_world(config, catalog, ColliderWorld::with_ground(GROUND_HALF_SIZE))
    }

    /// Same as [`BuildState::new`] but with caller-provided scenery.
    pub fn with_world(
        config: BuildConfig,
        catalog: PartCatalog,
        world: ColliderWorld,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = GridIndex::with_levels(config.grid_config(), &config.initial_levels);
        info!(
            "[Build] cell size {:.2}, {} levels, {} parts",
            config.cell_size,
            grid.level_count(),
            catalog.len()
        );
        Ok(Self {
            registry: PlacedEntityRegistry::new(grid),
            builder: BuilderMode::new(&config),
            input: InputQueue::new(),
            config,
            catalog,
            world,
        })
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Process everything queued since the last tick.
    pub fn tick(&mut self) -> TickReport {
        let events = self.input.drain();
        let mut ctx = BuildContext {
            registry: &mut self.registry,
            catalog: &self.catalog,
            world: &mut self.world,
        };
        self.builder.process_tick(&events, &mut ctx)
    }

    pub fn save(&self) -> WorldSnapshot {
        save::snapshot(&self.registry)
    }

    /// Replace the world with `snapshot`. Any preview is discarded and the
    /// working level stays on the same physical floor.
    ///
    /// Returns the registry notifications produced by the reload so the
    /// renderer can rebuild its scene.
    pub fn load(&mut self, snapshot: &WorldSnapshot) -> (RestoreReport, Vec<RegistryEvent>) {
        let session = self.builder.session_mut();
        session.cancel();
        let report = save::restore(&mut self.registry, &self.catalog, snapshot);
        let events = self.registry.sync(&mut self.world);
        for event in &events {
            event.apply_to(&mut *session);
        }
        (report, events)
    }
}
