//! Builder Mode
//!
//! Per-tick driver that feeds one batch of input events into the placement
//! session, the registry and the world mirror.
//!
//! Mode switches in a batch are applied before anything else. Leaving build
//! mode discards the preview immediately, and the rest of that batch's build
//! input is dropped.

use log::{debug, info, warn};

use super::registry::{PlacedEntityRegistry, RegistryEvent, RegistryListener};
use super::session::{CommitError, PlacementSession};
use crate::game::config::BuildConfig;
use crate::game::parts::PartCatalog;
use crate::input::{InputEvent, InteractionMode};
use crate::physics::WorldQuery;
use crate::world::EntityId;

/// Everything a tick needs to borrow from the game.
pub struct BuildContext<'a, W: ?Sized> {
    pub registry: &'a mut PlacedEntityRegistry,
    pub catalog: &'a PartCatalog,
    /// Physics scene; kept in sync with the registry after every change
    pub world: &'a mut W,
}

/// What happened during one tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub committed: Vec<EntityId>,
    pub removed: Vec<EntityId>,
    pub rejected: Vec<CommitError>,
    /// Part names that were selected but are not in the catalog
    pub unknown_parts: Vec<String>,
    /// Build inputs dropped because the mode does not allow building
    pub ignored: usize,
    /// Set if the interaction mode changed this tick
    pub mode_changed: Option<InteractionMode>,
    /// Registry notifications for the renderer, in order
    pub events: Vec<RegistryEvent>,
}

/// Build-mode controller owning the placement session.
#[derive(Debug, Clone)]
pub struct BuilderMode {
    mode: InteractionMode,
    session: PlacementSession,
    delete_distance: f32,
}

impl Default for BuilderMode {
    fn default() -> Self {
        Self::new(&BuildConfig::default())
    }
}

impl BuilderMode {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            mode: InteractionMode::Build,
            session: PlacementSession::new(config),
            delete_distance: config.delete_distance,
        }
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn session(&self) -> &PlacementSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut PlacementSession {
        &mut self.session
    }

    /// Switch interaction mode. Leaving build mode force-exits the session.
    pub fn set_mode(&mut self, mode: InteractionMode) -> bool {
        if mode == self.mode {
            return false;
        }
        if !mode.allows_building() {
            self.session.force_exit();
        }
        self.mode = mode;
        match mode {
            InteractionMode::Build => info!("[Builder Mode] ENABLED"),
            InteractionMode::FirstPerson => info!("[Builder Mode] DISABLED (first-person)"),
        }
        true
    }

    /// Flip between build and first-person mode.
    pub fn toggle(&mut self) -> InteractionMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    /// Apply one input batch.
    pub fn process_tick<W>(
        &mut self,
        events: &[InputEvent],
        ctx: &mut BuildContext<'_, W>,
    ) -> TickReport
    where
        W: WorldQuery + RegistryListener + ?Sized,
    {
        let mut report = TickReport::default();

        for event in events {
            if let InputEvent::SwitchMode(mode) = event
                && self.set_mode(*mode)
            {
                report.mode_changed = Some(*mode);
            }
        }

        if !self.mode.allows_building() {
            report.ignored = events.iter().filter(|e| e.is_build_input()).count();
            if report.ignored > 0 {
                debug!("[Builder Mode] Ignored {} inputs outside build mode", report.ignored);
            }
            return report;
        }

        for event in events {
            self.apply(event, ctx, &mut report);
        }
        report
    }

    fn apply<W>(
        &mut self,
        event: &InputEvent,
        ctx: &mut BuildContext<'_, W>,
        report: &mut TickReport,
    ) where
        W: WorldQuery + RegistryListener + ?Sized,
    {
        match event {
            InputEvent::SelectPart(name) => match ctx.catalog.get(name) {
                Some(part) => self.session.select_part(part.clone()),
                None => {
                    warn!("[Builder Mode] Unknown part '{}'", name);
                    report.unknown_parts.push(name.clone());
                }
            },
            InputEvent::Deselect | InputEvent::Cancel => {
                self.session.cancel();
            }
            InputEvent::PointerRay(ray) => {
                self.session.update_target(ray, ctx.registry.grid(), &*ctx.world);
            }
            InputEvent::Rotate(delta) => {
                if self.session.rotate(*delta).is_some() {
                    self.session.revalidate(ctx.registry.grid(), &*ctx.world);
                }
            }
            InputEvent::ChangeLevel(delta) => {
                self.session.change_level(*delta, ctx.registry.grid());
            }
            InputEvent::Commit => match self.session.commit(ctx.registry, &*ctx.world) {
                Ok(id) => {
                    report.committed.push(id);
                    self.sync(ctx, report);
                }
                Err(err) => report.rejected.push(err),
            },
            InputEvent::DeleteAt(ray) => {
                let hit = ctx
                    .registry
                    .find_nearest(ray, self.delete_distance, &*ctx.world);
                if let Some(id) = hit
                    && ctx.registry.remove(id).is_some()
                {
                    report.removed.push(id);
                    self.sync(ctx, report);
                }
            }
            InputEvent::SwitchMode(_) => {}
        }
    }

    /// Mirror registry changes into the world and refresh the preview.
    fn sync<W>(&mut self, ctx: &mut BuildContext<'_, W>, report: &mut TickReport)
    where
        W: WorldQuery + RegistryListener + ?Sized,
    {
        report.events.extend(ctx.registry.sync(&mut *ctx.world));
        self.session.revalidate(ctx.registry.grid(), &*ctx.world);
    }
}
