//! Placement Session
//!
//! The ghost preview state machine.
//!
//! ```text
//!   Idle --select_part--> Targeting --commit--> Targeting (same part)
//!    ^                      |   |                 or Idle (Deselect policy)
//!    +------cancel----------+   +--update_target / rotate / change_level
//!    +------force_exit------+
//! ```
//!
//! The session reads the grid and the world but never writes them; a
//! commit hands the candidate to the registry.

use glam::Vec3;
use log::{debug, info, warn};
use thiserror::Error;

use super::registry::{PlacedEntityRegistry, RegisterError, RegistryEvent, RegistryListener};
use super::validator::{Candidate, InvalidReason, PlacementValidator, Validity};
use crate::game::config::{BuildConfig, CommitPolicy};
use crate::game::parts::{PartSpec, PlacementMode};
use crate::physics::{LayerMask, Ray, WorldQuery};
use crate::world::{EntityId, GridIndex, Rotation};

/// Errors from [`PlacementSession::commit`]. A failed commit changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    #[error("no part is selected")]
    NotTargeting,
    #[error("no placement candidate yet")]
    NoCandidate,
    #[error("placement is invalid: {0}")]
    Invalid(InvalidReason),
    #[error(transparent)]
    Register(#[from] RegisterError),
}

/// Preview of the part about to be placed. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct GhostPreview {
    pub part: PartSpec,
    /// Working yaw applied to the next candidate
    pub rotation: Rotation,
    /// Last derived candidate, kept when a later derivation fails
    pub candidate: Option<Candidate>,
    pub validity: Validity,
}

impl GhostPreview {
    fn new(part: PartSpec) -> Self {
        Self {
            part,
            rotation: Rotation::ZERO,
            candidate: None,
            validity: Validity::Unknown,
        }
    }

    /// Candidate carrying the current working rotation.
    pub fn current(&self) -> Option<Candidate> {
        self.candidate.map(|c| c.with_rotation(self.rotation))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Targeting(GhostPreview),
}

/// Single-user placement session.
#[derive(Debug, Clone)]
pub struct PlacementSession {
    state: SessionState,
    working_level: usize,
    validator: PlacementValidator,
    commit_policy: CommitPolicy,
    max_placement_distance: f32,
}

impl Default for PlacementSession {
    fn default() -> Self {
        Self::new(&BuildConfig::default())
    }
}

impl PlacementSession {
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            state: SessionState::Idle,
            working_level: 0,
            validator: PlacementValidator::new(config.overlap_shrink),
            commit_policy: config.commit_policy,
            max_placement_distance: config.max_placement_distance,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn preview(&self) -> Option<&GhostPreview> {
        match &self.state {
            SessionState::Targeting(preview) => Some(preview),
            SessionState::Idle => None,
        }
    }

    pub fn is_targeting(&self) -> bool {
        matches!(self.state, SessionState::Targeting(_))
    }

    pub fn working_level(&self) -> usize {
        self.working_level
    }

    pub fn validator(&self) -> &PlacementValidator {
        &self.validator
    }

    pub fn commit_policy(&self) -> CommitPolicy {
        self.commit_policy
    }

    pub fn set_commit_policy(&mut self, policy: CommitPolicy) {
        self.commit_policy = policy;
    }

    /// Start (or restart) targeting with `part`. Rotation resets to 0.
    pub fn select_part(&mut self, part: PartSpec) {
        debug!("[Session] Selected {}", part.name);
        self.state = SessionState::Targeting(GhostPreview::new(part));
    }

    /// Re-derive the candidate from the pointer ray and validate it.
    ///
    /// When no candidate can be derived the previous one is kept and the
    /// validity turns invalid. Returns `None` while idle.
    pub fn update_target<W: WorldQuery + ?Sized>(
        &mut self,
        ray: &Ray,
        grid: &GridIndex,
        world: &W,
    ) -> Option<Validity> {
        let level = grid.clamp_level(self.working_level as i64);
        let max_distance = self.max_placement_distance;
        let validator = self.validator;
        let SessionState::Targeting(preview) = &mut self.state else {
            return None;
        };

        let derived = derive_candidate(
            &preview.part,
            preview.rotation,
            level,
            ray,
            grid,
            world,
            max_distance,
        );
        let validity = match derived {
            Ok(candidate) => {
                preview.candidate = Some(candidate);
                validator.validate(&candidate, &preview.part, grid, world)
            }
            Err(reason) => {
                debug!("[Session] No candidate for {}: {}", preview.part.name, reason);
                Validity::Invalid(reason)
            }
        };
        preview.validity = validity;
        Some(validity)
    }

    /// Re-run validation of the kept candidate against the current state.
    ///
    /// Does not re-derive the candidate; used after rotation or after the
    /// world changed under a stationary pointer.
    pub fn revalidate<W: WorldQuery + ?Sized>(
        &mut self,
        grid: &GridIndex,
        world: &W,
    ) -> Option<Validity> {
        let validator = self.validator;
        let SessionState::Targeting(preview) = &mut self.state else {
            return None;
        };
        let candidate = preview.current()?;
        if matches!(
            preview.validity,
            Validity::Invalid(InvalidReason::NoSurfaceHit | InvalidReason::OutOfRange)
        ) {
            // Pointer is off the plane or out of reach; only a new ray can fix that
            return Some(preview.validity);
        }
        preview.validity = validator.validate(&candidate, &preview.part, grid, world);
        Some(preview.validity)
    }

    /// Turn the working rotation by `delta` degrees. Grid parts snap to quarter turns.
    pub fn rotate(&mut self, delta: i32) -> Option<Rotation> {
        let SessionState::Targeting(preview) = &mut self.state else {
            return None;
        };
        let mut rotation = preview.rotation.offset(delta);
        if preview.part.placement == PlacementMode::Grid {
            rotation = rotation.snapped_to_quarter();
        }
        preview.rotation = rotation;
        debug!("[Session] Rotation: {}", rotation);
        Some(rotation)
    }

    /// Move the working level by `delta`, clamped to existing levels.
    pub fn change_level(&mut self, delta: i32, grid: &GridIndex) -> usize {
        self.working_level = grid.clamp_level(self.working_level as i64 + delta as i64);
        debug!(
            "[Session] Working level: {} (y = {:.2})",
            self.working_level,
            grid.y_for_level(self.working_level)
        );
        self.working_level
    }

    /// Keep the working level and the kept candidate on the same physical
    /// floor after a level was inserted at `index`.
    pub fn on_level_inserted(&mut self, index: usize) {
        if index <= self.working_level {
            self.working_level += 1;
        }
        if let SessionState::Targeting(preview) = &mut self.state
            && let Some(candidate) = preview.candidate.as_mut()
            && index <= candidate.level
        {
            candidate.level += 1;
        }
    }

    /// Commit the current candidate through the registry.
    ///
    /// The candidate is validated again against the current grid and world
    /// before anything is written.
    pub fn commit<W: WorldQuery + ?Sized>(
        &mut self,
        registry: &mut PlacedEntityRegistry,
        world: &W,
    ) -> Result<EntityId, CommitError> {
        let SessionState::Targeting(preview) = &self.state else {
            return Err(CommitError::NotTargeting);
        };
        let candidate = preview.current().ok_or(CommitError::NoCandidate)?;

        match preview.validity {
            Validity::Valid => {}
            Validity::Invalid(reason) => {
                warn!("[Session] Commit of {} rejected: {}", preview.part.name, reason);
                return Err(CommitError::Invalid(reason));
            }
            Validity::Unknown => return Err(CommitError::NoCandidate),
        }
        if let Validity::Invalid(reason) =
            self.validator.validate(&candidate, &preview.part, registry.grid(), world)
        {
            warn!("[Session] Commit of {} rejected: {}", preview.part.name, reason);
            return Err(CommitError::Invalid(reason));
        }

        let part = preview.part.clone();
        let registration = registry.register(&part, &candidate)?;

        if let Some(raised) = registration.raised_level {
            if raised.inserted {
                self.on_level_inserted(raised.index);
            }
            // Only climb; a level created below keeps the user where they are
            if raised.index > self.working_level {
                self.working_level = raised.index;
                info!(
                    "[Session] Building on level {} (y = {:.2})",
                    raised.index,
                    registry.grid().y_for_level(raised.index)
                );
            }
        }

        if self.commit_policy == CommitPolicy::Deselect {
            self.state = SessionState::Idle;
        }
        Ok(registration.id)
    }

    /// Targeting -> Idle. Discards the preview; touches nothing else.
    pub fn cancel(&mut self) -> bool {
        let was_targeting = self.is_targeting();
        if was_targeting {
            debug!("[Session] Cancelled");
        }
        self.state = SessionState::Idle;
        was_targeting
    }

    /// Cancel triggered from outside, e.g. leaving build mode.
    pub fn force_exit(&mut self) {
        if self.is_targeting() {
            info!("[Session] Preview discarded on mode exit");
        }
        self.state = SessionState::Idle;
    }
}

/// Follows levels inserted outside a commit, e.g. by a restore.
///
/// Commits adjust the session directly; a tick's events must not be
/// replayed here.
impl RegistryListener for PlacementSession {
    fn on_event(&mut self, event: &RegistryEvent) {
        if let RegistryEvent::LevelAdded { index, .. } = event {
            self.on_level_inserted(*index);
        }
    }
}

/// Candidate for `part` under `ray`, or why there is none.
fn derive_candidate<W: WorldQuery + ?Sized>(
    part: &PartSpec,
    rotation: Rotation,
    level: usize,
    ray: &Ray,
    grid: &GridIndex,
    world: &W,
    max_distance: f32,
) -> Result<Candidate, InvalidReason> {
    match part.placement {
        PlacementMode::Grid | PlacementMode::FreePlane => {
            let height = grid.y_for_level(level);
            let t = ray
                .intersect_horizontal_plane(height)
                .ok_or(InvalidReason::NoSurfaceHit)?;
            if t > max_distance {
                return Err(InvalidReason::OutOfRange);
            }
            let point = ray.at(t);
            let position = if part.placement == PlacementMode::Grid {
                grid.snap(point, level)
            } else {
                Vec3::new(point.x, height, point.z)
            };
            Ok(Candidate::new(position, rotation, level))
        }
        PlacementMode::Surface => {
            let hit = world
                .raycast(ray, max_distance, LayerMask::SUPPORT)
                .ok_or(InvalidReason::NoSurfaceHit)?;
            let position = hit.point + hit.normal * part.surface_offset;
            Ok(Candidate::new(position, rotation, level).with_normal(hit.normal))
        }
    }
}
