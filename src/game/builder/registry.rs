//! Placed Entity Registry
//!
//! Owns every committed placement and the grid they reserve cells in.
//! All writes to the grid funnel through here: registering reserves the
//! part's footprint (and creates a level for stairs), removing frees
//! exactly what was reserved at registration.
//!
//! Changes are queued as [`RegistryEvent`]s for the renderer and the
//! physics mirror to drain once per tick.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};
use log::{debug, info, warn};
use thiserror::Error;

use super::validator::Candidate;
use crate::game::parts::PartSpec;
use crate::physics::{ColliderWorld, LayerMask, OrientedBox, Ray, WorldQuery};
use crate::world::{Cell, EntityId, Footprint, GridError, GridIndex, LevelInsert, Rotation};

/// Errors from [`PlacedEntityRegistry::register`]. Nothing is created on error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("cannot place '{part}': cell {cell} is already reserved")]
    ReservationConflict { part: String, cell: Cell },
    #[error("level {0} does not exist")]
    UnknownLevel(usize),
}

/// Grid cells an entity reserved when it was committed.
///
/// Stored verbatim so removal frees the same cells even if the part type
/// is edited later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reservation {
    pub base: Vec3,
    pub footprint: Footprint,
    pub rotation: Rotation,
    pub level: usize,
}

impl Reservation {
    pub fn cells(&self, grid: &GridIndex) -> Vec<Cell> {
        grid.covered_cells(self.base, self.footprint, self.rotation, self.level)
    }
}

/// A committed placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEntity {
    pub id: EntityId,
    /// Catalog name of the part type
    pub part: String,
    pub position: Vec3,
    pub rotation: Rotation,
    pub level: usize,
    pub normal: Option<Vec3>,
    pub reservation: Option<Reservation>,
    /// World-space collision volume
    pub bounds: OrientedBox,
    /// Collider layers (besides `PLACED`)
    pub layers: LayerMask,
}

impl PlacedEntity {
    pub fn orientation(&self) -> Quat {
        Candidate {
            position: self.position,
            rotation: self.rotation,
            level: self.level,
            normal: self.normal,
        }
        .orientation()
    }
}

/// Change notification for consumers mirroring the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryEvent {
    Registered(PlacedEntity),
    Removed(PlacedEntity),
    /// A level was inserted at `index`; levels at or above it moved up by one
    LevelAdded { index: usize, height: f32 },
}

/// Something that mirrors registry state (physics scene, renderer).
pub trait RegistryListener {
    fn on_event(&mut self, event: &RegistryEvent);
}

impl RegistryListener for ColliderWorld {
    fn on_event(&mut self, event: &RegistryEvent) {
        match event {
            RegistryEvent::Registered(entity) => {
                self.insert_entity(entity.id, entity.bounds, entity.layers);
            }
            RegistryEvent::Removed(entity) => {
                self.remove_entity(entity.id);
            }
            RegistryEvent::LevelAdded { .. } => {}
        }
    }
}

impl RegistryEvent {
    /// Forward this event to a listener.
    pub fn apply_to<L: RegistryListener + ?Sized>(&self, listener: &mut L) {
        listener.on_event(self);
    }
}

/// Result of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub id: EntityId,
    /// Level targeted by a level-raising part, whether new or reused
    pub raised_level: Option<LevelInsert>,
}

/// Owner of all committed placements and of the grid.
#[derive(Debug, Clone)]
pub struct PlacedEntityRegistry {
    grid: GridIndex,
    entities: BTreeMap<EntityId, PlacedEntity>,
    next_id: u64,
    events: Vec<RegistryEvent>,
}

impl PlacedEntityRegistry {
    pub fn new(grid: GridIndex) -> Self {
        Self {
            grid,
            entities: BTreeMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Read-only view of the grid. Mutations go through the registry.
    pub fn grid(&self) -> &GridIndex {
        &self.grid
    }

    /// Create an entity for `part` at `candidate`.
    ///
    /// Reserves the footprint first (grid floors only), then creates the
    /// raised level (stairs only), then records the entity. The only
    /// fallible step is the first, so an error leaves everything untouched.
    pub fn register(
        &mut self,
        part: &PartSpec,
        candidate: &Candidate,
    ) -> Result<Registration, RegisterError> {
        let mut level = candidate.level;
        if level >= self.grid.level_count() {
            return Err(RegisterError::UnknownLevel(level));
        }

        let mut reservation = None;
        if part.reserves_cells() {
            self.grid
                .occupy_area(candidate.position, part.footprint, candidate.rotation, level)
                .map_err(|err| match err {
                    GridError::AreaOccupied { cell } => {
                        warn!("[Registry] Reservation conflict for {} at {}", part.name, cell);
                        RegisterError::ReservationConflict {
                            part: part.name.clone(),
                            cell,
                        }
                    }
                    GridError::UnknownLevel(level) => RegisterError::UnknownLevel(level),
                })?;
            reservation = Some(Reservation {
                base: candidate.position,
                footprint: part.footprint,
                rotation: candidate.rotation,
                level,
            });
        }

        let raised_level = part.raise_height.map(|raise| {
            let insert = self.add_level(self.grid.y_for_level(level) + raise);
            if insert.inserted && insert.index <= level {
                level += 1;
                if let Some(res) = reservation.as_mut() {
                    res.level = level;
                }
            }
            insert
        });

        let id = EntityId(self.next_id);
        self.next_id += 1;

        let entity = PlacedEntity {
            id,
            part: part.name.clone(),
            position: candidate.position,
            rotation: candidate.rotation,
            level,
            normal: candidate.normal,
            reservation,
            bounds: part.bounds_at(candidate.position, candidate.rotation, self.grid.cell_size()),
            layers: part.collider_layers(),
        };

        info!(
            "[Registry] Placed {} {} at ({:.2}, {:.2}, {:.2}) level {} rot {}",
            part.name,
            id,
            entity.position.x,
            entity.position.y,
            entity.position.z,
            level,
            entity.rotation
        );
        self.events.push(RegistryEvent::Registered(entity.clone()));
        self.entities.insert(id, entity);

        Ok(Registration { id, raised_level })
    }

    /// Remove an entity and free its reservation. Unknown ids are a no-op.
    pub fn remove(&mut self, id: EntityId) -> Option<PlacedEntity> {
        let Some(entity) = self.entities.remove(&id) else {
            debug!("[Registry] Remove of unknown entity {}", id);
            return None;
        };

        if let Some(res) = &entity.reservation {
            self.grid
                .free_area(res.base, res.footprint, res.rotation, res.level);
        }

        info!("[Registry] Removed {} {}", entity.part, id);
        self.events.push(RegistryEvent::Removed(entity.clone()));
        Some(entity)
    }

    /// Add a level at `height` (or reuse one within epsilon).
    ///
    /// When a level is inserted below existing ones, every stored level
    /// index at or above the insertion point is shifted up to follow its
    /// physical floor.
    pub fn add_level(&mut self, height: f32) -> LevelInsert {
        let insert = self.grid.add_level(height);
        if !insert.inserted {
            return insert;
        }

        for entity in self.entities.values_mut() {
            if entity.level >= insert.index {
                entity.level += 1;
            }
            if let Some(res) = entity.reservation.as_mut()
                && res.level >= insert.index
            {
                res.level += 1;
            }
        }

        info!(
            "[Registry] New level {} at height {:.2} ({} levels)",
            insert.index,
            height,
            self.grid.level_count()
        );
        self.events.push(RegistryEvent::LevelAdded {
            index: insert.index,
            height,
        });
        insert
    }

    /// Placed entity under `ray` within `max_distance`, if any.
    pub fn find_nearest<W: WorldQuery + ?Sized>(
        &self,
        ray: &Ray,
        max_distance: f32,
        world: &W,
    ) -> Option<EntityId> {
        let hit = world.raycast(ray, max_distance, LayerMask::PLACED)?;
        hit.entity.filter(|id| self.entities.contains_key(id))
    }

    pub fn get(&self, id: EntityId) -> Option<&PlacedEntity> {
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Live entities ordered by id.
    pub fn entities(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove every entity. Levels are kept.
    pub fn clear(&mut self) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        for id in ids {
            self.remove(id);
        }
        debug_assert_eq!(self.grid.occupied_count(), 0);
    }

    /// Take all queued change notifications in the order they happened.
    pub fn drain_events(&mut self) -> Vec<RegistryEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain queued events into a listener, returning them for other consumers.
    pub fn sync<L: RegistryListener + ?Sized>(&mut self, listener: &mut L) -> Vec<RegistryEvent> {
        let events = self.drain_events();
        for event in &events {
            event.apply_to(listener);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::parts::PlacementMode;
    use crate::world::GridConfig;

    fn registry() -> PlacedEntityRegistry {
        PlacedEntityRegistry::new(GridIndex::new(GridConfig::new(2.0)))
    }

    fn at(x: f32, z: f32, level: usize) -> Candidate {
        Candidate::new(Vec3::new(x, 0.0, z), Rotation::ZERO, level)
    }

    #[test]
    fn register_reserves_and_remove_frees() {
        let mut reg = registry();
        let floor = PartSpec::floor("floor", 2, 1);

        let first = reg.register(&floor, &at(0.0, 0.0, 0)).unwrap();
        assert_eq!(reg.grid().occupied_count(), 2);
        assert!(reg.grid().is_occupied(Cell::new(1, 0, 0)));

        let err = reg.register(&floor, &at(-2.0, 0.0, 0)).unwrap_err();
        assert_eq!(
            err,
            RegisterError::ReservationConflict {
                part: "floor".into(),
                cell: Cell::new(0, 0, 0)
            }
        );
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.grid().occupied_count(), 2);

        let removed = reg.remove(first.id).unwrap();
        assert_eq!(removed.part, "floor");
        assert_eq!(reg.grid().occupied_count(), 0);
        assert!(reg.remove(first.id).is_none());
    }

    #[test]
    fn ids_are_never_reused() {
        let mut reg = registry();
        let wall = PartSpec::new("wall", PlacementMode::Grid);
        let a = reg.register(&wall, &at(0.0, 0.0, 0)).unwrap().id;
        reg.remove(a);
        let b = reg.register(&wall, &at(0.0, 0.0, 0)).unwrap().id;
        assert!(b > a);
        assert_eq!(reg.grid().occupied_count(), 0);
    }

    #[test]
    fn unknown_level_is_rejected() {
        let mut reg = registry();
        let floor = PartSpec::floor("floor", 1, 1);
        assert_eq!(
            reg.register(&floor, &at(0.0, 0.0, 3)),
            Err(RegisterError::UnknownLevel(3))
        );
        assert!(reg.is_empty());
        assert!(reg.drain_events().is_empty());
    }

    #[test]
    fn raising_part_adds_level_once() {
        let mut reg = registry();
        let stairs = PartSpec::floor("stairs", 1, 2).raising(3.0);

        let reg1 = reg.register(&stairs, &at(0.0, 0.0, 0)).unwrap();
        let raised = reg1.raised_level.unwrap();
        assert_eq!(raised, LevelInsert { index: 1, inserted: true });
        assert_eq!(reg.grid().level_heights(), vec![0.0, 3.0]);
        assert_eq!(reg.grid().snap(Vec3::new(0.4, 9.0, 0.0), 1).y, 3.0);

        let reg2 = reg.register(&stairs, &at(6.0, 0.0, 0)).unwrap();
        assert_eq!(reg2.raised_level, Some(LevelInsert { index: 1, inserted: false }));
        assert_eq!(reg.grid().level_count(), 2);

        let events = reg.drain_events();
        let level_events = events
            .iter()
            .filter(|e| matches!(e, RegistryEvent::LevelAdded { .. }))
            .count();
        assert_eq!(level_events, 1);
    }

    #[test]
    fn lower_level_insert_renumbers_entities() {
        let mut reg = PlacedEntityRegistry::new(GridIndex::with_levels(
            GridConfig::new(2.0),
            &[0.0, 6.0],
        ));
        let floor = PartSpec::floor("floor", 1, 1);
        let upper = reg
            .register(&floor, &Candidate::new(Vec3::new(0.0, 6.0, 0.0), Rotation::ZERO, 1))
            .unwrap()
            .id;

        let insert = reg.add_level(3.0);
        assert_eq!(insert.index, 1);

        let entity = reg.get(upper).unwrap();
        assert_eq!(entity.level, 2);
        assert_eq!(entity.reservation.unwrap().level, 2);
        assert!(reg.grid().is_occupied(Cell::new(0, 2, 0)));

        reg.remove(upper);
        assert_eq!(reg.grid().occupied_count(), 0);
    }

    #[test]
    fn removal_uses_stored_reservation() {
        let mut reg = registry();
        let mut floor = PartSpec::floor("floor", 2, 1);
        let id = reg
            .register(&floor, &Candidate::new(Vec3::ZERO, Rotation::QUARTER, 0))
            .unwrap()
            .id;
        assert!(reg.grid().is_occupied(Cell::new(0, 0, 1)));

        floor.footprint = Footprint::new(5, 5);
        reg.register(&floor, &at(20.0, 20.0, 0)).unwrap();
        assert_eq!(reg.grid().occupied_count(), 27);

        reg.remove(id);
        assert_eq!(reg.grid().occupied_count(), 25);
        assert!(!reg.grid().is_occupied(Cell::new(0, 0, 1)));
    }

    #[test]
    fn events_mirror_into_collider_world() {
        let mut reg = registry();
        let mut world = ColliderWorld::new();
        let wall = PartSpec::new("wall", PlacementMode::Grid);

        let id = reg.register(&wall, &at(4.0, 4.0, 0)).unwrap().id;
        let events = reg.sync(&mut world);
        assert_eq!(events.len(), 1);
        assert_eq!(world.len(), 1);

        let ray = Ray::downward(4.0, 4.0, 20.0);
        assert_eq!(reg.find_nearest(&ray, 100.0, &world), Some(id));
        assert_eq!(reg.find_nearest(&ray, 10.0, &world), None);

        reg.remove(id);
        reg.sync(&mut world);
        assert!(world.is_empty());
        assert_eq!(reg.find_nearest(&ray, 100.0, &world), None);
    }

    #[test]
    fn clear_removes_everything_but_levels() {
        let mut reg = registry();
        let stairs = PartSpec::floor("stairs", 1, 1).raising(3.0);
        reg.register(&stairs, &at(0.0, 0.0, 0)).unwrap();
        reg.register(&PartSpec::floor("floor", 1, 1), &at(2.0, 0.0, 0)).unwrap();
        reg.drain_events();

        reg.clear();
        assert!(reg.is_empty());
        assert_eq!(reg.grid().occupied_count(), 0);
        assert_eq!(reg.grid().level_count(), 2);
        assert_eq!(reg.drain_events().len(), 2);
    }
}
