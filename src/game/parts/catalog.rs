//! Part Catalog
//!
//! Named part types available to the builder, in toolbar order.

use std::collections::HashMap;

use log::debug;

use super::part::{PartSpec, PlacementMode};
use crate::game::config::ConfigError;

/// Ordered set of part types keyed by unique name.
#[derive(Clone, Debug, Default)]
pub struct PartCatalog {
    parts: Vec<PartSpec>,
    by_name: HashMap<String, usize>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list, rejecting duplicate names.
    pub fn from_parts(parts: impl IntoIterator<Item = PartSpec>) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for part in parts {
            catalog.insert(part)?;
        }
        Ok(catalog)
    }

    /// Load a JSON array of part records.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let parts: Vec<PartSpec> = serde_json::from_str(json)?;
        let catalog = Self::from_parts(parts)?;
        debug!("Loaded part catalog with {} parts", catalog.len());
        Ok(catalog)
    }

    /// The stock castle set: floors, a wall, stairs and a wall torch.
    pub fn castle_set() -> Self {
        let parts = [
            PartSpec::floor("floor_1x1", 1, 1),
            PartSpec::floor("floor_2x1", 2, 1),
            PartSpec::new("wall", PlacementMode::Grid),
            PartSpec::floor("stairs", 1, 2).with_height(0.5).raising(3.0),
            PartSpec::new("crate", PlacementMode::FreePlane).with_height(1.0),
            PartSpec::new("torch", PlacementMode::Surface)
                .with_height(0.6)
                .aligned_to_surface(0.1),
        ];
        let mut catalog = Self::new();
        for part in parts {
            catalog.by_name.insert(part.name.clone(), catalog.parts.len());
            catalog.parts.push(part);
        }
        catalog
    }

    pub fn insert(&mut self, part: PartSpec) -> Result<(), ConfigError> {
        if self.by_name.contains_key(&part.name) {
            return Err(ConfigError::DuplicatePart(part.name));
        }
        self.by_name.insert(part.name.clone(), self.parts.len());
        self.parts.push(part);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PartSpec> {
        self.by_name.get(name).map(|&i| &self.parts[i])
    }

    /// Mutable access for live tuning. Already placed entities keep what they reserved.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut PartSpec> {
        self.by_name.get(name).map(|&i| &mut self.parts[i])
    }

    /// Part in toolbar slot `slot` (0-based, hotkeys 1-9 map to slots 0-8).
    pub fn slot(&self, slot: usize) -> Option<&PartSpec> {
        self.parts.get(slot)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PartSpec> {
        self.parts.iter()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn castle_set_is_ordered_and_unique() {
        let catalog = PartCatalog::castle_set();
        assert_eq!(catalog.slot(0).unwrap().name, "floor_1x1");
        assert!(catalog.get("stairs").unwrap().raises_level());
        assert!(catalog.get("torch").unwrap().align_to_surface);
        assert!(PartCatalog::from_parts(catalog.iter().cloned()).is_ok());
    }

    #[test]
    fn from_json_rejects_duplicates() {
        let json = r#"[ { "name": "wall" }, { "name": "wall", "is_floor": true } ]"#;
        match PartCatalog::from_json(json) {
            Err(ConfigError::DuplicatePart(name)) => assert_eq!(name, "wall"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn from_json_loads_modes() {
        let json = r#"[
            { "name": "floor", "is_floor": true, "footprint": { "width": 2, "depth": 2 } },
            { "name": "lamp", "placement": "surface", "align_to_surface": true, "surface_offset": 0.2 },
            { "name": "barrel", "placement": "free_plane", "height": 1.2 }
        ]"#;
        let catalog = PartCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get("lamp").unwrap().placement, PlacementMode::Surface);
        assert_eq!(catalog.get("barrel").unwrap().placement, PlacementMode::FreePlane);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn get_mut_edits_in_place() {
        let mut catalog = PartCatalog::castle_set();
        catalog.get_mut("floor_2x1").unwrap().footprint.width = 3;
        assert_eq!(catalog.get("floor_2x1").unwrap().footprint.width, 3);
    }
}
