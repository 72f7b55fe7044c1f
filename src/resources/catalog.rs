//! Component model catalog.
//!
//! Holds the component models available to the robot editor, keyed by id.
//! A catalog is either [`ModelCatalog::builtin`] or loaded from JSON:
//!
//! ```json
//! {
//!   "components": [
//!     { "id": "wheels", "name": "Wheels", "health": 15, "weight": 2, "price": 40,
//!       "type": "movement", "force": 3.0, "turn": 0.08 },
//!     { "id": "mount", "name": "Weapon Mount", "health": 20, "weight": 3, "price": 30,
//!       "type": "block", "attributes": ["weapon_mount"] }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::components::robotcomponent::{Attribute, ComponentKind, ComponentModel, ComponentType};
use crate::error::Result;

#[derive(Deserialize)]
struct CatalogData {
    components: Vec<ComponentModel>,
}

/// Registry of component models in insertion order.
#[derive(Debug, Default, Clone)]
pub struct ModelCatalog {
    models: FxHashMap<String, Arc<ComponentModel>>,
    order: Vec<String>,
}

impl ModelCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock parts: armor block, weapon mount, wheels, tracks and cannon.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            ComponentModel::new("armor_block", 40, 4, 20, ComponentKind::Block).with_name("Armor Block"),
        );
        catalog.insert(
            ComponentModel::new("weapon_mount", 20, 3, 30, ComponentKind::Block)
                .with_name("Weapon Mount")
                .with_attribute(Attribute::WeaponMount),
        );
        catalog.insert(
            ComponentModel::new("wheels", 15, 2, 40, ComponentKind::Movement { force: 3.0, turn: 0.08 })
                .with_name("Wheels"),
        );
        catalog.insert(
            ComponentModel::new("tracks", 30, 5, 70, ComponentKind::Movement { force: 2.0, turn: 0.04 })
                .with_name("Tracks")
                .with_size(2, 1),
        );
        catalog.insert(
            ComponentModel::new(
                "cannon",
                10,
                4,
                90,
                ComponentKind::Weapon { damage: 12, range: 240.0, cooldown: 45 },
            )
            .with_name("Cannon"),
        );
        catalog
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for model in data.components {
            catalog.insert(model);
        }
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        info!("Loaded {} component model(s) from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Add a model; a model with the same id is replaced in place.
    pub fn insert(&mut self, model: ComponentModel) -> Arc<ComponentModel> {
        let model = Arc::new(model);
        if self.models.insert(model.id.clone(), model.clone()).is_some() {
            warn!("component model '{}' redefined", model.id);
        } else {
            self.order.push(model.id.clone());
        }
        model
    }

    pub fn get(&self, id: &str) -> Option<Arc<ComponentModel>> {
        self.models.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.models.contains_key(id)
    }

    /// Models in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ComponentModel>> {
        self.order.iter().filter_map(|id| self.models.get(id))
    }

    pub fn of_type(&self, ty: ComponentType) -> impl Iterator<Item = &Arc<ComponentModel>> {
        self.iter().filter(move |model| model.component_type() == ty)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
