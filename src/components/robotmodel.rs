//! Immutable robot assemblies.
//!
//! A [`RobotModel`] is a named list of placed components plus summary stats
//! derived once at construction. Editing never mutates a model: every edit
//! builds a new one (see [`EditSession`](crate::resources::editsession::EditSession)).

use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::components::robotcomponent::{ComponentType, PlacedComponent, hash_f64};
use crate::systems::verifier::{Verifier, Violation};

/// Max acceleration is max speed divided by this.
pub const ACCELERATION_DIVISOR: f64 = 20.0;

/// Cache key for a robot's composited sprite.
///
/// Renderers key their composite textures on this value; weapons are drawn
/// separately and never contribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualKey {
    /// No components: draw the "no robot" placeholder.
    Empty,
    Composite(u64),
}

#[derive(Serialize, Deserialize)]
struct RobotModelData {
    name: String,
    components: Vec<PlacedComponent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "RobotModelData", into = "RobotModelData")]
pub struct RobotModel {
    name: String,
    components: Vec<PlacedComponent>,
    health: i32,
    weight: i32,
    price: i32,
    max_speed: f64,
    max_acceleration: f64,
    turn_speed: f64,
    visual_key: OnceLock<VisualKey>,
}

impl Default for RobotModel {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<RobotModelData> for RobotModel {
    fn from(data: RobotModelData) -> Self {
        Self::new(data.name, data.components)
    }
}

impl From<RobotModel> for RobotModelData {
    fn from(model: RobotModel) -> Self {
        Self {
            name: model.name,
            components: model.components,
        }
    }
}

impl RobotModel {
    pub fn new(name: impl Into<String>, components: Vec<PlacedComponent>) -> Self {
        let mut health = 0;
        let mut weight = 0;
        let mut price = 0;
        let mut max_speed = 0.0;
        let mut turn_speed = 0.0;

        for component in &components {
            health += component.model.health;
            weight += component.model.weight;
            price += component.model.price;
            if let Some((force, turn)) = component.movement() {
                max_speed += force;
                turn_speed += turn;
            }
        }

        Self {
            name: name.into(),
            components,
            health,
            weight,
            price,
            max_speed,
            max_acceleration: max_speed / ACCELERATION_DIVISOR,
            turn_speed,
            visual_key: OnceLock::new(),
        }
    }

    /// The "no robot" sentinel.
    pub fn empty() -> Self {
        Self::new("", Vec::new())
    }

    /// Same components under another name.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.components.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[PlacedComponent] {
        &self.components
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn price(&self) -> i32 {
        self.price
    }

    pub fn max_speed(&self) -> f64 {
        self.max_speed
    }

    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    pub fn turn_speed(&self) -> f64 {
        self.turn_speed
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn components_of(&self, ty: ComponentType) -> impl Iterator<Item = &PlacedComponent> {
        self.components.iter().filter(move |c| c.component_type() == ty)
    }

    /// Key of the composited (non-weapon) sprite, computed on first use.
    pub fn visual_key(&self) -> VisualKey {
        *self.visual_key.get_or_init(|| {
            if self.components.is_empty() {
                return VisualKey::Empty;
            }
            let mut hasher = FxHasher::default();
            for component in self
                .components
                .iter()
                .filter(|c| c.component_type() != ComponentType::Weapon)
            {
                component.model.id.hash(&mut hasher);
                component.grid_x.hash(&mut hasher);
                component.grid_y.hash(&mut hasher);
            }
            VisualKey::Composite(hasher.finish())
        })
    }

    /// Run the default structural checks.
    pub fn verify(&self) -> Vec<Violation> {
        Verifier::default().verify(self)
    }
}

impl PartialEq for RobotModel {
    fn eq(&self, other: &Self) -> bool {
        // derived stats first: cheap and usually enough to tell models apart
        self.health == other.health
            && self.weight == other.weight
            && self.price == other.price
            && self.max_speed == other.max_speed
            && self.max_acceleration == other.max_acceleration
            && self.turn_speed == other.turn_speed
            && self.name == other.name
            && self.components == other.components
    }
}

impl Hash for RobotModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.components.hash(state);
        self.health.hash(state);
        self.weight.hash(state);
        self.price.hash(state);
        hash_f64(self.max_speed, state);
        hash_f64(self.max_acceleration, state);
        hash_f64(self.turn_speed, state);
    }
}
