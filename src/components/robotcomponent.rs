//! Placeable robot parts.
//!
//! A [`ComponentModel`] is a catalog entry (stats and type-specific data);
//! a [`PlacedComponent`] is one of those models put on a grid cell of a robot
//! under construction.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Type tag of a component, derived from its [`ComponentKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Block,
    Weapon,
    Movement,
}

/// Type-specific data of a component model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ComponentKind {
    Block,
    Weapon {
        damage: i32,
        range: f64,
        /// Ticks between shots.
        cooldown: u32,
    },
    Movement {
        /// Contribution to the robot's max speed.
        force: f64,
        /// Contribution to the robot's turn speed, radians per tick.
        turn: f64,
    },
}

impl ComponentKind {
    pub fn component_type(&self) -> ComponentType {
        match self {
            ComponentKind::Block => ComponentType::Block,
            ComponentKind::Weapon { .. } => ComponentType::Weapon,
            ComponentKind::Movement { .. } => ComponentType::Movement,
        }
    }
}

/// Capabilities a component may carry regardless of its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// A weapon may share this component's cell.
    WeaponMount,
}

/// Hash a float consistently with `==`: `-0.0` and `0.0` hash the same.
pub(crate) fn hash_f64<H: Hasher>(value: f64, state: &mut H) {
    let value = if value == 0.0 { 0.0 } else { value };
    value.to_bits().hash(state);
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentModel {
    pub id: String,
    pub name: String,
    pub health: i32,
    pub weight: i32,
    pub price: i32,
    /// Footprint in grid cells.
    #[serde(default = "one")]
    pub width: u32,
    #[serde(default = "one")]
    pub height: u32,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(flatten)]
    pub kind: ComponentKind,
}

impl ComponentModel {
    pub fn new(id: impl Into<String>, health: i32, weight: i32, price: i32, kind: ComponentKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            health,
            weight,
            price,
            width: 1,
            height: 1,
            attributes: Vec::new(),
            kind,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        if !self.attributes.contains(&attribute) {
            self.attributes.push(attribute);
        }
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn component_type(&self) -> ComponentType {
        self.kind.component_type()
    }

    pub fn has_attribute(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }

    pub fn is_weapon_mount(&self) -> bool {
        self.has_attribute(Attribute::WeaponMount)
    }
}

impl Hash for ComponentModel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.health.hash(state);
        self.weight.hash(state);
        self.price.hash(state);
        self.width.hash(state);
        self.height.hash(state);
        self.attributes.hash(state);
        self.component_type().hash(state);
        match &self.kind {
            ComponentKind::Block => {}
            ComponentKind::Weapon { damage, range, cooldown } => {
                damage.hash(state);
                hash_f64(*range, state);
                cooldown.hash(state);
            }
            ComponentKind::Movement { force, turn } => {
                hash_f64(*force, state);
                hash_f64(*turn, state);
            }
        }
    }
}

/// Grid cell on the robot editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A component model placed at a grid cell (its top-left footprint cell).
#[derive(Debug, Clone, PartialEq, Hash, Serialize, Deserialize)]
pub struct PlacedComponent {
    pub model: Arc<ComponentModel>,
    pub grid_x: i32,
    pub grid_y: i32,
}

impl PlacedComponent {
    pub fn new(model: Arc<ComponentModel>, grid_x: i32, grid_y: i32) -> Self {
        Self {
            model,
            grid_x,
            grid_y,
        }
    }

    pub fn cell(&self) -> GridPoint {
        GridPoint::new(self.grid_x, self.grid_y)
    }

    pub fn component_type(&self) -> ComponentType {
        self.model.component_type()
    }

    /// Movement contribution as `(force, turn)`, if this is a movement part.
    pub fn movement(&self) -> Option<(f64, f64)> {
        match self.model.kind {
            ComponentKind::Movement { force, turn } => Some((force, turn)),
            ComponentKind::Block | ComponentKind::Weapon { .. } => None,
        }
    }

    /// The same component moved by `(dx, dy)`, or `None` if that overflows.
    pub fn shifted(&self, dx: i32, dy: i32) -> Option<Self> {
        let x = self.grid_x.checked_add(dx)?;
        let y = self.grid_y.checked_add(dy)?;
        Some(Self::new(self.model.clone(), x, y))
    }
}
