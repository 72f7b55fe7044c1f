//! Positioned, oriented simulation entities.
//!
//! A node is an entity in a battlefield's [`World`]. It is spawned from the
//! [`Node`] bundle ([`MapPosition`], [`Rotation`], [`BoundingBox`],
//! [`NodeKind`], [`Peers`], [`FocusedByPlayer`], [`GlobalTransform2D`] and an
//! [`ActionTree`]); children hang off their parent through bevy's
//! [`ChildOf`]/[`Children`] relationship, so despawning a node takes its whole
//! subtree with it.
//!
//! Actions see a live node through [`NodeMut`], renderers and selection
//! helpers through [`NodeRef`]. Shared behaviour is written as free functions
//! over small capability traits ([`Positioned`], [`Orientable`],
//! [`HasActionTree`]).

use std::sync::Arc;

use bevy_ecs::hierarchy::{ChildOf, Children};
use bevy_ecs::prelude::*;
use smallvec::SmallVec;

use crate::components::action::{Action, ActionSlot, FrameContext};
use crate::components::actiontree::ActionTree;
use crate::components::boundingbox::BoundingBox;
use crate::components::globaltransform2d::GlobalTransform2D;
use crate::components::mapposition::MapPosition;
use crate::components::robotmodel::RobotModel;
use crate::components::rotation::{Rotation, normalize_angle, to_degrees};
use crate::error::ActionError;
use crate::resources::gameconfig::GameConfig;
use crate::resources::player::PlayerId;

/// Entity id of a node. Ids are generational and never alias a despawned node.
pub type NodeId = Entity;

/// Id reported by nodes that are not (yet) part of a battlefield.
pub const DETACHED: NodeId = Entity::PLACEHOLDER;

/// Identifier of a battlefield, stored as a resource in its world.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub u32);

/// Per-robot simulation state.
#[derive(Debug, Clone)]
pub struct RobotState {
    pub model: Arc<RobotModel>,
    pub owner: PlayerId,
    /// Current speed in battlefield units per tick.
    pub speed: f64,
    pub health: i32,
}

#[derive(Component, Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Plain,
    Robot(RobotState),
}

impl NodeKind {
    pub fn is_movable(&self) -> bool {
        matches!(self, NodeKind::Robot(_))
    }

    pub fn robot_state(&self) -> Option<&RobotState> {
        match self {
            NodeKind::Robot(state) => Some(state),
            NodeKind::Plain => None,
        }
    }
}

/// Other nodes this node may influence. Not owning.
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct Peers(pub SmallVec<[NodeId; 4]>);

/// Selection marker, set by the input collaborator and read by renderers.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusedByPlayer(pub bool);

/// Everything a node is spawned with.
#[derive(Bundle, Debug)]
pub struct Node {
    pub position: MapPosition,
    /// Heading. Read as `[0, 2π)` after [`correct_orientation`].
    pub rotation: Rotation,
    pub bounds: BoundingBox,
    pub kind: NodeKind,
    pub peers: Peers,
    pub focus: FocusedByPlayer,
    pub global: GlobalTransform2D,
    pub actions: ActionTree,
}

impl Node {
    /// A plain node centered at `(x, y)`.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        let position = MapPosition::new(x, y);
        Self {
            position,
            rotation: Rotation::default(),
            bounds: BoundingBox::new(width, height),
            kind: NodeKind::Plain,
            peers: Peers::default(),
            focus: FocusedByPlayer::default(),
            global: GlobalTransform2D::new(position, 0.0),
            actions: ActionTree::new(),
        }
    }

    /// A robot node built from `model`, sized by the configured robot pixel size.
    pub fn robot(model: Arc<RobotModel>, owner: PlayerId, x: f64, y: f64, config: &GameConfig) -> Self {
        let side = f64::from(config.robot_pixel_size);
        let health = model.health();
        Self {
            kind: NodeKind::Robot(RobotState {
                model,
                owner,
                speed: 0.0,
                health,
            }),
            ..Self::new(x, y, side, side)
        }
    }

    pub fn with_orientation(mut self, radians: f64) -> Self {
        self.rotation = Rotation::new(radians);
        self.global = GlobalTransform2D::new(self.position, radians);
        self
    }

    pub fn with_action(mut self, action: impl Action + 'static, slot: ActionSlot) -> Self {
        self.actions.put_action(action, slot);
        self
    }

    pub fn with_peer(mut self, peer: NodeId) -> Self {
        self.peers.0.push(peer);
        self
    }

    /// Mutable view of a node that has not been spawned yet.
    pub fn as_node_mut(&mut self) -> NodeMut<'_> {
        NodeMut {
            id: DETACHED,
            parent: None,
            position: &mut self.position,
            rotation: &mut self.rotation,
            bounds: &self.bounds,
            kind: &mut self.kind,
            peers: &mut self.peers,
            focus: &mut self.focus,
            actions: &mut self.actions,
        }
    }
}

/// Query data behind [`NodeMut`]; see [`with_node_mut`].
pub type NodeData = (
    Entity,
    Option<&'static ChildOf>,
    &'static mut MapPosition,
    &'static mut Rotation,
    &'static BoundingBox,
    &'static mut NodeKind,
    &'static mut Peers,
    &'static mut FocusedByPlayer,
    &'static mut ActionTree,
);

/// Mutable access to one node's components, handed to actions and commands.
pub struct NodeMut<'w> {
    id: NodeId,
    parent: Option<NodeId>,
    pub position: &'w mut MapPosition,
    pub rotation: &'w mut Rotation,
    pub bounds: &'w BoundingBox,
    pub kind: &'w mut NodeKind,
    pub peers: &'w mut Peers,
    pub focus: &'w mut FocusedByPlayer,
    actions: &'w mut ActionTree,
}

impl NodeMut<'_> {
    /// Entity id, or [`DETACHED`] for a node that is not spawned.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn action_tree(&self) -> &ActionTree {
        &*self.actions
    }

    pub fn action_tree_mut(&mut self) -> &mut ActionTree {
        &mut *self.actions
    }

    pub fn robot_state(&self) -> Option<&RobotState> {
        self.kind.robot_state()
    }

    pub fn set_focused_by_player(&mut self, focused: bool) {
        self.focus.0 = focused;
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        contains_point(self, x, y)
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        distance_to(self, x, y)
    }

    pub fn correct_orientation(&mut self) {
        correct_orientation(self)
    }

    pub fn update(&mut self, ctx: &mut FrameContext) -> Result<(), ActionError> {
        update(self, ctx)
    }
}

/// Run `f` against the node `id` if the query can see it.
pub fn with_node_mut<R>(
    nodes: &mut Query<NodeData>,
    id: NodeId,
    f: impl FnOnce(&mut NodeMut<'_>) -> R,
) -> Option<R> {
    let (id, child_of, position, rotation, bounds, kind, peers, focus, actions) =
        nodes.get_mut(id).ok()?;
    let mut node = NodeMut {
        id,
        parent: child_of.map(ChildOf::parent),
        position: position.into_inner(),
        rotation: rotation.into_inner(),
        bounds,
        kind: kind.into_inner(),
        peers: peers.into_inner(),
        focus: focus.into_inner(),
        actions: actions.into_inner(),
    };
    Some(f(&mut node))
}

/// Read-only view of a live node.
#[derive(Clone, Copy)]
pub struct NodeRef<'w> {
    id: NodeId,
    field: Option<FieldId>,
    parent: Option<NodeId>,
    children: &'w [NodeId],
    pub position: &'w MapPosition,
    pub rotation: &'w Rotation,
    pub bounds: &'w BoundingBox,
    pub kind: &'w NodeKind,
    pub peers: &'w Peers,
    pub global: &'w GlobalTransform2D,
    focus: &'w FocusedByPlayer,
    actions: &'w ActionTree,
}

impl<'w> NodeRef<'w> {
    /// `None` if `id` is not a live node of `world`.
    pub fn from_world(world: &'w World, id: NodeId) -> Option<Self> {
        let entity = world.get_entity(id).ok()?;
        Some(Self {
            id,
            field: world.get_resource::<FieldId>().copied(),
            parent: entity.get::<ChildOf>().map(ChildOf::parent),
            children: entity
                .get::<Children>()
                .map(|children| &children[..])
                .unwrap_or_default(),
            position: entity.get::<MapPosition>()?,
            rotation: entity.get::<Rotation>()?,
            bounds: entity.get::<BoundingBox>()?,
            kind: entity.get::<NodeKind>()?,
            peers: entity.get::<Peers>()?,
            global: entity.get::<GlobalTransform2D>()?,
            focus: entity.get::<FocusedByPlayer>()?,
            actions: entity.get::<ActionTree>()?,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &'w [NodeId] {
        self.children
    }

    /// The battlefield this node lives in.
    pub fn field(&self) -> Option<FieldId> {
        self.field
    }

    pub fn focused_by_player(&self) -> bool {
        self.focus.0
    }

    pub fn action_tree(&self) -> &'w ActionTree {
        self.actions
    }

    pub fn robot_state(&self) -> Option<&'w RobotState> {
        self.kind.robot_state()
    }

    pub fn orientation(&self) -> f64 {
        self.rotation.radians
    }

    pub fn degree_orientation(&self) -> f64 {
        to_degrees(self.rotation.radians)
    }

    pub fn left_x(&self) -> f64 {
        self.bounds.left_x(*self.position)
    }

    pub fn right_x(&self) -> f64 {
        self.bounds.right_x(*self.position)
    }

    pub fn upper_y(&self) -> f64 {
        self.bounds.upper_y(*self.position)
    }

    pub fn bottom_y(&self) -> f64 {
        self.bounds.bottom_y(*self.position)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        contains_point(self, x, y)
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        distance_to(self, x, y)
    }
}

pub trait Positioned {
    fn position(&self) -> MapPosition;
    fn bounds(&self) -> BoundingBox;
}

pub trait Orientable {
    fn orientation(&self) -> f64;
    fn set_orientation(&mut self, orientation: f64);
}

pub trait HasActionTree {
    fn tree(&self) -> &ActionTree;
    fn tree_mut(&mut self) -> &mut ActionTree;
}

impl Positioned for NodeRef<'_> {
    fn position(&self) -> MapPosition {
        *self.position
    }

    fn bounds(&self) -> BoundingBox {
        *self.bounds
    }
}

impl Positioned for NodeMut<'_> {
    fn position(&self) -> MapPosition {
        *self.position
    }

    fn bounds(&self) -> BoundingBox {
        *self.bounds
    }
}

impl Orientable for NodeMut<'_> {
    fn orientation(&self) -> f64 {
        self.rotation.radians
    }

    fn set_orientation(&mut self, orientation: f64) {
        self.rotation.radians = orientation;
    }
}

impl HasActionTree for NodeMut<'_> {
    fn tree(&self) -> &ActionTree {
        &*self.actions
    }

    fn tree_mut(&mut self) -> &mut ActionTree {
        &mut *self.actions
    }
}

/// Hit test against the un-rotated box around the center.
pub fn contains_point(node: &impl Positioned, x: f64, y: f64) -> bool {
    node.bounds().contains_point(node.position(), x, y)
}

pub fn distance_to(node: &impl Positioned, x: f64, y: f64) -> f64 {
    node.position().distance_to(x, y)
}

pub fn correct_orientation(node: &mut impl Orientable) {
    let corrected = normalize_angle(node.orientation());
    node.set_orientation(corrected);
}

/// Run one frame of the node's action tree.
///
/// The tree is detached while it runs so actions can mutate the node freely,
/// including putting new actions into its tree; those submissions are merged
/// back afterwards and take precedence over continuing actions in the same slot.
pub fn update(node: &mut NodeMut<'_>, ctx: &mut FrameContext) -> Result<(), ActionError> {
    let mut running = std::mem::take(node.tree_mut());
    if running.is_empty() {
        return Ok(());
    }
    let result = running.execute_all(node, ctx);
    let submitted = std::mem::replace(node.tree_mut(), running);
    node.tree_mut().absorb(submitted);
    result
}
