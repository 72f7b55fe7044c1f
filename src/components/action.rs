//! Per-frame behaviours that live in a node's [`ActionTree`](super::actiontree::ActionTree).
//!
//! An [`Action`] runs once per frame against its owning node (seen through
//! [`NodeMut`]) and reports whether it is finished. Any
//! `FnMut(&mut NodeMut<'_>, &mut FrameContext)` closure
//! with the right return type is an action, which is how commands and tests
//! usually build them. [`GotoTarget`] is the built-in steering behaviour used
//! by move orders.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bevy_ecs::prelude::Resource;

use crate::components::node::{Node, NodeId, NodeKind, NodeMut};
use crate::components::rotation::{min_angle_difference, normalize_angle};
use crate::error::{ActionError, EngineError};
use crate::resources::queues::PendingNode;

/// Priority slots of an action tree, executed in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionSlot {
    Movement,
    Combat,
    Custom,
    Idle,
}

impl ActionSlot {
    pub const COUNT: usize = 4;
    pub const ALL: [ActionSlot; ActionSlot::COUNT] = [
        ActionSlot::Movement,
        ActionSlot::Combat,
        ActionSlot::Custom,
        ActionSlot::Idle,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionSlot::Movement => "movement",
            ActionSlot::Combat => "combat",
            ActionSlot::Custom => "custom",
            ActionSlot::Idle => "idle",
        }
    }
}

impl fmt::Display for ActionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActionSlot {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionSlot::ALL
            .into_iter()
            .find(|slot| slot.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::InvalidSlot(s.to_string()))
    }
}

impl TryFrom<usize> for ActionSlot {
    type Error = EngineError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        ActionSlot::ALL
            .get(index)
            .copied()
            .ok_or_else(|| EngineError::InvalidSlot(index.to_string()))
    }
}

/// Return type of [`Action::execute`].
pub type ActionResult = Result<ActionStatus, ActionError>;

/// Outcome of one execution of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStatus {
    /// Keep the action in its slot for the next frame.
    Continue,
    /// Clear the slot.
    Done,
}

/// Per-tick context handed to actions and commands.
///
/// Spawn and despawn requests are deferred: spawned nodes are queued for the
/// next tick boundary and despawns are applied after every node has updated.
/// The director keeps one in the battlefield world for the length of a tick.
#[derive(Resource, Debug)]
pub struct FrameContext {
    /// Tick counter, starting at 1 for the first tick.
    pub frame: u64,
    /// Time elapsed since the previous tick started.
    pub lag: Duration,
    node: Option<NodeId>,
    spawns: Vec<PendingNode>,
    despawns: Vec<NodeId>,
}

impl FrameContext {
    pub fn new(frame: u64, lag: Duration) -> Self {
        Self {
            frame,
            lag,
            node: None,
            spawns: Vec::new(),
            despawns: Vec::new(),
        }
    }

    /// Id of the node currently being updated or commanded.
    pub fn node_id(&self) -> Option<NodeId> {
        self.node
    }

    pub(crate) fn set_node(&mut self, id: Option<NodeId>) {
        self.node = id;
    }

    /// Queue a new child of the current node.
    pub fn spawn_child(&mut self, child: Node) {
        self.spawns.push(PendingNode {
            node: child,
            parent: self.node,
        });
    }

    /// Queue a new top-level node.
    pub fn spawn(&mut self, node: Node) {
        self.spawns.push(PendingNode { node, parent: None });
    }

    /// Request removal of a node (and its subtree) at the end of this tick.
    pub fn despawn(&mut self, id: NodeId) {
        if !self.despawns.contains(&id) {
            self.despawns.push(id);
        }
    }

    pub fn pending_spawns(&self) -> &[PendingNode] {
        &self.spawns
    }

    pub fn pending_despawns(&self) -> &[NodeId] {
        &self.despawns
    }

    pub(crate) fn take_spawns(&mut self) -> Vec<PendingNode> {
        std::mem::take(&mut self.spawns)
    }

    pub(crate) fn take_despawns(&mut self) -> Vec<NodeId> {
        std::mem::take(&mut self.despawns)
    }
}

/// A unit of per-frame behaviour.
pub trait Action: Send + Sync {
    fn execute(&mut self, node: &mut NodeMut<'_>, ctx: &mut FrameContext) -> ActionResult;

    /// Short label for logs.
    fn label(&self) -> &str {
        "action"
    }
}

impl<F> Action for F
where
    F: FnMut(&mut NodeMut<'_>, &mut FrameContext) -> ActionResult + Send + Sync,
{
    fn execute(&mut self, node: &mut NodeMut<'_>, ctx: &mut FrameContext) -> ActionResult {
        self(node, ctx)
    }
}

/// Steer a robot node toward a point.
///
/// Per frame: turn toward the target by at most the model's turn speed,
/// accelerate up to the model's max speed, then advance along the heading.
/// Finishes by snapping onto the target once it is within one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GotoTarget {
    pub x: f64,
    pub y: f64,
}

impl GotoTarget {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Action for GotoTarget {
    fn execute(&mut self, node: &mut NodeMut<'_>, _ctx: &mut FrameContext) -> ActionResult {
        let position = *node.position;
        let orientation = node.rotation.radians;
        let id = node.id();
        let NodeKind::Robot(robot) = &mut *node.kind else {
            return Err(ActionError::NotMovable(id));
        };

        let dx = self.x - position.x;
        let dy = self.y - position.y;
        let distance = (dx * dx + dy * dy).sqrt();

        let model = robot.model.clone();
        robot.speed = (robot.speed + model.max_acceleration()).min(model.max_speed());
        let step = robot.speed;

        if distance <= step || distance == 0.0 {
            robot.speed = 0.0;
            node.position.x = self.x;
            node.position.y = self.y;
            return Ok(ActionStatus::Done);
        }

        let desired = dy.atan2(dx);
        let turn = model.turn_speed();
        let diff = min_angle_difference(desired, orientation).clamp(-turn, turn);
        node.rotation.radians = normalize_angle(orientation + diff);

        let (sin, cos) = node.rotation.radians.sin_cos();
        node.position.x += cos * step;
        node.position.y += sin * step;
        Ok(ActionStatus::Continue)
    }

    fn label(&self) -> &str {
        "goto_target"
    }
}
