//! Channels between the director's world and the threads that feed it.
//!
//! Both inbound queues are unbounded `crossbeam_channel` channels: any number
//! of threads may hold a clone of a [`CommandQueue`] or [`NodeQueue`] and
//! enqueue without blocking, and nothing is ever dropped. The receiving ends
//! live in the battlefield world as the [`CommandInbox`] and [`NodeInbox`]
//! resources and are drained by the tick systems; [`EventOutbox`] carries
//! [`DirectorEvent`]s back out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use bevy_ecs::prelude::Resource;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};

use crate::components::node::{Node, NodeId};
use crate::components::robotmodel::RobotModel;
use crate::events::command::Command;
use crate::events::director::DirectorEvent;
use crate::resources::gameconfig::GameConfig;
use crate::resources::player::PlayerId;

/// A node waiting to be inserted into the live collection.
#[derive(Debug)]
pub struct PendingNode {
    pub node: Node,
    /// Attach as a child of this node; `None` for a top-level node.
    pub parent: Option<NodeId>,
}

/// Cloneable sender for player commands.
#[derive(Clone, Debug)]
pub struct CommandQueue {
    tx: Sender<Command>,
}

impl CommandQueue {
    pub(crate) fn new(tx: Sender<Command>) -> Self {
        Self { tx }
    }

    /// Enqueue a command for the next tick. Never blocks.
    ///
    /// Returns `false` only when the director has been dropped.
    pub fn command(&self, cmd: Command) -> bool {
        match self.tx.send(cmd) {
            Ok(()) => true,
            Err(err) => {
                warn!("command for {} dropped: director is gone", err.0.target());
                false
            }
        }
    }
}

/// Cloneable sender for node insertion requests.
#[derive(Clone, Debug)]
pub struct NodeQueue {
    tx: Sender<PendingNode>,
}

impl NodeQueue {
    pub(crate) fn new(tx: Sender<PendingNode>) -> Self {
        Self { tx }
    }

    /// Queue a top-level node for insertion at the next tick boundary.
    pub fn add(&self, node: Node) -> bool {
        self.push(PendingNode { node, parent: None })
    }

    /// Queue `node` as a child of `parent`.
    pub fn add_child(&self, parent: NodeId, node: Node) -> bool {
        self.push(PendingNode {
            node,
            parent: Some(parent),
        })
    }

    /// Queue a robot built from `model`. Empty models are refused.
    pub fn spawn_robot(
        &self,
        model: Arc<RobotModel>,
        owner: PlayerId,
        x: f64,
        y: f64,
        config: &GameConfig,
    ) -> bool {
        if model.is_empty() {
            debug!("refusing to spawn empty robot model for {}", owner);
            return false;
        }
        self.add(Node::robot(model, owner, x, y, config))
    }

    pub(crate) fn push(&self, pending: PendingNode) -> bool {
        if self.tx.send(pending).is_err() {
            warn!("node insertion dropped: director is gone");
            return false;
        }
        true
    }
}

/// Cooperative stop request, observed at the next tick boundary.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Receiving end of the command queue.
#[derive(Resource)]
pub struct CommandInbox {
    pub rx: Receiver<Command>,
}

/// Receiving end of the node-add queue, plus a producer handle for nodes
/// spawned during the tick.
#[derive(Resource)]
pub struct NodeInbox {
    pub rx: Receiver<PendingNode>,
    pub queue: NodeQueue,
}

/// Sender for director notifications. Sends never block: events that do not
/// fit in the channel are dropped.
#[derive(Resource, Clone)]
pub struct EventOutbox {
    pub tx: Sender<DirectorEvent>,
}

impl EventOutbox {
    pub fn send(&self, event: DirectorEvent) {
        if self.tx.try_send(event).is_err() {
            debug!("director event dropped: channel full or closed");
        }
    }
}
