//! The phases of a director tick.
//!
//! [`tick_schedule`] chains them, so within a tick command application
//! happens before node insertion, which happens before node updates, which
//! happen before render:
//!
//! 1. [`apply_commands`] drains the [`CommandInbox`].
//! 2. [`insert_pending_nodes`] drains the [`NodeInbox`] into the world.
//! 3. [`update_nodes`] runs every live node's action tree in [`NodeOrder`].
//! 4. [`remove_despawned`] applies despawn requests collected during 1 and 3.
//! 5. [`propagate_transforms`] refreshes world transforms for the renderer.
//!
//! The director inserts a fresh [`FrameContext`] and [`TickSummary`] before
//! running the schedule and reads the summary back afterwards. A failing
//! command or node is logged and reported as a
//! [`DirectorEvent::UpdateFailed`]; nothing here aborts the tick.

use std::panic::{self, AssertUnwindSafe};

use bevy_ecs::prelude::*;
use log::{debug, error, warn};

use crate::components::action::FrameContext;
use crate::components::node::{NodeData, NodeId, with_node_mut};
use crate::error::ActionError;
use crate::events::director::DirectorEvent;
use crate::resources::battlefield::{NodeOrder, despawn_node, spawn_node};
use crate::resources::queues::{CommandInbox, EventOutbox, NodeInbox};
use crate::systems::propagate_transforms::propagate_transforms;

/// Counters for one tick, filled in by the phase systems.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub frame: u64,
    pub commands: usize,
    pub inserted: usize,
    pub failures: usize,
    pub removed: usize,
}

/// The per-tick schedule, phases chained in order.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            apply_commands,
            insert_pending_nodes,
            update_nodes,
            remove_despawned,
            propagate_transforms,
        )
            .chain(),
    );
    schedule
}

fn report_failure(outbox: &EventOutbox, node: NodeId, frame: u64, err: &ActionError) {
    error!("node {} failed during frame {}: {}", node, frame, err);
    outbox.send(DirectorEvent::UpdateFailed {
        node,
        frame,
        error: err.to_string(),
    });
}

/// Apply every queued command to its target.
pub fn apply_commands(
    inbox: Res<CommandInbox>,
    outbox: Res<EventOutbox>,
    mut ctx: ResMut<FrameContext>,
    mut summary: ResMut<TickSummary>,
    mut nodes: Query<NodeData>,
) {
    let ctx = &mut *ctx;
    for cmd in inbox.rx.try_iter() {
        let target = cmd.target();
        let label = cmd.label();
        ctx.set_node(Some(target));
        let outcome = with_node_mut(&mut nodes, target, |node| {
            panic::catch_unwind(AssertUnwindSafe(|| cmd.apply(node, ctx)))
                .unwrap_or_else(|payload| Err(ActionError::from_panic(payload)))
        });
        match outcome {
            Some(Ok(())) => summary.commands += 1,
            Some(Err(err)) => report_failure(&outbox, target, ctx.frame, &err),
            None => {
                warn!("command '{}' dropped: node {} does not exist", label, target);
                outbox.send(DirectorEvent::CommandRejected { target, label });
            }
        }
    }
    ctx.set_node(None);
}

/// Move queued nodes into the world.
pub fn insert_pending_nodes(world: &mut World) {
    let pending: Vec<_> = world.resource::<NodeInbox>().rx.try_iter().collect();
    let outbox = world.resource::<EventOutbox>().clone();
    let mut inserted = 0;
    for request in pending {
        let parent = request.parent;
        match spawn_node(world, request) {
            Ok(id) => {
                debug!("node {} inserted (parent {:?})", id, parent);
                outbox.send(DirectorEvent::NodeAdded { id, parent });
                inserted += 1;
            }
            Err(err) => {
                warn!("node insertion rejected: {}", err);
                outbox.send(DirectorEvent::NodeRejected {
                    reason: err.to_string(),
                });
            }
        }
    }
    world.resource_mut::<TickSummary>().inserted += inserted;
}

/// Update every live node once, in insertion order.
///
/// Nodes spawned by actions or commands are pushed onto the node queue and
/// show up at the next tick boundary.
pub fn update_nodes(
    order: Res<NodeOrder>,
    inbox: Res<NodeInbox>,
    outbox: Res<EventOutbox>,
    mut ctx: ResMut<FrameContext>,
    mut summary: ResMut<TickSummary>,
    mut nodes: Query<NodeData>,
) {
    let ctx = &mut *ctx;
    for &id in &order.0 {
        ctx.set_node(Some(id));
        if let Some(Err(err)) = with_node_mut(&mut nodes, id, |node| node.update(ctx)) {
            report_failure(&outbox, id, ctx.frame, &err);
            summary.failures += 1;
        }
    }
    ctx.set_node(None);
    for request in ctx.take_spawns() {
        inbox.queue.push(request);
    }
}

/// Despawn the subtrees requested through [`FrameContext::despawn`].
pub fn remove_despawned(world: &mut World) {
    let requested = world.resource_mut::<FrameContext>().take_despawns();
    let outbox = world.resource::<EventOutbox>().clone();
    let mut removed = 0;
    for id in requested {
        match despawn_node(world, id) {
            Ok(count) => {
                removed += count;
                outbox.send(DirectorEvent::NodesRemoved { root: id, count });
            }
            // already gone with an earlier subtree in this batch
            Err(err) => debug!("despawn of {} skipped: {}", id, err),
        }
    }
    world.resource_mut::<TickSummary>().removed += removed;
}
