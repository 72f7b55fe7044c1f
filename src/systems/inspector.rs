//! Selection helpers for a battle view.
//!
//! These work on a [`NodeSnapshot`] (for example inside a render callback)
//! and turn a selection into [`Command`]s ready for the director's queue.
//! Hit tests only consider root nodes, whose positions are world positions.

use crate::components::node::NodeId;
use crate::components::robotmodel::RobotModel;
use crate::events::command::Command;
use crate::resources::director::NodeSnapshot;
use crate::resources::player::PlayerId;

/// Root nodes whose bounding box contains the point, in live order.
pub fn nodes_containing_point(snapshot: NodeSnapshot<'_>, x: f64, y: f64) -> Vec<NodeId> {
    snapshot
        .roots()
        .filter(|node| node.contains_point(x, y))
        .map(|node| node.id())
        .collect()
}

/// The root node under the point whose center is closest to it.
///
/// Ties go to the earlier node in live order.
pub fn select_node_beside(snapshot: NodeSnapshot<'_>, x: f64, y: f64) -> Option<NodeId> {
    let mut best: Option<(f64, NodeId)> = None;
    for node in snapshot.roots().filter(|node| node.contains_point(x, y)) {
        let distance = node.distance_to(x, y);
        if best.is_none_or(|(closest, _)| distance < closest) {
            best = Some((distance, node.id()));
        }
    }
    best.map(|(_, id)| id)
}

/// Every robot built from a model equal to `model`.
pub fn select_same_model(snapshot: NodeSnapshot<'_>, model: &RobotModel) -> Vec<NodeId> {
    snapshot
        .iter()
        .filter(|node| node.robot_state().is_some_and(|robot| *robot.model == *model))
        .map(|node| node.id())
        .collect()
}

/// One move order per robot in the selection. Other nodes are skipped.
pub fn move_commands(
    source: PlayerId,
    snapshot: NodeSnapshot<'_>,
    selection: &[NodeId],
    x: f64,
    y: f64,
) -> Vec<Command> {
    selection
        .iter()
        .filter(|id| snapshot.get(**id).is_some_and(|node| node.kind.is_movable()))
        .map(|&id| Command::move_to(source, id, x, y))
        .collect()
}

pub fn focus_commands(source: PlayerId, selection: &[NodeId], focused: bool) -> Vec<Command> {
    selection
        .iter()
        .map(|&id| Command::focus(source, id, focused))
        .collect()
}
