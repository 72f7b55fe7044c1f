use crate::components::node::NodeId;

/// Notifications sent *from* the game director to whoever listens.
#[derive(Debug, Clone, PartialEq)]
pub enum DirectorEvent {
    Started,
    Stopped { frames: u64 },
    NodeAdded { id: NodeId, parent: Option<NodeId> },
    NodeRejected { reason: String },
    NodesRemoved { root: NodeId, count: usize },
    CommandRejected { target: NodeId, label: &'static str },
    /// A node's actions or a command failed; only that node lost its frame.
    UpdateFailed { node: NodeId, frame: u64, error: String },
}
