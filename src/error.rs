//! Error types shared across the engine.
//!
//! [`EngineError`] covers programming and I/O failures surfaced to callers.
//! [`ActionError`] is the per-node, per-frame failure produced by actions and
//! commands; the director logs it and moves on to the next node.
//!
//! Structural problems found by the verifier are *not* errors: they are
//! returned as [`Violation`](crate::systems::verifier::Violation) values.

use thiserror::Error;

use crate::components::node::NodeId;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid action slot: {0}")]
    InvalidSlot(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("parent node not found: {0}")]
    ParentNotFound(NodeId),

    #[error("grid cell ({x}, {y}) is outside the edit grid")]
    OutOfGrid { x: i32, y: i32 },

    #[error("config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("game director thread panicked")]
    DirectorPanicked,
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failure of a single action or command during one node's update.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    #[error("{0}")]
    Failed(String),

    #[error("panicked: {0}")]
    Panicked(String),

    #[error("node {0} cannot move")]
    NotMovable(NodeId),
}

impl ActionError {
    pub fn failed(msg: impl Into<String>) -> Self {
        ActionError::Failed(msg.into())
    }

    /// Build a `Panicked` error from a `catch_unwind` payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        ActionError::Panicked(msg)
    }
}
