//! Player-issued commands.
//!
//! A [`Command`] captures who issued it, which node it targets, and a one-shot
//! behaviour run against that node at the start of the next tick. Applying a
//! command usually puts an action into the target's action tree.

use std::fmt;

use crate::components::action::{ActionSlot, FrameContext, GotoTarget};
use crate::components::node::{NodeId, NodeMut};
use crate::error::ActionError;
use crate::resources::player::PlayerId;

type Behaviour = Box<dyn FnOnce(&mut NodeMut<'_>, &mut FrameContext) -> Result<(), ActionError> + Send>;

pub struct Command {
    source: PlayerId,
    target: NodeId,
    label: &'static str,
    behaviour: Behaviour,
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("label", &self.label)
            .finish()
    }
}

impl Command {
    pub fn new<F>(source: PlayerId, target: NodeId, behaviour: F) -> Self
    where
        F: FnOnce(&mut NodeMut<'_>, &mut FrameContext) -> Result<(), ActionError> + Send + 'static,
    {
        Self {
            source,
            target,
            label: "custom",
            behaviour: Box::new(behaviour),
        }
    }

    /// Order a robot to drive to `(x, y)`, replacing any previous order.
    pub fn move_to(source: PlayerId, target: NodeId, x: f64, y: f64) -> Self {
        Self::new(source, target, move |node: &mut NodeMut<'_>, _: &mut FrameContext| {
            if !node.kind.is_movable() {
                return Err(ActionError::NotMovable(node.id()));
            }
            node.action_tree_mut()
                .put_action(GotoTarget::new(x, y), ActionSlot::Custom);
            Ok(())
        })
        .labelled("move_to")
    }

    /// Set or clear the selection marker drawn by the renderer.
    pub fn focus(source: PlayerId, target: NodeId, focused: bool) -> Self {
        Self::new(source, target, move |node: &mut NodeMut<'_>, _: &mut FrameContext| {
            node.set_focused_by_player(focused);
            Ok(())
        })
        .labelled("focus")
    }

    /// Remove the target and its children at the end of the tick.
    pub fn despawn(source: PlayerId, target: NodeId) -> Self {
        Self::new(source, target, move |_: &mut NodeMut<'_>, ctx: &mut FrameContext| {
            ctx.despawn(target);
            Ok(())
        })
        .labelled("despawn")
    }

    pub fn labelled(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn source(&self) -> PlayerId {
        self.source
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Run the behaviour against its target.
    pub fn apply(self, node: &mut NodeMut<'_>, ctx: &mut FrameContext) -> Result<(), ActionError> {
        (self.behaviour)(node, ctx)
    }
}
