//! Slot-based per-node scheduler.
//!
//! An [`ActionTree`] holds at most one pending [`Action`] per [`ActionSlot`].
//! Putting an action into an occupied slot replaces the previous one; nothing
//! queues inside a slot. [`ActionTree::execute_all`] runs every occupied slot
//! once, in ascending slot order, and clears the slots whose action reports
//! [`ActionStatus::Done`].
//!
//! Slots are independent channels (movement, weapons, orders, idle) and an
//! action must not rely on what another slot did earlier in the same frame.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use bevy_ecs::prelude::Component;
use log::trace;

use crate::components::action::{Action, ActionSlot, ActionStatus, FrameContext};
use crate::components::node::NodeMut;
use crate::error::{ActionError, Result};

#[derive(Component, Default)]
pub struct ActionTree {
    slots: [Option<Box<dyn Action>>; ActionSlot::COUNT],
}

impl fmt::Debug for ActionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.occupied()).finish()
    }
}

impl ActionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `action` in `slot`, replacing whatever was there.
    pub fn put_action(&mut self, action: impl Action + 'static, slot: ActionSlot) {
        self.put_boxed(Box::new(action), slot);
    }

    pub fn put_boxed(&mut self, action: Box<dyn Action>, slot: ActionSlot) {
        if let Some(old) = self.slots[slot.index()].replace(action) {
            trace!("slot {} replaced '{}'", slot, old.label());
        }
    }

    /// Like [`put_action`](Self::put_action) with the slot given by name.
    pub fn put_action_named(&mut self, action: impl Action + 'static, slot: &str) -> Result<()> {
        let slot: ActionSlot = slot.parse()?;
        self.put_action(action, slot);
        Ok(())
    }

    pub fn has_action(&self, slot: ActionSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    pub fn action(&self, slot: ActionSlot) -> Option<&dyn Action> {
        self.slots[slot.index()].as_deref()
    }

    pub fn remove_action(&mut self, slot: ActionSlot) -> Option<Box<dyn Action>> {
        self.slots[slot.index()].take()
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Occupied slots in execution order.
    pub fn occupied(&self) -> impl Iterator<Item = ActionSlot> + '_ {
        ActionSlot::ALL
            .into_iter()
            .filter(|slot| self.slots[slot.index()].is_some())
    }

    /// Run each occupied slot once against `owner`.
    ///
    /// Stops at the first failing action and returns its error; that action
    /// stays in its slot and later slots are skipped for this frame. A panic
    /// inside an action is caught and reported as [`ActionError::Panicked`].
    pub fn execute_all(
        &mut self,
        owner: &mut NodeMut<'_>,
        ctx: &mut FrameContext,
    ) -> std::result::Result<(), ActionError> {
        for slot in ActionSlot::ALL {
            let Some(action) = self.slots[slot.index()].as_mut() else {
                continue;
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| action.execute(owner, ctx)))
                .unwrap_or_else(|payload| Err(ActionError::from_panic(payload)));
            match outcome? {
                ActionStatus::Continue => {}
                ActionStatus::Done => {
                    trace!("slot {} finished", slot);
                    self.slots[slot.index()] = None;
                }
            }
        }
        Ok(())
    }

    /// Merge actions submitted while this tree was detached for execution.
    ///
    /// Submissions win over continuing actions in the same slot, matching
    /// the overwrite rule of [`put_action`](Self::put_action).
    pub(crate) fn absorb(&mut self, submitted: ActionTree) {
        for (mine, theirs) in self.slots.iter_mut().zip(submitted.slots) {
            if theirs.is_some() {
                *mine = theirs;
            }
        }
    }
}
