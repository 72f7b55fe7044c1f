//! Messages flowing into and out of the game director.
//!
//! Submodules:
//! - [`command`] – player commands applied to a target node at the next tick
//! - [`director`] – notifications emitted by the director's loop
pub mod command;
pub mod director;
