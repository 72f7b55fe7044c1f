//! Simulation systems.
//!
//! The tick phases run as bevy systems in a chained schedule. The inspector
//! and verifier are plain functions over snapshots and models.
//!
//! Submodules overview
//! - [`inspector`] – hit-testing and selection helpers producing commands
//! - [`propagate_transforms`] – compose parent chains into world transforms
//! - [`tick`] – the phases of one director tick
//! - [`verifier`] – structural checks over robot models

pub mod inspector;
pub mod propagate_transforms;
pub mod tick;
pub mod verifier;
