//! Simulation data types.
//!
//! Submodules overview:
//! - [`action`] – action trait, priority slots, per-frame context, built-in steering
//! - [`actiontree`] – one-action-per-slot scheduler owned by every node
//! - [`boundingbox`] – axis-aligned box for hit-testing
//! - [`globaltransform2d`] – world-space position and orientation of a node
//! - [`mapposition`] – center position of a node
//! - [`node`] – the simulation entity and its capability traits
//! - [`robotcomponent`] – component models and their placement on the edit grid
//! - [`robotgroup`] – bounded list of robot designs
//! - [`robotmodel`] – immutable robot assembly with derived stats
//! - [`rotation`] – angle normalization and shortest signed difference

pub mod action;
pub mod actiontree;
pub mod boundingbox;
pub mod globaltransform2d;
pub mod mapposition;
pub mod node;
pub mod robotcomponent;
pub mod robotgroup;
pub mod robotmodel;
pub mod rotation;
