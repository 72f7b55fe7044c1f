//! Long-lived simulation state and its handles.
//!
//! Overview
//! - `battlefield` – the bevy world holding the nodes, spawn and despawn
//! - `catalog` – component models available to the editor
//! - `director` – the tick loop, its thread handle and the render snapshot
//! - `editsession` – robot editing with undo
//! - `gameconfig` – INI-backed settings passed explicitly to constructors
//! - `player` – player identity
//! - `queues` – producer handles for commands and node insertion, stop flag
pub mod battlefield;
pub mod catalog;
pub mod director;
pub mod editsession;
pub mod gameconfig;
pub mod player;
pub mod queues;
