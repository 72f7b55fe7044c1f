//! Botforge library.
//!
//! Headless core of a robot-building battle game: nodes driven by per-slot
//! action trees, a threaded tick director fed by command and node queues,
//! immutable robot assemblies with derived stats, and structural verification
//! for the robot editor.

pub mod components;
pub mod error;
pub mod events;
pub mod resources;
pub mod systems;
