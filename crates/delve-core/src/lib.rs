//! delve-core: dungeon generation and beam combat for a roguelike
//!
//! The crate has no I/O. A [`dungeon::Level`] holds all state for one
//! level and is passed by reference into the level builder and the beam
//! engine; nothing is global.

pub mod actor;
pub mod beam;
pub mod config;
pub mod dungeon;
pub mod errors;
pub mod geom;
pub mod item;
pub mod logging;
pub mod rarity;

mod consts;
mod rng;

pub use config::{BeamOptions, GenOptions, Options};
pub use consts::*;
pub use errors::{GenerationError, PlacementError, SnapshotError, VetoReason};
pub use rng::GameRng;
