//! Dungeon levels and their generation
//!
//! Contains the terrain grid, map mask, vaults, connectivity analysis and
//! the level builder with its layout algorithms.

mod branch;
mod cloud;
mod feature;
mod level;
mod mask;
mod shop;
mod trap;

pub mod abyss;
pub mod basic;
pub mod builder;
pub mod corruption;
pub mod dig;
pub mod extras;
pub mod labyrinth;
pub mod pandemonium;
pub mod pits;
pub mod place;
pub mod plans;
pub mod populate;
pub mod vault;
pub mod zones;

pub use branch::{Branch, BranchLayout, LevelId, LevelType};
pub use builder::{BuildStage, LevelBuilder, branch_end_vault, place_vault_checked};
pub use cloud::{Cloud, CloudEntry, CloudKind};
pub use corruption::{CorruptionSeed, corrupt_step};
pub use feature::{Feature, God};
pub use level::{Level, LevelSnapshot};
pub use mask::MapMask;
pub use place::{VaultPosition, place_vault};
pub use shop::{ShopInfo, ShopKind};
pub use trap::{Trap, TrapKind};
pub use vault::{GlyphSpec, VaultCatalogue, VaultId, VaultMap, VaultPlacement, VaultTags};
pub use zones::{count_disconnected_zones, find_nearest_feature, stairs_connected};
