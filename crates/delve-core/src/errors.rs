//! Error types for level generation and snapshots
//!
//! Vetoes are retryable and never reach the player. Only
//! [`GenerationError::LevelGenerationFailed`] ends a generation run.

use thiserror::Error;

use crate::dungeon::{Feature, LevelId};
use crate::geom::Coord;

/// Why a generation attempt was thrown away
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VetoReason {
    #[error("placing vault '{vault}' split the level: {before} zones became {after}")]
    ConnectivityBroken {
        before: usize,
        after: usize,
        vault: String,
    },

    #[error("mandatory vault '{vault}' could not be placed")]
    MandatoryVaultFailed { vault: String },

    #[error("no down stair is reachable from the up stair")]
    StairsUnreachable,

    #[error("layout plan '{plan}' collided with existing features")]
    PlanCollision { plan: String },

    #[error("no position available for stair {feature}")]
    MissingStairs { feature: Feature },

    #[error("encompass vault '{vault}' refused without full-level permission")]
    EncompassRefused { vault: String },
}

/// Fatal level generation failure
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("failed to generate {level} after {attempts} attempts: {veto}")]
    LevelGenerationFailed {
        level: LevelId,
        attempts: u32,
        /// Vaults attempted on the final try, for the diagnostic dump
        last_vaults: Vec<String>,
        veto: VetoReason,
    },
}

/// Soft failure from vault placement; the caller decides whether to veto
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error("no valid position for vault '{vault}' after {tries} tries")]
    NoValidPosition { vault: String, tries: u32 },

    #[error("vault '{vault}' collides with existing features at ({}, {})", at.x, at.y)]
    Collision { vault: String, at: Coord },

    #[error("vault '{vault}' at ({}, {}) does not touch the level", at.x, at.y)]
    Disconnected { vault: String, at: Coord },

    #[error("encompass vault '{vault}' needs permission to replace the level")]
    EncompassNotPermitted { vault: String },
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot grid is {width}x{height}, expected {expected_width}x{expected_height}")]
    Dimensions {
        width: i32,
        height: i32,
        expected_width: i32,
        expected_height: i32,
    },
}
