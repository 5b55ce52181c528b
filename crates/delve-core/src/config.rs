//! Generation and beam tuning options

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_RETRY_BUDGET;
use crate::errors::SnapshotError;

/// Level builder tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenOptions {
    /// Attempts before generation fails for good
    pub retry_budget: u32,
    /// Random vaults and minivaults stop once this many retries or fewer remain
    pub disable_random_vaults_below: u32,
    /// 1 in N chance of a minivault
    pub minivault_chance: i32,
    /// 1 in N chance of each extra vault
    pub extra_vault_chance: i32,
    /// 1 in N chance of a special room from depth 6
    pub special_room_chance: i32,
    /// Random positions tried per floating vault
    pub max_vault_tries: u32,
    /// Cap on automatically chosen vault exits
    pub max_exits: usize,
}

impl Default for GenOptions {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
            disable_random_vaults_below: 5,
            minivault_chance: 3,
            extra_vault_chance: 4,
            special_room_chance: 10,
            max_vault_tries: 600,
            max_exits: 10,
        }
    }
}

/// Beam engine tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BeamOptions {
    pub statues_block_explosions: bool,
    pub max_bounces: u32,
    /// To-hit lost per cloud cell crossed
    pub cloud_to_hit_penalty: i32,
    /// Run a tracer before a real player shot to catch friendly fire
    pub check_friendly_fire: bool,
}

impl Default for BeamOptions {
    fn default() -> Self {
        Self {
            statues_block_explosions: true,
            max_bounces: 4,
            cloud_to_hit_penalty: 2,
            check_friendly_fire: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub generation: GenOptions,
    pub beam: BeamOptions,
}

impl Options {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.generation.retry_budget, 20);
        assert_eq!(opts.generation.max_vault_tries, 600);
        assert_eq!(opts.beam.max_bounces, 4);
        assert!(opts.beam.statues_block_explosions);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let opts = Options::from_json(r#"{"beam": {"max_bounces": 1}}"#).unwrap();
        assert_eq!(opts.beam.max_bounces, 1);
        assert_eq!(opts.beam.cloud_to_hit_penalty, 2);
        assert_eq!(opts.generation, GenOptions::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut opts = Options::default();
        opts.generation.retry_budget = 3;
        let json = opts.to_json().unwrap();
        assert_eq!(Options::from_json(&json).unwrap(), opts);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Options::from_json("{not json").is_err());
    }
}
