//! Corruption seeds: abyssal terrain spreading from a point over time

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::abyss::abyss_feature;
use super::feature::Feature;
use super::level::Level;
use crate::geom::{Coord, in_gen_bounds};
use crate::logging::GEN_TARGET;
use crate::rng::GameRng;

/// A point that keeps corrupting the terrain around it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorruptionSeed {
    pub pos: Coord,
    /// Chebyshev radius reached when fully grown
    pub radius: i32,
    /// Steps left before the seed retires
    pub turns: i32,
    /// Steps already taken; the affected radius grows with it
    #[serde(default)]
    pub age: i32,
}

impl CorruptionSeed {
    pub fn new(pos: Coord, radius: i32, turns: i32) -> Self {
        Self {
            pos,
            radius,
            turns,
            age: 0,
        }
    }

    fn current_radius(&self) -> i32 {
        (self.age + 1).min(self.radius)
    }
}

/// Terrain a seed may rewrite
fn corruptible(f: Feature) -> bool {
    matches!(
        f,
        Feature::Floor
            | Feature::RockWall
            | Feature::StoneWall
            | Feature::MetalWall
            | Feature::CrystalWall
            | Feature::ShallowWater
            | Feature::DeepWater
            | Feature::Lava
    )
}

/// Advance every seed by one step
///
/// Each corruptible cell within a seed's current radius changes with
/// chance 1 in 4. Vault cells, occupied cells and cells holding items
/// are skipped. Seeds whose turns run out are removed. Returns the number
/// of cells changed.
pub fn corrupt_step(level: &mut Level, rng: &mut GameRng) -> usize {
    let mut seeds = std::mem::take(&mut level.corruption);
    let mut changed = 0;
    for seed in &mut seeds {
        let r = seed.current_radius();
        for dy in -r..=r {
            for dx in -r..=r {
                let c = seed.pos + Coord::new(dx, dy);
                if !in_gen_bounds(c)
                    || level.is_vault(c)
                    || !corruptible(level.feature(c))
                    || level.monster_index_at(c).is_some()
                    || level.has_items_at(c)
                    || !rng.one_in(4)
                {
                    continue;
                }
                let f = abyss_feature(rng);
                if f != level.feature(c) {
                    level.set_feature(c, f);
                    changed += 1;
                }
            }
        }
        seed.age += 1;
        seed.turns -= 1;
    }
    seeds.retain(|s| s.turns > 0);
    trace!(target: GEN_TARGET, changed, seeds = seeds.len(), "corruption step");
    level.corruption = seeds;
    changed
}
