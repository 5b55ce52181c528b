//! Effect sinks: real effects, or statistics for a tracer
//!
//! The trace loop is the same for real shots and tracers; only the sink
//! decides whether anything actually happens.

use serde::{Deserialize, Serialize};

use super::affect::{ActorRef, BeamWorld, HitOutcome, affect_actor};
use super::bolt::{BeamResult, Bolt};
use super::flavour::flavoured_damage;
use super::walls::{WallChange, apply_wall_change};
use crate::geom::Coord;
use crate::rng::GameRng;

/// Targets and summed hit dice on one side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TracerCount {
    /// -1 once the player aborted the shot
    pub count: i32,
    pub power: i32,
}

/// What a tracer would hit, split by side relative to the thrower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TracerStats {
    pub friend: TracerCount,
    pub foe: TracerCount,
}

impl TracerStats {
    /// The player refused to fire through an ally
    pub fn aborted(&self) -> bool {
        self.friend.count < 0
    }

    /// Hits some foe and no friend
    pub fn is_clean_shot(&self) -> bool {
        !self.aborted() && self.foe.count > 0 && self.friend.count == 0
    }
}

pub trait EffectSink {
    fn is_tracer(&self) -> bool;

    /// Resolve the bolt against an actor in its path
    fn hit_actor(
        &mut self,
        world: &mut BeamWorld<'_>,
        target: ActorRef,
        bolt: &Bolt,
        rng: &mut GameRng,
        result: &mut BeamResult,
    ) -> HitOutcome;

    /// Change a solid cell; true if it no longer blocks the bolt
    fn change_wall(
        &mut self,
        world: &mut BeamWorld<'_>,
        pos: Coord,
        change: WallChange,
        result: &mut BeamResult,
    ) -> bool;

    /// Abort the shot
    fn cancel(&mut self) {}

    fn stats(&self) -> TracerStats {
        TracerStats::default()
    }
}

/// Applies damage, statuses and terrain changes
#[derive(Debug, Clone, Copy, Default)]
pub struct RealEffects;

impl EffectSink for RealEffects {
    fn is_tracer(&self) -> bool {
        false
    }

    fn hit_actor(
        &mut self,
        world: &mut BeamWorld<'_>,
        target: ActorRef,
        bolt: &Bolt,
        rng: &mut GameRng,
        result: &mut BeamResult,
    ) -> HitOutcome {
        affect_actor(world, target, bolt, rng, result)
    }

    fn change_wall(
        &mut self,
        world: &mut BeamWorld<'_>,
        pos: Coord,
        change: WallChange,
        result: &mut BeamResult,
    ) -> bool {
        apply_wall_change(world.level, pos, change, result);
        true
    }
}

/// Counts who would be hit without touching anything
#[derive(Debug, Clone, Copy, Default)]
pub struct TracerSink {
    pub stats: TracerStats,
}

impl TracerSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EffectSink for TracerSink {
    fn is_tracer(&self) -> bool {
        true
    }

    fn hit_actor(
        &mut self,
        world: &mut BeamWorld<'_>,
        target: ActorRef,
        bolt: &Bolt,
        _rng: &mut GameRng,
        _result: &mut BeamResult,
    ) -> HitOutcome {
        let Some(actor) = world.actor(target) else {
            return HitOutcome::Passed;
        };
        if actor.is_submerged() {
            return HitOutcome::Passed;
        }
        // immune targets are not worth counting either way
        if !bolt.flavour.is_enchantment() && bolt.dice.max() > 0 {
            let (dmg, _) = flavoured_damage(actor, bolt.flavour, bolt.dice.max());
            if dmg == 0 {
                return HitOutcome::Hit;
            }
        }
        if self.stats.aborted() {
            return HitOutcome::Hit;
        }
        let bucket = if actor.attitude().aligned_with(bolt.attitude) {
            &mut self.stats.friend
        } else {
            &mut self.stats.foe
        };
        bucket.count += 1;
        bucket.power += actor.hit_dice();
        HitOutcome::Hit
    }

    fn change_wall(
        &mut self,
        _world: &mut BeamWorld<'_>,
        _pos: Coord,
        _change: WallChange,
        _result: &mut BeamResult,
    ) -> bool {
        true
    }

    fn cancel(&mut self) {
        self.stats.friend.count = -1;
    }

    fn stats(&self) -> TracerStats {
        self.stats
    }
}
