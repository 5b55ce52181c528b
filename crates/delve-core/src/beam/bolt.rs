//! Bolt state and the per-shot report

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::affect::ActorRef;
use super::attack::{AttackKind, Dice};
use super::flavour::{Flavour, ResistNote};
use super::sink::TracerStats;
use crate::actor::{Attitude, MonsterId};
use crate::consts::{AUTOMATIC_HIT, BEAM_STOP, MAX_EXPLOSION_RADIUS};
use crate::geom::Coord;
use crate::rng::GameRng;

/// Who fired a bolt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Thrower {
    Player,
    Monster(MonsterId),
}

/// A bolt in flight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bolt {
    pub kind: AttackKind,
    pub name: String,
    pub flavour: Flavour,
    pub source: Coord,
    pub target: Coord,
    /// Cells left to travel
    pub range: i32,
    pub initial_range: i32,
    pub dice: Dice,
    /// To-hit; lowered by clouds along the way
    pub hit: i32,
    pub power: i32,
    pub is_beam: bool,
    pub is_explosion: bool,
    pub is_big_cloud: bool,
    pub is_missile: bool,
    pub ex_size: i32,
    /// Explosion skips its own epicentre
    pub hole_in_middle: bool,
    pub thrower: Thrower,
    /// Side of the thrower, used to bucket tracer hits
    pub attitude: Attitude,
    pub bounces: u32,
}

impl Bolt {
    /// Set a bolt up from the attack table
    pub fn new(
        kind: AttackKind,
        power: i32,
        source: Coord,
        target: Coord,
        thrower: Thrower,
        attitude: Attitude,
    ) -> Self {
        let spec = kind.spec();
        Self {
            kind,
            name: spec.name.to_string(),
            flavour: spec.flavour,
            source,
            target,
            range: spec.range,
            initial_range: spec.range,
            dice: spec.dice(power),
            hit: spec.to_hit(power),
            power,
            is_beam: spec.is_beam,
            is_explosion: spec.is_explosion,
            is_big_cloud: spec.is_big_cloud,
            is_missile: spec.is_missile,
            ex_size: spec.ex_size.min(MAX_EXPLOSION_RADIUS),
            hole_in_middle: false,
            thrower,
            attitude,
            bounces: 0,
        }
    }

    /// Player-fired bolt
    pub fn from_player(kind: AttackKind, power: i32, source: Coord, target: Coord) -> Self {
        Self::new(kind, power, source, target, Thrower::Player, Attitude::Friendly)
    }

    pub fn with_range(mut self, range: i32) -> Self {
        self.range = range.max(0);
        self.initial_range = self.range;
        self
    }

    pub fn with_ex_size(mut self, ex_size: i32) -> Self {
        self.ex_size = ex_size.clamp(0, MAX_EXPLOSION_RADIUS);
        self
    }

    pub fn with_hole_in_middle(mut self) -> Self {
        self.hole_in_middle = true;
        self
    }

    /// Ends the path on the aimed cell so that cell becomes the epicentre
    pub fn stop_at_target(&self) -> bool {
        self.is_explosion || self.is_big_cloud
    }

    pub fn auto_hits(&self) -> bool {
        self.is_explosion || self.is_big_cloud || self.hit >= AUTOMATIC_HIT
    }

    /// Range spent when the bolt hits something
    ///
    /// Non-piercing bolts stop. A player tracer that would stop on a roll
    /// it might miss assumes the miss and keeps going.
    pub fn range_used_on_hit(&self, player_tracer: bool, rng: &mut GameRng) -> i32 {
        let used = if !self.is_beam {
            BEAM_STOP
        } else if self.flavour.is_enchantment() {
            if self.flavour == Flavour::Digging {
                0
            } else {
                BEAM_STOP
            }
        } else if self.flavour == Flavour::Hellfire {
            0
        } else if self.is_explosion || self.is_big_cloud {
            BEAM_STOP
        } else {
            match self.flavour {
                Flavour::Acid => BEAM_STOP,
                Flavour::Lava => 1,
                Flavour::Electricity => 0,
                _ => 2 + rng.rn2(3),
            }
        };
        if player_tracer && used >= BEAM_STOP && self.hit < AUTOMATIC_HIT {
            1
        } else {
            used
        }
    }
}

/// One cell of the travelled path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeamStep {
    pub pos: Coord,
    /// Range left after this cell
    pub range: i32,
}

/// One damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRecord {
    pub target: ActorRef,
    pub pos: Coord,
    pub amount: i32,
    pub flavour: Flavour,
    pub note: ResistNote,
}

/// Result of firing a bolt
#[derive(Debug, Clone)]
pub struct BeamResult {
    /// Messages to display, each at most once
    pub messages: Vec<String>,
    pub path: Vec<BeamStep>,
    pub damage: Vec<DamageRecord>,
    /// Monsters that died
    pub killed: Vec<MonsterId>,
    pub player_died: bool,
    /// Monsters sent away by banishment
    pub banished: Vec<MonsterId>,
    pub player_banished: bool,
    /// Cells the explosion reached, in ring order
    pub explosion: Vec<Coord>,
    /// Cells whose occupant resisted the explosion
    pub resisted: Vec<Coord>,
    pub bounces: u32,
    pub tracer: TracerStats,
    /// The player declined to fire through an ally
    pub cancelled: bool,
    /// Where the bolt came to rest
    pub landing: Option<Coord>,
    seen: HashSet<String>,
}

impl BeamResult {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            path: Vec::new(),
            damage: Vec::new(),
            killed: Vec::new(),
            player_died: false,
            banished: Vec::new(),
            player_banished: false,
            explosion: Vec::new(),
            resisted: Vec::new(),
            bounces: 0,
            tracer: TracerStats::default(),
            cancelled: false,
            landing: None,
            seen: HashSet::new(),
        }
    }

    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message(msg);
        self
    }

    /// Add a message unless the same text was already shown this shot
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        if self.seen.insert(msg.clone()) {
            self.messages.push(msg);
        }
    }

    pub fn total_damage(&self) -> i32 {
        self.damage.iter().map(|d| d.amount).sum()
    }

    pub fn damage_to(&self, target: ActorRef) -> impl Iterator<Item = &DamageRecord> {
        self.damage.iter().filter(move |d| d.target == target)
    }
}

impl Default for BeamResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bolt(kind: AttackKind) -> Bolt {
        Bolt::from_player(kind, 20, Coord::new(5, 5), Coord::new(10, 5))
    }

    #[test]
    fn test_range_cost_table() {
        let mut rng = GameRng::new(3);
        assert_eq!(bolt(AttackKind::MagicDart).range_used_on_hit(false, &mut rng), BEAM_STOP);
        assert_eq!(bolt(AttackKind::Slow).range_used_on_hit(false, &mut rng), BEAM_STOP);
        assert_eq!(bolt(AttackKind::Dig).range_used_on_hit(false, &mut rng), 0);
        assert_eq!(bolt(AttackKind::HellfireBolt).range_used_on_hit(false, &mut rng), 0);
        assert_eq!(bolt(AttackKind::Fireball).range_used_on_hit(false, &mut rng), BEAM_STOP);
        assert_eq!(bolt(AttackKind::CorrosiveBolt).range_used_on_hit(false, &mut rng), BEAM_STOP);
        assert_eq!(bolt(AttackKind::BoltOfMagma).range_used_on_hit(false, &mut rng), 1);
        assert_eq!(bolt(AttackKind::LightningBolt).range_used_on_hit(false, &mut rng), 0);
        for _ in 0..50 {
            let used = bolt(AttackKind::BoltOfFire).range_used_on_hit(false, &mut rng);
            assert!((2..=4).contains(&used));
        }
    }

    #[test]
    fn test_player_tracer_assumes_miss() {
        let mut rng = GameRng::new(4);
        let mut acid = bolt(AttackKind::CorrosiveBolt);
        assert_eq!(acid.range_used_on_hit(true, &mut rng), 1);
        // automatic hits still stop the tracer
        acid.hit = AUTOMATIC_HIT;
        assert_eq!(acid.range_used_on_hit(true, &mut rng), BEAM_STOP);
    }

    #[test]
    fn test_stop_at_target() {
        assert!(bolt(AttackKind::Fireball).stop_at_target());
        assert!(bolt(AttackKind::MephiticCloud).stop_at_target());
        assert!(!bolt(AttackKind::BoltOfCold).stop_at_target());
    }

    #[test]
    fn test_messages_are_deduped() {
        let mut result = BeamResult::new().with_message("You hear a grinding noise.");
        result.message("You hear a grinding noise.");
        result.message("The wall is blasted away!");
        assert_eq!(result.messages.len(), 2);
    }

    #[test]
    fn test_ex_size_capped() {
        let b = bolt(AttackKind::Fireball).with_ex_size(40);
        assert_eq!(b.ex_size, MAX_EXPLOSION_RADIUS);
    }
}
