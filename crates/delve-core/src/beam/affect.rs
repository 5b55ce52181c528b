//! Resolving a bolt against whoever stands in a cell

use tracing::debug;

use super::bolt::{Bolt, BeamResult, DamageRecord};
use super::corrosion::{CorrosionOutcome, corrode_random_item};
use super::flavour::{Flavour, ResistNote, flavoured_damage};
use crate::actor::{Actor, MR_IMMUNE, MonsterId, MonsterSpec, Player, ResistKind, Status};
use crate::dungeon::Level;
use crate::geom::Coord;
use crate::logging::BEAM_TARGET;
use crate::rng::GameRng;

/// Handle to an actor in a [`BeamWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorRef {
    Player,
    Monster(MonsterId),
}

/// Everything a beam can touch
pub struct BeamWorld<'a> {
    pub level: &'a mut Level,
    pub player: &'a mut Player,
}

impl<'a> BeamWorld<'a> {
    pub fn new(level: &'a mut Level, player: &'a mut Player) -> Self {
        Self { level, player }
    }

    /// The living actor standing on `c`
    pub fn actor_at(&self, c: Coord) -> Option<ActorRef> {
        if self.player.pos == c && self.player.is_alive() {
            return Some(ActorRef::Player);
        }
        self.level.monster_at(c).map(|m| ActorRef::Monster(m.id))
    }

    pub fn actor(&self, who: ActorRef) -> Option<&dyn Actor> {
        match who {
            ActorRef::Player => Some(&*self.player as &dyn Actor),
            ActorRef::Monster(id) => self.level.monster(id).map(|m| m as &dyn Actor),
        }
    }

    pub fn actor_mut(&mut self, who: ActorRef) -> Option<&mut dyn Actor> {
        match who {
            ActorRef::Player => Some(&mut *self.player as &mut dyn Actor),
            ActorRef::Monster(id) => self.level.monster_mut(id).map(|m| m as &mut dyn Actor),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitRoll {
    Hit,
    Miss,
    /// Stopped by a shield; ends the bolt
    Blocked,
}

/// Outcome of affecting one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Nothing there the bolt interacts with
    Passed,
    Missed,
    Blocked,
    Hit,
}

/// Roll the bolt's to-hit against a defender
pub fn roll_to_hit(target: &dyn Actor, bolt: &Bolt, rng: &mut GameRng) -> HitRoll {
    if bolt.auto_hits() {
        return HitRoll::Hit;
    }
    let block = target.shield_block_chance();
    if block > 0 && rng.rn2(100) < block {
        return HitRoll::Blocked;
    }
    let mut attack = bolt.hit;
    match target.missile_deflection() {
        0 => {}
        1 => {
            attack = if bolt.is_missile {
                rng.rn2(attack)
            } else {
                attack - rng.rn2(attack / 2)
            };
        }
        _ => {
            attack = if bolt.is_missile {
                rng.rn2(attack / 2)
            } else {
                rng.rn2(attack * 2) / 3
            };
        }
    }
    if rng.rn2(attack) >= rng.random2avg(target.evasion(), 2) {
        HitRoll::Hit
    } else {
        HitRoll::Miss
    }
}

/// Diminishing returns on enchantment power
pub fn stepdown(power: i32) -> i32 {
    let p = f64::from(power.max(0));
    (30.0 * (1.0 + p / 30.0).ln()).round() as i32
}

/// Whether the target shrugs off an enchantment
pub fn resists_enchantment(target: &dyn Actor, power: i32, rng: &mut GameRng) -> bool {
    let mr = target.magic_resistance();
    if mr >= MR_IMMUNE {
        return true;
    }
    rng.rn2(100) + rng.rn2(101) < 100 + mr - stepdown(power)
}

fn cap(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "You are" or "The orc is"
fn is_phrase(target: &dyn Actor) -> String {
    if target.is_player() {
        "You are".to_string()
    } else {
        format!("{} is", cap(&target.name()))
    }
}

fn resist_message(target: &dyn Actor, flavour: Flavour, note: ResistNote) -> Option<String> {
    let who = cap(&target.name());
    match note {
        ResistNote::None => None,
        ResistNote::Immune => Some(if target.is_player() {
            "You are unaffected.".to_string()
        } else {
            format!("{who} is unaffected.")
        }),
        ResistNote::Resisted => Some(match (flavour, target.is_player()) {
            (Flavour::Holy, false) => format!("{who} shrugs off the holy light."),
            (_, true) => "You resist.".to_string(),
            (_, false) => format!("{who} resists."),
        }),
        ResistNote::Vulnerable => {
            let how = match flavour {
                Flavour::Fire | Flavour::Lava => "burned terribly",
                Flavour::Cold | Flavour::Ice => "frozen to the bone",
                Flavour::Electricity => "electrocuted",
                Flavour::Poison => "badly poisoned",
                Flavour::Acid => "eaten away",
                Flavour::Holy => "seared by the light",
                _ => "badly hurt",
            };
            Some(format!("{} {how}!", is_phrase(target)))
        }
    }
}

fn status_turns(bolt: &Bolt, rng: &mut GameRng) -> i32 {
    3 + rng.rn2(bolt.power / 10 + 4)
}

/// Resolve a real (non-tracer) hit attempt on `who`
pub fn affect_actor(
    world: &mut BeamWorld<'_>,
    who: ActorRef,
    bolt: &Bolt,
    rng: &mut GameRng,
    result: &mut BeamResult,
) -> HitOutcome {
    let Some(target) = world.actor(who) else {
        return HitOutcome::Passed;
    };
    if target.is_submerged() && bolt.flavour != Flavour::Electricity {
        return HitOutcome::Passed;
    }
    let name = target.name();
    let pos = target.pos();
    match roll_to_hit(target, bolt, rng) {
        HitRoll::Miss => {
            result.message(format!("The {} misses {name}.", bolt.name));
            return HitOutcome::Missed;
        }
        HitRoll::Blocked => {
            let msg = if target.is_player() {
                format!("You block the {}.", bolt.name)
            } else {
                format!("{} blocks the {}.", cap(&name), bolt.name)
            };
            result.message(msg);
            return HitOutcome::Blocked;
        }
        HitRoll::Hit => {}
    }

    if bolt.flavour.has_saving_throw() && resists_enchantment(target, bolt.power, rng) {
        let msg = if target.is_player() {
            "You resist.".to_string()
        } else {
            format!("{} resists.", cap(&name))
        };
        result.message(msg);
        return HitOutcome::Hit;
    }

    if bolt.flavour.is_enchantment() && bolt.flavour != Flavour::PainAgony {
        enchant(world, who, bolt, rng, result);
    } else {
        damage(world, who, pos, bolt, rng, result);
    }
    HitOutcome::Hit
}

fn damage(
    world: &mut BeamWorld<'_>,
    who: ActorRef,
    pos: Coord,
    bolt: &Bolt,
    rng: &mut GameRng,
    result: &mut BeamResult,
) {
    let Some(target) = world.actor_mut(who) else {
        return;
    };
    let mut raw = bolt.dice.roll(rng);
    if !bolt.flavour.ignores_ac() {
        raw = (raw - rng.rn2(1 + target.armour_class())).max(0);
    }
    let (amount, note) = flavoured_damage(&*target, bolt.flavour, raw);

    let name = target.name();
    if bolt.is_explosion || bolt.is_big_cloud {
        result.message(format!("{} caught in the {}.", is_phrase(&*target), bolt.name));
    } else {
        result.message(format!("The {} hits {name}.", bolt.name));
    }
    if let Some(msg) = resist_message(&*target, bolt.flavour, note) {
        result.message(msg);
    }

    let killed = target.apply_damage(amount);
    result.damage.push(DamageRecord {
        target: who,
        pos,
        amount,
        flavour: bolt.flavour,
        note,
    });
    debug!(target: BEAM_TARGET, ?pos, amount, flavour = %bolt.flavour, killed, "damage applied");

    if killed {
        match who {
            ActorRef::Player => {
                result.player_died = true;
                result.message("You die...");
            }
            ActorRef::Monster(id) => {
                result.killed.push(id);
                result.message(format!("{} is killed!", cap(&name)));
            }
        }
        return;
    }

    match bolt.flavour {
        Flavour::Poison if amount > 0 && target.resist(ResistKind::Poison) < 1 => {
            target.apply_status(Status::Poisoned, 1 + rng.rn2(bolt.power / 10 + 3));
            let msg = if target.is_player() {
                "You are poisoned.".to_string()
            } else {
                format!("{} looks sick.", cap(&name))
            };
            result.message(msg);
        }
        Flavour::Negative if target.resist(ResistKind::Negative) < 3 && rng.one_in(5) => {
            let loss = (target.max_hp() / 10).max(1);
            target.drain(1, loss);
            let msg = if target.is_player() {
                "You feel drained.".to_string()
            } else {
                format!("{} is drained.", cap(&name))
            };
            result.message(msg);
        }
        Flavour::Acid if target.is_player() => {
            let resists = target.res_corrosion();
            let items = target.carried_items_mut();
            if let Some((idx, CorrosionOutcome::Corroded { .. })) =
                corrode_random_item(items, raw, resists, rng)
            {
                let item = items[idx].name.clone();
                result.message(format!("Your {item} corrodes!"));
            }
        }
        _ => {}
    }
}

fn enchant(
    world: &mut BeamWorld<'_>,
    who: ActorRef,
    bolt: &Bolt,
    rng: &mut GameRng,
    result: &mut BeamResult,
) {
    let turns = status_turns(bolt, rng);
    match bolt.flavour {
        Flavour::Teleport => {
            teleport(world, who, rng, result);
            return;
        }
        Flavour::Banish => {
            banish(world, who, result);
            return;
        }
        Flavour::Polymorph => {
            polymorph(world, who, rng, result);
            return;
        }
        _ => {}
    }

    let Some(target) = world.actor_mut(who) else {
        return;
    };
    let is = is_phrase(&*target);
    let msg = match bolt.flavour {
        Flavour::Slow => {
            if target.remove_status(Status::Hasted) {
                Some(format!("{is} no longer moving quickly."))
            } else {
                target.apply_status(Status::Slowed, turns);
                Some(format!("{is} slowed."))
            }
        }
        Flavour::Haste => {
            if target.remove_status(Status::Slowed) {
                Some(format!("{is} no longer slow."))
            } else {
                target.apply_status(Status::Hasted, turns);
                Some(format!("{is} moving quickly."))
            }
        }
        Flavour::Paralysis => {
            target.apply_status(Status::Paralysed, turns);
            Some(format!("{is} paralysed."))
        }
        Flavour::Confusion => {
            target.apply_status(Status::Confused, turns);
            Some(format!("{is} confused."))
        }
        Flavour::Sleep => {
            target.apply_status(Status::Asleep, turns);
            Some(format!("{is} put to sleep."))
        }
        Flavour::Petrify => {
            if target.has_status(Status::Petrified) {
                None
            } else if target.remove_status(Status::Petrifying) {
                target.apply_status(Status::Petrified, turns * 2);
                Some(format!("{is} turned to stone!"))
            } else {
                target.apply_status(Status::Petrifying, 2);
                Some(format!("{is} slowing down."))
            }
        }
        _ => None,
    };
    if let Some(msg) = msg {
        result.message(msg);
    }
}

fn teleport(world: &mut BeamWorld<'_>, who: ActorRef, rng: &mut GameRng, result: &mut BeamResult) {
    let player_pos = world.player.pos;
    let dest = world
        .level
        .random_cell_where(rng, |level, c| level.can_hold_monster(c) && c != player_pos);
    let Some(dest) = dest else {
        return;
    };
    if let Some(target) = world.actor_mut(who) {
        let msg = if target.is_player() {
            "You feel yourself yanked away!".to_string()
        } else {
            format!("{} disappears!", cap(&target.name()))
        };
        target.move_to(dest);
        result.message(msg);
    }
}

fn banish(world: &mut BeamWorld<'_>, who: ActorRef, result: &mut BeamResult) {
    match who {
        ActorRef::Player => {
            result.player_banished = true;
            result.message("You are cast into the Abyss!");
        }
        ActorRef::Monster(id) => {
            let Some(name) = world.level.monster(id).map(|m| m.name()) else {
                return;
            };
            world.level.monsters.retain(|m| m.id != id);
            result.banished.push(id);
            result.message(format!("{} is banished!", cap(&name)));
        }
    }
}

fn polymorph(world: &mut BeamWorld<'_>, who: ActorRef, rng: &mut GameRng, result: &mut BeamResult) {
    match who {
        ActorRef::Player => result.message("You feel momentarily different."),
        ActorRef::Monster(id) => {
            let depth = world.level.id.absolute_depth();
            let spec = MonsterSpec::random_for_depth(depth, rng);
            if let Some(m) = world.level.monster_mut(id) {
                let old = m.name();
                m.polymorph_into(&spec);
                result.message(format!("{} turns into {}!", cap(&old), m.name()));
            }
        }
    }
}
