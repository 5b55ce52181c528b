//! The cell-by-cell trace loop

use hashbrown::HashSet;
use tracing::{debug, trace};

use super::affect::{ActorRef, BeamWorld, HitOutcome};
use super::bolt::{BeamResult, BeamStep, Bolt, Thrower};
use super::explode::explode;
use super::sink::{EffectSink, RealEffects, TracerSink, TracerStats};
use super::ui::BeamUi;
use super::walls::wall_change;
use crate::actor::Attitude;
use crate::config::BeamOptions;
use crate::consts::AUTOMATIC_HIT;
use crate::geom::{Ray, in_bounds};
use crate::logging::BEAM_TARGET;
use crate::rng::GameRng;

/// Fire `bolt` through the world
///
/// The sink decides whether this is a real shot or a tracer. The bolt's
/// range and to-hit are spent in place, so the caller can read what is
/// left afterwards.
pub fn fire(
    bolt: &mut Bolt,
    world: &mut BeamWorld<'_>,
    sink: &mut dyn EffectSink,
    ui: &mut dyn BeamUi,
    opts: &BeamOptions,
    rng: &mut GameRng,
) -> BeamResult {
    let mut result = BeamResult::new();
    let tracer = sink.is_tracer();
    let player_tracer = tracer && bolt.thrower == Thrower::Player;
    let mut prompted: HashSet<ActorRef> = HashSet::new();
    let mut ray = Ray::new(bolt.source, bolt.target);

    if ray.aimed_at_self() {
        if !bolt.stop_at_target() {
            if let Some(who) = world.actor_at(bolt.source) {
                sink.hit_actor(world, who, bolt, rng, &mut result);
            }
        }
    } else {
        while bolt.range > 0 {
            let pos = ray.advance();
            if !in_bounds(pos) {
                ray.regress();
                break;
            }

            let feature = world.level.feature(pos);
            let mut stop_here = false;
            if feature.is_solid() {
                let change = wall_change(feature, bolt);
                let cleared = match change {
                    Some(change) => sink.change_wall(world, pos, change, &mut result),
                    None => false,
                };
                if !cleared {
                    if bolt.flavour.bounces_off(feature) && bolt.bounces < opts.max_bounces {
                        if ray.bounce(|c| world.level.is_solid(c)) {
                            bolt.bounces += 1;
                            result.bounces += 1;
                            trace!(target: BEAM_TARGET, ?pos, bounces = bolt.bounces, "bounce");
                            continue;
                        }
                    } else {
                        ray.regress();
                    }
                    break;
                }
                stop_here = change.is_some_and(|c| c.stops_beam());
            }

            if !tracer {
                ui.draw_beam(pos, bolt.flavour);
            }
            if world.level.cloud_at(pos).is_some() && bolt.hit < AUTOMATIC_HIT {
                bolt.hit = (bolt.hit - opts.cloud_to_hit_penalty).max(0);
            }

            if bolt.stop_at_target() && pos == bolt.target {
                bolt.range -= 1;
                result.path.push(BeamStep { pos, range: bolt.range });
                break;
            }

            if let Some(who) = world.actor_at(pos) {
                if bolt.stop_at_target() {
                    // explodes on whoever it runs into
                    bolt.range -= 1;
                    result.path.push(BeamStep { pos, range: bolt.range });
                    break;
                }
                if player_tracer && !check_friendly_fire(world, who, bolt, ui, &mut prompted) {
                    sink.cancel();
                    result.cancelled = true;
                    result.path.push(BeamStep { pos, range: bolt.range });
                    break;
                }
                match sink.hit_actor(world, who, bolt, rng, &mut result) {
                    HitOutcome::Hit => {
                        let used = bolt.range_used_on_hit(player_tracer, rng);
                        bolt.range = (bolt.range - used).max(0);
                    }
                    HitOutcome::Blocked => stop_here = true,
                    HitOutcome::Missed | HitOutcome::Passed => {}
                }
            }

            bolt.range = (bolt.range - 1).max(0);
            result.path.push(BeamStep { pos, range: bolt.range });
            trace!(target: BEAM_TARGET, ?pos, range = bolt.range, "beam step");
            if stop_here {
                break;
            }
        }
    }

    let landing = ray.pos();
    result.landing = Some(landing);
    if (bolt.is_explosion || bolt.is_big_cloud) && !result.cancelled {
        explode(bolt, landing, world, sink, ui, opts, rng, &mut result);
    }

    if !tracer {
        for id in world.level.remove_dead() {
            if !result.killed.contains(&id) {
                result.killed.push(id);
            }
        }
    }
    result.tracer = sink.stats();
    debug!(
        target: BEAM_TARGET,
        bolt = %bolt.name,
        tracer,
        ?landing,
        steps = result.path.len(),
        bounces = result.bounces,
        killed = result.killed.len(),
        cancelled = result.cancelled,
        "beam resolved"
    );
    result
}

/// Prompt before a player tracer passes through a notable ally
///
/// Returns false when the player declines. Each ally is asked about once.
pub(super) fn check_friendly_fire(
    world: &BeamWorld<'_>,
    who: ActorRef,
    bolt: &Bolt,
    ui: &mut dyn BeamUi,
    prompted: &mut HashSet<ActorRef>,
) -> bool {
    if who == ActorRef::Player || bolt.flavour.is_beneficial() {
        return true;
    }
    let Some(actor) = world.actor(who) else {
        return true;
    };
    if actor.attitude() != Attitude::Friendly || !actor.is_notable() || !prompted.insert(who) {
        return true;
    }
    ui.confirm_fire_through(&actor.name())
}

/// A player shot, checked with a tracer first when configured
///
/// If the player declines to fire through an ally the real shot never
/// happens and the returned result is marked cancelled.
pub fn fire_player_shot(
    bolt: &mut Bolt,
    world: &mut BeamWorld<'_>,
    ui: &mut dyn BeamUi,
    opts: &BeamOptions,
    rng: &mut GameRng,
) -> BeamResult {
    if opts.check_friendly_fire {
        let mut probe = bolt.clone();
        let mut tracer_rng = rng.fork();
        let mut tracer = TracerSink::new();
        let check = fire(&mut probe, world, &mut tracer, ui, opts, &mut tracer_rng);
        if check.cancelled || check.tracer.aborted() {
            debug!(target: BEAM_TARGET, bolt = %bolt.name, "player shot cancelled");
            let mut result = BeamResult::new();
            result.tracer = check.tracer;
            result.cancelled = true;
            return result;
        }
    }
    fire(bolt, world, &mut RealEffects, ui, opts, rng)
}

/// Tracer statistics for an AI deciding whether to fire
pub fn trace_for_ai(
    bolt: &Bolt,
    world: &mut BeamWorld<'_>,
    ui: &mut dyn BeamUi,
    opts: &BeamOptions,
    rng: &mut GameRng,
) -> TracerStats {
    let mut probe = bolt.clone();
    let mut sink = TracerSink::new();
    fire(&mut probe, world, &mut sink, ui, opts, rng).tracer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{Attitude, MonsterSpec, Player};
    use crate::beam::attack::AttackKind;
    use crate::beam::ui::{NullUi, RecordingUi};
    use crate::dungeon::{Cloud, CloudKind, Feature, Level, LevelId};
    use crate::geom::Coord;

    fn arena() -> (Level, Player) {
        (
            Level::open(LevelId::main_dungeon(7)),
            Player::new(Coord::new(10, 10)),
        )
    }

    #[test]
    fn test_range_runs_out() {
        let (mut level, mut player) = arena();
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut bolt = Bolt::from_player(AttackKind::BoltOfCold, 10, Coord::new(10, 10), Coord::new(11, 10))
            .with_range(5);
        let result = fire(&mut bolt, &mut world, &mut RealEffects, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(1));
        assert_eq!(result.path.len(), 5);
        assert_eq!(result.landing, Some(Coord::new(15, 10)));
        assert_eq!(bolt.range, 0);
        let ranges: Vec<i32> = result.path.iter().map(|s| s.range).collect();
        assert_eq!(ranges, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_stops_before_wall() {
        let (mut level, mut player) = arena();
        level.set_feature(Coord::new(13, 10), Feature::StoneWall);
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut bolt = Bolt::from_player(AttackKind::BoltOfCold, 10, Coord::new(10, 10), Coord::new(20, 10));
        let result = fire(&mut bolt, &mut world, &mut RealEffects, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(2));
        assert_eq!(result.landing, Some(Coord::new(12, 10)));
        assert_eq!(result.path.len(), 2);
        assert_eq!(world.level.feature(Coord::new(13, 10)), Feature::StoneWall);
    }

    #[test]
    fn test_lightning_bounces() {
        let (mut level, mut player) = arena();
        level.set_feature(Coord::new(13, 10), Feature::StoneWall);
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut bolt = Bolt::from_player(AttackKind::LightningBolt, 10, Coord::new(10, 10), Coord::new(20, 10));
        let result = fire(&mut bolt, &mut world, &mut RealEffects, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(3));
        assert_eq!(result.bounces, 1);
        assert!(result.path.iter().any(|s| s.pos.x < 10));
    }

    #[test]
    fn test_walled_in_beam_does_nothing() {
        let (mut level, mut player) = arena();
        for c in Coord::new(10, 10).neighbours() {
            level.set_feature(c, Feature::MetalWall);
        }
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut bolt = Bolt::from_player(AttackKind::LightningBolt, 10, Coord::new(10, 10), Coord::new(20, 10));
        let result = fire(&mut bolt, &mut world, &mut RealEffects, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(4));
        assert!(result.path.is_empty());
        assert_eq!(result.landing, Some(Coord::new(10, 10)));
        assert!(result.damage.is_empty());
    }

    #[test]
    fn test_non_piercing_bolt_stops_on_hit() {
        let (mut level, mut player) = arena();
        let first = level.spawn_monster(&MonsterSpec::new("orc", 3), Coord::new(12, 10)).unwrap();
        let second = level.spawn_monster(&MonsterSpec::new("orc", 3), Coord::new(14, 10)).unwrap();
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut bolt = Bolt::from_player(AttackKind::MagicDart, 10, Coord::new(10, 10), Coord::new(14, 10));
        let result = fire(&mut bolt, &mut world, &mut RealEffects, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(5));
        assert_eq!(result.damage_to(ActorRef::Monster(first)).count(), 1);
        assert_eq!(result.damage_to(ActorRef::Monster(second)).count(), 0);
        assert_eq!(result.landing, Some(Coord::new(12, 10)));
    }

    #[test]
    fn test_cloud_lowers_to_hit() {
        let (mut level, mut player) = arena();
        level.add_cloud(Coord::new(11, 10), Cloud::new(CloudKind::Fog, 10));
        level.add_cloud(Coord::new(12, 10), Cloud::new(CloudKind::Fog, 10));
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut bolt = Bolt::from_player(AttackKind::BoltOfCold, 0, Coord::new(10, 10), Coord::new(20, 10));
        let before = bolt.hit;
        fire(&mut bolt, &mut world, &mut RealEffects, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(6));
        assert_eq!(bolt.hit, before - 4);
    }

    #[test]
    fn test_declined_prompt_cancels_shot() {
        let (mut level, mut player) = arena();
        let ally_spec = MonsterSpec::new("knight", 8).with_attitude(Attitude::Friendly).awake(true);
        let ally = level.spawn_monster(&ally_spec, Coord::new(12, 10)).unwrap();
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut ui = RecordingUi::answering(false);
        let mut bolt = Bolt::from_player(AttackKind::BoltOfFire, 10, Coord::new(10, 10), Coord::new(16, 10));
        let result = fire_player_shot(&mut bolt, &mut world, &mut ui, &BeamOptions::default(), &mut GameRng::new(7));
        assert!(result.cancelled);
        assert_eq!(result.tracer.friend.count, -1);
        assert_eq!(ui.prompts, vec!["the knight".to_string()]);
        assert_eq!(world.level.monster(ally).unwrap().hp, 40);
        assert!(ui.drawn.is_empty());
    }

    #[test]
    fn test_declined_prompt_for_ally_in_blast() {
        let (mut level, mut player) = arena();
        let ally_spec = MonsterSpec::new("knight", 8).with_attitude(Attitude::Friendly).awake(true);
        let ally = level.spawn_monster(&ally_spec, Coord::new(16, 11)).unwrap();
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut ui = RecordingUi::answering(false);
        let mut bolt = Bolt::from_player(AttackKind::Fireball, 10, Coord::new(10, 10), Coord::new(15, 10));
        let result = fire_player_shot(&mut bolt, &mut world, &mut ui, &BeamOptions::default(), &mut GameRng::new(9));
        assert!(result.cancelled);
        assert!(result.tracer.aborted());
        assert!(result.damage.is_empty());
        assert_eq!(ui.prompts, vec!["the knight".to_string()]);
        assert_eq!(world.level.monster(ally).unwrap().hp, 40);
        assert!(ui.explosion.is_empty());
    }

    #[test]
    fn test_accepted_prompt_for_ally_in_blast_fires() {
        let (mut level, mut player) = arena();
        let ally_spec = MonsterSpec::new("knight", 8).with_attitude(Attitude::Friendly).awake(true);
        let ally = level.spawn_monster(&ally_spec, Coord::new(16, 11)).unwrap();
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut ui = RecordingUi::answering(true);
        let mut bolt = Bolt::from_player(AttackKind::Fireball, 10, Coord::new(10, 10), Coord::new(15, 10));
        let result = fire_player_shot(&mut bolt, &mut world, &mut ui, &BeamOptions::default(), &mut GameRng::new(10));
        assert!(!result.cancelled);
        assert_eq!(ui.prompts.len(), 1);
        assert_eq!(result.damage_to(ActorRef::Monster(ally)).count(), 1);
    }

    #[test]
    fn test_ai_tracer_counts_without_harm() {
        let (mut level, mut player) = arena();
        let foe = level.spawn_monster(&MonsterSpec::new("orc", 3), Coord::new(14, 10)).unwrap();
        let mut world = BeamWorld::new(&mut level, &mut player);
        let bolt = Bolt::new(
            AttackKind::BoltOfFire,
            10,
            Coord::new(14, 10),
            Coord::new(8, 10),
            Thrower::Monster(foe),
            Attitude::Hostile,
        );
        let stats = trace_for_ai(&bolt, &mut world, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(8));
        // the orc's only target is the player
        assert_eq!(stats.foe.count, 1);
        assert_eq!(stats.friend.count, 0);
        assert_eq!(world.player.hp, 30);
    }

    #[test]
    fn test_aimed_at_feet() {
        let (mut level, mut player) = arena();
        player.hp = 1000;
        let mut world = BeamWorld::new(&mut level, &mut player);
        let mut bolt = Bolt::from_player(AttackKind::MagicDart, 10, Coord::new(10, 10), Coord::new(10, 10));
        let result = fire(&mut bolt, &mut world, &mut RealEffects, &mut NullUi, &BeamOptions::default(), &mut GameRng::new(9));
        assert_eq!(result.damage_to(ActorRef::Player).count(), 1);
        assert!(result.path.is_empty());
    }
}
