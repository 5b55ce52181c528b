//! Explosions and big clouds
//!
//! The blast shape is a cheapest-path flood from the epicentre: straight
//! steps cost less than turns, so the blast fills open rooms roundly but
//! only partly wraps around corners.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use super::affect::{ActorRef, BeamWorld, HitOutcome};
use super::bolt::{BeamResult, Bolt, Thrower};
use super::flavour::{ResistNote, flavoured_damage};
use super::sink::EffectSink;
use super::trace::check_friendly_fire;
use super::ui::BeamUi;
use crate::config::BeamOptions;
use crate::consts::MAX_EXPLOSION_RADIUS;
use crate::dungeon::{Cloud, Feature, Level};
use crate::geom::{COMPASS, Coord, in_bounds};
use crate::logging::BEAM_TARGET;
use crate::rng::GameRng;

const STRAIGHT_COST: i32 = 5;
const TURN_COST: i32 = 7;

fn blocks_explosion(f: Feature, statues_block: bool) -> bool {
    match f {
        Feature::Statue => statues_block,
        f => f.is_solid(),
    }
}

/// Cells an explosion of radius `radius` reaches, grouped by ring
///
/// `rings[d]` holds the cells at Chebyshev distance `d`; ring 0 is the
/// epicentre. The radius is capped at [`MAX_EXPLOSION_RADIUS`].
pub fn explosion_cells(level: &Level, centre: Coord, radius: i32, statues_block: bool) -> Vec<Vec<Coord>> {
    let r = radius.clamp(0, MAX_EXPLOSION_RADIUS);
    let mut best: HashMap<(Coord, Coord), i32> = HashMap::new();
    let mut reached: HashSet<Coord> = HashSet::new();
    let mut heap = BinaryHeap::new();
    heap.push(Reverse((0, centre, Coord::origin())));
    reached.insert(centre);

    while let Some(Reverse((cost, pos, dir))) = heap.pop() {
        if best.get(&(pos, dir)).is_some_and(|&b| b < cost) {
            continue;
        }
        for step in COMPASS {
            let next = pos + step;
            let offset = next - centre;
            if offset.rdist() > r || offset.abs() > r * (r + 1) || !in_bounds(next) {
                continue;
            }
            if blocks_explosion(level.feature(next), statues_block) {
                continue;
            }
            let add = if dir.is_origin() || dir == step {
                STRAIGHT_COST
            } else {
                TURN_COST
            };
            let total = cost + add;
            if total > 10 * r {
                continue;
            }
            if best.get(&(next, step)).is_some_and(|&b| b <= total) {
                continue;
            }
            best.insert((next, step), total);
            reached.insert(next);
            heap.push(Reverse((total, next, step)));
        }
    }

    let mut rings = vec![Vec::new(); r as usize + 1];
    for c in reached {
        rings[(c - centre).rdist() as usize].push(c);
    }
    for ring in &mut rings {
        ring.sort();
    }
    rings
}

/// Detonate `bolt` at `centre`
///
/// A resistance-only pre-pass marks and draws the cells whose occupant
/// would resist; the effect pass then affects each cell once, ring by ring.
#[allow(clippy::too_many_arguments)]
pub fn explode(
    bolt: &Bolt,
    centre: Coord,
    world: &mut BeamWorld<'_>,
    sink: &mut dyn EffectSink,
    ui: &mut dyn BeamUi,
    opts: &BeamOptions,
    rng: &mut GameRng,
    result: &mut BeamResult,
) {
    let rings = explosion_cells(world.level, centre, bolt.ex_size, opts.statues_block_explosions);
    let cells: Vec<Coord> = rings
        .iter()
        .flatten()
        .copied()
        .filter(|&c| !(bolt.hole_in_middle && c == centre))
        .collect();

    let mut resisted = HashSet::new();
    for &c in &cells {
        let Some(actor) = world.actor_at(c).and_then(|who| world.actor(who)) else {
            continue;
        };
        let (_, note) = flavoured_damage(actor, bolt.flavour, bolt.dice.max());
        if matches!(note, ResistNote::Resisted | ResistNote::Immune) {
            resisted.insert(c);
        }
    }

    if !sink.is_tracer() {
        ui.flash(bolt.flavour);
        for &c in &cells {
            ui.draw_explosion_cell(c, bolt.flavour, resisted.contains(&c));
        }
    }

    let player_tracer = sink.is_tracer() && bolt.thrower == Thrower::Player;
    let mut prompted: HashSet<ActorRef> = HashSet::new();
    let mut affected: HashSet<ActorRef> = HashSet::new();
    for &c in &cells {
        result.explosion.push(c);
        if resisted.contains(&c) {
            result.resisted.push(c);
        }
        // an actor teleported within the blast is only hit once
        if let Some(who) = world.actor_at(c) {
            if player_tracer && !check_friendly_fire(world, who, bolt, ui, &mut prompted) {
                sink.cancel();
                result.cancelled = true;
                break;
            }
            if !affected.contains(&who)
                && sink.hit_actor(world, who, bolt, rng, result) != HitOutcome::Passed
            {
                affected.insert(who);
            }
        }
        if bolt.is_big_cloud && !sink.is_tracer() {
            if let Some(kind) = bolt.flavour.cloud() {
                world.level.add_cloud(c, Cloud::new(kind, 5 + rng.rn2(bolt.power / 10 + 5)));
            }
        }
    }
    debug!(
        target: BEAM_TARGET,
        ?centre,
        radius = bolt.ex_size,
        cells = cells.len(),
        resisted = resisted.len(),
        "explosion"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::LevelId;

    fn open_level() -> Level {
        Level::open(LevelId::main_dungeon(5))
    }

    #[test]
    fn test_radius_one_is_three_by_three() {
        let level = open_level();
        let centre = Coord::new(30, 30);
        let rings = explosion_cells(&level, centre, 1, true);
        assert_eq!(rings[0], vec![centre]);
        assert_eq!(rings[1].len(), 8);
    }

    #[test]
    fn test_shape_is_rounded() {
        let level = open_level();
        let centre = Coord::new(30, 30);
        let rings = explosion_cells(&level, centre, 3, true);
        let all: HashSet<Coord> = rings.iter().flatten().copied().collect();
        assert!(all.contains(&(centre + Coord::new(3, 0))));
        assert!(all.contains(&(centre + Coord::new(2, 2))));
        // corners are cut off
        assert!(!all.contains(&(centre + Coord::new(3, 3))));
    }

    #[test]
    fn test_walls_block() {
        let mut level = open_level();
        let centre = Coord::new(30, 30);
        for y in 20..40 {
            level.set_feature(Coord::new(31, y), Feature::StoneWall);
        }
        let rings = explosion_cells(&level, centre, 3, true);
        assert!(rings.iter().flatten().all(|c| c.x <= 30));
    }

    #[test]
    fn test_statue_policy() {
        let mut level = open_level();
        let centre = Coord::new(30, 30);
        let statue = centre + Coord::new(1, 0);
        level.set_feature(statue, Feature::Statue);
        let blocked = explosion_cells(&level, centre, 1, true);
        assert!(!blocked[1].contains(&statue));
        let open = explosion_cells(&level, centre, 1, false);
        assert!(open[1].contains(&statue));
    }

    #[test]
    fn test_hole_in_middle_spares_the_centre() {
        use crate::actor::{MonsterSpec, Player};
        use crate::beam::attack::AttackKind;
        use crate::beam::sink::RealEffects;
        use crate::beam::ui::RecordingUi;

        let mut level = open_level();
        let centre = Coord::new(30, 30);
        let middle = level.spawn_monster(&MonsterSpec::new("ogre", 6), centre).unwrap();
        let mut player = Player::new(Coord::new(10, 10));
        let mut world = BeamWorld::new(&mut level, &mut player);
        let bolt = Bolt::from_player(AttackKind::MephiticCloud, 20, Coord::new(25, 30), centre)
            .with_ex_size(1)
            .with_hole_in_middle();
        let mut ui = RecordingUi::default();
        let mut result = BeamResult::new();
        explode(
            &bolt,
            centre,
            &mut world,
            &mut RealEffects,
            &mut ui,
            &BeamOptions::default(),
            &mut GameRng::new(9),
            &mut result,
        );
        assert_eq!(result.explosion.len(), 8);
        assert!(!result.explosion.contains(&centre));
        assert_eq!(result.damage_to(ActorRef::Monster(middle)).count(), 0);
        assert_eq!(ui.explosion.len(), 8);
        assert!(world.level.cloud_at(centre + Coord::new(1, 0)).is_some());
        assert!(world.level.cloud_at(centre).is_none());
    }

    #[test]
    fn test_radius_is_capped() {
        let level = open_level();
        let centre = Coord::new(40, 35);
        let rings = explosion_cells(&level, centre, 50, true);
        assert_eq!(rings.len() as i32, MAX_EXPLOSION_RADIUS + 1);
        assert!(rings.iter().flatten().all(|c| (*c - centre).rdist() <= MAX_EXPLOSION_RADIUS));
    }
}
