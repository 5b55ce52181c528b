//! Whole-shot scenarios run through the public beam API

use delve_core::actor::{Attitude, MonsterSpec, Player};
use delve_core::beam::{
    ActorRef, AttackKind, BeamWorld, Bolt, CorrosionOutcome, NullUi, RealEffects, RecordingUi,
    TracerSink, corrode_item, explosion_cells, fire,
};
use delve_core::dungeon::{Feature, Level, LevelId};
use delve_core::geom::{Coord, Rect};
use delve_core::item::{Item, ItemClass, ItemId, ItemSpec};
use delve_core::{BeamOptions, GameRng};

fn arena() -> (Level, Player) {
    (
        Level::open(LevelId::main_dungeon(9)),
        Player::new(Coord::new(10, 10)),
    )
}

#[test]
fn test_digging_tunnels_through_rock() {
    let (mut level, mut player) = arena();
    for x in 12..15 {
        level.set_feature(Coord::new(x, 10), Feature::RockWall);
    }
    let mut world = BeamWorld::new(&mut level, &mut player);
    let mut bolt = Bolt::from_player(AttackKind::Dig, 10, Coord::new(10, 10), Coord::new(20, 10));
    let initial = bolt.range;
    let result = fire(
        &mut bolt,
        &mut world,
        &mut RealEffects,
        &mut NullUi,
        &BeamOptions::default(),
        &mut GameRng::new(40),
    );

    for x in 12..15 {
        assert_eq!(world.level.feature(Coord::new(x, 10)), Feature::Floor, "x = {x}");
    }
    assert_eq!(bolt.range, 0);
    assert_eq!(result.path.len() as i32, initial);
    let grinding = result
        .messages
        .iter()
        .filter(|m| *m == "You hear a grinding noise.")
        .count();
    assert_eq!(grinding, 1);
}

#[test]
fn test_fireball_hits_each_neighbour_once() {
    let (mut level, mut player) = arena();
    let centre = Coord::new(15, 10);
    let orc = level
        .spawn_monster(&MonsterSpec::new("orc", 20), Coord::new(16, 11))
        .expect("room for the orc");
    let mut world = BeamWorld::new(&mut level, &mut player);
    let mut bolt = Bolt::from_player(AttackKind::Fireball, 10, Coord::new(10, 10), centre);
    assert_eq!(bolt.ex_size, 1);
    let result = fire(
        &mut bolt,
        &mut world,
        &mut RealEffects,
        &mut NullUi,
        &BeamOptions::default(),
        &mut GameRng::new(41),
    );

    assert_eq!(result.landing, Some(centre));
    assert_eq!(result.damage_to(ActorRef::Monster(orc)).count(), 1);
    assert_eq!(result.damage_to(ActorRef::Player).count(), 0);
    assert_eq!(result.explosion.len(), 9);
    assert!(result.explosion.iter().all(|c| (*c - centre).rdist() <= 1));
}

#[test]
fn test_explosion_stops_at_room_walls() {
    let mut level = Level::new(LevelId::main_dungeon(3));
    level
        .grid
        .fill_rect(Rect::new(Coord::new(20, 20), Coord::new(22, 22)), Feature::Floor);
    let rings = explosion_cells(&level, Coord::new(21, 21), 3, true);
    let count: usize = rings.iter().map(Vec::len).sum();
    assert_eq!(count, 9);
}

#[test]
fn test_pristine_items_resist_acid_six_percent_of_the_time() {
    let mut rng = GameRng::new(42);
    let spec = ItemSpec::new(ItemClass::Armour, "ring mail");
    let trials = 10_000;
    let mut resisted = 0;
    for i in 0..trials {
        let mut item = Item::from_spec(ItemId(i), &spec, None);
        match corrode_item(&mut item, 15, false, &mut rng) {
            CorrosionOutcome::Resisted => resisted += 1,
            CorrosionOutcome::Corroded { rust } => assert_eq!(rust, -1),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    let rate = resisted as f64 / trials as f64;
    assert!((0.045..0.075).contains(&rate), "resist rate {rate}");
}

#[test]
fn test_player_tracer_abort_marks_friend_count() {
    let (mut level, mut player) = arena();
    let ally_spec = MonsterSpec::new("paladin", 9)
        .with_attitude(Attitude::Friendly)
        .awake(true);
    let ally = level
        .spawn_monster(&ally_spec, Coord::new(13, 10))
        .expect("room for the ally");
    let mut world = BeamWorld::new(&mut level, &mut player);
    let mut ui = RecordingUi::answering(false);
    let mut sink = TracerSink::new();
    let mut bolt = Bolt::from_player(AttackKind::BoltOfFire, 10, Coord::new(10, 10), Coord::new(18, 10));
    let result = fire(
        &mut bolt,
        &mut world,
        &mut sink,
        &mut ui,
        &BeamOptions::default(),
        &mut GameRng::new(43),
    );

    assert!(result.cancelled);
    assert_eq!(result.tracer.friend.count, -1);
    assert!(result.tracer.aborted());
    let ally = world.level.monster(ally).expect("ally still there");
    assert_eq!(ally.hp, ally.max_hp);
}
