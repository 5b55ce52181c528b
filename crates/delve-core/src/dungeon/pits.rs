//! Special rooms: monster pits and treasuries
//!
//! A special room is a walled box whose walls and floor use builder
//! sentinels until the final fixup, so no corridor digger passes through
//! it. A single door is joined to the nearest floor outside.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use tracing::debug;

use super::dig::join_the_dots;
use super::feature::Feature;
use super::level::Level;
use super::mask::MapMask;
use crate::actor::{Holiness, MonsterSpec};
use crate::geom::{Coord, Rect};
use crate::item::ItemSpec;
use crate::logging::GEN_TARGET;
use crate::rng::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum SpecialRoomKind {
    JellyPit,
    OrcLair,
    Morgue,
    Treasury,
}

impl SpecialRoomKind {
    pub fn random(depth: i32, rng: &mut GameRng) -> SpecialRoomKind {
        let mut kind = SpecialRoomKind::OrcLair;
        if depth > 12 && rng.one_in(4) {
            kind = SpecialRoomKind::Morgue;
        }
        if rng.one_in(3) {
            kind = SpecialRoomKind::JellyPit;
        }
        if depth > 13 && rng.one_in(6) {
            kind = SpecialRoomKind::Treasury;
        }
        kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitEntry {
    pub monster: MonsterSpec,
    pub rarity: i32,
}

/// Weighted monster table for one pit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitSpec {
    pub entries: Vec<PitEntry>,
    /// Percent chance for each free cell to get a monster
    pub density: i32,
    /// Placed before the rest of the room fills
    pub boss: Option<MonsterSpec>,
}

fn entry(kind: &str, hit_dice: i32, rarity: i32) -> PitEntry {
    PitEntry {
        monster: MonsterSpec::new(kind, hit_dice),
        rarity,
    }
}

impl PitSpec {
    pub fn jelly_pit(depth: i32) -> Self {
        let mut entries = vec![
            entry("ooze", 3, 27 - depth / 5),
            entry("jelly", 4, 20),
            entry("brown ooze", 7, 3 + depth),
            entry("death ooze", 11, 2 + (2 * depth) / 3),
        ];
        if depth >= 12 {
            entries.push(entry("azure jelly", 12, 1 + (depth - 12) / 3));
        }
        if depth >= 15 {
            entries.push(entry("acid blob", 18, 1 + (depth - 15) / 4));
        }
        Self {
            entries,
            density: 90,
            boss: None,
        }
    }

    pub fn orc_lair(depth: i32) -> Self {
        let power = if depth > 24 {
            3
        } else if depth > 15 {
            2
        } else if depth > 9 {
            1
        } else {
            0
        };
        let entries = vec![
            entry("orc", 1, 40 - 10 * power),
            entry("orc warrior", 4, 10 + 5 * power),
            entry("orc priest", 3, 5 + 2 * power),
            entry("orc knight", 9, 4 * power),
            entry("orc sorcerer", 7, 2 * power),
            entry("ogre", 5, 2 + power),
            entry("troll", 7, power),
        ];
        let boss = if power >= 2 {
            MonsterSpec::new("orc warlord", 15)
        } else {
            MonsterSpec::new("orc high priest", 11)
        };
        Self {
            entries,
            density: 80,
            boss: Some(boss),
        }
    }

    pub fn morgue() -> Self {
        let undead = |kind: &str, hd: i32, rarity: i32| PitEntry {
            monster: MonsterSpec::new(kind, hd).with_holiness(Holiness::Undead),
            rarity,
        };
        Self {
            entries: vec![
                undead("small zombie", 1, 12),
                undead("wight", 3, 4),
                undead("necrophage", 5, 4),
                undead("wraith", 6, 3),
                undead("vampire", 7, 1),
            ],
            density: 20,
            boss: None,
        }
    }

    pub fn rarity_sum(&self) -> i32 {
        self.entries.iter().map(|e| e.rarity.max(0)).sum()
    }

    fn pick(&self, rng: &mut GameRng) -> Option<&MonsterSpec> {
        let mut roll = rng.rn2(self.rarity_sum());
        for e in &self.entries {
            let r = e.rarity.max(0);
            if roll < r {
                return Some(&e.monster);
            }
            roll -= r;
        }
        None
    }

    /// Place the boss at `boss_at`, then fill the free cells of `room`
    ///
    /// Returns the number of monsters placed.
    ///
    /// # Panics
    ///
    /// Panics if every entry has zero rarity.
    pub fn fill(&self, level: &mut Level, room: Rect, boss_at: Coord, rng: &mut GameRng) -> usize {
        assert!(self.rarity_sum() > 0, "monster pit with no eligible monsters");
        let mut placed = 0;
        if let Some(boss) = &self.boss {
            if level.spawn_monster(boss, boss_at).is_some() {
                placed += 1;
            }
        }
        for c in room.cells() {
            if !level.can_hold_monster(c) || rng.rn2(100) >= self.density {
                continue;
            }
            if let Some(spec) = self.pick(rng) {
                let spec = spec.clone();
                if level.spawn_monster(&spec, c).is_some() {
                    placed += 1;
                }
            }
        }
        placed
    }
}

/// A built special room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialRoom {
    pub kind: SpecialRoomKind,
    /// Outer wall rectangle
    pub rect: Rect,
    pub door: Coord,
}

/// Try to build a special room in an untouched stretch of rock
pub fn special_room(level: &mut Level, kind: SpecialRoomKind, rng: &mut GameRng) -> Option<SpecialRoom> {
    let depth = level.id.absolute_depth();
    let rect = (0..200).find_map(|_| {
        let tl = Coord::new(8 + rng.rn2(55), 8 + rng.rn2(45));
        let rect = Rect::new(
            tl,
            tl + Coord::new(4 + rng.random2avg(6, 2), 4 + rng.random2avg(6, 2)),
        );
        let margin = rect.inflate(1);
        let clear = level.grid.contains(margin.br)
            && level.grid.count_not_in_rect(margin, Feature::RockWall) == 0
            && !margin.cells().any(|c| level.has_mask(c, MapMask::VAULT));
        clear.then_some(rect)
    })?;

    // door and tunnel target are settled before any rock is touched
    let door = pick_door(rect, rng)?;
    let step_out = door + outward(rect, door);
    let target = level
        .find_where(|f| f == Feature::Floor)
        .into_iter()
        .filter(|c| !rect.inflate(1).contains(*c))
        .min_by_key(|c| c.distance_sq_to(step_out))?;

    for c in rect.cells() {
        let f = if rect.on_edge(c) {
            Feature::BuilderSpecialWall
        } else {
            Feature::BuilderSpecialFloor
        };
        level.set_feature(c, f);
    }
    let interior = rect.inflate(-1);

    level.set_feature(door, Feature::ClosedDoor);
    level.set_feature(step_out, Feature::Floor);
    join_the_dots(level, step_out, target, MapMask::DIG_FORBIDDEN);

    match kind {
        SpecialRoomKind::JellyPit => {
            PitSpec::jelly_pit(depth).fill(level, interior, interior.center(), rng);
        }
        SpecialRoomKind::OrcLair => {
            let boss_at = Coord::new(
                rng.random_range(interior.tl.x, interior.br.x),
                rng.random_range(interior.tl.y, interior.br.y),
            );
            PitSpec::orc_lair(depth).fill(level, interior, boss_at, rng);
        }
        SpecialRoomKind::Morgue => {
            PitSpec::morgue().fill(level, interior, interior.center(), rng);
        }
        SpecialRoomKind::Treasury => {
            for c in interior.cells() {
                let spec = ItemSpec::random(depth * 3, rng);
                level.create_item(&spec, c);
            }
            let guardian = MonsterSpec::new("guardian naga", 8);
            level.spawn_monster(&guardian, interior.center());
        }
    }

    debug!(target: GEN_TARGET, %kind, ?rect, "special room");
    Some(SpecialRoom { kind, rect, door })
}

/// A non-corner wall cell for the door
fn pick_door(rect: Rect, rng: &mut GameRng) -> Option<Coord> {
    let candidates: Vec<Coord> = rect
        .edge_cells()
        .filter(|c| {
            let corner = (c.x == rect.tl.x || c.x == rect.br.x) && (c.y == rect.tl.y || c.y == rect.br.y);
            !corner
        })
        .collect();
    rng.choose(&candidates).copied()
}

fn outward(rect: Rect, door: Coord) -> Coord {
    Coord::new(
        if door.x == rect.tl.x { -1 } else if door.x == rect.br.x { 1 } else { 0 },
        if door.y == rect.tl.y { -1 } else if door.y == rect.br.y { 1 } else { 0 },
    )
}

/// Turn special-room sentinels back into ordinary wall and floor
pub fn fixup_special_rooms(level: &mut Level) {
    for c in level.grid.coords() {
        match level.feature(c) {
            Feature::BuilderSpecialWall => level.set_feature(c, Feature::RockWall),
            Feature::BuilderSpecialFloor => level.set_feature(c, Feature::Floor),
            _ => {}
        }
    }
}
