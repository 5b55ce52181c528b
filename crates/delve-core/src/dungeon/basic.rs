//! Basic rooms-and-corridors builder
//!
//! Random-walk trails are carved first, each starting and ending on a
//! stair pair, then rooms are stamped wherever they touch a corridor.

use super::dig::{TrailParams, make_trail};
use super::feature::Feature;
use super::level::Level;
use super::mask::MapMask;
use crate::geom::{Coord, Rect};
use crate::rng::GameRng;

/// Start boxes (top-left, size) and stair pairs for the trails
const TRAILS: [(i32, i32, i32, i32, Feature, Feature); 3] = [
    (35, 30, 35, 20, Feature::StairsDownI, Feature::StairsUpI),
    (10, 15, 10, 15, Feature::StairsDownII, Feature::StairsUpII),
    (50, 20, 10, 15, Feature::StairsDownIII, Feature::StairsUpIII),
];

/// Corridors, stairs, optional big and octagonal rooms, then ordinary rooms
pub fn builder_basic(level: &mut Level, rng: &mut GameRng) {
    let depth = level.id.absolute_depth();
    let door_level = rng.rn2(11);
    let room_size = 4 + rng.rn2(5) + rng.rn2(6);
    let params = TrailParams::random(rng);

    for (x, xr, y, yr, down, up) in TRAILS {
        trail_with_stairs(level, Rect::from_size(Coord::new(x, y), Coord::new(xr, yr)), params, down, up, rng);
    }
    if rng.one_in(4) {
        let area = Rect::from_size(Coord::new(10, 40), Coord::new(20, 20));
        trail_with_stairs(level, area, params, Feature::HatchDown, Feature::Floor, rng);
    }
    if rng.one_in(4) {
        let area = Rect::from_size(Coord::new(50, 40), Coord::new(20, 20));
        trail_with_stairs(level, area, params, Feature::Floor, Feature::HatchUp, rng);
    }

    if depth > 1 && rng.one_in(16) {
        big_room(level, rng);
    }
    if rng.rn2(depth) > 6 && rng.one_in(3) {
        for _ in 0..(1 + rng.rn2(3)) {
            octa_room(level, rng);
        }
    }

    let roll = rng.rn2(750);
    let rooms = if roll > 63 {
        5 + rng.random2avg(29, 2)
    } else if roll > 14 {
        100
    } else {
        1
    };
    let max_doors = 2 + rng.rn2(8);
    let mut failures = 0;
    let mut made = 0;
    while made < rooms && failures < 30 * rooms.max(1) {
        let x1 = 8 + rng.rn2(52);
        let y1 = 8 + rng.rn2(48);
        let rect = Rect::new(
            Coord::new(x1, y1),
            Coord::new(x1 + 4 + rng.rn2(room_size), y1 + 4 + rng.rn2(room_size)),
        );
        if make_room(level, rect, max_doors, door_level, rng) {
            made += 1;
        } else {
            failures += 1;
        }
    }
}

fn trail_with_stairs(
    level: &mut Level,
    area: Rect,
    params: TrailParams,
    begin_feature: Feature,
    end_feature: Feature,
    rng: &mut GameRng,
) {
    if let Some((begin, end)) = make_trail(level, area, params, rng) {
        level.set_feature(begin, begin_feature);
        level.set_feature(end, end_feature);
    }
}

/// A cell on a room's outline that already opens onto something
fn good_door_spot(level: &Level, c: Coord) -> bool {
    let f = level.feature(c);
    (!f.is_solid() && !f.is_stair()) || f.is_closed_door()
}

/// Stamp a room over `rect` if it touches between one and `max_doors`
/// open cells on its outline
///
/// Vault cells and special-room walls are never overwritten. Openings in
/// the surrounding ring become doors with chance `door_level` in 10.
pub fn make_room(
    level: &mut Level,
    rect: Rect,
    max_doors: i32,
    door_level: i32,
    rng: &mut GameRng,
) -> bool {
    if rect.tl.x < 2 || rect.tl.y < 2 || !level.grid.contains(rect.br + Coord::new(2, 2)) {
        return false;
    }

    let openings = rect
        .edge_cells()
        .filter(|c| good_door_spot(level, *c))
        .count() as i32;
    if openings == 0 || openings > max_doors {
        return false;
    }
    if rect
        .cells()
        .any(|c| level.is_vault(c) || level.feature(c) == Feature::BuilderSpecialWall)
    {
        return false;
    }

    for c in rect.cells() {
        let f = level.feature(c);
        if f.is_wall() && !f.is_permanent() {
            level.set_feature(c, Feature::Floor);
        }
    }

    // Doors go in gaps of the surrounding ring flanked by solid cells
    let ring = rect.inflate(1);
    for c in ring.edge_cells() {
        let corner = (c.x == ring.tl.x || c.x == ring.br.x) && (c.y == ring.tl.y || c.y == ring.br.y);
        if corner || level.feature(c) != Feature::Floor || level.has_mask(c, MapMask::NO_DOOR) {
            continue;
        }
        let (a, b) = if c.x == ring.tl.x || c.x == ring.br.x {
            (c + Coord::new(0, -1), c + Coord::new(0, 1))
        } else {
            (c + Coord::new(-1, 0), c + Coord::new(1, 0))
        };
        if level.is_solid(a) && level.is_solid(b) && rng.x_chance_in_y(door_level, 10) {
            level.set_feature(c, Feature::ClosedDoor);
        }
    }
    true
}

/// One large room, sometimes with a pool of water or lava in the middle
fn big_room(level: &mut Level, rng: &mut GameRng) {
    let tl = Coord::new(8 + rng.rn2(30), 8 + rng.rn2(22));
    let rect = Rect::new(tl, tl + Coord::new(6 + rng.rn2(35), 6 + rng.rn2(28)));
    if !level.grid.contains(rect.br + Coord::new(8, 8)) {
        return;
    }
    if rect.cells().any(|c| level.is_vault(c)) {
        return;
    }
    level.grid.replace_in_rect(rect, Feature::RockWall, Feature::Floor);
    if rng.one_in(4) && rect.width() > 8 && rect.height() > 8 {
        let pool = if rng.coinflip() { Feature::DeepWater } else { Feature::Lava };
        level.grid.replace_in_rect(rect.inflate(-3), Feature::Floor, pool);
    }
}

/// A room with its corners cut off
fn octa_room(level: &mut Level, rng: &mut GameRng) {
    let tl = Coord::new(8 + rng.rn2(45), 8 + rng.rn2(40));
    let size = Coord::new(7 + rng.rn2(10), 7 + rng.rn2(10));
    let rect = Rect::from_size(tl, size);
    if !level.grid.contains(rect.br + Coord::new(8, 8)) || rect.cells().any(|c| level.is_vault(c)) {
        return;
    }
    let cut = (size.x.min(size.y) / 3).max(1);
    for c in rect.cells() {
        let dx = (c.x - rect.tl.x).min(rect.br.x - c.x);
        let dy = (c.y - rect.tl.y).min(rect.br.y - c.y);
        if dx + dy >= cut && level.feature(c) == Feature::RockWall {
            level.set_feature(c, Feature::Floor);
        }
    }
}
