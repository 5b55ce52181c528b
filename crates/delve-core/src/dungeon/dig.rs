//! Corridor diggers shared by the level builders

use std::collections::VecDeque;

use super::feature::Feature;
use super::level::Level;
use super::mask::MapMask;
use crate::consts::{GXM, GYM, MAPGEN_BORDER};
use crate::geom::{Coord, Grid, Rect, in_map_bounds};
use crate::rng::GameRng;

/// Upper bound on join-the-dots steps
const MAX_JOIN_STEPS: usize = 10_000;

/// Whether a digger may enter `c`
fn diggable_cell(level: &Level, c: Coord, forbid: MapMask) -> bool {
    in_map_bounds(c)
        && !level.has_mask(c, forbid)
        && !matches!(
            level.feature(c),
            Feature::BuilderSpecialWall | Feature::PermaRock
        )
}

/// Turn a solid, non-door cell into floor
fn open_cell(level: &mut Level, c: Coord) {
    let f = level.feature(c);
    if f.is_solid() && !f.is_door() {
        level.set_feature(c, Feature::Floor);
    }
}

/// Dig an axis-stepping corridor from `from` to `to`
///
/// Moves along x first, then y, never entering a cell carrying any of
/// `forbid`. When both preferred axes are blocked the rest of the way is
/// routed around the obstacle. Returns false if no route exists.
pub fn join_the_dots(level: &mut Level, from: Coord, to: Coord, forbid: MapMask) -> bool {
    if from == to {
        return true;
    }
    if !in_map_bounds(from) || !in_map_bounds(to) {
        return false;
    }

    let mut at = from;
    for _ in 0..MAX_JOIN_STEPS {
        if at != from && !level.has_mask(at, forbid) {
            open_cell(level, at);
        }
        if at == to {
            return true;
        }

        let steps = [
            (at.x < to.x, Coord::new(1, 0)),
            (at.x > to.x, Coord::new(-1, 0)),
            (at.y > to.y, Coord::new(0, -1)),
            (at.y < to.y, Coord::new(0, 1)),
        ];
        let preferred = steps
            .iter()
            .filter(|(wanted, _)| *wanted)
            .map(|(_, d)| at + *d)
            .find(|c| diggable_cell(level, *c, forbid));

        match preferred {
            Some(c) => at = c,
            None => return dig_detour(level, at, to, forbid),
        }
    }
    false
}

/// Shortest orthogonal route through diggable cells, dug out
fn dig_detour(level: &mut Level, from: Coord, to: Coord, forbid: MapMask) -> bool {
    let mut came_from: Grid<Option<Coord>> = Grid::new(GXM, GYM, None);
    came_from[from] = Some(from);
    let mut queue = VecDeque::from([from]);
    while let Some(c) = queue.pop_front() {
        if c == to {
            break;
        }
        for n in c.orthogonal_neighbours() {
            if came_from.get(n) == Some(&None) && diggable_cell(level, n, forbid) {
                came_from[n] = Some(c);
                queue.push_back(n);
            }
        }
    }
    if came_from.get(to).is_none_or(|p| p.is_none()) {
        return false;
    }
    let mut at = to;
    while at != from {
        open_cell(level, at);
        match came_from[at] {
            Some(prev) => at = prev,
            None => return false,
        }
    }
    true
}

/// Tuning for [`make_trail`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailParams {
    /// Maximum segment length minus two
    pub corridor_length: i32,
    /// 1 in N chance of carrying on through existing floor
    pub intersect_chance: i32,
    /// Number of segments
    pub segments: i32,
}

impl TrailParams {
    pub fn random(rng: &mut GameRng) -> Self {
        Self {
            corridor_length: 2 + rng.rn2(14),
            intersect_chance: if rng.one_in(20) { 400 } else { rng.rn2(20) },
            segments: if rng.one_in(100) {
                500 + rng.rn2(500)
            } else {
                30 + rng.rn2(200)
            },
        }
    }
}

/// Carve a random-walk corridor starting inside `start_box`
///
/// Returns the first and last cells of the trail, which the caller turns
/// into a stair pair. Cells carrying `MapMask::VAULT` are never entered.
pub fn make_trail(
    level: &mut Level,
    start_box: Rect,
    params: TrailParams,
    rng: &mut GameRng,
) -> Option<(Coord, Coord)> {
    let lo = MAPGEN_BORDER + 6;
    let (hi_x, hi_y) = (GXM - MAPGEN_BORDER - 7, GYM - MAPGEN_BORDER - 7);
    let mut pos = Coord::new(
        rng.random_range(start_box.tl.x, start_box.br.x).clamp(lo, hi_x),
        rng.random_range(start_box.tl.y, start_box.br.y).clamp(lo, hi_y),
    );
    if level.is_vault(pos) {
        return None;
    }
    let begin = pos;
    open_cell(level, pos);

    let mut finished = 0;
    while finished < params.segments {
        let mut dir = if rng.coinflip() {
            Coord::new(if rng.coinflip() { 1 } else { -1 }, 0)
        } else {
            Coord::new(0, if rng.coinflip() { 1 } else { -1 })
        };

        // Steer back towards the middle near the edges
        if pos.x < lo + 2 {
            dir = Coord::new(1, 0);
        } else if pos.x > hi_x - 2 {
            dir = Coord::new(-1, 0);
        } else if pos.y < lo + 2 {
            dir = Coord::new(0, 1);
        } else if pos.y > hi_y - 2 {
            dir = Coord::new(0, -1);
        }

        let length = rng.rn2(params.corridor_length) + 2;
        for _ in 0..length {
            let next = pos + dir;
            if next.x < lo || next.x > hi_x || next.y < lo || next.y > hi_y {
                break;
            }
            if level.has_mask(next, MapMask::VAULT)
                || level.feature(next) == Feature::BuilderSpecialWall
            {
                break;
            }
            pos = next;
            if level.feature(pos) == Feature::Floor && !rng.one_in(params.intersect_chance) {
                finished += 1;
            }
            open_cell(level, pos);
        }
        finished += 1;
    }

    (pos != begin).then_some((begin, pos))
}

/// Direction leading out of a vault from an exit on its edge
fn dig_away_dir(rect: Rect, exit: Coord, rng: &mut GameRng) -> Coord {
    let mut x_edge = exit.x == rect.tl.x || exit.x == rect.br.x;
    let mut y_edge = exit.y == rect.tl.y || exit.y == rect.br.y;
    if x_edge && y_edge {
        if rng.coinflip() {
            x_edge = false;
        } else {
            y_edge = false;
        }
    }
    let mut dir = Coord::origin();
    if x_edge {
        dir.x = if exit.x == rect.tl.x { -1 } else { 1 };
    }
    if y_edge {
        dir.y = if exit.y == rect.tl.y { -1 } else { 1 };
    }
    dir
}

/// Dig outwards from a vault exit until reaching open floor
///
/// Rock turns to floor. Digging stops on floor with at least two open
/// neighbours, at the generation border, or at an opaque or vault-owned
/// cell. Returns true if any cell was dug.
pub fn dig_away_from_vault(level: &mut Level, rect: Rect, exit: Coord, rng: &mut GameRng) -> bool {
    let dir = dig_away_dir(rect, exit, rng);
    if dir.is_origin() {
        return false;
    }
    let mut at = exit;
    let mut dug = false;
    for i in 0..GXM {
        at += dir;
        if at.x < MAPGEN_BORDER
            || at.x > GXM - MAPGEN_BORDER - 1
            || at.y < MAPGEN_BORDER
            || at.y > GYM - MAPGEN_BORDER - 1
        {
            break;
        }
        if level.has_mask(at, MapMask::DIG_FORBIDDEN) {
            break;
        }
        match level.feature(at) {
            Feature::RockWall => {
                level.set_feature(at, Feature::Floor);
                dug = true;
            }
            Feature::Floor if i > 0 => {
                if level.open_neighbours(at) >= 2 {
                    break;
                }
            }
            _ => {}
        }
    }
    dug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::LevelId;
    use crate::dungeon::zones::count_disconnected_zones;

    #[test]
    fn test_join_the_dots_connects() {
        let mut level = Level::new(LevelId::default());
        let (a, b) = (Coord::new(5, 5), Coord::new(30, 20));
        level.set_feature(a, Feature::Floor);
        level.set_feature(b, Feature::Floor);
        assert!(join_the_dots(&mut level, a, b, MapMask::VAULT));
        assert_eq!(count_disconnected_zones(&level), 1);
    }

    #[test]
    fn test_join_the_dots_routes_around_forbidden_cells() {
        let mut level = Level::new(LevelId::default());
        let (a, b) = (Coord::new(5, 10), Coord::new(20, 10));
        for y in 8..=12 {
            level.mask[Coord::new(12, y)] = MapMask::VAULT;
        }
        level.set_feature(a, Feature::Floor);
        assert!(join_the_dots(&mut level, a, b, MapMask::VAULT));
        for y in 8..=12 {
            assert_eq!(level.feature(Coord::new(12, y)), Feature::RockWall);
        }
        assert_eq!(level.feature(b), Feature::Floor);
    }

    #[test]
    fn test_join_the_dots_fails_when_walled_in() {
        let mut level = Level::new(LevelId::default());
        let a = Coord::new(10, 10);
        for n in a.neighbours() {
            level.mask[n] = MapMask::OPAQUE;
        }
        assert!(!join_the_dots(&mut level, a, Coord::new(30, 30), MapMask::DIG_FORBIDDEN));
    }

    #[test]
    fn test_make_trail_carves_floor() {
        let mut rng = GameRng::new(11);
        let mut level = Level::new(LevelId::default());
        let params = TrailParams {
            corridor_length: 8,
            intersect_chance: 10,
            segments: 40,
        };
        let box_ = Rect::from_size(Coord::new(35, 35), Coord::new(10, 10));
        if let Some((begin, end)) = make_trail(&mut level, box_, params, &mut rng) {
            assert_eq!(level.feature(begin), Feature::Floor);
            assert_eq!(level.feature(end), Feature::Floor);
            assert_eq!(count_disconnected_zones(&level), 1);
        }
        assert!(level.grid.count(Feature::Floor) > 10);
    }

    #[test]
    fn test_dig_away_reaches_floor() {
        let mut rng = GameRng::new(12);
        let mut level = Level::new(LevelId::default());
        let room = Rect::new(Coord::new(30, 10), Coord::new(34, 14));
        level.grid.fill_rect(room, Feature::Floor);
        let vault = Rect::new(Coord::new(10, 11), Coord::new(14, 13));
        let exit = Coord::new(14, 12);
        level.set_feature(exit, Feature::Floor);
        assert!(dig_away_from_vault(&mut level, vault, exit, &mut rng));
        assert_eq!(count_disconnected_zones(&level), 1);
        // nothing dug past the room
        assert_eq!(level.feature(Coord::new(35, 12)), Feature::RockWall);
    }

    #[test]
    fn test_dig_away_interior_exit_does_nothing() {
        let mut rng = GameRng::new(13);
        let mut level = Level::new(LevelId::default());
        let vault = Rect::new(Coord::new(10, 10), Coord::new(14, 14));
        assert!(!dig_away_from_vault(&mut level, vault, Coord::new(12, 12), &mut rng));
    }
}
