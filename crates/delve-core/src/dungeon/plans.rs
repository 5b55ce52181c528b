//! Layout plans and organic cave carving
//!
//! A plan is an independent room/corridor algorithm run on a level of
//! solid rock. Each reports whether it already placed stairs.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::dig::join_the_dots;
use super::feature::Feature;
use super::level::Level;
use super::mask::MapMask;
use crate::consts::{GXM, GYM, X_BOUND_1, X_BOUND_2, Y_BOUND_1, Y_BOUND_2};
use crate::geom::{Coord, Rect};
use crate::rarity::pick_weighted;
use crate::rng::GameRng;

/// What a plan left for the generic stair pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    StairsPlaced,
    NeedsStairs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum LayoutPlan {
    /// Grid of rectangular rooms joined until all are connected
    RoomGrid,
    /// Two crossing corridor bands
    Cross,
    /// Rooms placed one by one, each joined to the one before
    RoomChain,
    /// Hundreds of stamped boxes on open ground
    City,
    /// Random point pairs joined, then cave growth
    PointPairs,
    /// Concentric rings with spokes
    Ring,
}

impl LayoutPlan {
    pub fn random(rng: &mut GameRng) -> LayoutPlan {
        const WEIGHTS: [(LayoutPlan, i32); 6] = [
            (LayoutPlan::RoomGrid, 1),
            (LayoutPlan::Cross, 1),
            (LayoutPlan::RoomChain, 7),
            (LayoutPlan::City, 1),
            (LayoutPlan::PointPairs, 1),
            (LayoutPlan::Ring, 1),
        ];
        pick_weighted(&WEIGHTS, rng)
            .copied()
            .unwrap_or(LayoutPlan::RoomChain)
    }

    pub fn build(self, level: &mut Level, rng: &mut GameRng) -> PlanOutcome {
        match self {
            LayoutPlan::RoomGrid => room_grid(level, rng),
            LayoutPlan::Cross => cross(level, rng),
            LayoutPlan::RoomChain => room_chain(level, rng),
            LayoutPlan::City => city(level, rng),
            LayoutPlan::PointPairs => point_pairs(level, rng),
            LayoutPlan::Ring => ring(level, rng),
        }
    }
}

fn random_point_in(rect: Rect, rng: &mut GameRng) -> Coord {
    Coord::new(
        rng.random_range(rect.tl.x, rect.br.x),
        rng.random_range(rect.tl.y, rect.br.y),
    )
}

fn place_stair_in(level: &mut Level, rect: Rect, f: Feature, rng: &mut GameRng) {
    let floor: Vec<Coord> = rect
        .cells()
        .filter(|c| level.feature(*c) == Feature::Floor)
        .collect();
    if let Some(c) = rng.choose(&floor) {
        level.set_feature(*c, f);
    }
}

/// Union of rooms known to be joined
///
/// Each room carries the id of its class; merging relabels one class.
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    class: Vec<usize>,
}

impl ConnectivityTracker {
    pub fn new(rooms: usize) -> Self {
        Self {
            class: (0..rooms).collect(),
        }
    }

    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        a < self.class.len() && b < self.class.len() && self.class[a] == self.class[b]
    }

    pub fn merge(&mut self, a: usize, b: usize) {
        if a >= self.class.len() || b >= self.class.len() {
            return;
        }
        let (keep, gone) = (self.class[a], self.class[b]);
        for c in &mut self.class {
            if *c == gone {
                *c = keep;
            }
        }
    }

    pub fn all_connected(&self) -> bool {
        self.class.windows(2).all(|w| w[0] == w[1])
    }
}

/// 3x3 (or 4x3) grid of rooms; neighbours are joined first, then random
/// pairs until every room is connected
fn room_grid(level: &mut Level, rng: &mut GameRng) -> PlanOutcome {
    let cols = 3 + rng.rn2(2);
    let rows = 3;
    let cell_w = (GXM - 16) / cols;
    let cell_h = (GYM - 16) / rows;

    let mut rooms = Vec::new();
    for gy in 0..rows {
        for gx in 0..cols {
            let cell_tl = Coord::new(8 + gx * cell_w, 8 + gy * cell_h);
            let w = 4 + rng.rn2(cell_w - 7);
            let h = 3 + rng.rn2(cell_h - 6);
            let tl = cell_tl + Coord::new(1 + rng.rn2(cell_w - w - 1), 1 + rng.rn2(cell_h - h - 1));
            let room = Rect::from_size(tl, Coord::new(w, h));
            level.grid.replace_in_rect(room, Feature::RockWall, Feature::Floor);
            rooms.push(room);
        }
    }

    let mut tracker = ConnectivityTracker::new(rooms.len());
    let idx = |gx: i32, gy: i32| (gy * cols + gx) as usize;
    for gy in 0..rows {
        for gx in 0..cols {
            if gx + 1 < cols && !rng.one_in(3) {
                link(level, &rooms, &mut tracker, idx(gx, gy), idx(gx + 1, gy), rng);
            }
            if gy + 1 < rows && !rng.one_in(3) {
                link(level, &rooms, &mut tracker, idx(gx, gy), idx(gx, gy + 1), rng);
            }
        }
    }
    let mut guard = 0;
    while !tracker.all_connected() && guard < 200 {
        guard += 1;
        let a = rng.rn2(rooms.len() as i32) as usize;
        let b = rng.rn2(rooms.len() as i32) as usize;
        if !tracker.are_connected(a, b) {
            link(level, &rooms, &mut tracker, a, b, rng);
        }
    }
    PlanOutcome::NeedsStairs
}

fn link(
    level: &mut Level,
    rooms: &[Rect],
    tracker: &mut ConnectivityTracker,
    a: usize,
    b: usize,
    rng: &mut GameRng,
) {
    let from = random_point_in(rooms[a], rng);
    let to = random_point_in(rooms[b], rng);
    if join_the_dots(level, from, to, MapMask::VAULT) {
        tracker.merge(a, b);
    }
}

/// Horizontal and vertical corridor bands through the centre
fn cross(level: &mut Level, rng: &mut GameRng) -> PlanOutcome {
    let width = 5 - rng.rn2(5);
    let (cx, cy) = (GXM / 2, GYM / 2);
    let horizontal = Rect::new(Coord::new(10, cy - width), Coord::new(GXM - 10, cy + width));
    let vertical = Rect::new(Coord::new(cx - width, 10), Coord::new(cx + width, GYM - 10));
    level.grid.replace_in_rect(horizontal, Feature::RockWall, Feature::Floor);
    level.grid.replace_in_rect(vertical, Feature::RockWall, Feature::Floor);

    // Up stairs on the west and north arms, down stairs on the east and south
    let west = Rect::new(Coord::new(10, cy - width), Coord::new(20, cy + width));
    let east = Rect::new(Coord::new(GXM - 20, cy - width), Coord::new(GXM - 10, cy + width));
    let north = Rect::new(Coord::new(cx - width, 10), Coord::new(cx + width, 18));
    let south = Rect::new(Coord::new(cx - width, GYM - 18), Coord::new(cx + width, GYM - 10));
    place_stair_in(level, west, Feature::StairsUpI, rng);
    place_stair_in(level, north, Feature::StairsUpII, rng);
    place_stair_in(level, west, Feature::StairsUpIII, rng);
    place_stair_in(level, east, Feature::StairsDownI, rng);
    place_stair_in(level, south, Feature::StairsDownII, rng);
    place_stair_in(level, east, Feature::StairsDownIII, rng);
    PlanOutcome::StairsPlaced
}

/// Rooms placed one at a time, each joined to the previous one
fn room_chain(level: &mut Level, rng: &mut GameRng) -> PlanOutcome {
    let attempts = 30 + rng.rn2(90);
    let exclusive = !rng.one_in(10);
    let join_at_end = rng.coinflip();
    let mut rooms: Vec<Rect> = Vec::new();

    for _ in 0..attempts {
        let tl = Coord::new(10 + rng.rn2(50), 10 + rng.rn2(40));
        let room = Rect::new(tl, tl + Coord::new(2 + rng.rn2(8), 2 + rng.rn2(8)));
        if exclusive && level.grid.count_not_in_rect(room.inflate(1), Feature::RockWall) > 0 {
            continue;
        }
        level.grid.replace_in_rect(room, Feature::RockWall, Feature::Floor);
        if !join_at_end {
            if let Some(prev) = rooms.last() {
                let (from, to) = (random_point_in(room, rng), random_point_in(*prev, rng));
                join_the_dots(level, from, to, MapMask::VAULT);
            }
        }
        rooms.push(room);
        if rooms.len() >= 29 {
            break;
        }
    }
    if join_at_end {
        for pair in rooms.windows(2) {
            let (from, to) = (random_point_in(pair[1], rng), random_point_in(pair[0], rng));
            join_the_dots(level, from, to, MapMask::VAULT);
        }
    }
    PlanOutcome::NeedsStairs
}

/// Open ground filled with randomly stamped boxes
///
/// A box is only drawn where its surroundings are all floor, so the
/// streets between boxes stay connected.
fn city(level: &mut Level, rng: &mut GameRng) -> PlanOutcome {
    let roll = rng.rn2(81);
    let boxes = if roll > 48 {
        4000
    } else if roll > 24 {
        3000
    } else if roll > 8 {
        5000
    } else if roll > 0 {
        2000
    } else {
        1000
    };
    let roll = rng.rn2(18);
    let wall = if roll > 7 {
        Feature::RockWall
    } else if roll > 2 {
        Feature::StoneWall
    } else {
        Feature::MetalWall
    };

    let ground = Rect::new(Coord::new(10, 10), Coord::new(GXM - 10, GYM - 10));
    level.grid.replace_in_rect(ground, Feature::RockWall, Feature::Floor);

    for _ in 0..boxes {
        let tl = Coord::new(11 + rng.rn2(GXM - 35), 11 + rng.rn2(GYM - 35));
        let size = Coord::new(
            3 + rng.rn2(7) + rng.rn2(5),
            3 + rng.rn2(7) + rng.rn2(5),
        );
        let b = Rect::new(tl, tl + size);
        if b.br.x > GXM - 12 || b.br.y > GYM - 12 {
            continue;
        }
        if level.grid.count_not_in_rect(b.inflate(1), Feature::Floor) > 0 {
            continue;
        }
        level.grid.fill_rect(b, wall);
        if rng.coinflip() && b.width() > 2 && b.height() > 2 {
            // Hollow building with a single door
            level.grid.fill_rect(b.inflate(-1), Feature::Floor);
            let doors: Vec<Coord> = b
                .edge_cells()
                .filter(|c| {
                    let corner = (c.x == b.tl.x || c.x == b.br.x) && (c.y == b.tl.y || c.y == b.br.y);
                    !corner
                })
                .collect();
            if let Some(d) = rng.choose(&doors) {
                level.set_feature(*d, Feature::ClosedDoor);
            }
        }
    }
    PlanOutcome::NeedsStairs
}

/// Join random point pairs, then usually grow caves around them
fn point_pairs(level: &mut Level, rng: &mut GameRng) -> PlanOutcome {
    let pairs = 5 + rng.rn2(20);
    let mut last: Option<Coord> = None;
    for _ in 0..pairs {
        let a = Coord::new(10 + rng.rn2(GXM - 20), 10 + rng.rn2(GYM - 20));
        let b = Coord::new(10 + rng.rn2(GXM - 20), 10 + rng.rn2(GYM - 20));
        join_the_dots(level, a, b, MapMask::VAULT);
        // chain pairs so the network stays in one piece
        if let Some(prev) = last {
            join_the_dots(level, prev, a, MapMask::VAULT);
        }
        last = Some(b);
    }
    if !rng.one_in(4) {
        let boxy = rng.coinflip();
        spotty_level(level, rng, true, 100, boxy);
    }
    PlanOutcome::NeedsStairs
}

/// Outer ring corridor, inner ring, spokes and a central hall
fn ring(level: &mut Level, rng: &mut GameRng) -> PlanOutcome {
    let outer = Rect::new(Coord::new(10, 10), Coord::new(GXM - 11, GYM - 11));
    let inner = Rect::new(Coord::new(24, 20), Coord::new(GXM - 25, GYM - 21));
    let hall = Rect::new(Coord::new(34, 29), Coord::new(GXM - 35, GYM - 30));
    let thickness = 1 + rng.rn2(2);

    for ring in [outer, inner] {
        for k in 0..thickness {
            for c in ring.inflate(-k).edge_cells() {
                level.set_feature(c, Feature::Floor);
            }
        }
    }
    level.grid.fill_rect(hall, Feature::Floor);

    let centre = outer.center();
    let spokes = [
        Coord::new(centre.x, outer.tl.y),
        Coord::new(centre.x, outer.br.y),
        Coord::new(outer.tl.x, centre.y),
        Coord::new(outer.br.x, centre.y),
    ];
    for s in spokes {
        join_the_dots(level, s, centre, MapMask::VAULT);
    }

    let corners = [
        outer.tl,
        Coord::new(outer.br.x, outer.tl.y),
        Coord::new(outer.tl.x, outer.br.y),
    ];
    for (c, f) in corners.into_iter().zip(Feature::STONE_STAIRS_UP) {
        level.set_feature(c, f);
    }
    for f in Feature::STONE_STAIRS_DOWN {
        place_stair_in(level, hall, f, rng);
    }
    PlanOutcome::StairsPlaced
}

/// Grow organic caves by repeatedly clearing crosses of rock next to
/// existing open space
///
/// Unless `seeded`, stone stairs are scattered first as growth seeds (up
/// stair I beside down stair I). With `iterations == 0` the count is
/// rolled. `boxy` clears diagonals too. Seeds are joined afterwards so
/// the cave is one piece.
pub fn spotty_level(level: &mut Level, rng: &mut GameRng, seeded: bool, iterations: i32, boxy: bool) {
    let mut seeds = Vec::new();
    if !seeded {
        for f in Feature::STONE_STAIRS_DOWN
            .into_iter()
            .chain(Feature::STONE_STAIRS_UP.into_iter().skip(1))
        {
            let Some(c) = (0..1000).find_map(|_| {
                let c = Coord::new(10 + rng.rn2(GXM - 20), 10 + rng.rn2(GYM - 20));
                let right = c + Coord::new(1, 0);
                (level.feature(c) == Feature::RockWall && level.feature(right) == Feature::RockWall)
                    .then_some(c)
            }) else {
                continue;
            };
            level.set_feature(c, f);
            if f == Feature::StairsDownI {
                level.set_feature(c + Coord::new(1, 0), Feature::StairsUpI);
            }
            for n in c.orthogonal_neighbours() {
                if level.feature(n) == Feature::RockWall {
                    level.set_feature(n, Feature::Floor);
                }
            }
            seeds.push(c);
        }
    }

    let count = if iterations == 0 {
        200 + rng.rn2(if boxy { 750 } else { 1500 })
    } else {
        iterations
    };
    let is_rock = |level: &Level, c: Coord| level.feature(c) == Feature::RockWall;
    for _ in 0..count {
        let found = (0..1000).find_map(|_| {
            let c = Coord::new(
                rng.random_range(X_BOUND_1 + 4, X_BOUND_2 - 4),
                rng.random_range(Y_BOUND_1 + 4, Y_BOUND_2 - 4),
            );
            let offsets = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1), (-2, 0), (2, 0), (0, -2), (0, 2)];
            let buried = offsets
                .iter()
                .all(|&(dx, dy)| is_rock(level, c + Coord::new(dx, dy)));
            (!buried && !level.is_vault(c)).then_some(c)
        });
        let Some(c) = found else {
            break;
        };
        let mut clear = vec![c, c + Coord::new(0, -1), c + Coord::new(0, 1), c + Coord::new(-1, 0), c + Coord::new(1, 0)];
        if boxy {
            clear.extend([(-1, -1), (1, -1), (-1, 1), (1, 1)].map(|(dx, dy)| c + Coord::new(dx, dy)));
        }
        for cell in clear {
            if is_rock(level, cell) && !level.is_vault(cell) {
                level.set_feature(cell, Feature::Floor);
            }
        }
    }

    for pair in seeds.windows(2) {
        join_the_dots(level, pair[0], pair[1], MapMask::VAULT);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::LevelId;
    use crate::dungeon::zones::{count_disconnected_zones, stairs_connected};
    use strum::IntoEnumIterator;

    #[test]
    fn test_tracker() {
        let mut t = ConnectivityTracker::new(4);
        assert!(!t.all_connected());
        t.merge(0, 1);
        t.merge(2, 3);
        assert!(t.are_connected(0, 1));
        assert!(!t.are_connected(1, 2));
        t.merge(1, 3);
        assert!(t.all_connected());
    }

    #[test]
    fn test_every_plan_carves_something() {
        for plan in LayoutPlan::iter() {
            for seed in 0..3 {
                let mut rng = GameRng::new(seed);
                let mut level = Level::new(LevelId::main_dungeon(5));
                plan.build(&mut level, &mut rng);
                assert!(level.grid.count(Feature::Floor) > 40, "{plan} seed {seed}");
            }
        }
    }

    #[test]
    fn test_stair_placing_plans_are_connected() {
        for plan in [LayoutPlan::Cross, LayoutPlan::Ring] {
            let mut rng = GameRng::new(3);
            let mut level = Level::new(LevelId::main_dungeon(5));
            assert_eq!(plan.build(&mut level, &mut rng), PlanOutcome::StairsPlaced);
            assert!(!level.up_stairs().is_empty());
            assert!(!level.down_stairs().is_empty());
            assert!(stairs_connected(&level), "{plan}");
        }
    }

    #[test]
    fn test_city_streets_connected() {
        let mut rng = GameRng::new(4);
        let mut level = Level::new(LevelId::main_dungeon(5));
        city(&mut level, &mut rng);
        // hollow buildings with closed doors still count as reachable
        assert_eq!(count_disconnected_zones(&level), 1);
    }

    #[test]
    fn test_spotty_level_is_one_cave() {
        for seed in 0..5 {
            let mut rng = GameRng::new(seed);
            let mut level = Level::new(LevelId::new(crate::dungeon::Branch::Lair, 2));
            spotty_level(&mut level, &mut rng, false, 0, seed % 2 == 0);
            assert_eq!(count_disconnected_zones(&level), 1, "seed {seed}");
            assert!(stairs_connected(&level));
        }
    }

    #[test]
    fn test_plan_weights() {
        let mut rng = GameRng::new(5);
        let chains = (0..1200)
            .filter(|_| LayoutPlan::random(&mut rng) == LayoutPlan::RoomChain)
            .count();
        // 7 in 12
        assert!(chains > 600 && chains < 800, "{chains}");
    }
}
