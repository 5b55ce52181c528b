//! Connectivity analysis
//!
//! Zones are maximal 8-connected sets of traversable cells. Vault-owned
//! and opaque cells never belong to a zone, so a vault's interior cannot
//! stitch two parts of the open level together.

use std::collections::VecDeque;

use super::feature::Feature;
use super::level::Level;
use super::mask::MapMask;
use crate::geom::{Coord, Grid};

/// Cells excluded from zone counting regardless of terrain
const ZONE_BLOCKERS: MapMask = MapMask::VAULT.union(MapMask::OPAQUE);

/// Whether `c` takes part in zone counting
pub fn in_zone(level: &Level, c: Coord) -> bool {
    level.is_traversable(c) && !level.has_mask(c, ZONE_BLOCKERS)
}

/// Number of disconnected traversable regions outside vaults
pub fn count_disconnected_zones(level: &Level) -> usize {
    zone_map(level).1
}

/// Zone id per cell (0 = no zone) and the number of zones
pub fn zone_map(level: &Level) -> (Grid<u32>, usize) {
    let mut zones = Grid::new(level.grid.width(), level.grid.height(), 0u32);
    let mut count = 0usize;
    for start in level.grid.coords() {
        if zones[start] != 0 || !in_zone(level, start) {
            continue;
        }
        count += 1;
        let id = count as u32;
        zones[start] = id;
        let mut queue = VecDeque::from([start]);
        while let Some(c) = queue.pop_front() {
            for n in c.neighbours() {
                if zones.get(n) == Some(&0) && in_zone(level, n) {
                    zones[n] = id;
                    queue.push_back(n);
                }
            }
        }
    }
    (zones, count)
}

/// Cells reachable from `start` over traversable terrain
///
/// With `respect_vaults` set, vault-owned cells are impassable as in
/// zone counting.
pub fn reachable_from(level: &Level, start: Coord, respect_vaults: bool) -> Grid<bool> {
    let mut seen = Grid::new(level.grid.width(), level.grid.height(), false);
    let passable = |c: Coord| {
        level.is_traversable(c) && (!respect_vaults || !level.has_mask(c, ZONE_BLOCKERS))
    };
    if !level.grid.contains(start) {
        return seen;
    }
    seen[start] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(c) = queue.pop_front() {
        for n in c.neighbours() {
            if seen.get(n) == Some(&false) && passable(n) {
                seen[n] = true;
                queue.push_back(n);
            }
        }
    }
    seen
}

/// Closest cell matching `pred`, searching outwards over traversable cells
///
/// The matching cell itself may be solid (a wall, a closed door) as long
/// as it borders the searched region.
pub fn find_nearest_feature(
    level: &Level,
    from: Coord,
    pred: impl Fn(Feature) -> bool,
) -> Option<Coord> {
    if !level.grid.contains(from) {
        return None;
    }
    if pred(level.grid[from]) {
        return Some(from);
    }
    let mut seen = Grid::new(level.grid.width(), level.grid.height(), false);
    seen[from] = true;
    let mut queue = VecDeque::from([from]);
    while let Some(c) = queue.pop_front() {
        for n in c.neighbours() {
            if seen.get(n) != Some(&false) {
                continue;
            }
            seen[n] = true;
            if pred(level.grid[n]) {
                return Some(n);
            }
            if level.is_traversable(n) {
                queue.push_back(n);
            }
        }
    }
    None
}

/// Every up stair reaches at least one down stair
///
/// Levels lacking either kind of stair pass trivially.
pub fn stairs_connected(level: &Level) -> bool {
    let ups = level.up_stairs();
    let downs = level.down_stairs();
    if ups.is_empty() || downs.is_empty() {
        return true;
    }
    ups.iter().all(|up| {
        let reach = reachable_from(level, *up, false);
        downs.iter().any(|d| reach[*d])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::LevelId;
    use crate::geom::Rect;

    fn carve(level: &mut Level, rect: Rect) {
        level.grid.fill_rect(rect, Feature::Floor);
    }

    #[test]
    fn test_two_rooms_two_zones() {
        let mut level = Level::new(LevelId::default());
        carve(&mut level, Rect::new(Coord::new(5, 5), Coord::new(10, 10)));
        carve(&mut level, Rect::new(Coord::new(20, 5), Coord::new(25, 10)));
        assert_eq!(count_disconnected_zones(&level), 2);

        carve(&mut level, Rect::new(Coord::new(11, 7), Coord::new(19, 7)));
        assert_eq!(count_disconnected_zones(&level), 1);
    }

    #[test]
    fn test_diagonal_contact_connects() {
        let mut level = Level::new(LevelId::default());
        level.set_feature(Coord::new(5, 5), Feature::Floor);
        level.set_feature(Coord::new(6, 6), Feature::Floor);
        assert_eq!(count_disconnected_zones(&level), 1);
    }

    #[test]
    fn test_doors_join_zones_vault_cells_split_them() {
        let mut level = Level::new(LevelId::default());
        carve(&mut level, Rect::new(Coord::new(5, 5), Coord::new(15, 5)));
        level.set_feature(Coord::new(10, 5), Feature::ClosedDoor);
        assert_eq!(count_disconnected_zones(&level), 1);

        level.mask[Coord::new(10, 5)] = MapMask::VAULT;
        assert_eq!(count_disconnected_zones(&level), 2);
    }

    #[test]
    fn test_find_nearest() {
        let mut level = Level::new(LevelId::default());
        carve(&mut level, Rect::new(Coord::new(5, 5), Coord::new(20, 5)));
        level.set_feature(Coord::new(8, 5), Feature::Fountain);
        level.set_feature(Coord::new(18, 5), Feature::Fountain);
        assert_eq!(
            find_nearest_feature(&level, Coord::new(15, 5), |f| f == Feature::Fountain),
            Some(Coord::new(18, 5))
        );
        assert_eq!(
            find_nearest_feature(&level, Coord::new(15, 5), |f| f == Feature::Lava),
            None
        );
    }

    #[test]
    fn test_stairs_connected() {
        let mut level = Level::new(LevelId::default());
        carve(&mut level, Rect::new(Coord::new(5, 5), Coord::new(10, 10)));
        carve(&mut level, Rect::new(Coord::new(30, 5), Coord::new(35, 10)));
        level.set_feature(Coord::new(6, 6), Feature::StairsUpI);
        level.set_feature(Coord::new(31, 6), Feature::StairsDownI);
        assert!(!stairs_connected(&level));

        level.set_feature(Coord::new(9, 9), Feature::StairsDownII);
        assert!(stairs_connected(&level));
    }
}
