//! Rivers, lakes and pools laid over a finished layout

use tracing::debug;

use super::branch::Branch;
use super::feature::Feature;
use super::level::Level;
use crate::consts::{GXM, GYM};
use crate::geom::{Coord, Rect};
use crate::logging::GEN_TARGET;
use crate::rng::GameRng;

/// What the extras pass added
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extra {
    Pools(Feature),
    River(Feature),
    Lake(Feature),
}

/// Liquid may replace plain terrain that no vault, monster or item claims
fn may_overwrite(level: &Level, c: Coord) -> bool {
    let f = level.feature(c);
    let plain = f == Feature::Floor
        || f.is_door()
        || f.is_liquid()
        || (f.is_wall() && !f.is_permanent() && f != Feature::BuilderSpecialWall);
    plain && !level.is_vault(c) && level.monster_index_at(c).is_none() && !level.has_items_at(c)
}

/// Roll for pools, a river or a lake
pub fn builder_extras(level: &mut Level, rng: &mut GameRng) -> Option<Extra> {
    let depth = level.id.absolute_depth();
    let branch = level.id.branch;

    if depth > 6 && rng.one_in(10) {
        let pool = match branch {
            Branch::Cocytus => Feature::DeepWater,
            Branch::Gehenna => Feature::Lava,
            _ if depth < 11 || rng.coinflip() => Feature::DeepWater,
            _ => Feature::Lava,
        };
        many_pools(level, pool, rng);
        return Some(Extra::Pools(pool));
    }

    let mut liquid = if rng.one_in(5 + depth) {
        Feature::ShallowWater
    } else {
        Feature::DeepWater
    };
    if depth > 11 && (rng.one_in(5) || (depth > 15 && !rng.one_in(5))) {
        liquid = Feature::Lava;
    }

    let forced = match branch {
        Branch::Gehenna => Some(Feature::Lava),
        Branch::Cocytus => Some(Feature::DeepWater),
        _ => None,
    };
    let extra = if let Some(liquid) = forced {
        if rng.coinflip() {
            build_river(level, liquid, rng)
        } else {
            build_lake(level, liquid, rng)
        }
    } else if depth > 8 && rng.one_in(16) {
        build_river(level, liquid, rng)
    } else if depth > 8 && rng.one_in(12) {
        let lake = if liquid == Feature::ShallowWater {
            Feature::DeepWater
        } else {
            liquid
        };
        build_lake(level, lake, rng)
    } else {
        None
    };
    if let Some(extra) = extra {
        debug!(target: GEN_TARGET, level = %level.id, ?extra, "extras");
    }
    extra
}

/// A meandering band of liquid crossing the map west to east
///
/// Crypt levels never get one.
pub fn build_river(level: &mut Level, liquid: Feature, rng: &mut GameRng) -> Option<Extra> {
    if level.id.branch == Branch::Crypt {
        return None;
    }
    let mut width = 3 + rng.rn2(4);
    let mut y = 10 - width + rng.random2avg(GYM - 10, 3);
    for x in 5..GXM - 5 {
        if rng.one_in(3) {
            y += 1;
        }
        if rng.one_in(3) {
            y -= 1;
        }
        if rng.coinflip() {
            width += 1;
        }
        if rng.coinflip() {
            width -= 1;
        }
        width = width.clamp(2, 6);

        for row in y..y + width {
            let c = Coord::new(x, row);
            if row < 5 || row > GYM - 5 || rng.one_in(200) || !may_overwrite(level, c) {
                continue;
            }
            let f = if width == 2 && liquid == Feature::DeepWater && rng.coinflip() {
                Feature::ShallowWater
            } else {
                liquid
            };
            level.set_feature(c, f);
        }
    }
    Some(Extra::River(liquid))
}

/// A rough blob of liquid, widest across its middle
pub fn build_lake(level: &mut Level, liquid: Feature, rng: &mut GameRng) -> Option<Extra> {
    let mut x1 = 5 + rng.rn2(GXM - 30);
    let y1 = 5 + rng.rn2(GYM - 30);
    let mut x2 = x1 + 4 + rng.rn2(16);
    let y2 = y1 + 8 + rng.rn2(12);

    for y in y1..y2 {
        if rng.coinflip() {
            x1 += rng.rn2(3);
        }
        if rng.coinflip() {
            x1 -= rng.rn2(3);
        }
        if rng.coinflip() {
            x2 += rng.rn2(3);
        }
        if rng.coinflip() {
            x2 -= rng.rn2(3);
        }
        if y - y1 < (y2 - y1) / 2 {
            x2 += rng.rn2(3);
            x1 -= rng.rn2(3);
        } else {
            x2 -= rng.rn2(3);
            x1 += rng.rn2(3);
        }

        for x in x1..x2 {
            let c = Coord::new(x, y);
            if y < 5 || y > GYM - 5 || x < 5 || x > GXM - 5 {
                continue;
            }
            if !rng.one_in(200) && may_overwrite(level, c) {
                level.set_feature(c, liquid);
            }
        }
    }
    Some(Extra::Lake(liquid))
}

/// Scatter pools over boxes of open floor
pub fn many_pools(level: &mut Level, liquid: Feature, rng: &mut GameRng) -> usize {
    let wanted = 20 + rng.random2avg(9, 2).max(0) as usize;
    let mut pools = 0;
    for _ in 0..30_000 {
        if pools >= wanted {
            break;
        }
        let tl = Coord::new(6 + rng.rn2(GXM - 26), 6 + rng.rn2(GYM - 26));
        let br = tl + Coord::new(2 + rng.roll_dice(2, 9), 2 + rng.roll_dice(2, 9));
        let area = Rect::new(tl, br);
        if level.grid.count_not_in_rect(area, Feature::Floor) == 0
            && !area.cells().any(|c| level.is_vault(c))
        {
            place_pool(level, liquid, area, rng);
            pools += 1;
        }
    }
    pools
}

/// Fill a rounded pool inside `area`, touching only floor
fn place_pool(level: &mut Level, liquid: Feature, area: Rect, rng: &mut GameRng) {
    let (x1, y1, x2, y2) = (area.tl.x, area.tl.y, area.br.x, area.br.y);
    if x1 >= x2 - 4 || y1 >= y2 - 4 {
        return;
    }
    let mut left = x1 + 2 + rng.rn2(x2 - x1);
    let mut right = x2 - 2 - rng.rn2(x2 - x1);

    for y in y1 + 1..y2 - 1 {
        for x in x1 + 1..x2 - 1 {
            let c = Coord::new(x, y);
            if x >= left && x <= right && may_overwrite(level, c) && level.feature(c) == Feature::Floor {
                level.set_feature(c, liquid);
            }
        }
        let upper_half = y - y1 < (y2 - y1) / 2;
        if upper_half || rng.one_in(4) {
            if left > x1 + 1 {
                left -= rng.rn2(3);
            }
            if right < x2 - 1 {
                right += rng.rn2(3);
            }
        }
        if left < x2 - 1 && (!upper_half || left <= x1 + 2 || rng.one_in(4)) {
            left += rng.rn2(3);
        }
        if right > x1 + 1 && (!upper_half || right >= x2 - 2 || rng.one_in(4)) {
            right -= rng.rn2(3);
        }
    }
}
