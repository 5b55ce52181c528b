//! The Abyss: a level regenerated around the player
//!
//! Each area is drawn from a five-feature composition rolled fresh from a
//! weighted palette, so one stretch of the Abyss may be mostly lava and the
//! next mostly stone. Shifting copies a window around the focus point to
//! the middle of the map and regenerates everything else.

use tracing::debug;

use super::feature::{Feature, God};
use super::level::Level;
use super::mask::MapMask;
use crate::actor::MonsterSpec;
use crate::consts::{GXM, GYM, MAPGEN_BORDER, MAX_DEPTH};
use crate::geom::{Coord, Grid, Rect};
use crate::item::ItemSpec;
use crate::logging::GEN_TARGET;
use crate::rng::GameRng;

/// Where the player stands after a shift
pub const ABYSS_CENTRE: Coord = Coord::new(GXM / 2, GYM / 2);

/// Half-width of the window kept across a shift
pub const SHIFT_RADIUS: i32 = 8;

const MAX_AREA_ITEMS: usize = 150;

/// One feature from the abyss palette
pub fn abyss_feature(rng: &mut GameRng) -> Feature {
    let roll = rng.rn2(10000);
    if roll > 4926 {
        Feature::RockWall
    } else if roll > 2918 {
        Feature::StoneWall
    } else if roll > 2004 {
        Feature::MetalWall
    } else if roll > 1282 {
        Feature::Lava
    } else if roll > 616 {
        Feature::ShallowWater
    } else if roll > 15 {
        Feature::DeepWater
    } else {
        Feature::ClosedDoor
    }
}

fn generation_area() -> Rect {
    Rect::new(
        Coord::new(MAPGEN_BORDER, MAPGEN_BORDER),
        Coord::new(GXM - MAPGEN_BORDER - 1, GYM - MAPGEN_BORDER - 1),
    )
}

/// Build a fresh abyss level with the player arriving at the centre
pub fn build_abyss(level: &mut Level, rng: &mut GameRng) {
    level.reset();
    level.grid.fill(Feature::Unseen);
    generate_area(level, generation_area(), None, rng);
    clear_arrival(level, ABYSS_CENTRE);
    populate_abyss(level, None, rng);
}

/// Fill `area` with abyssal terrain, leaving cells inside `keep` alone
///
/// Only `Unseen` cells are painted.
fn generate_area(level: &mut Level, area: Rect, keep: Option<Rect>, rng: &mut GameRng) {
    let thickness = 30 + rng.rn2(70);
    let composition: [Feature; 5] = std::array::from_fn(|_| abyss_feature(rng));
    let outside_keep = |c: Coord| keep.is_none_or(|k| !k.contains(c));

    if rng.one_in(3) {
        let rooms = 1 + rng.rn2(10);
        for _ in 0..rooms {
            let tl = Coord::new(10 + rng.rn2(GXM - 20), 10 + rng.rn2(GYM - 20));
            let room = Rect::new(tl, tl + Coord::new(rng.rn2(10), rng.rn2(10)));
            if rng.one_in(100) {
                break;
            }
            let untouched = room
                .cells()
                .all(|c| level.grid.get(c) == Some(&Feature::Unseen) && outside_keep(c));
            if untouched && area.contains(room.tl) && area.contains(room.br) {
                level.grid.fill_rect(room, Feature::Floor);
            }
        }
    }

    let mut exits_wanted = 0;
    let mut altars_wanted = 0;
    let mut items_placed = 0;
    for c in area.cells() {
        if !outside_keep(c) {
            continue;
        }
        if level.feature(c) == Feature::Unseen && rng.rn2(100) <= thickness {
            level.set_feature(c, Feature::Floor);
        }
        if level.feature(c) == Feature::Floor
            && items_placed < MAX_AREA_ITEMS
            && rng.one_in(200)
        {
            level.create_item(&ItemSpec::random(MAX_DEPTH + 1, rng), c);
            items_placed += 1;
        }
        if level.feature(c) == Feature::Unseen {
            let f = composition[rng.rn2(5) as usize];
            level.set_feature(c, f);
        }

        if rng.one_in(7500) {
            exits_wanted += 1;
        }
        if exits_wanted > 0 && !level.has_items_at(c) {
            level.set_feature(c, Feature::ExitAbyss);
            exits_wanted -= 1;
        }
        if rng.one_in(10000) {
            altars_wanted += 1;
        }
        if altars_wanted > 0 && level.feature(c) == Feature::Floor && !level.has_items_at(c) {
            level.set_feature(c, Feature::Altar(God::Lugonu));
            altars_wanted -= 1;
        }
    }
}

fn clear_arrival(level: &mut Level, at: Coord) {
    level.set_feature(at, Feature::Floor);
    for n in at.neighbours() {
        if level.grid.contains(n) && level.is_solid(n) {
            level.set_feature(n, Feature::Floor);
        }
    }
}

fn populate_abyss(level: &mut Level, keep: Option<Rect>, rng: &mut GameRng) {
    let wanted = 7 + rng.rn2(5);
    for _ in 0..wanted {
        let spot = level.random_cell_where(rng, |level, c| {
            level.can_hold_monster(c)
                && c.distance_to(ABYSS_CENTRE) > SHIFT_RADIUS
                && keep.is_none_or(|k| !k.contains(c))
        });
        let Some(spot) = spot else {
            break;
        };
        let spec = MonsterSpec::random_for_depth(MAX_DEPTH + 1, rng).awake(true);
        level.spawn_monster(&spec, spot);
    }
}

/// Move the area around `focus` to the centre and regenerate the rest
///
/// Terrain, monsters, items and clouds inside the window travel with it;
/// everything outside is discarded. Returns the focus point's new position.
pub fn shift_abyss(level: &mut Level, focus: Coord, rng: &mut GameRng) -> Coord {
    let offset = ABYSS_CENTRE - focus;
    let window = Rect::new(
        focus - Coord::new(SHIFT_RADIUS, SHIFT_RADIUS),
        focus + Coord::new(SHIFT_RADIUS, SHIFT_RADIUS),
    );
    let kept = Rect::new(window.tl + offset, window.br + offset);

    let mut grid = Grid::new(GXM, GYM, Feature::Unseen);
    for c in window.cells() {
        if let Some(f) = level.grid.get(c) {
            grid[c + offset] = *f;
        }
    }
    level.grid = grid;
    level.mask.fill(MapMask::empty());
    level.vault_owner.fill(None);
    level.vaults.clear();

    level.monsters.retain(|m| window.contains(m.pos));
    for m in &mut level.monsters {
        m.pos += offset;
    }
    level
        .items
        .retain(|i| i.pos.is_some_and(|p| window.contains(p)));
    for item in &mut level.items {
        item.pos = item.pos.map(|p| p + offset);
    }
    level.clouds = std::mem::take(&mut level.clouds)
        .into_iter()
        .filter(|(pos, _)| window.contains(*pos))
        .map(|(pos, cloud)| (pos + offset, cloud))
        .collect();
    level.traps.clear();

    generate_area(level, generation_area(), Some(kept), rng);
    // Parts of the window that fell off the map
    for c in level.grid.coords() {
        if level.feature(c) == Feature::Unseen {
            level.set_feature(c, Feature::RockWall);
        }
    }
    populate_abyss(level, Some(kept), rng);

    debug!(target: GEN_TARGET, ?focus, monsters = level.monsters.len(), "abyss shifted");
    ABYSS_CENTRE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{LevelId, LevelType};

    fn abyss_level() -> Level {
        Level::new(LevelId::special(LevelType::Abyss, 1))
    }

    #[test]
    fn test_palette_frequencies() {
        let mut rng = GameRng::new(1);
        let n = 20_000;
        let rock = (0..n)
            .filter(|_| abyss_feature(&mut rng) == Feature::RockWall)
            .count();
        // 5073 in 10000
        assert!(rock > 9_700 && rock < 10_600, "{rock}");
    }

    #[test]
    fn test_build_abyss_fills_everything() {
        let mut rng = GameRng::new(2);
        let mut level = abyss_level();
        build_abyss(&mut level, &mut rng);
        let area = generation_area();
        assert!(area.cells().all(|c| level.feature(c) != Feature::Unseen));
        assert_eq!(level.feature(ABYSS_CENTRE), Feature::Floor);
        assert!(!level.monsters.is_empty());
    }

    #[test]
    fn test_shift_keeps_the_window() {
        let mut rng = GameRng::new(3);
        let mut level = abyss_level();
        build_abyss(&mut level, &mut rng);

        let focus = Coord::new(20, 20);
        level.set_feature(focus + Coord::new(1, 0), Feature::Fountain);
        let item = level.create_item(&ItemSpec::gold(5), focus + Coord::new(0, 2));
        let far = level.create_item(&ItemSpec::gold(5), Coord::new(70, 60));

        let moved = shift_abyss(&mut level, focus, &mut rng);
        assert_eq!(moved, ABYSS_CENTRE);
        assert_eq!(level.feature(ABYSS_CENTRE + Coord::new(1, 0)), Feature::Fountain);
        let kept = level.items.iter().find(|i| i.id == item).map(|i| i.pos);
        assert_eq!(kept, Some(Some(ABYSS_CENTRE + Coord::new(0, 2))));
        assert!(level.items.iter().all(|i| i.id != far));
        assert!(level.grid.iter().all(|(_, f)| *f != Feature::Unseen));
    }

    #[test]
    fn test_shift_moves_monsters() {
        let mut rng = GameRng::new(4);
        let mut level = abyss_level();
        build_abyss(&mut level, &mut rng);
        level.monsters.clear();
        let focus = Coord::new(30, 30);
        let near = focus + Coord::new(-2, 3);
        level.set_feature(near, Feature::Floor);
        let id = level
            .spawn_monster(&MonsterSpec::new("imp", 3), near)
            .expect("floor cell");
        shift_abyss(&mut level, focus, &mut rng);
        let m = level.monster(id).expect("monster kept");
        assert_eq!(m.pos, ABYSS_CENTRE + Coord::new(-2, 3));
    }
}
