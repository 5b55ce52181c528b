//! Late builder stages: entrances, traps, fog, items, monsters, shops,
//! altars and the final stair and border fixup

use tracing::debug;

use super::branch::Branch;
use super::cloud::Cloud;
use super::feature::{Feature, God};
use super::level::Level;
use super::mask::MapMask;
use super::shop::{ShopInfo, ShopKind, shop_count};
use super::trap::TrapKind;
use crate::actor::MonsterSpec;
use crate::consts::{GXM, GYM};
use crate::errors::VetoReason;
use crate::geom::Coord;
use crate::item::ItemSpec;
use crate::logging::GEN_TARGET;
use crate::rng::GameRng;

/// Put `f` on a random floor cell outside vaults
fn place_on_floor(level: &mut Level, f: Feature, rng: &mut GameRng) -> Result<Coord, VetoReason> {
    let spot = level
        .random_floor(rng, MapMask::VAULT)
        .ok_or(VetoReason::MissingStairs { feature: f })?;
    level.set_feature(spot, f);
    Ok(spot)
}

/// Entrances to child branches, plus the occasional portal
pub fn place_branch_entrances(level: &mut Level, rng: &mut GameRng) -> Result<usize, VetoReason> {
    let mut placed = 0;
    for child in level.id.branch.children_at(level.id.depth) {
        place_on_floor(level, Feature::EnterBranch(child), rng)?;
        placed += 1;
    }

    let depth = level.id.absolute_depth();
    let mut portals = Vec::new();
    if level.id.branch == Branch::Dungeon {
        if (10..=24).contains(&depth) && rng.one_in(24) {
            portals.push(Feature::EnterLabyrinth);
        }
        if depth > 20 && rng.one_in(10) {
            portals.push(Feature::EnterAbyss);
        }
    }
    if depth > 23 && rng.one_in(12) {
        portals.push(Feature::EnterPandemonium);
    }
    for portal in portals {
        if place_on_floor(level, portal, rng).is_ok() {
            placed += 1;
        }
    }
    Ok(placed)
}

/// Traps on random floor; no shafts on a branch's bottom level
pub fn place_traps(level: &mut Level, rng: &mut GameRng) -> usize {
    let depth = level.id.absolute_depth();
    let allow_shaft = !level.id.is_branch_bottom();
    let wanted = rng.random2avg(9, 2);
    let mut placed = 0;
    for _ in 0..wanted {
        let Some(spot) = level.random_floor(rng, MapMask::VAULT) else {
            break;
        };
        level.add_trap(spot, TrapKind::random_for_depth(depth, allow_shaft, rng));
        placed += 1;
    }
    placed
}

/// One to three fog machines, from depth 4
pub fn place_fog_machines(level: &mut Level, rng: &mut GameRng) -> usize {
    if level.id.absolute_depth() < 4 || !rng.one_in(6) {
        return 0;
    }
    let wanted = 1 + rng.rn2(3);
    let mut placed = 0;
    for _ in 0..wanted {
        if let Some(spot) = level.random_floor(rng, MapMask::VAULT) {
            level.add_cloud(spot, Cloud::fog_machine());
            placed += 1;
        }
    }
    placed
}

pub fn place_items(level: &mut Level, rng: &mut GameRng) -> usize {
    let depth = level.id.absolute_depth();
    let mut wanted = 3 + rng.roll_dice(3, 11);
    if rng.one_in(500) {
        // treasure level
        wanted += 10 + rng.random2avg(90, 2);
    }
    let mut placed = 0;
    for _ in 0..wanted {
        let Some(spot) = level.random_floor(rng, MapMask::VAULT | MapMask::NO_ITEM) else {
            break;
        };
        level.create_item(&ItemSpec::random(depth, rng), spot);
        placed += 1;
    }
    placed
}

/// Random monsters, kept away from the up stairs
pub fn place_monsters(level: &mut Level, rng: &mut GameRng) -> usize {
    let depth = level.id.absolute_depth();
    let mut wanted = 3 + rng.roll_dice(3, 10);
    if depth <= 1 {
        wanted /= 2;
    }
    let arrivals = level.up_stairs();
    let mut placed = 0;
    for _ in 0..wanted {
        let spot = level.random_cell_where(rng, |level, c| {
            level.feature(c) == Feature::Floor
                && !level.has_mask(c, MapMask::VAULT | MapMask::NO_MONS)
                && level.can_hold_monster(c)
                && arrivals.iter().all(|a| a.distance_to(c) > 5)
        });
        let Some(spot) = spot else {
            break;
        };
        let spec = MonsterSpec::random_for_depth(depth, rng);
        if level.spawn_monster(&spec, spot).is_some() {
            placed += 1;
        }
    }
    placed
}

pub fn place_shops(level: &mut Level, rng: &mut GameRng) -> usize {
    let depth = level.id.absolute_depth();
    let wanted = shop_count(depth, rng);
    let mut placed = 0;
    for _ in 0..wanted {
        let spot = level.random_cell_where(rng, |level, c| {
            c.x >= 10
                && c.x < GXM - 10
                && c.y >= 10
                && c.y < GYM - 10
                && level.feature(c) == Feature::Floor
                && !level.is_vault(c)
                && level.monster_index_at(c).is_none()
                && !level.has_items_at(c)
        });
        let Some(spot) = spot else {
            break;
        };
        level.set_feature(spot, Feature::EnterShop);
        let info = ShopInfo::new(spot, ShopKind::random(rng), depth, rng);
        level.shops.push(info);
        placed += 1;
    }
    placed
}

/// A random temple altar now and then
pub fn place_altars(level: &mut Level, rng: &mut GameRng) -> usize {
    if level.id.absolute_depth() < 2 || !rng.one_in(5) {
        return 0;
    }
    let Some(&god) = rng.choose(&God::TEMPLE) else {
        return 0;
    };
    match place_on_floor(level, Feature::Altar(god), rng) {
        Ok(_) => 1,
        Err(_) => 0,
    }
}

/// Exactly one of each stone stair the level should have
///
/// A branch's first level keeps a single up exit (a branch exit outside
/// the main dungeon); its bottom level has no down stairs. Duplicates turn
/// into floor and missing stairs go on random floor.
pub fn fixup_stairs(level: &mut Level, rng: &mut GameRng) -> Result<(), VetoReason> {
    let top = level.id.is_branch_top();
    let bottom = level.id.is_branch_bottom();

    let mut wanted: Vec<Feature> = Vec::with_capacity(6);
    if top {
        wanted.push(Feature::StairsUpI);
    } else {
        wanted.extend(Feature::STONE_STAIRS_UP);
    }
    if !bottom {
        wanted.extend(Feature::STONE_STAIRS_DOWN);
    }

    let all = Feature::STONE_STAIRS_UP
        .into_iter()
        .chain(Feature::STONE_STAIRS_DOWN)
        .chain([Feature::ExitBranch]);
    for f in all {
        let mut found = level.find_all(f);
        if wanted.contains(&f) {
            if found.is_empty() {
                place_on_floor(level, f, rng)?;
                continue;
            }
            let keep = rng.rn2(found.len() as i32) as usize;
            found.swap_remove(keep);
        }
        for c in found {
            level.set_feature(c, Feature::Floor);
        }
    }

    if top && level.id.branch != Branch::Dungeon {
        for c in level.find_all(Feature::StairsUpI) {
            level.set_feature(c, Feature::ExitBranch);
        }
    }
    debug!(target: GEN_TARGET, level = %level.id, ups = level.up_stairs().len(), downs = level.down_stairs().len(), "stairs fixed");
    Ok(())
}

/// Make the outermost ring permanent rock
pub fn seal_border(level: &mut Level) {
    let edge = level.grid.bounds();
    for c in edge.edge_cells() {
        level.set_feature(c, Feature::PermaRock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::LevelId;

    #[test]
    fn test_fixup_removes_duplicates_and_adds_missing() {
        let mut rng = GameRng::new(1);
        let mut level = Level::open(LevelId::main_dungeon(5));
        level.set_feature(Coord::new(5, 5), Feature::StairsUpI);
        level.set_feature(Coord::new(6, 5), Feature::StairsUpI);
        level.set_feature(Coord::new(7, 5), Feature::StairsUpI);
        fixup_stairs(&mut level, &mut rng).unwrap();
        for f in Feature::STONE_STAIRS_UP.into_iter().chain(Feature::STONE_STAIRS_DOWN) {
            assert_eq!(level.find_all(f).len(), 1, "{f}");
        }
    }

    #[test]
    fn test_branch_top_and_bottom() {
        let mut rng = GameRng::new(2);
        let mut top = Level::open(LevelId::new(Branch::Lair, 1));
        fixup_stairs(&mut top, &mut rng).unwrap();
        assert_eq!(top.up_stairs().len(), 1);
        assert_eq!(top.find_all(Feature::ExitBranch).len(), 1);
        assert_eq!(top.down_stairs().len(), 3);

        let mut bottom = Level::open(LevelId::new(Branch::OrcishMines, 4));
        bottom.set_feature(Coord::new(9, 9), Feature::StairsDownII);
        fixup_stairs(&mut bottom, &mut rng).unwrap();
        assert!(bottom.down_stairs().is_empty());
        assert_eq!(bottom.up_stairs().len(), 3);

        let mut d1 = Level::open(LevelId::main_dungeon(1));
        fixup_stairs(&mut d1, &mut rng).unwrap();
        assert_eq!(d1.find_all(Feature::StairsUpI).len(), 1);
        assert!(d1.find_all(Feature::ExitBranch).is_empty());
    }

    #[test]
    fn test_fixup_vetoes_without_floor() {
        let mut rng = GameRng::new(3);
        let mut level = Level::new(LevelId::main_dungeon(5));
        assert!(matches!(
            fixup_stairs(&mut level, &mut rng),
            Err(VetoReason::MissingStairs { .. })
        ));
    }

    #[test]
    fn test_branch_entrance_placed() {
        let mut rng = GameRng::new(4);
        let mut level = Level::open(LevelId::main_dungeon(10));
        place_branch_entrances(&mut level, &mut rng).unwrap();
        assert_eq!(level.find_all(Feature::EnterBranch(Branch::Lair)).len(), 1);
    }

    #[test]
    fn test_monsters_keep_clear_of_arrival() {
        let mut rng = GameRng::new(5);
        let mut level = Level::open(LevelId::main_dungeon(8));
        let up = Coord::new(40, 35);
        level.set_feature(up, Feature::StairsUpI);
        assert!(place_monsters(&mut level, &mut rng) > 0);
        assert!(level.monsters.iter().all(|m| m.pos.distance_to(up) > 5));
    }

    #[test]
    fn test_seal_border() {
        let mut level = Level::open(LevelId::default());
        seal_border(&mut level);
        assert_eq!(level.feature(Coord::new(0, 0)), Feature::PermaRock);
        assert_eq!(level.feature(Coord::new(GXM - 1, 10)), Feature::PermaRock);
        assert_eq!(level.feature(Coord::new(1, 1)), Feature::Floor);
    }

    #[test]
    fn test_shops_stay_inside_margin() {
        let mut level = Level::open(LevelId::main_dungeon(12));
        for seed in 0..50 {
            let mut rng = GameRng::new(seed);
            place_shops(&mut level, &mut rng);
        }
        assert!(!level.shops.is_empty());
        for shop in &level.shops {
            assert_eq!(level.feature(shop.pos), Feature::EnterShop);
            assert!(shop.pos.x >= 10 && shop.pos.x < GXM - 10);
        }
    }
}
