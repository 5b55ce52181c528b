//! Vault placement engine
//!
//! Placement runs in five steps: choose a position, validate it, paint
//! the glyphs and contents, pick exits, and dig away from each exit.

use tracing::debug;

use super::dig::dig_away_from_vault;
use super::feature::{Feature, God};
use super::level::Level;
use super::mask::MapMask;
use super::shop::{ShopInfo, ShopKind};
use super::trap::TrapKind;
use super::vault::{GlyphSpec, VaultId, VaultMap, VaultPlacement, VaultTags};
use crate::actor::MonsterSpec;
use crate::config::GenOptions;
use crate::consts::{GXM, GYM, MAPGEN_BORDER};
use crate::errors::PlacementError;
use crate::geom::{Coord, Rect, in_map_bounds};
use crate::item::ItemSpec;
use crate::logging::VAULT_TARGET;
use crate::rng::GameRng;

/// Where a vault should go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultPosition {
    /// Anywhere suitable
    Float,
    /// Top-left corner fixed by the caller
    At(Coord),
}

/// Level cells covered by non-transparent glyphs at `pos`
fn footprint(map: &VaultMap, pos: Coord) -> impl Iterator<Item = (Coord, char)> + '_ {
    map.cells()
        .filter(|(_, g)| !matches!(map.spec_for(*g), Some(GlyphSpec::Transparent)))
        .map(move |(rel, g)| (pos + rel, g))
}

/// Whether every painted cell may be overwritten
///
/// Returns the first offending cell.
pub fn check_safe_place(level: &Level, map: &VaultMap, pos: Coord) -> Result<(), Coord> {
    let water_ok = map.has_tag(VaultTags::WATER_OK);
    for (c, _) in footprint(map, pos) {
        if !in_map_bounds(c)
            || !level.mask[c].is_empty()
            || !level.feature(c).is_overwritable(water_ok)
            || level.has_items_at(c)
            || level.monster_at(c).is_some()
        {
            return Err(c);
        }
    }
    Ok(())
}

/// Whether the footprint overlaps or borders existing traversable terrain
pub fn touches_level(level: &Level, map: &VaultMap, pos: Coord) -> bool {
    footprint(map, pos).any(|(c, _)| {
        level.is_traversable(c) || c.neighbours().any(|n| level.is_traversable(n))
    })
}

/// Place a vault on the level
///
/// Encompass vaults wipe the level first and are refused unless
/// `allow_encompass` is set. Floating vaults are tried at up to
/// `opts.max_vault_tries` random positions.
pub fn place_vault(
    level: &mut Level,
    map: &VaultMap,
    position: VaultPosition,
    allow_encompass: bool,
    opts: &GenOptions,
    rng: &mut GameRng,
) -> Result<VaultId, PlacementError> {
    let name = map.name.clone();
    let size = map.size();

    if map.has_tag(VaultTags::ENCOMPASS) {
        if !allow_encompass {
            return Err(PlacementError::EncompassNotPermitted { vault: name });
        }
        debug!(target: VAULT_TARGET, vault = %name, "encompass vault replaces level");
        level.reset();
        let pos = Coord::new((GXM - size.x).max(0) / 2, (GYM - size.y).max(0) / 2);
        return Ok(paint_vault(level, map, pos, opts, rng, false));
    }

    let needs_contact = !map.has_tag(VaultTags::CLOBBER);
    let pos = match position {
        VaultPosition::At(pos) => {
            check_safe_place(level, map, pos)
                .map_err(|at| PlacementError::Collision { vault: name.clone(), at })?;
            if needs_contact && !touches_level(level, map, pos) {
                return Err(PlacementError::Disconnected { vault: name, at: pos });
            }
            pos
        }
        VaultPosition::Float => {
            let margin = MAPGEN_BORDER * 2;
            let (max_x, max_y) = (GXM - margin - size.x, GYM - margin - size.y);
            if max_x < margin || max_y < margin {
                return Err(PlacementError::NoValidPosition { vault: name, tries: 0 });
            }
            let found = (0..opts.max_vault_tries).find_map(|_| {
                let pos = Coord::new(
                    rng.random_range(margin, max_x),
                    rng.random_range(margin, max_y),
                );
                let ok = check_safe_place(level, map, pos).is_ok()
                    && (!needs_contact || touches_level(level, map, pos));
                ok.then_some(pos)
            });
            match found {
                Some(pos) => pos,
                None => {
                    return Err(PlacementError::NoValidPosition {
                        vault: name,
                        tries: opts.max_vault_tries,
                    });
                }
            }
        }
    };

    debug!(target: VAULT_TARGET, vault = %name, x = pos.x, y = pos.y, "placing vault");
    Ok(paint_vault(level, map, pos, opts, rng, true))
}

/// Paint terrain, masks and contents, then pick exits and connect them
fn paint_vault(
    level: &mut Level,
    map: &VaultMap,
    pos: Coord,
    opts: &GenOptions,
    rng: &mut GameRng,
    connect: bool,
) -> VaultId {
    let id = level.next_vault_id();
    let depth = level.id.absolute_depth();
    let tags = map.tags;

    let mut flags = MapMask::VAULT;
    if tags.contains(VaultTags::NO_MONSTER_GEN) {
        flags |= MapMask::NO_MONS;
    }
    if tags.contains(VaultTags::NO_ITEM_GEN) {
        flags |= MapMask::NO_ITEM;
    }
    if !tags.contains(VaultTags::TRANSPARENT) {
        flags |= MapMask::OPAQUE;
    }

    let mut cells = Vec::new();
    let mut marked_exits = Vec::new();
    let mut contents = Vec::new();
    for (c, glyph) in footprint(map, pos) {
        if !level.grid.contains(c) {
            continue;
        }
        let Some(spec) = map.spec_for(glyph) else {
            continue;
        };
        let Some(mut feature) = spec.base_feature() else {
            continue;
        };
        if tags.contains(VaultTags::DIS)
            && matches!(feature, Feature::RockWall | Feature::StoneWall)
        {
            feature = Feature::MetalWall;
        }
        if matches!(spec, GlyphSpec::RandomAltar) {
            feature = Feature::Altar(rng.choose(&God::TEMPLE).copied().unwrap_or_default());
        }
        level.set_feature(c, feature);
        level.mask[c] |= flags;
        level.vault_owner[c] = Some(id);
        cells.push(c);
        if matches!(spec, GlyphSpec::Exit) {
            marked_exits.push(c);
        }
        contents.push((c, spec));
    }

    let awake = tags.contains(VaultTags::GENERATE_AWAKE);
    for (c, spec) in contents {
        match spec {
            GlyphSpec::Gold => {
                level.create_item(&ItemSpec::gold(10 + rng.rn2(depth * 5 + 10)), c);
            }
            GlyphSpec::RandomItem => {
                let item = ItemSpec::random(depth, rng);
                level.create_item(&item, c);
            }
            GlyphSpec::Item(item) => {
                level.create_item(&item, c);
            }
            GlyphSpec::Monster(mon) => {
                let awake_now = awake || mon.awake;
                let mon = mon.awake(awake_now);
                level.spawn_monster(&mon, c);
            }
            GlyphSpec::RandomMonster { out_of_depth } => {
                let mon_depth = if out_of_depth { depth + 5 } else { depth };
                let mon = MonsterSpec::random_for_depth(mon_depth, rng).awake(awake);
                level.spawn_monster(&mon, c);
            }
            GlyphSpec::Trap(kind) => {
                let kind = kind.unwrap_or_else(|| TrapKind::random_for_depth(depth, false, rng));
                level.add_trap(c, kind);
            }
            GlyphSpec::Shop(kind) => {
                let kind = kind.unwrap_or_else(|| ShopKind::random(rng));
                let shop = ShopInfo::new(c, kind, depth, rng);
                level.shops.push(shop);
            }
            GlyphSpec::Feature(_)
            | GlyphSpec::Exit
            | GlyphSpec::RandomAltar
            | GlyphSpec::Transparent => {}
        }
    }

    let mut placement = VaultPlacement {
        id,
        name: map.name.clone(),
        pos,
        size: map.size(),
        tags,
        exits: Vec::new(),
        cells,
    };
    placement.exits = if marked_exits.is_empty() {
        auto_exits(level, &placement, opts.max_exits, rng)
    } else {
        marked_exits
    };

    if connect {
        let rect = placement.rect();
        for exit in &placement.exits {
            dig_away_from_vault(level, rect, *exit, rng);
        }
    }
    level.vaults.push(placement);
    id
}

fn opens_outward(level: &Level, rect: Rect, c: Coord) -> bool {
    c.neighbours()
        .any(|n| !rect.contains(n) && level.grid.contains(n) && !level.is_solid(n))
}

/// Sample exits from the vault's boundary
///
/// Candidates are traversable edge cells with non-solid ground just
/// outside the vault. A vault walled in on every side falls back to any
/// traversable edge cell, and digging connects it later. With fewer than
/// six candidates all are used; otherwise one in eight (plus one), never
/// more than `max_exits`.
pub fn auto_exits(
    level: &Level,
    placement: &VaultPlacement,
    max_exits: usize,
    rng: &mut GameRng,
) -> Vec<Coord> {
    let rect: Rect = placement.rect();
    let edge: Vec<Coord> = placement
        .cells
        .iter()
        .copied()
        .filter(|c| rect.on_edge(*c) && level.is_traversable(*c))
        .collect();
    let open: Vec<Coord> = edge
        .iter()
        .copied()
        .filter(|c| opens_outward(level, rect, *c))
        .collect();
    let mut candidates = if open.is_empty() { edge } else { open };
    let n = candidates.len();
    let wanted = if n < 6 { n } else { n / 8 + 1 }.min(max_exits);
    rng.shuffle(&mut candidates);
    candidates.truncate(wanted);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::LevelId;
    use crate::dungeon::zones::count_disconnected_zones;

    fn boxed_room() -> Level {
        let mut level = Level::new(LevelId::main_dungeon(5));
        level
            .grid
            .fill_rect(Rect::new(Coord::new(10, 10), Coord::new(60, 50)), Feature::Floor);
        level
    }

    #[test]
    fn test_forced_placement_paints_and_masks() {
        let mut level = boxed_room();
        let mut rng = GameRng::new(1);
        let map = VaultMap::new("t", &["xxx", "x.x", "x@x"]);
        let id = place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(20, 20)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        let vault = level.vault(id).unwrap();
        assert_eq!(vault.cells.len(), 9);
        assert_eq!(vault.exits, vec![Coord::new(21, 22)]);
        assert_eq!(level.feature(Coord::new(20, 20)), Feature::RockWall);
        assert!(level.mask[Coord::new(21, 21)].contains(MapMask::VAULT | MapMask::OPAQUE));
        assert_eq!(level.vault_owner[Coord::new(22, 22)], Some(id));
    }

    #[test]
    fn test_overlap_is_a_collision() {
        let mut level = boxed_room();
        let mut rng = GameRng::new(2);
        let opts = GenOptions::default();
        let map = VaultMap::new("t", &["...", "...", "..."]);
        place_vault(&mut level, &map, VaultPosition::At(Coord::new(20, 20)), false, &opts, &mut rng)
            .unwrap();
        let err = place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(22, 22)),
            false,
            &opts,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::Collision { at, .. } if at == Coord::new(22, 22)));
    }

    #[test]
    fn test_disconnected_forced_placement_refused() {
        let mut level = Level::new(LevelId::default());
        let mut rng = GameRng::new(3);
        let map = VaultMap::new("t", &["xxx", "x.x", "xxx"]);
        let err = place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(30, 30)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::Disconnected { .. }));

        // extra-pass vaults still have to touch the level
        let extra = map.clone().with_tags(VaultTags::EXTRA);
        let err = place_vault(
            &mut level,
            &extra,
            VaultPosition::At(Coord::new(30, 30)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::Disconnected { .. }));

        let clobber = map.clone().with_tags(VaultTags::CLOBBER);
        assert!(
            place_vault(
                &mut level,
                &clobber,
                VaultPosition::At(Coord::new(30, 30)),
                false,
                &GenOptions::default(),
                &mut rng
            )
            .is_ok()
        );
    }

    #[test]
    fn test_transparent_glyphs_stay_unowned() {
        let mut level = boxed_room();
        let mut rng = GameRng::new(4);
        let map = VaultMap::new("t", &[" . ", "...", " . "]);
        let id = place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(30, 30)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(level.vault(id).unwrap().cells.len(), 5);
        assert_eq!(level.vault_owner[Coord::new(30, 30)], None);
    }

    #[test]
    fn test_dis_tag_makes_metal_walls() {
        let mut level = boxed_room();
        let mut rng = GameRng::new(5);
        let map = VaultMap::new("t", &["xcx", "x.x", "x@x"]).with_tags(VaultTags::DIS);
        place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(30, 30)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(level.feature(Coord::new(30, 30)), Feature::MetalWall);
        assert_eq!(level.feature(Coord::new(31, 30)), Feature::MetalWall);
    }

    #[test]
    fn test_generate_awake_and_contents() {
        let mut level = boxed_room();
        let mut rng = GameRng::new(6);
        let map = VaultMap::new("t", &["0$*", "^A."]).with_tags(VaultTags::GENERATE_AWAKE);
        place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(30, 30)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        let mon = level.monster_at(Coord::new(30, 30)).unwrap();
        assert!(!mon.statuses.has(crate::actor::Status::Asleep));
        assert_eq!(level.items.len(), 2);
        assert!(level.trap_at(Coord::new(30, 31)).is_some());
        assert_eq!(level.shops.len(), 1);
        assert_eq!(level.feature(Coord::new(31, 31)), Feature::EnterShop);
    }

    #[test]
    fn test_encompass_needs_permission() {
        let mut level = boxed_room();
        let mut rng = GameRng::new(7);
        let map = VaultMap::new("big", &["..."]).with_tags(VaultTags::ENCOMPASS);
        let opts = GenOptions::default();
        assert!(matches!(
            place_vault(&mut level, &map, VaultPosition::Float, false, &opts, &mut rng),
            Err(PlacementError::EncompassNotPermitted { .. })
        ));
        place_vault(&mut level, &map, VaultPosition::Float, true, &opts, &mut rng).unwrap();
        assert_eq!(level.grid.count(Feature::Floor), 3);
    }

    #[test]
    fn test_float_placement_connects_to_level() {
        let mut level = Level::new(LevelId::main_dungeon(5));
        // every float position lands on open ground
        level
            .grid
            .fill_rect(Rect::new(Coord::new(3, 3), Coord::new(76, 66)), Feature::Floor);
        let mut rng = GameRng::new(8);
        let map = VaultMap::new("t", &["xxxxx", "x...x", "x...x", "xx.xx"]);
        let before = count_disconnected_zones(&level);
        let id = place_vault(
            &mut level,
            &map,
            VaultPosition::Float,
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        let vault = level.vault(id).unwrap();
        assert_eq!(vault.exits.len(), 1);
        let rect = vault.rect();
        for exit in &vault.exits {
            assert!(
                exit.neighbours()
                    .any(|n| !rect.contains(n) && level.is_traversable(n))
            );
        }
        assert!(count_disconnected_zones(&level) <= before);
    }

    #[test]
    fn test_auto_exit_count() {
        let mut level = boxed_room();
        let mut rng = GameRng::new(9);
        let map = VaultMap::new("open", &["..........", "..........", ".........."]);
        let id = place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(15, 15)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        // 22 boundary cells: 22 / 8 + 1
        assert_eq!(level.vault(id).unwrap().exits.len(), 3);
    }

    #[test]
    fn test_auto_exits_skip_sides_facing_rock() {
        let mut level = boxed_room();
        level
            .grid
            .fill_rect(Rect::new(Coord::new(10, 10), Coord::new(60, 14)), Feature::RockWall);
        let mut rng = GameRng::new(10);
        let map = VaultMap::new("open", &["..........", "..........", ".........."]);
        let id = place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(15, 15)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        let vault = level.vault(id).unwrap();
        // the eight inner top-row cells face rock: 14 / 8 + 1
        assert_eq!(vault.exits.len(), 2);
        for exit in &vault.exits {
            assert!(!(exit.y == 15 && (16..=23).contains(&exit.x)));
        }
    }

    #[test]
    fn test_walled_in_vault_still_gets_an_exit() {
        let mut level = Level::new(LevelId::default());
        let mut rng = GameRng::new(11);
        let map = VaultMap::new("t", &["...", "...", "..."]).with_tags(VaultTags::CLOBBER);
        let id = place_vault(
            &mut level,
            &map,
            VaultPosition::At(Coord::new(30, 30)),
            false,
            &GenOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(level.vault(id).unwrap().exits.len(), 1);
    }
}
