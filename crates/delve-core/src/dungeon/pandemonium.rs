//! Pandemonium levels: open ground, metal blocks, a demon vault and portals

use tracing::debug;

use super::feature::Feature;
use super::level::Level;
use super::mask::MapMask;
use super::place::{VaultPosition, place_vault};
use super::vault::{VaultCatalogue, VaultTags};
use crate::actor::{Holiness, MonsterSpec};
use crate::config::GenOptions;
use crate::consts::{GXM, GYM};
use crate::errors::VetoReason;
use crate::geom::{Coord, Rect};
use crate::logging::GEN_TARGET;
use crate::rarity::pick_weighted;
use crate::rng::GameRng;

const DEMONS: [((&str, i32), i32); 6] = [
    (("imp", 4), 10),
    (("hellion", 7), 8),
    (("ice fiend", 18), 3),
    (("pit fiend", 18), 3),
    (("tormentor", 9), 6),
    (("reaper", 14), 4),
];

/// Build a pandemonium level
///
/// Always has at least one transit portal onward; an exit portal appears
/// one time in three.
pub fn build_pandemonium(
    level: &mut Level,
    catalogue: &VaultCatalogue,
    opts: &GenOptions,
    rng: &mut GameRng,
) -> Result<(), VetoReason> {
    level.reset();
    let ground = Rect::new(Coord::new(8, 8), Coord::new(GXM - 9, GYM - 9));
    level.grid.fill_rect(ground, Feature::Floor);

    let blocks = 40 + rng.rn2(40);
    for _ in 0..blocks {
        let tl = Coord::new(10 + rng.rn2(GXM - 30), 10 + rng.rn2(GYM - 30));
        let b = Rect::new(tl, tl + Coord::new(1 + rng.rn2(6), 1 + rng.rn2(6)));
        if ground.inflate(-1).contains(b.br) && level.grid.count_not_in_rect(b.inflate(1), Feature::Floor) == 0 {
            level.grid.fill_rect(b, Feature::MetalWall);
        }
    }

    let depth = level.id.absolute_depth();
    let map = catalogue
        .pick(depth, VaultTags::PAN, VaultTags::empty(), rng)
        .ok_or_else(|| VetoReason::MandatoryVaultFailed {
            vault: "pandemonium vault".to_string(),
        })?;
    place_vault(level, map, VaultPosition::Float, false, opts, rng).map_err(|_| {
        VetoReason::MandatoryVaultFailed {
            vault: map.name.clone(),
        }
    })?;

    let mut portals = vec![Feature::TransitPandemonium];
    if rng.coinflip() {
        portals.push(Feature::TransitPandemonium);
    }
    if rng.one_in(3) {
        portals.push(Feature::ExitPandemonium);
    }
    for portal in portals {
        let spot = level
            .random_floor(rng, MapMask::VAULT)
            .ok_or(VetoReason::MissingStairs { feature: portal })?;
        level.set_feature(spot, portal);
    }

    let demons = 10 + rng.rn2(10);
    for _ in 0..demons {
        let Some(&(kind, hd)) = pick_weighted(&DEMONS, rng) else {
            break;
        };
        let spec = MonsterSpec::new(kind, hd)
            .with_holiness(Holiness::Demonic)
            .awake(true);
        if let Some(spot) = level.random_cell_where(rng, |level, c| {
            level.can_hold_monster(c) && !level.has_mask(c, MapMask::NO_MONS)
        }) {
            level.spawn_monster(&spec, spot);
        }
    }

    debug!(target: GEN_TARGET, vault = %map.name, monsters = level.monsters.len(), "pandemonium built");
    Ok(())
}
