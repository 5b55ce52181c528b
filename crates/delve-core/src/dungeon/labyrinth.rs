//! Labyrinth levels: a recursive-backtracker maze around a treasure room

use tracing::debug;

use super::feature::Feature;
use super::level::Level;
use super::place::{VaultPosition, place_vault};
use super::vault::{VaultCatalogue, VaultTags};
use crate::actor::MonsterSpec;
use crate::config::GenOptions;
use crate::consts::{GXM, GYM};
use crate::errors::VetoReason;
use crate::geom::{Coord, ORTHOGONAL, Rect};
use crate::logging::GEN_TARGET;
use crate::rng::GameRng;

/// Maze cells live on odd coordinates between these bounds
const MAZE_MIN: i32 = 5;
const MAZE_MAX_X: i32 = GXM - 6;
const MAZE_MAX_Y: i32 = GYM - 6;

/// Where things ended up on a labyrinth level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabyrinthLayout {
    /// Arrival point, far from the centre
    pub arrival: Coord,
    /// Escape hatch inside the treasure room
    pub exit: Coord,
}

fn maze_start(rng: &mut GameRng) -> Coord {
    Coord::new(
        MAZE_MIN + 2 * rng.rn2((MAZE_MAX_X - MAZE_MIN) / 2),
        MAZE_MIN + 2 * rng.rn2((MAZE_MAX_Y - MAZE_MIN) / 2),
    )
}

/// Whether the walk may carve two steps from `c` towards `dir`
fn okay(level: &Level, c: Coord, dir: Coord) -> bool {
    let next = c + dir * 2;
    next.x >= MAZE_MIN
        && next.y >= MAZE_MIN
        && next.x < MAZE_MAX_X
        && next.y < MAZE_MAX_Y
        && level.feature(next) == Feature::RockWall
}

/// Carve a perfect maze from `start`, two cells per step
pub fn walkfrom(level: &mut Level, start: Coord, rng: &mut GameRng) {
    let mut stack = Vec::with_capacity((GXM * GYM / 4) as usize);
    stack.push(start);
    level.set_feature(start, Feature::Floor);

    while let Some(&at) = stack.last() {
        let dirs: Vec<Coord> = ORTHOGONAL
            .iter()
            .copied()
            .filter(|d| okay(level, at, *d))
            .collect();
        let Some(&dir) = rng.choose(&dirs) else {
            stack.pop();
            continue;
        };
        level.set_feature(at + dir, Feature::Floor);
        level.set_feature(at + dir * 2, Feature::Floor);
        stack.push(at + dir * 2);
    }
}

/// Knock through one wall at each dead end with an open cell behind it
pub fn remove_deadends(level: &mut Level, rng: &mut GameRng) {
    for y in (MAZE_MIN..MAZE_MAX_Y).step_by(2) {
        for x in (MAZE_MIN..MAZE_MAX_X).step_by(2) {
            let c = Coord::new(x, y);
            if level.feature(c) != Feature::Floor {
                continue;
            }
            let closed = ORTHOGONAL
                .iter()
                .filter(|d| level.is_solid(c + **d))
                .count();
            if closed < 3 {
                continue;
            }
            let through: Vec<Coord> = ORTHOGONAL
                .iter()
                .copied()
                .filter(|d| {
                    let far = c + *d * 2;
                    far.x >= MAZE_MIN
                        && far.y >= MAZE_MIN
                        && far.x < MAZE_MAX_X
                        && far.y < MAZE_MAX_Y
                        && level.is_solid(c + *d)
                        && level.feature(far) == Feature::Floor
                })
                .collect();
            if let Some(&d) = rng.choose(&through) {
                level.set_feature(c + d, Feature::Floor);
            }
        }
    }
}

/// Build the whole labyrinth level
///
/// Fails if the catalogue has no labyrinth centre or it cannot be placed.
pub fn build_labyrinth(
    level: &mut Level,
    catalogue: &VaultCatalogue,
    opts: &GenOptions,
    rng: &mut GameRng,
) -> Result<LabyrinthLayout, VetoReason> {
    level.reset();
    let start = maze_start(rng);
    walkfrom(level, start, rng);
    if rng.one_in(5) {
        remove_deadends(level, rng);
    }

    let depth = level.id.absolute_depth();
    let centre_map = catalogue
        .pick(depth, VaultTags::LABYRINTH, VaultTags::empty(), rng)
        .ok_or_else(|| VetoReason::MandatoryVaultFailed {
            vault: "labyrinth centre".to_string(),
        })?;

    // Open a plaza so the treasure room cannot cut maze passages
    let size = centre_map.size();
    let tl = Coord::new((GXM - size.x) / 2, (GYM - size.y) / 2);
    let plaza = Rect::from_size(tl, size).inflate(1);
    level.grid.fill_rect(plaza, Feature::Floor);

    let vault = place_vault(level, centre_map, VaultPosition::At(tl), false, opts, rng).map_err(|e| {
        debug!(target: GEN_TARGET, error = %e, "labyrinth centre failed");
        VetoReason::MandatoryVaultFailed {
            vault: centre_map.name.clone(),
        }
    })?;

    let floor_in_vault: Vec<Coord> = level
        .vault(vault)
        .map(|v| {
            v.cells
                .iter()
                .copied()
                .filter(|c| level.feature(*c) == Feature::Floor && !level.has_items_at(*c))
                .collect()
        })
        .unwrap_or_default();
    let exit = *rng
        .choose(&floor_in_vault)
        .ok_or_else(|| VetoReason::MissingStairs {
            feature: Feature::HatchUp,
        })?;
    level.set_feature(exit, Feature::HatchUp);

    let centre = plaza.center();
    let arrival = level
        .random_cell_where(rng, |level, c| {
            level.feature(c) == Feature::Floor
                && !level.is_vault(c)
                && c.distance_to(centre) > 20
        })
        .ok_or(VetoReason::StairsUnreachable)?;

    let minotaur = MonsterSpec::new("minotaur", 13);
    if let Some(spot) = level.random_cell_where(rng, |level, c| {
        level.can_hold_monster(c) && !level.is_vault(c) && c.distance_to(arrival) > 10
    }) {
        level.spawn_monster(&minotaur, spot);
    }

    debug!(target: GEN_TARGET, ?arrival, ?exit, "labyrinth built");
    Ok(LabyrinthLayout { arrival, exit })
}
