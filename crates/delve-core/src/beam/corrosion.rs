//! Acid corrosion of carried items

use tracing::debug;

use crate::item::Item;
use crate::logging::BEAM_TARGET;
use crate::rng::GameRng;

/// Percent chance an item at `rust` resists one acid tick
///
/// `2 + (4 << r) + 8r` with `r = -rust`: 6, 18, 34, 58, 98.
pub fn resist_chance(rust: i8) -> i32 {
    let r = i32::from(rust).clamp(-4, 0).abs();
    2 + (4 << r) + 8 * r
}

/// Deepest rust an acid of this strength can reach
pub fn rust_limit(strength: i32) -> i8 {
    let limit = -(1 + strength.max(0) / 5);
    limit.max(i32::from(i8::MIN)) as i8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrosionOutcome {
    /// Not corrodible, an artefact, or the holder resists corrosion
    Immune,
    Resisted,
    /// Already as corroded as this acid can make it
    AtLimit,
    Corroded { rust: i8 },
}

/// Expose one item to one tick of acid
pub fn corrode_item(
    item: &mut Item,
    strength: i32,
    holder_resists: bool,
    rng: &mut GameRng,
) -> CorrosionOutcome {
    if !item.class.is_corrodible() || item.artefact || holder_resists {
        return CorrosionOutcome::Immune;
    }
    if item.dwarven && !rng.one_in(5) {
        return CorrosionOutcome::Resisted;
    }
    if item.rust <= rust_limit(strength) {
        return CorrosionOutcome::AtLimit;
    }
    if rng.percent(resist_chance(item.rust)) {
        return CorrosionOutcome::Resisted;
    }
    item.rust -= 1;
    debug!(target: BEAM_TARGET, item = %item.name, rust = item.rust, "item corroded");
    CorrosionOutcome::Corroded { rust: item.rust }
}

/// Corrode one random carried item; `None` when nothing is carried
pub fn corrode_random_item(
    items: &mut [Item],
    strength: i32,
    holder_resists: bool,
    rng: &mut GameRng,
) -> Option<(usize, CorrosionOutcome)> {
    if items.is_empty() {
        return None;
    }
    let idx = rng.rn2(items.len() as i32) as usize;
    let outcome = corrode_item(&mut items[idx], strength, holder_resists, rng);
    Some((idx, outcome))
}
