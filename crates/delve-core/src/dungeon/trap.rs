//! Traps placed by the level builder

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::Coord;
use crate::rarity::{DepthEntry, DepthPicker, DistribShape};
use crate::rng::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum TrapKind {
    Dart,
    Arrow,
    Spear,
    Net,
    Alarm,
    Teleport,
    Blade,
    Shaft,
    Zot,
}

impl TrapKind {
    /// Traps that drop the victim to another level
    pub const fn is_shaft(&self) -> bool {
        matches!(self, TrapKind::Shaft)
    }

    /// Depth-weighted trap choice; shafts only where `allow_shaft`
    pub fn random_for_depth(depth: i32, allow_shaft: bool, rng: &mut GameRng) -> TrapKind {
        let picker = DepthPicker::new(vec![
            DepthEntry::new(TrapKind::Dart, 1, 14, 30, DistribShape::Down),
            DepthEntry::new(TrapKind::Arrow, 1, 27, 30, DistribShape::Flat),
            DepthEntry::new(TrapKind::Spear, 4, 27, 20, DistribShape::Semi),
            DepthEntry::new(TrapKind::Net, 4, 27, 15, DistribShape::Flat),
            DepthEntry::new(TrapKind::Alarm, 3, 27, 10, DistribShape::Flat),
            DepthEntry::new(TrapKind::Teleport, 5, 28, 15, DistribShape::Flat),
            DepthEntry::new(TrapKind::Blade, 10, 28, 20, DistribShape::Up),
            DepthEntry::new(TrapKind::Shaft, 3, 26, 10, DistribShape::Flat),
            DepthEntry::new(TrapKind::Zot, 18, 28, 10, DistribShape::Up),
        ]);
        picker
            .pick_filtered(depth, rng, |kind| allow_shaft || !kind.is_shaft())
            .copied()
            .unwrap_or(TrapKind::Dart)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub pos: Coord,
    pub kind: TrapKind,
}
