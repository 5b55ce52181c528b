//! Player and monster state as seen by the beam engine
//!
//! The core reads defences and resistances through [`Actor`] and changes
//! state only through its mutators.

mod monster;
mod player;
mod status;

pub use monster::{Monster, MonsterId, MonsterSpec};
pub use player::Player;
pub use status::{Status, StatusSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::Coord;
use crate::item::Item;

/// Magic resistance value that no enchantment gets through
pub const MR_IMMUNE: i32 = 5000;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Attitude {
    #[default]
    Hostile,
    Neutral,
    Friendly,
}

impl Attitude {
    /// Whether two sides count as allies
    pub fn aligned_with(self, other: Attitude) -> bool {
        self == other
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Holiness {
    #[default]
    Natural,
    Undead,
    Demonic,
    Holy,
    Nonliving,
}

impl Holiness {
    pub const fn is_evil(&self) -> bool {
        matches!(self, Holiness::Undead | Holiness::Demonic)
    }
}

/// Resistance channels read by flavoured damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum ResistKind {
    Fire,
    Cold,
    Elec,
    Poison,
    Negative,
    Acid,
}

/// Resistance levels; negative means vulnerable, 3 or more means immune
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Resistances {
    pub fire: i8,
    pub cold: i8,
    pub elec: i8,
    pub poison: i8,
    pub negative: i8,
    pub acid: i8,
}

impl Resistances {
    pub fn level(&self, kind: ResistKind) -> i32 {
        i32::from(match kind {
            ResistKind::Fire => self.fire,
            ResistKind::Cold => self.cold,
            ResistKind::Elec => self.elec,
            ResistKind::Poison => self.poison,
            ResistKind::Negative => self.negative,
            ResistKind::Acid => self.acid,
        })
    }

    pub fn with(mut self, kind: ResistKind, level: i8) -> Self {
        match kind {
            ResistKind::Fire => self.fire = level,
            ResistKind::Cold => self.cold = level,
            ResistKind::Elec => self.elec = level,
            ResistKind::Poison => self.poison = level,
            ResistKind::Negative => self.negative = level,
            ResistKind::Acid => self.acid = level,
        }
        self
    }
}

/// Anything a beam can hit
pub trait Actor {
    /// Name as used in messages, e.g. "the goblin" or "you"
    fn name(&self) -> String;
    fn is_player(&self) -> bool;
    fn pos(&self) -> Coord;
    fn hp(&self) -> i32;
    fn max_hp(&self) -> i32;
    /// Hit dice for monsters, experience level for the player
    fn hit_dice(&self) -> i32;
    fn armour_class(&self) -> i32;
    fn evasion(&self) -> i32;
    fn magic_resistance(&self) -> i32;
    fn resist(&self, kind: ResistKind) -> i32;
    fn holiness(&self) -> Holiness;
    fn attitude(&self) -> Attitude;

    /// Percent chance to block a bolt with a shield
    fn shield_block_chance(&self) -> i32 {
        0
    }

    /// 0 none, 1 repel missiles, 2 deflect missiles
    fn missile_deflection(&self) -> u8 {
        0
    }

    fn is_submerged(&self) -> bool {
        false
    }

    /// Allies worth a confirmation prompt before firing through them
    fn is_notable(&self) -> bool {
        false
    }

    fn res_corrosion(&self) -> bool {
        false
    }

    /// Subtract hit points; returns true if this killed the actor
    fn apply_damage(&mut self, amount: i32) -> bool;
    fn has_status(&self, status: Status) -> bool;
    fn apply_status(&mut self, status: Status, turns: i32);
    /// Returns true if the status was present
    fn remove_status(&mut self, status: Status) -> bool;
    /// Permanently lose levels and maximum hit points
    fn drain(&mut self, levels: i32, max_hp_loss: i32);
    fn move_to(&mut self, pos: Coord);

    fn carried_items_mut(&mut self) -> &mut [Item] {
        &mut []
    }

    fn is_alive(&self) -> bool {
        self.hp() > 0
    }
}
