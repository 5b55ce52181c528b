//! Beam flavours and their resistance rules

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::actor::{Actor, Holiness, ResistKind};
use crate::dungeon::{CloudKind, Feature};

/// Damage or status type carried by a beam
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Flavour {
    /// Plain physical damage
    #[default]
    Normal,
    /// Raw magic, nothing resists it
    Magic,
    Fire,
    Cold,
    Electricity,
    Poison,
    Negative,
    Acid,
    /// Half fire, half irresistible
    Lava,
    /// Half cold, half irresistible
    Ice,
    Holy,
    Hellfire,
    /// Disintegration: irresistible and wall-destroying with enough dice
    Disintegration,
    /// Destroys anything that is not permanent
    Nuke,
    Pain,
    /// Halves current hit points
    PainAgony,
    Slow,
    Haste,
    Paralysis,
    Confusion,
    Sleep,
    Petrify,
    Teleport,
    Polymorph,
    Banish,
    Digging,
}

/// How resistance changed a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResistNote {
    None,
    Resisted,
    Immune,
    Vulnerable,
}

impl Flavour {
    /// Status-type flavours that use the enchantment rules
    pub const fn is_enchantment(&self) -> bool {
        matches!(
            self,
            Flavour::PainAgony
                | Flavour::Slow
                | Flavour::Haste
                | Flavour::Paralysis
                | Flavour::Confusion
                | Flavour::Sleep
                | Flavour::Petrify
                | Flavour::Teleport
                | Flavour::Polymorph
                | Flavour::Banish
                | Flavour::Digging
        )
    }

    /// Whether the target gets a magic-resistance check
    pub const fn has_saving_throw(&self) -> bool {
        match self {
            Flavour::Haste | Flavour::Digging => false,
            Flavour::Pain => true,
            f => f.is_enchantment(),
        }
    }

    /// Only affects the living
    pub const fn is_pain(&self) -> bool {
        matches!(self, Flavour::Pain | Flavour::PainAgony)
    }

    /// Good for whoever it hits
    pub const fn is_beneficial(&self) -> bool {
        matches!(self, Flavour::Haste)
    }

    pub const fn resist_kind(&self) -> Option<ResistKind> {
        match self {
            Flavour::Fire | Flavour::Lava => Some(ResistKind::Fire),
            Flavour::Cold | Flavour::Ice => Some(ResistKind::Cold),
            Flavour::Electricity => Some(ResistKind::Elec),
            Flavour::Poison => Some(ResistKind::Poison),
            Flavour::Negative => Some(ResistKind::Negative),
            Flavour::Acid => Some(ResistKind::Acid),
            _ => None,
        }
    }

    /// Percentage of the damage no resistance reduces
    pub const fn irresistible_percent(&self) -> i32 {
        match self {
            Flavour::Lava | Flavour::Ice => 50,
            _ => 0,
        }
    }

    /// Resists that are all-or-nothing get an extra divisor step
    const fn resist_bonus(&self) -> i32 {
        match self {
            Flavour::Electricity | Flavour::Poison => 1,
            _ => 0,
        }
    }

    /// Armour does nothing against these
    pub const fn ignores_ac(&self) -> bool {
        matches!(
            self,
            Flavour::Magic | Flavour::Negative | Flavour::Holy | Flavour::Pain | Flavour::PainAgony
        )
    }

    /// Whether the flavour reflects off this wall
    pub const fn bounces_off(&self, f: Feature) -> bool {
        match self {
            Flavour::Electricity => f.is_wall() && !f.is_metal(),
            Flavour::Fire | Flavour::Cold => f.is_crystal(),
            _ => false,
        }
    }

    /// Cloud left behind by a big-cloud beam of this flavour
    pub const fn cloud(&self) -> Option<CloudKind> {
        match self {
            Flavour::Fire | Flavour::Hellfire => Some(CloudKind::Fire),
            Flavour::Cold | Flavour::Ice => Some(CloudKind::Cold),
            Flavour::Poison => Some(CloudKind::Poison),
            Flavour::Negative => Some(CloudKind::Miasma),
            _ => None,
        }
    }
}

/// Scale a resistible amount by a resistance level
///
/// Positive levels divide by `1 + bonus + r*r` and level 3 or more is
/// immunity; negative levels multiply by 3/2.
pub fn resist_adjust(amount: i32, level: i32, bonus: i32) -> i32 {
    if level >= 3 {
        0
    } else if level > 0 {
        amount / (1 + bonus + level * level)
    } else if level < 0 {
        amount * 3 / 2
    } else {
        amount
    }
}

/// Damage after the flavour's resistance rules, without side effects
pub fn flavoured_damage(target: &dyn Actor, flavour: Flavour, raw: i32) -> (i32, ResistNote) {
    let raw = raw.max(0);
    if flavour.is_pain() && !is_living(target) {
        return (0, ResistNote::Immune);
    }
    match flavour {
        Flavour::Holy => {
            let h = target.holiness();
            if h == Holiness::Holy {
                (0, ResistNote::Immune)
            } else if h.is_evil() {
                (raw * 3 / 2, ResistNote::Vulnerable)
            } else {
                (raw / 2, ResistNote::Resisted)
            }
        }
        Flavour::PainAgony => (target.hp() / 2, ResistNote::None),
        _ => match flavour.resist_kind() {
            Some(kind) => {
                let level = target.resist(kind);
                let fixed = raw * flavour.irresistible_percent() / 100;
                let resistible = raw - fixed;
                let total = fixed + resist_adjust(resistible, level, flavour.resist_bonus());
                let note = if total == 0 && raw > 0 {
                    ResistNote::Immune
                } else if level > 0 {
                    ResistNote::Resisted
                } else if level < 0 {
                    ResistNote::Vulnerable
                } else {
                    ResistNote::None
                };
                (total, note)
            }
            None => (raw, ResistNote::None),
        },
    }
}

pub fn is_living(target: &dyn Actor) -> bool {
    !matches!(target.holiness(), Holiness::Undead | Holiness::Nonliving)
        && target.resist(ResistKind::Negative) < 3
}
