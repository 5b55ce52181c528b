//! Item records produced by generation and read by the beam engine

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::Coord;
use crate::rarity::pick_weighted;
use crate::rng::GameRng;

/// Stable handle for an item on a level or in an inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum ItemClass {
    Weapon,
    Armour,
    Gold,
    Potion,
    Scroll,
    Wand,
    Jewellery,
    #[default]
    Misc,
}

impl ItemClass {
    /// Classes whose items can rust or corrode
    pub const fn is_corrodible(&self) -> bool {
        matches!(self, ItemClass::Weapon | ItemClass::Armour)
    }
}

/// What to create; the concrete item is opaque to the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub class: ItemClass,
    pub name: String,
    pub quantity: i32,
}

impl ItemSpec {
    pub fn new(class: ItemClass, name: impl Into<String>) -> Self {
        Self {
            class,
            name: name.into(),
            quantity: 1,
        }
    }

    /// A level-appropriate random item
    pub fn random(depth: i32, rng: &mut GameRng) -> Self {
        const CLASSES: [(ItemClass, i32); 7] = [
            (ItemClass::Weapon, 20),
            (ItemClass::Armour, 20),
            (ItemClass::Potion, 20),
            (ItemClass::Scroll, 20),
            (ItemClass::Gold, 10),
            (ItemClass::Wand, 5),
            (ItemClass::Jewellery, 5),
        ];
        let class = pick_weighted(&CLASSES, rng)
            .copied()
            .unwrap_or(ItemClass::Misc);
        let names: &[&str] = match class {
            ItemClass::Weapon => &["dagger", "short sword", "mace", "spear", "war axe"],
            ItemClass::Armour => &["leather armour", "ring mail", "buckler", "helmet"],
            ItemClass::Potion => &["potion of curing", "potion of might", "potion of flight"],
            ItemClass::Scroll => &["scroll of teleportation", "scroll of fog", "scroll of noise"],
            ItemClass::Wand => &["wand of flame", "wand of digging", "wand of slowing"],
            ItemClass::Jewellery => &["ring of protection", "amulet of faith"],
            ItemClass::Gold => return Self::gold(rng.roll_dice(2, 10 + depth * 2)),
            ItemClass::Misc => &["stone"],
        };
        let name = rng.choose(names).copied().unwrap_or("stone");
        Self::new(class, name)
    }

    pub fn gold(amount: i32) -> Self {
        Self {
            class: ItemClass::Gold,
            name: "gold".to_string(),
            quantity: amount.max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub class: ItemClass,
    pub name: String,
    pub quantity: i32,
    /// `Some` while lying on the floor
    pub pos: Option<Coord>,
    /// Corrosion damage; 0 is pristine, more negative is worse
    pub rust: i8,
    pub artefact: bool,
    pub dwarven: bool,
}

impl Item {
    pub fn from_spec(id: ItemId, spec: &ItemSpec, pos: Option<Coord>) -> Self {
        Self {
            id,
            class: spec.class,
            name: spec.name.clone(),
            quantity: spec.quantity,
            pos,
            rust: 0,
            artefact: false,
            dwarven: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_items_are_named() {
        let mut rng = GameRng::new(21);
        for _ in 0..200 {
            let spec = ItemSpec::random(10, &mut rng);
            assert!(!spec.name.is_empty());
            assert!(spec.quantity >= 1);
        }
    }

    #[test]
    fn test_only_weapons_and_armour_corrode() {
        assert!(ItemClass::Weapon.is_corrodible());
        assert!(ItemClass::Armour.is_corrodible());
        assert!(!ItemClass::Potion.is_corrodible());
    }
}
