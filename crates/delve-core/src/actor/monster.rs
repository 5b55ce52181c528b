//! Monster records as stored on a level

use serde::{Deserialize, Serialize};

use super::{Actor, Attitude, Holiness, ResistKind, Resistances, Status, StatusSet};
use crate::geom::Coord;
use crate::consts::MAX_DEPTH;
use crate::item::Item;
use crate::rarity::{DepthEntry, DepthPicker, DistribShape};
use crate::rng::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

/// Request to spawn a monster; the level turns it into a [`Monster`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterSpec {
    pub kind: String,
    pub hit_dice: i32,
    pub holiness: Holiness,
    pub attitude: Attitude,
    pub awake: bool,
    pub unique: bool,
}

impl MonsterSpec {
    pub fn new(kind: impl Into<String>, hit_dice: i32) -> Self {
        Self {
            kind: kind.into(),
            hit_dice: hit_dice.max(1),
            holiness: Holiness::Natural,
            attitude: Attitude::Hostile,
            awake: false,
            unique: false,
        }
    }

    /// A depth-appropriate random monster
    pub fn random_for_depth(depth: i32, rng: &mut GameRng) -> Self {
        use DistribShape::{Down, Flat, Peak, Semi, Up};
        use Holiness::{Demonic, Holy, Natural, Nonliving, Undead};
        const TABLE: [(&str, i32, Holiness, i32, i32, i32, DistribShape); 17] = [
            ("rat", 1, Natural, 1, 6, 20, Down),
            ("goblin", 1, Natural, 1, 8, 20, Down),
            ("jackal", 1, Natural, 1, 7, 15, Down),
            ("kobold", 2, Natural, 1, 10, 15, Peak),
            ("hobgoblin", 3, Natural, 2, 11, 10, Semi),
            ("orc", 3, Natural, 3, 12, 15, Peak),
            ("gnoll", 4, Natural, 4, 14, 10, Peak),
            ("zombie", 4, Undead, 4, 16, 8, Flat),
            ("imp", 4, Demonic, 6, 18, 5, Semi),
            ("ogre", 6, Natural, 8, 20, 8, Peak),
            ("wraith", 8, Undead, 10, 24, 6, Peak),
            ("troll", 9, Natural, 12, 26, 6, Peak),
            ("iron golem", 12, Nonliving, 14, 28, 3, Flat),
            ("daeva", 12, Holy, 15, 28, 1, Flat),
            ("fire giant", 14, Natural, 16, 28, 5, Up),
            ("lich", 16, Undead, 20, 28, 3, Up),
            ("ice fiend", 18, Demonic, 22, 28, 2, Up),
        ];
        let picker = DepthPicker::new(
            TABLE
                .iter()
                .map(|&(kind, hd, holiness, lo, hi, rarity, shape)| {
                    DepthEntry::new((kind, hd, holiness), lo, hi, rarity, shape)
                })
                .collect(),
        );
        let depth = depth.clamp(1, MAX_DEPTH + 1);
        match picker.pick(depth, rng) {
            Some(&(kind, hd, holiness)) => Self::new(kind, hd).with_holiness(holiness),
            None => Self::new("rat", 1),
        }
    }

    pub fn with_holiness(mut self, holiness: Holiness) -> Self {
        self.holiness = holiness;
        self
    }

    pub fn with_attitude(mut self, attitude: Attitude) -> Self {
        self.attitude = attitude;
        self
    }

    pub fn awake(mut self, awake: bool) -> Self {
        self.awake = awake;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    pub kind: String,
    pub pos: Coord,
    pub hp: i32,
    pub max_hp: i32,
    pub hit_dice: i32,
    pub ac: i32,
    pub ev: i32,
    pub mr: i32,
    pub resists: Resistances,
    pub holiness: Holiness,
    pub attitude: Attitude,
    pub shield_block: i32,
    pub deflection: u8,
    pub submerged: bool,
    pub unique: bool,
    pub statuses: StatusSet,
    pub inventory: Vec<Item>,
}

impl Monster {
    /// Build a monster with stats derived from its hit dice
    pub fn from_spec(id: MonsterId, spec: &MonsterSpec, pos: Coord) -> Self {
        let hd = spec.hit_dice.max(1);
        let mut statuses = StatusSet::default();
        if !spec.awake {
            statuses.apply(Status::Asleep, 100);
        }
        let resists = match spec.holiness {
            Holiness::Undead => Resistances {
                cold: 1,
                poison: 3,
                negative: 3,
                ..Resistances::default()
            },
            Holiness::Demonic => Resistances {
                fire: 1,
                poison: 1,
                negative: 1,
                ..Resistances::default()
            },
            Holiness::Nonliving => Resistances {
                poison: 3,
                negative: 3,
                ..Resistances::default()
            },
            _ => Resistances::default(),
        };
        Self {
            id,
            kind: spec.kind.clone(),
            pos,
            hp: hd * 5,
            max_hp: hd * 5,
            hit_dice: hd,
            ac: hd / 2,
            ev: 5 + hd / 3,
            mr: hd * 5,
            resists,
            holiness: spec.holiness,
            attitude: spec.attitude,
            shield_block: 0,
            deflection: 0,
            submerged: false,
            unique: spec.unique,
            statuses,
            inventory: Vec::new(),
        }
    }
}

impl Monster {
    /// Become a different kind of monster in place
    ///
    /// Keeps identity, position, attitude and inventory; the hit point
    /// fraction carries over to the new maximum.
    pub fn polymorph_into(&mut self, spec: &MonsterSpec) {
        let fresh = Monster::from_spec(self.id, spec, self.pos);
        let fraction = (self.hp.max(1) * 100) / self.max_hp.max(1);
        self.kind = fresh.kind;
        self.hit_dice = fresh.hit_dice;
        self.max_hp = fresh.max_hp;
        self.hp = (fresh.max_hp * fraction / 100).max(1);
        self.ac = fresh.ac;
        self.ev = fresh.ev;
        self.mr = fresh.mr;
        self.resists = fresh.resists;
        self.holiness = fresh.holiness;
        self.unique = false;
    }
}

impl Actor for Monster {
    fn name(&self) -> String {
        if self.unique {
            self.kind.clone()
        } else {
            format!("the {}", self.kind)
        }
    }

    fn is_player(&self) -> bool {
        false
    }

    fn pos(&self) -> Coord {
        self.pos
    }

    fn hp(&self) -> i32 {
        self.hp
    }

    fn max_hp(&self) -> i32 {
        self.max_hp
    }

    fn hit_dice(&self) -> i32 {
        self.hit_dice
    }

    fn armour_class(&self) -> i32 {
        self.ac
    }

    fn evasion(&self) -> i32 {
        self.ev
    }

    fn magic_resistance(&self) -> i32 {
        self.mr
    }

    fn resist(&self, kind: ResistKind) -> i32 {
        self.resists.level(kind)
    }

    fn holiness(&self) -> Holiness {
        self.holiness
    }

    fn attitude(&self) -> Attitude {
        self.attitude
    }

    fn shield_block_chance(&self) -> i32 {
        self.shield_block
    }

    fn missile_deflection(&self) -> u8 {
        self.deflection
    }

    fn is_submerged(&self) -> bool {
        self.submerged
    }

    fn is_notable(&self) -> bool {
        self.unique || self.hit_dice >= 5
    }

    fn apply_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.hp > 0;
        self.hp -= amount.max(0);
        if amount > 0 {
            self.statuses.remove(Status::Asleep);
        }
        was_alive && self.hp <= 0
    }

    fn has_status(&self, status: Status) -> bool {
        self.statuses.has(status)
    }

    fn apply_status(&mut self, status: Status, turns: i32) {
        self.statuses.apply(status, turns);
    }

    fn remove_status(&mut self, status: Status) -> bool {
        self.statuses.remove(status)
    }

    fn drain(&mut self, levels: i32, max_hp_loss: i32) {
        self.hit_dice = (self.hit_dice - levels).max(1);
        self.max_hp = (self.max_hp - max_hp_loss).max(1);
        self.hp = self.hp.min(self.max_hp);
    }

    fn move_to(&mut self, pos: Coord) {
        self.pos = pos;
    }

    fn carried_items_mut(&mut self) -> &mut [Item] {
        &mut self.inventory
    }
}
