//! The subset of player state that combat reads and mutates

use serde::{Deserialize, Serialize};

use super::{Actor, Attitude, Holiness, ResistKind, Resistances, Status, StatusSet};
use crate::geom::Coord;
use crate::item::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Coord,
    pub hp: i32,
    pub max_hp: i32,
    pub experience_level: i32,
    pub ac: i32,
    pub ev: i32,
    pub mr: i32,
    pub resists: Resistances,
    pub shield_block: i32,
    pub deflection: u8,
    /// Granted by equipment; blocks acid corrosion of carried items
    pub res_corrosion: bool,
    pub statuses: StatusSet,
    pub inventory: Vec<Item>,
}

impl Player {
    pub fn new(pos: Coord) -> Self {
        Self {
            pos,
            hp: 30,
            max_hp: 30,
            experience_level: 5,
            ac: 3,
            ev: 10,
            mr: 20,
            resists: Resistances::default(),
            shield_block: 0,
            deflection: 0,
            res_corrosion: false,
            statuses: StatusSet::default(),
            inventory: Vec::new(),
        }
    }
}

impl Actor for Player {
    fn name(&self) -> String {
        "you".to_string()
    }

    fn is_player(&self) -> bool {
        true
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
        self.experience_level
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
        Holiness::Natural
    }

    fn attitude(&self) -> Attitude {
        Attitude::Friendly
    }

    fn shield_block_chance(&self) -> i32 {
        self.shield_block
    }

    fn missile_deflection(&self) -> u8 {
        self.deflection
    }

    fn is_notable(&self) -> bool {
        true
    }

    fn res_corrosion(&self) -> bool {
        self.res_corrosion
    }

    fn apply_damage(&mut self, amount: i32) -> bool {
        let was_alive = self.hp > 0;
        self.hp -= amount.max(0);
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
        self.experience_level = (self.experience_level - levels).max(1);
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
