//! Timed status effects

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Status {
    Poisoned,
    Confused,
    Slowed,
    Hasted,
    Asleep,
    Paralysed,
    /// First stage of petrification
    Petrifying,
    /// Second stage: turned to stone
    Petrified,
}

/// Active statuses with their remaining turns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSet {
    active: HashMap<Status, i32>,
}

impl StatusSet {
    pub fn has(&self, status: Status) -> bool {
        self.active.contains_key(&status)
    }

    pub fn turns(&self, status: Status) -> i32 {
        self.active.get(&status).copied().unwrap_or(0)
    }

    /// Add a status; an existing one keeps the longer duration, except
    /// poison, which stacks
    pub fn apply(&mut self, status: Status, turns: i32) {
        let entry = self.active.entry(status).or_insert(0);
        if status == Status::Poisoned {
            *entry += turns.max(1);
        } else {
            *entry = (*entry).max(turns.max(1));
        }
    }

    pub fn remove(&mut self, status: Status) -> bool {
        self.active.remove(&status).is_some()
    }

    /// Advance one turn, dropping expired statuses
    pub fn tick(&mut self) {
        self.active.retain(|_, turns| {
            *turns -= 1;
            *turns > 0
        });
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poison_stacks_others_extend() {
        let mut s = StatusSet::default();
        s.apply(Status::Poisoned, 3);
        s.apply(Status::Poisoned, 2);
        assert_eq!(s.turns(Status::Poisoned), 5);

        s.apply(Status::Slowed, 4);
        s.apply(Status::Slowed, 2);
        assert_eq!(s.turns(Status::Slowed), 4);
    }

    #[test]
    fn test_tick_expires() {
        let mut s = StatusSet::default();
        s.apply(Status::Confused, 1);
        s.apply(Status::Asleep, 3);
        s.tick();
        assert!(!s.has(Status::Confused));
        assert_eq!(s.turns(Status::Asleep), 2);
    }
}
