//! Branches, level types and level identifiers

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::consts::MAX_DEPTH;

/// How a branch lays out its ordinary levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchLayout {
    /// Room/corridor plans and the basic builder
    Generic,
    /// Organic cave carving
    Spotty,
    /// Box-stamped city blocks
    City,
}

/// A dungeon branch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Branch {
    #[default]
    Dungeon,
    Lair,
    OrcishMines,
    Vaults,
    Crypt,
    Gehenna,
    Cocytus,
}

impl Branch {
    /// Number of levels in the branch
    pub const fn levels(&self) -> i32 {
        match self {
            Branch::Dungeon => MAX_DEPTH,
            Branch::Lair => 8,
            Branch::OrcishMines => 4,
            Branch::Vaults => 8,
            Branch::Crypt => 5,
            Branch::Gehenna | Branch::Cocytus => 7,
        }
    }

    /// Branch holding the entrance, and the level of it that holds it
    pub const fn entrance(&self) -> Option<(Branch, i32)> {
        match self {
            Branch::Dungeon | Branch::Gehenna | Branch::Cocytus => None,
            Branch::Lair => Some((Branch::Dungeon, 10)),
            Branch::OrcishMines => Some((Branch::Lair, 3)),
            Branch::Vaults => Some((Branch::Dungeon, 14)),
            Branch::Crypt => Some((Branch::Vaults, 3)),
        }
    }

    pub const fn layout(&self) -> BranchLayout {
        match self {
            Branch::OrcishMines | Branch::Lair => BranchLayout::Spotty,
            Branch::Vaults => BranchLayout::City,
            _ => BranchLayout::Generic,
        }
    }

    /// Depth of the branch's first level measured from the top of the dungeon
    pub fn base_depth(&self) -> i32 {
        match self {
            Branch::Gehenna | Branch::Cocytus => MAX_DEPTH,
            _ => match self.entrance() {
                Some((parent, level)) => parent.base_depth() + level,
                None => 0,
            },
        }
    }

    /// Branches whose entrance lies on `level` of this branch
    pub fn children_at(&self, level: i32) -> Vec<Branch> {
        use strum::IntoEnumIterator;
        Branch::iter()
            .filter(|b| b.entrance() == Some((*self, level)))
            .collect()
    }

    pub const fn abbrev(&self) -> &'static str {
        match self {
            Branch::Dungeon => "D",
            Branch::Lair => "Lair",
            Branch::OrcishMines => "Orc",
            Branch::Vaults => "Vaults",
            Branch::Crypt => "Crypt",
            Branch::Gehenna => "Geh",
            Branch::Cocytus => "Coc",
        }
    }
}

/// Levels that replace the whole generation pass with their own
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum LevelType {
    #[default]
    Normal,
    Labyrinth,
    Abyss,
    Pandemonium,
}

/// Identifies the level being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelId {
    pub branch: Branch,
    /// 1-based level within the branch
    pub depth: i32,
    pub level_type: LevelType,
}

impl LevelId {
    pub const fn new(branch: Branch, depth: i32) -> Self {
        Self {
            branch,
            depth,
            level_type: LevelType::Normal,
        }
    }

    /// A portal level hanging off `depth` of the main dungeon
    pub const fn special(level_type: LevelType, depth: i32) -> Self {
        Self {
            branch: Branch::Dungeon,
            depth,
            level_type,
        }
    }

    pub const fn main_dungeon(depth: i32) -> Self {
        Self::new(Branch::Dungeon, depth)
    }

    pub fn is_branch_top(&self) -> bool {
        self.level_type == LevelType::Normal && self.depth <= 1
    }

    pub fn is_branch_bottom(&self) -> bool {
        self.level_type == LevelType::Normal && self.depth >= self.branch.levels()
    }

    /// Depth used for rarity tables
    pub fn absolute_depth(&self) -> i32 {
        match self.level_type {
            LevelType::Normal | LevelType::Labyrinth => self.branch.base_depth() + self.depth,
            LevelType::Abyss | LevelType::Pandemonium => MAX_DEPTH + 1,
        }
    }
}

impl Default for LevelId {
    fn default() -> Self {
        Self::main_dungeon(1)
    }
}

impl fmt::Display for LevelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level_type {
            LevelType::Normal => write!(f, "{}:{}", self.branch.abbrev(), self.depth),
            other => write!(f, "{other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_depths_chain_through_parents() {
        assert_eq!(Branch::Dungeon.base_depth(), 0);
        assert_eq!(Branch::Lair.base_depth(), 10);
        assert_eq!(Branch::OrcishMines.base_depth(), 13);
        assert_eq!(Branch::Crypt.base_depth(), 17);
    }

    #[test]
    fn test_children_at() {
        assert_eq!(Branch::Dungeon.children_at(10), vec![Branch::Lair]);
        assert!(Branch::Dungeon.children_at(9).is_empty());
    }

    #[test]
    fn test_top_and_bottom() {
        assert!(LevelId::main_dungeon(1).is_branch_top());
        assert!(LevelId::new(Branch::OrcishMines, 4).is_branch_bottom());
        assert!(!LevelId::special(LevelType::Abyss, 1).is_branch_top());
    }

    #[test]
    fn test_display() {
        assert_eq!(LevelId::main_dungeon(3).to_string(), "D:3");
        assert_eq!(LevelId::special(LevelType::Abyss, 1).to_string(), "Abyss");
    }
}
