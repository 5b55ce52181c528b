//! Terrain feature codes
//!
//! Every predicate is an explicit match; nothing depends on the numeric
//! order of the variants.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::branch::Branch;

/// Gods that can own an altar
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum God {
    #[default]
    Zin,
    TheShiningOne,
    Kikubaaqudgha,
    Yredelemnul,
    Xom,
    Vehumet,
    Okawaru,
    Makhleb,
    Sif,
    Trog,
    Nemelex,
    Elyvilon,
    Lugonu,
}

impl God {
    /// Gods whose altars can appear in ordinary levels
    pub const TEMPLE: [God; 12] = [
        God::Zin,
        God::TheShiningOne,
        God::Kikubaaqudgha,
        God::Yredelemnul,
        God::Xom,
        God::Vehumet,
        God::Okawaru,
        God::Makhleb,
        God::Sif,
        God::Trog,
        God::Nemelex,
        God::Elyvilon,
    ];
}

/// What occupies a single map cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Feature {
    /// Not yet generated; only seen mid-build
    Unseen,
    #[default]
    RockWall,
    StoneWall,
    MetalWall,
    CrystalWall,
    WaxWall,
    PermaRock,
    /// Wall of a special room, protected from corridor diggers until fixup
    BuilderSpecialWall,
    /// Floor of a special room, protected until fixup
    BuilderSpecialFloor,
    Statue,
    ClosedDoor,
    SecretDoor,
    OpenDoor,
    Floor,
    ShallowWater,
    DeepWater,
    Lava,
    Fountain,
    Trap,
    EnterShop,
    StairsDownI,
    StairsDownII,
    StairsDownIII,
    StairsUpI,
    StairsUpII,
    StairsUpIII,
    HatchDown,
    HatchUp,
    /// Leaves the current branch from its first level
    ExitBranch,
    EnterBranch(Branch),
    EnterAbyss,
    ExitAbyss,
    EnterPandemonium,
    TransitPandemonium,
    ExitPandemonium,
    EnterLabyrinth,
    Altar(God),
}

impl Feature {
    pub const STONE_STAIRS_DOWN: [Feature; 3] = [
        Feature::StairsDownI,
        Feature::StairsDownII,
        Feature::StairsDownIII,
    ];

    pub const STONE_STAIRS_UP: [Feature; 3] = [
        Feature::StairsUpI,
        Feature::StairsUpII,
        Feature::StairsUpIII,
    ];

    /// Load-bearing walls: block movement, sight and explosions
    pub const fn is_wall(&self) -> bool {
        matches!(
            self,
            Feature::RockWall
                | Feature::StoneWall
                | Feature::MetalWall
                | Feature::CrystalWall
                | Feature::WaxWall
                | Feature::PermaRock
                | Feature::BuilderSpecialWall
        )
    }

    /// Blocks movement and beams
    pub const fn is_solid(&self) -> bool {
        self.is_wall()
            || matches!(
                self,
                Feature::Unseen | Feature::Statue | Feature::ClosedDoor | Feature::SecretDoor
            )
    }

    pub const fn is_door(&self) -> bool {
        matches!(
            self,
            Feature::ClosedDoor | Feature::SecretDoor | Feature::OpenDoor
        )
    }

    pub const fn is_closed_door(&self) -> bool {
        matches!(self, Feature::ClosedDoor | Feature::SecretDoor)
    }

    /// Counts as open space for connectivity analysis
    pub const fn is_traversable(&self) -> bool {
        !self.is_solid() || self.is_door()
    }

    pub const fn is_water(&self) -> bool {
        matches!(self, Feature::ShallowWater | Feature::DeepWater)
    }

    pub const fn is_liquid(&self) -> bool {
        self.is_water() || matches!(self, Feature::Lava)
    }

    pub const fn is_stone_stair(&self) -> bool {
        self.is_stone_stair_up() || self.is_stone_stair_down()
    }

    pub const fn is_stone_stair_up(&self) -> bool {
        matches!(
            self,
            Feature::StairsUpI | Feature::StairsUpII | Feature::StairsUpIII
        )
    }

    pub const fn is_stone_stair_down(&self) -> bool {
        matches!(
            self,
            Feature::StairsDownI | Feature::StairsDownII | Feature::StairsDownIII
        )
    }

    /// Any way up and out of the level
    pub const fn is_up_exit(&self) -> bool {
        self.is_stone_stair_up() || matches!(self, Feature::ExitBranch)
    }

    /// Any staircase, hatch, portal or branch marker
    pub const fn is_stair(&self) -> bool {
        self.is_stone_stair()
            || matches!(
                self,
                Feature::HatchDown
                    | Feature::HatchUp
                    | Feature::ExitBranch
                    | Feature::EnterBranch(_)
                    | Feature::EnterAbyss
                    | Feature::ExitAbyss
                    | Feature::EnterPandemonium
                    | Feature::TransitPandemonium
                    | Feature::ExitPandemonium
                    | Feature::EnterLabyrinth
            )
    }

    pub const fn is_altar(&self) -> bool {
        matches!(self, Feature::Altar(_))
    }

    pub const fn is_trap(&self) -> bool {
        matches!(self, Feature::Trap)
    }

    pub const fn is_shop(&self) -> bool {
        matches!(self, Feature::EnterShop)
    }

    pub const fn is_builder_sentinel(&self) -> bool {
        matches!(
            self,
            Feature::Unseen | Feature::BuilderSpecialWall | Feature::BuilderSpecialFloor
        )
    }

    /// Walls a digging beam can remove
    pub const fn is_diggable(&self) -> bool {
        matches!(self, Feature::RockWall | Feature::WaxWall)
    }

    pub const fn is_metal(&self) -> bool {
        matches!(self, Feature::MetalWall)
    }

    pub const fn is_crystal(&self) -> bool {
        matches!(self, Feature::CrystalWall)
    }

    pub const fn is_permanent(&self) -> bool {
        matches!(self, Feature::PermaRock)
    }

    /// Cells vault placement may paint over
    pub const fn is_overwritable(&self, water_ok: bool) -> bool {
        match self {
            Feature::Floor | Feature::RockWall | Feature::ClosedDoor | Feature::SecretDoor => true,
            Feature::ShallowWater | Feature::DeepWater => water_ok,
            _ => false,
        }
    }

    /// Display character for map dumps
    pub const fn symbol(&self) -> char {
        match self {
            Feature::Unseen => ' ',
            Feature::RockWall => '#',
            Feature::StoneWall => 'c',
            Feature::MetalWall => 'v',
            Feature::CrystalWall => 'b',
            Feature::WaxWall => 'a',
            Feature::PermaRock => 'X',
            Feature::BuilderSpecialWall => '%',
            Feature::BuilderSpecialFloor => ',',
            Feature::Statue => 'G',
            Feature::ClosedDoor => '+',
            Feature::SecretDoor => '=',
            Feature::OpenDoor => '\'',
            Feature::Floor => '.',
            Feature::ShallowWater => 'W',
            Feature::DeepWater => 'w',
            Feature::Lava => 'l',
            Feature::Fountain => 'T',
            Feature::Trap => '^',
            Feature::EnterShop => 'A',
            Feature::StairsDownI | Feature::StairsDownII | Feature::StairsDownIII => '>',
            Feature::StairsUpI | Feature::StairsUpII | Feature::StairsUpIII => '<',
            Feature::HatchDown => 'v',
            Feature::HatchUp => '^',
            Feature::ExitBranch => '<',
            Feature::EnterBranch(_) => '>',
            Feature::EnterAbyss
            | Feature::ExitAbyss
            | Feature::EnterPandemonium
            | Feature::TransitPandemonium
            | Feature::ExitPandemonium
            | Feature::EnterLabyrinth => '\\',
            Feature::Altar(_) => '_',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_walls_are_solid() {
        for f in Feature::iter() {
            if f.is_wall() {
                assert!(f.is_solid(), "{f} is a wall but not solid");
                assert!(!f.is_traversable(), "{f} is a wall but traversable");
            }
        }
    }

    #[test]
    fn test_doors_are_traversable() {
        assert!(Feature::ClosedDoor.is_solid());
        assert!(Feature::ClosedDoor.is_traversable());
        assert!(Feature::SecretDoor.is_traversable());
        assert!(Feature::OpenDoor.is_traversable());
        assert!(!Feature::OpenDoor.is_solid());
    }

    #[test]
    fn test_statue_is_solid_not_wall() {
        assert!(Feature::Statue.is_solid());
        assert!(!Feature::Statue.is_wall());
    }

    #[test]
    fn test_liquids_are_traversable_but_not_floor() {
        for f in [Feature::DeepWater, Feature::ShallowWater, Feature::Lava] {
            assert!(f.is_liquid());
            assert!(f.is_traversable());
        }
        assert!(!Feature::Lava.is_water());
    }

    #[test]
    fn test_stairs_partition() {
        for f in Feature::STONE_STAIRS_UP {
            assert!(f.is_stone_stair_up() && !f.is_stone_stair_down() && f.is_stair());
        }
        for f in Feature::STONE_STAIRS_DOWN {
            assert!(f.is_stone_stair_down() && !f.is_stone_stair_up());
        }
        assert!(Feature::EnterBranch(Branch::Lair).is_stair());
        assert!(!Feature::EnterBranch(Branch::Lair).is_stone_stair());
    }

    #[test]
    fn test_overwritable_respects_water_ok() {
        assert!(Feature::Floor.is_overwritable(false));
        assert!(!Feature::DeepWater.is_overwritable(false));
        assert!(Feature::DeepWater.is_overwritable(true));
        assert!(!Feature::Lava.is_overwritable(true));
        assert!(!Feature::StairsUpI.is_overwritable(true));
    }

    #[test]
    fn test_default_is_rock() {
        assert_eq!(Feature::default(), Feature::RockWall);
    }
}
