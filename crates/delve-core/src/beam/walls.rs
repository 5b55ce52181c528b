//! What a beam does to the solid cell it runs into

use super::bolt::{BeamResult, Bolt};
use super::flavour::Flavour;
use crate::dungeon::{Cloud, CloudKind, Feature, Level};
use crate::geom::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallChange {
    /// Digging: the beam carries on
    Dig,
    /// Disintegration or annihilation: the beam stops
    Disintegrate,
    /// Fire against wax: the beam stops
    MeltWax,
}

impl WallChange {
    pub const fn stops_beam(&self) -> bool {
        !matches!(self, WallChange::Dig)
    }
}

/// Whether this bolt would change `feature`, and how
pub fn wall_change(feature: Feature, bolt: &Bolt) -> Option<WallChange> {
    match bolt.flavour {
        Flavour::Digging if feature.is_diggable() => Some(WallChange::Dig),
        Flavour::Disintegration | Flavour::Nuke => {
            let strong = bolt.flavour == Flavour::Nuke || bolt.dice.num >= 3;
            let breakable = !feature.is_permanent()
                && !feature.is_builder_sentinel()
                && (feature.is_wall() || feature.is_door() || feature == Feature::Statue);
            (strong && breakable).then_some(WallChange::Disintegrate)
        }
        Flavour::Fire | Flavour::Hellfire if feature == Feature::WaxWall => {
            Some(WallChange::MeltWax)
        }
        _ => None,
    }
}

/// Apply a wall change to the level, adding its message
pub fn apply_wall_change(level: &mut Level, pos: Coord, change: WallChange, result: &mut BeamResult) {
    let old = level.feature(pos);
    match change {
        WallChange::Dig => {
            result.message("You hear a grinding noise.");
        }
        WallChange::Disintegrate => {
            let msg = if old == Feature::Statue {
                "The statue shatters!"
            } else if old.is_door() {
                "The door is blown apart!"
            } else {
                "The wall is blasted away!"
            };
            result.message(msg);
        }
        WallChange::MeltWax => {
            result.message("The wax bubbles and burns!");
        }
    }
    level.set_feature(pos, Feature::Floor);
    if change == WallChange::MeltWax {
        level.add_cloud(pos, Cloud::new(CloudKind::Fire, 5));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beam::attack::AttackKind;
    use crate::dungeon::LevelId;

    fn bolt(kind: AttackKind) -> Bolt {
        Bolt::from_player(kind, 20, Coord::new(5, 5), Coord::new(9, 5))
    }

    #[test]
    fn test_which_walls_change() {
        let dig = bolt(AttackKind::Dig);
        assert_eq!(wall_change(Feature::RockWall, &dig), Some(WallChange::Dig));
        assert_eq!(wall_change(Feature::MetalWall, &dig), None);

        let disint = bolt(AttackKind::Disintegrate);
        assert_eq!(wall_change(Feature::StoneWall, &disint), Some(WallChange::Disintegrate));
        assert_eq!(wall_change(Feature::Statue, &disint), Some(WallChange::Disintegrate));
        assert_eq!(wall_change(Feature::PermaRock, &disint), None);

        let mut weak = disint.clone();
        weak.dice.num = 2;
        assert_eq!(wall_change(Feature::StoneWall, &weak), None);

        let fire = bolt(AttackKind::BoltOfFire);
        assert_eq!(wall_change(Feature::WaxWall, &fire), Some(WallChange::MeltWax));
        assert_eq!(wall_change(Feature::RockWall, &fire), None);
    }

    #[test]
    fn test_melting_wax_leaves_fire() {
        let mut level = Level::new(LevelId::main_dungeon(3));
        let pos = Coord::new(10, 10);
        level.set_feature(pos, Feature::WaxWall);
        let mut result = BeamResult::new();
        apply_wall_change(&mut level, pos, WallChange::MeltWax, &mut result);
        assert_eq!(level.feature(pos), Feature::Floor);
        assert_eq!(level.cloud_at(pos).map(|c| c.kind), Some(CloudKind::Fire));
        assert_eq!(result.messages, vec!["The wax bubbles and burns!".to_string()]);
    }
}
