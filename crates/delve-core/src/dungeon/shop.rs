//! Shop records

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geom::Coord;
use crate::rarity::pick_weighted;
use crate::rng::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum ShopKind {
    General,
    Weapon,
    Armour,
    Food,
    Wand,
    Jewellery,
    Book,
    Distillery,
    Scroll,
    Antique,
}

impl ShopKind {
    pub fn random(rng: &mut GameRng) -> ShopKind {
        const WEIGHTS: [(ShopKind, i32); 10] = [
            (ShopKind::General, 20),
            (ShopKind::Weapon, 12),
            (ShopKind::Armour, 12),
            (ShopKind::Food, 8),
            (ShopKind::Wand, 6),
            (ShopKind::Jewellery, 6),
            (ShopKind::Book, 6),
            (ShopKind::Distillery, 8),
            (ShopKind::Scroll, 8),
            (ShopKind::Antique, 4),
        ];
        pick_weighted(&WEIGHTS, rng)
            .copied()
            .unwrap_or(ShopKind::General)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    /// The shop entrance cell
    pub pos: Coord,
    pub kind: ShopKind,
    /// Price multiplier in percent
    pub greed: i32,
}

impl ShopInfo {
    pub fn new(pos: Coord, kind: ShopKind, depth: i32, rng: &mut GameRng) -> Self {
        Self {
            pos,
            kind,
            greed: 15 + rng.random2avg(19, 2) + depth,
        }
    }
}

/// How many shops a level of the given depth gets
pub fn shop_count(depth: i32, rng: &mut GameRng) -> usize {
    if depth < 3 {
        return 0;
    }
    let roll = rng.rn2(125);
    if roll > 28 {
        0
    } else if roll > 4 {
        1
    } else {
        1 + rng.rn2(5) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_shops_near_surface() {
        let mut rng = GameRng::new(1);
        for depth in 1..3 {
            for _ in 0..100 {
                assert_eq!(shop_count(depth, &mut rng), 0);
            }
        }
    }

    #[test]
    fn test_shop_count_distribution() {
        let mut rng = GameRng::new(2);
        let trials = 12_500;
        let with_shop = (0..trials).filter(|_| shop_count(10, &mut rng) > 0).count();
        // 29 in 125 levels get at least one shop
        let expected = trials * 29 / 125;
        assert!(with_shop > expected * 8 / 10 && with_shop < expected * 12 / 10);
    }

    #[test]
    fn test_shop_count_bounds() {
        let mut rng = GameRng::new(3);
        for _ in 0..1000 {
            assert!(shop_count(15, &mut rng) <= 5);
        }
    }
}
