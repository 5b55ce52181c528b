//! Attack-type parameter table
//!
//! Every zappable attack is one row of [`ATTACKS`]; bolt setup reads the
//! row instead of switching on the attack kind.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::flavour::Flavour;
use crate::consts::AUTOMATIC_HIT;
use crate::rng::GameRng;

/// Damage dice, `num`d`size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dice {
    pub num: i32,
    pub size: i32,
}

impl Dice {
    pub const fn new(num: i32, size: i32) -> Self {
        Self { num, size }
    }

    pub fn roll(&self, rng: &mut GameRng) -> i32 {
        rng.roll_dice(self.num, self.size)
    }

    pub const fn max(&self) -> i32 {
        self.num * self.size
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum AttackKind {
    MagicDart,
    Dart,
    Flame,
    Frost,
    BoltOfFire,
    BoltOfCold,
    LightningBolt,
    BoltOfMagma,
    IceBolt,
    PoisonArrow,
    CorrosiveBolt,
    BoltOfDraining,
    HolyBolt,
    HellfireBolt,
    Fireball,
    FreezingCloud,
    MephiticCloud,
    Disintegrate,
    Annihilate,
    Dig,
    Slow,
    Haste,
    Paralyse,
    Confuse,
    Sleep,
    Petrify,
    Teleport,
    Polymorph,
    Banish,
    Pain,
    Agony,
}

/// One row of the attack table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackSpec {
    pub kind: AttackKind,
    pub name: &'static str,
    pub flavour: Flavour,
    pub dice_num: i32,
    /// Base die size before power scaling
    pub dice_size: i32,
    /// Power points per extra pip on the die
    pub power_per_size: i32,
    /// Base to-hit, or [`AUTOMATIC_HIT`]
    pub hit: i32,
    pub range: i32,
    /// Pierces through what it hits
    pub is_beam: bool,
    pub is_explosion: bool,
    /// Spreads a cloud over an area at the landing cell
    pub is_big_cloud: bool,
    /// A physical projectile, affected by missile deflection
    pub is_missile: bool,
    /// Explosion radius
    pub ex_size: i32,
}

const fn row(
    kind: AttackKind,
    name: &'static str,
    flavour: Flavour,
    dice: (i32, i32, i32),
    hit: i32,
    range: i32,
    is_beam: bool,
) -> AttackSpec {
    AttackSpec {
        kind,
        name,
        flavour,
        dice_num: dice.0,
        dice_size: dice.1,
        power_per_size: dice.2,
        hit,
        range,
        is_beam,
        is_explosion: false,
        is_big_cloud: false,
        is_missile: false,
        ex_size: 0,
    }
}

const fn missile(mut spec: AttackSpec) -> AttackSpec {
    spec.is_missile = true;
    spec
}

const fn explosion(mut spec: AttackSpec, ex_size: i32) -> AttackSpec {
    spec.is_explosion = true;
    spec.ex_size = ex_size;
    spec
}

const fn big_cloud(mut spec: AttackSpec, ex_size: i32) -> AttackSpec {
    spec.is_big_cloud = true;
    spec.ex_size = ex_size;
    spec
}

use AttackKind as K;
use Flavour as F;

/// Indexed by `AttackKind as usize`
pub const ATTACKS: [AttackSpec; 31] = [
    row(K::MagicDart, "magic dart", F::Magic, (1, 3, 5), AUTOMATIC_HIT, 12, false),
    missile(row(K::Dart, "dart", F::Normal, (1, 4, 0), 10, 10, false)),
    row(K::Flame, "puff of flame", F::Fire, (2, 4, 10), 8, 8, false),
    row(K::Frost, "puff of frost", F::Cold, (2, 4, 10), 8, 8, false),
    row(K::BoltOfFire, "bolt of fire", F::Fire, (6, 6, 15), 10, 12, true),
    row(K::BoltOfCold, "bolt of cold", F::Cold, (6, 6, 15), 10, 12, true),
    row(K::LightningBolt, "bolt of lightning", F::Electricity, (3, 10, 12), 12, 10, true),
    row(K::BoltOfMagma, "bolt of magma", F::Lava, (4, 8, 15), 10, 10, true),
    row(K::IceBolt, "bolt of ice", F::Ice, (4, 8, 15), 10, 10, true),
    row(K::PoisonArrow, "poison arrow", F::Poison, (3, 7, 12), 12, 10, false),
    row(K::CorrosiveBolt, "corrosive bolt", F::Acid, (3, 8, 15), 10, 10, true),
    row(K::BoltOfDraining, "bolt of negative energy", F::Negative, (3, 6, 15), 12, 10, true),
    row(K::HolyBolt, "bolt of holy energy", F::Holy, (3, 8, 15), 12, 10, true),
    row(K::HellfireBolt, "burst of hellfire", F::Hellfire, (3, 12, 20), 15, 10, true),
    explosion(row(K::Fireball, "fireball", F::Fire, (3, 6, 15), AUTOMATIC_HIT, 10, false), 1),
    big_cloud(row(K::FreezingCloud, "freezing blast", F::Cold, (2, 5, 15), AUTOMATIC_HIT, 8, false), 1),
    big_cloud(row(K::MephiticCloud, "stinking cloud", F::Poison, (1, 4, 20), AUTOMATIC_HIT, 8, false), 1),
    row(K::Disintegrate, "disintegration bolt", F::Disintegration, (3, 15, 12), AUTOMATIC_HIT, 8, true),
    row(K::Annihilate, "blast of annihilation", F::Nuke, (4, 20, 10), AUTOMATIC_HIT, 10, true),
    row(K::Dig, "digging beam", F::Digging, (0, 0, 0), AUTOMATIC_HIT, 6, true),
    row(K::Slow, "slowing beam", F::Slow, (0, 0, 0), AUTOMATIC_HIT, 10, true),
    row(K::Haste, "hasting beam", F::Haste, (0, 0, 0), AUTOMATIC_HIT, 10, true),
    row(K::Paralyse, "paralysing beam", F::Paralysis, (0, 0, 0), AUTOMATIC_HIT, 10, true),
    row(K::Confuse, "confusing beam", F::Confusion, (0, 0, 0), AUTOMATIC_HIT, 10, true),
    row(K::Sleep, "sleeping beam", F::Sleep, (0, 0, 0), AUTOMATIC_HIT, 10, true),
    row(K::Petrify, "petrifying beam", F::Petrify, (0, 0, 0), AUTOMATIC_HIT, 8, true),
    row(K::Teleport, "teleporting beam", F::Teleport, (0, 0, 0), AUTOMATIC_HIT, 10, true),
    row(K::Polymorph, "polymorphing beam", F::Polymorph, (0, 0, 0), AUTOMATIC_HIT, 8, true),
    row(K::Banish, "banishing beam", F::Banish, (0, 0, 0), AUTOMATIC_HIT, 8, true),
    row(K::Pain, "pain", F::Pain, (1, 4, 5), AUTOMATIC_HIT, 8, false),
    row(K::Agony, "agony", F::PainAgony, (0, 0, 0), AUTOMATIC_HIT, 8, true),
];

impl AttackKind {
    pub fn spec(self) -> &'static AttackSpec {
        &ATTACKS[self as usize]
    }
}

impl AttackSpec {
    /// Damage dice at a given spell or wand power
    pub fn dice(&self, power: i32) -> Dice {
        if self.dice_num == 0 {
            return Dice::default();
        }
        let bonus = if self.power_per_size > 0 {
            power.max(0) / self.power_per_size
        } else {
            0
        };
        Dice::new(self.dice_num, self.dice_size + bonus)
    }

    /// Extra to-hit from power, except for automatic hits
    pub fn to_hit(&self, power: i32) -> i32 {
        if self.hit >= AUTOMATIC_HIT {
            AUTOMATIC_HIT
        } else {
            self.hit + power.max(0) / 20
        }
    }
}
