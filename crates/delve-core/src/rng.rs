//! Random number generation
//!
//! Uses a seeded ChaCha RNG so that any level or beam can be replayed from
//! its seed. Only the seed is serialized.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Game random number generator
///
/// Wraps ChaCha8Rng. Every helper treats a non-positive bound as "no roll"
/// and returns 0 instead of panicking.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent generator, e.g. one per generation attempt
    pub fn fork(&mut self) -> Self {
        Self::new(self.rng.r#gen())
    }

    /// Uniform in `0..n`; 0 when `n <= 0`
    pub fn rn2(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform in `1..=n`; 0 when `n <= 0`
    pub fn rnd(&mut self, n: i32) -> i32 {
        if n <= 0 {
            return 0;
        }
        self.rng.gen_range(1..=n)
    }

    /// Sum of `n` rolls of `1..=sides`
    pub fn roll_dice(&mut self, n: i32, sides: i32) -> i32 {
        (0..n.max(0)).map(|_| self.rnd(sides)).sum()
    }

    /// Inclusive uniform range; the bounds may be given in either order
    pub fn random_range(&mut self, lo: i32, hi: i32) -> i32 {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        lo + self.rn2(hi - lo + 1)
    }

    /// Average of `rolls` draws, biased towards the middle of `0..max`
    pub fn random2avg(&mut self, max: i32, rolls: i32) -> i32 {
        let rolls = rolls.max(1);
        let mut sum = self.rn2(max);
        for _ in 1..rolls {
            sum += self.rn2(max + 1);
        }
        sum / rolls
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: i32) -> bool {
        self.rn2(n) == 0
    }

    /// Returns true with probability 1/2
    pub fn coinflip(&mut self) -> bool {
        self.rn2(2) == 0
    }

    /// Returns true with probability x/y
    pub fn x_chance_in_y(&mut self, x: i32, y: i32) -> bool {
        if x <= 0 {
            return false;
        }
        if x >= y {
            return true;
        }
        self.rn2(y) < x
    }

    /// Returns true with probability percent/100
    pub fn percent(&mut self, percent: i32) -> bool {
        self.rn2(100) < percent
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rn2(items.len() as i32) as usize])
        }
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as i32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rn2_bounds() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            let n = rng.rn2(10);
            assert!((0..10).contains(&n));
        }
    }

    #[test]
    fn test_roll_dice_bounds() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            let n = rng.roll_dice(2, 6);
            assert!((2..=12).contains(&n));
        }
    }

    #[test]
    fn test_random_range_inclusive() {
        let mut rng = GameRng::new(7);
        let mut seen_lo = false;
        let mut seen_hi = false;
        for _ in 0..2000 {
            let n = rng.random_range(3, 6);
            assert!((3..=6).contains(&n));
            seen_lo |= n == 3;
            seen_hi |= n == 6;
        }
        assert!(seen_lo && seen_hi);
        assert_eq!(rng.random_range(5, 5), 5);
        assert!((2..=4).contains(&rng.random_range(4, 2)));
    }

    #[test]
    fn test_random2avg_stays_below_max() {
        let mut rng = GameRng::new(11);
        for _ in 0..1000 {
            let n = rng.random2avg(9, 2);
            assert!((0..=9).contains(&n));
        }
    }

    #[test]
    fn test_x_chance_in_y_edges() {
        let mut rng = GameRng::new(3);
        assert!(!rng.x_chance_in_y(0, 10));
        assert!(rng.x_chance_in_y(10, 10));
    }

    #[test]
    fn test_reproducibility() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.rn2(100), rng2.rn2(100));
        }
    }

    #[test]
    fn test_zero_inputs() {
        let mut rng = GameRng::new(42);
        assert_eq!(rng.rn2(0), 0);
        assert_eq!(rng.rnd(0), 0);
        assert_eq!(rng.roll_dice(0, 6), 0);
        assert_eq!(rng.roll_dice(2, 0), 0);
        assert_eq!(rng.rn2(-4), 0);
    }

    #[test]
    fn test_serde_keeps_seed() {
        let rng = GameRng::new(99);
        let json = serde_json::to_string(&rng).unwrap();
        let back: GameRng = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed(), 99);
    }
}
