//! Depth-weighted random selection
//!
//! Each entry is eligible between `min_depth` and `max_depth` (inclusive)
//! and its weight at a given depth follows one of five curves.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::rng::GameRng;

/// How an entry's rarity varies across its depth range
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum DistribShape {
    /// Full rarity everywhere in range
    #[default]
    Flat,
    /// Full rarity in the middle, half at the edges
    Semi,
    /// Full rarity in the middle, tapering to almost nothing at the edges
    Peak,
    /// Increases linearly with depth
    Up,
    /// Decreases linearly with depth
    Down,
}

/// One candidate in a depth-weighted table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthEntry<T> {
    pub value: T,
    pub min_depth: i32,
    pub max_depth: i32,
    pub rarity: i32,
    pub shape: DistribShape,
}

impl<T> DepthEntry<T> {
    pub fn new(value: T, min_depth: i32, max_depth: i32, rarity: i32, shape: DistribShape) -> Self {
        Self {
            value,
            min_depth,
            max_depth,
            rarity,
            shape,
        }
    }

    pub fn in_range(&self, depth: i32) -> bool {
        depth >= self.min_depth && depth <= self.max_depth
    }

    /// Effective weight at `depth`; zero outside the entry's range
    pub fn weight_at(&self, depth: i32) -> i32 {
        if !self.in_range(depth) {
            return 0;
        }
        let rar = self.rarity;
        let mut len = self.max_depth - self.min_depth;
        let off_centre = (self.min_depth + self.max_depth - 2 * depth).abs();
        match self.shape {
            DistribShape::Flat => rar,
            DistribShape::Semi => {
                if len > 0 {
                    len *= 2;
                } else {
                    len += 2;
                }
                rar * (len - off_centre) / len
            }
            DistribShape::Peak => {
                len += 1;
                rar * (len - off_centre) / len
            }
            DistribShape::Up => rar * (depth - self.min_depth + 1) / (len + 1),
            DistribShape::Down => rar * (self.max_depth - depth + 1) / (len + 1),
        }
    }
}

/// A table of depth entries with weighted selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthPicker<T> {
    entries: Vec<DepthEntry<T>>,
}

impl<T> Default for DepthPicker<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> DepthPicker<T> {
    pub fn new(entries: Vec<DepthEntry<T>>) -> Self {
        Self { entries }
    }

    pub fn push(&mut self, entry: DepthEntry<T>) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DepthEntry<T>] {
        &self.entries
    }

    /// Sum of all entry weights at `depth`
    pub fn total_weight(&self, depth: i32) -> i32 {
        self.entries.iter().map(|e| e.weight_at(depth)).sum()
    }

    /// Pick an entry proportionally to its weight at `depth`
    ///
    /// Returns `None` when nothing has positive weight.
    pub fn pick(&self, depth: i32, rng: &mut GameRng) -> Option<&T> {
        self.pick_filtered(depth, rng, |_| true)
    }

    /// Like [`pick`](Self::pick) but only among values accepted by `keep`
    pub fn pick_filtered(
        &self,
        depth: i32,
        rng: &mut GameRng,
        keep: impl Fn(&T) -> bool,
    ) -> Option<&T> {
        let weighted: Vec<(&T, i32)> = self
            .entries
            .iter()
            .filter(|e| keep(&e.value))
            .map(|e| (&e.value, e.weight_at(depth)))
            .collect();
        pick_weighted(&weighted, rng).copied()
    }

    /// Pick when the caller has no fallback; an empty table is a bug
    pub fn pick_required(&self, depth: i32, rng: &mut GameRng) -> &T {
        let total = self.total_weight(depth);
        assert!(total > 0, "depth picker has no weight at depth {depth}");
        match self.pick(depth, rng) {
            Some(v) => v,
            None => unreachable!("positive total weight always yields a pick"),
        }
    }
}

/// Choose from `(value, weight)` pairs proportionally to weight
///
/// Non-positive weights never win. Returns `None` if the total is zero.
pub fn pick_weighted<'a, T>(items: &'a [(T, i32)], rng: &mut GameRng) -> Option<&'a T> {
    let total: i32 = items.iter().map(|(_, w)| (*w).max(0)).sum();
    if total <= 0 {
        return None;
    }
    let mut roll = rng.rn2(total);
    for (value, weight) in items {
        let weight = (*weight).max(0);
        if roll < weight {
            return Some(value);
        }
        roll -= weight;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(shape: DistribShape) -> DepthEntry<&'static str> {
        DepthEntry::new("x", 0, 10, 100, shape)
    }

    #[test]
    fn test_flat_is_constant() {
        let e = entry(DistribShape::Flat);
        assert_eq!(e.weight_at(0), 100);
        assert_eq!(e.weight_at(10), 100);
        assert_eq!(e.weight_at(11), 0);
    }

    #[test]
    fn test_semi_halves_at_edges() {
        let e = entry(DistribShape::Semi);
        assert_eq!(e.weight_at(5), 100);
        assert_eq!(e.weight_at(0), 50);
        assert_eq!(e.weight_at(10), 50);
    }

    #[test]
    fn test_semi_single_level_range() {
        let e = DepthEntry::new("x", 4, 4, 60, DistribShape::Semi);
        assert_eq!(e.weight_at(4), 60);
    }

    #[test]
    fn test_peak_curve() {
        let e = entry(DistribShape::Peak);
        assert_eq!(e.weight_at(5), 100);
        assert_eq!(e.weight_at(0), 9);
        assert_eq!(e.weight_at(10), 9);
        assert_eq!(e.weight_at(-1), 0);
        assert!(e.weight_at(3) < e.weight_at(4));
    }

    #[test]
    fn test_up_and_down_are_linear() {
        let up = entry(DistribShape::Up);
        let down = entry(DistribShape::Down);
        assert_eq!(up.weight_at(0), 9);
        assert_eq!(up.weight_at(10), 100);
        assert_eq!(down.weight_at(0), 100);
        assert_eq!(down.weight_at(10), 9);
        for d in 0..10 {
            assert!(up.weight_at(d) <= up.weight_at(d + 1));
            assert!(down.weight_at(d) >= down.weight_at(d + 1));
        }
    }

    #[test]
    fn test_pick_respects_depth_range() {
        let picker = DepthPicker::new(vec![
            DepthEntry::new("shallow", 1, 5, 10, DistribShape::Flat),
            DepthEntry::new("deep", 10, 20, 10, DistribShape::Flat),
        ]);
        let mut rng = GameRng::new(5);
        for _ in 0..200 {
            assert_eq!(picker.pick(3, &mut rng), Some(&"shallow"));
            assert_eq!(picker.pick(15, &mut rng), Some(&"deep"));
        }
        assert_eq!(picker.pick(7, &mut rng), None);
    }

    #[test]
    #[should_panic(expected = "no weight")]
    fn test_pick_required_panics_on_empty() {
        let picker: DepthPicker<u8> = DepthPicker::default();
        let mut rng = GameRng::new(1);
        picker.pick_required(3, &mut rng);
    }

    #[test]
    fn test_pick_weighted_distribution() {
        let items = [("common", 90), ("rare", 10), ("never", 0)];
        let mut rng = GameRng::new(42);
        let mut rare = 0;
        for _ in 0..10_000 {
            match pick_weighted(&items, &mut rng) {
                Some(&"rare") => rare += 1,
                Some(&"never") => panic!("zero weight was picked"),
                _ => {}
            }
        }
        assert!(rare > 800 && rare < 1200, "rare picked {rare} times");
    }

    #[test]
    fn test_peak_frequency_highest_mid_range() {
        let picker = DepthPicker::new(vec![
            DepthEntry::new(true, 0, 10, 100, DistribShape::Peak),
            DepthEntry::new(false, 0, 10, 100, DistribShape::Flat),
        ]);
        let mut rng = GameRng::new(2024);
        let mut freq = |depth: i32| {
            (0..4000)
                .filter(|_| *picker.pick_required(depth, &mut rng))
                .count()
        };
        let mid = freq(5);
        assert!(mid > freq(0));
        assert!(mid > freq(10));
    }
}
