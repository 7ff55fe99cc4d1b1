//! Injectable random source for shuffling and side assignment
//!
//! Production code draws from a `StdRng` seeded from OS entropy. Tests swap in
//! [`ScriptedSource`] to pin the exact round order and left/right sides.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Randomness used by the pair matcher
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..bound` (`bound` is at least 1)
    fn pick_index(&mut self, bound: usize) -> usize;

    /// Fair coin flip
    fn coin_flip(&mut self) -> bool;
}

/// Adapter from any `rand::Rng` to [`RandomSource`]
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    /// Source seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible source for a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send + Sync> RandomSource for RngSource<R> {
    fn pick_index(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound.max(1))
    }

    fn coin_flip(&mut self) -> bool {
        self.rng.gen_bool(0.5)
    }
}

/// Deterministic source replaying fixed sequences
///
/// Once a sequence runs out, `pick_index` returns `bound - 1` (a Fisher-Yates
/// no-op swap) and `coin_flip` returns `true`. Scripted indices are clamped
/// into range.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    indices: VecDeque<usize>,
    flips: VecDeque<bool>,
}

impl ScriptedSource {
    pub fn new(indices: Vec<usize>, flips: Vec<bool>) -> Self {
        Self {
            indices: indices.into(),
            flips: flips.into(),
        }
    }

    /// No reordering, first model always on the left
    pub fn identity() -> Self {
        Self::default()
    }
}

impl RandomSource for ScriptedSource {
    fn pick_index(&mut self, bound: usize) -> usize {
        let last = bound.saturating_sub(1);
        self.indices.pop_front().map_or(last, |idx| idx.min(last))
    }

    fn coin_flip(&mut self) -> bool {
        self.flips.pop_front().unwrap_or(true)
    }
}

/// Uniform in-place Fisher-Yates shuffle
pub fn shuffle<T>(items: &mut [T], random: &mut dyn RandomSource) {
    for i in (1..items.len()).rev() {
        let j = random.pick_index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_scripted_identity_keeps_order() {
        let mut items = vec![1, 2, 3, 4];
        shuffle(&mut items, &mut ScriptedSource::identity());
        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_scripted_swaps() {
        // i=2 swaps with 0, i=1 swaps with 0
        let mut items = vec!['a', 'b', 'c'];
        shuffle(&mut items, &mut ScriptedSource::new(vec![0, 0], vec![]));
        assert_eq!(items, vec!['b', 'c', 'a']);
    }

    #[test]
    fn test_scripted_index_clamped() {
        let mut source = ScriptedSource::new(vec![10], vec![]);
        assert_eq!(source.pick_index(3), 2);
    }

    #[test]
    fn test_scripted_flips_then_default() {
        let mut source = ScriptedSource::new(vec![], vec![false]);
        assert!(!source.coin_flip());
        assert!(source.coin_flip());
    }

    #[test]
    fn test_rng_source_in_range() {
        let mut source = RngSource::seeded(7);
        for bound in 1..50 {
            assert!(source.pick_index(bound) < bound);
        }
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut source = RngSource::seeded(42);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut items, &mut source);
        let set: HashSet<u32> = items.iter().copied().collect();
        assert_eq!(set.len(), 20);
        assert_eq!(items.iter().sum::<u32>(), (0..20u32).sum::<u32>());
    }

    #[test]
    fn test_shuffle_reaches_every_permutation_of_three() {
        let mut source = RngSource::seeded(1);
        let mut seen = HashSet::new();
        for _ in 0..600 {
            let mut items = vec![0, 1, 2];
            shuffle(&mut items, &mut source);
            seen.insert(items);
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_shuffle_empty_and_single() {
        let mut source = ScriptedSource::new(vec![5], vec![]);
        let mut empty: Vec<u8> = vec![];
        shuffle(&mut empty, &mut source);
        let mut single = vec![9];
        shuffle(&mut single, &mut source);
        assert_eq!(single, vec![9]);
    }
}
