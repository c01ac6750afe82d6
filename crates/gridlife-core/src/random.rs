//! Random draws threaded explicitly through the decision and action paths.

use rand::Rng;

/// Uniform integer capability consumed by the simulation.
///
/// Only [`RandomSource::uniform`] is required; the helpers are derived from it so a
/// scripted source only has to replay integers.
pub trait RandomSource {
    /// Returns an integer in the half-open range `[lo, hi)`, or `lo` when the range is empty.
    fn uniform(&mut self, lo: u64, hi: u64) -> u64;

    /// Uniform index into a collection of `len` items.
    fn index(&mut self, len: usize) -> usize {
        self.uniform(0, len as u64) as usize
    }

    /// Fair coin flip.
    fn coin(&mut self) -> bool {
        self.uniform(0, 2) == 1
    }
}

/// Adapts any `rand` generator into a [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl<R: Rng> RandomSource for RngSource<R> {
    fn uniform(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        self.0.random_range(lo..hi)
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`].
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.index(i + 1);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::SmallRng};

    #[test]
    fn uniform_stays_in_half_open_range() {
        let mut source = RngSource(SmallRng::seed_from_u64(9));
        for _ in 0..1_000 {
            let value = source.uniform(3, 7);
            assert!((3..7).contains(&value));
        }
        assert_eq!(source.uniform(5, 5), 5);
        assert_eq!(source.uniform(6, 2), 6);
    }

    #[test]
    fn shuffle_preserves_elements() {
        let mut source = RngSource(SmallRng::seed_from_u64(1));
        let mut items = vec![1, 2, 3, 4, 5, 6];
        shuffle(&mut source, &mut items);
        items.sort_unstable();
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
    }
}
