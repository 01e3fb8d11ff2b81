// --- File: src/data/sampler.rs ---

//! Index orders for one pass of the DataLoader.

use crate::seed;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::ops::Range;
use std::vec::IntoIter;

/// Dataset indices `0..len` in order.
pub struct SequentialSampler(Range<usize>);

impl SequentialSampler {
    pub fn new(len: usize) -> Self {
        Self(0..len)
    }
}

impl Iterator for SequentialSampler {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.0.next()
    }
}

/// A permutation of `0..len`, fixed at construction.
///
/// Without an explicit seed the permutation is drawn from the process-wide
/// general-purpose generator, so [`seed::set_seeds`] makes it reproducible.
pub struct RandomSampler(IntoIter<usize>);

impl RandomSampler {
    pub fn new(len: usize) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        seed::with_cpu_rng(|rng| order.shuffle(rng));
        Self(order.into_iter())
    }

    /// A permutation from its own seed, independent of the global generator.
    pub fn with_seed(len: usize, seed: u64) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut StdRng::seed_from_u64(seed));
        Self(order.into_iter())
    }
}

impl Iterator for RandomSampler {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.0.next()
    }
}

/// Chunks an index stream into batches of `batch_size`.
pub struct BatchSampler<S> {
    indices: S,
    batch_size: usize,
    drop_last: bool,
}

impl<S: Iterator<Item = usize>> BatchSampler<S> {
    /// A zero `batch_size` is treated as 1. With `drop_last` a trailing short
    /// batch is discarded.
    pub fn new(indices: S, batch_size: usize, drop_last: bool) -> Self {
        Self {
            indices,
            batch_size: batch_size.max(1),
            drop_last,
        }
    }
}

impl<S: Iterator<Item = usize>> Iterator for BatchSampler<S> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let chunk: Vec<usize> = self.indices.by_ref().take(self.batch_size).collect();
        match chunk.len() {
            0 => None,
            n if n < self.batch_size && self.drop_last => None,
            _ => Some(chunk),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_order() {
        assert_eq!(SequentialSampler::new(4).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(SequentialSampler::new(0).count(), 0);
    }

    #[test]
    fn test_seeded_permutation() {
        let a: Vec<_> = RandomSampler::with_seed(20, 7).collect();
        let b: Vec<_> = RandomSampler::with_seed(20, 7).collect();
        assert_eq!(a, b);

        let mut sorted = a;
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_batches_keep_short_tail() {
        let batches: Vec<_> = BatchSampler::new(SequentialSampler::new(10), 3, false).collect();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[0], vec![0, 1, 2]);
        assert_eq!(batches[3], vec![9]);
    }

    #[test]
    fn test_drop_last_discards_short_tail() {
        let batches: Vec<_> = BatchSampler::new(SequentialSampler::new(10), 3, true).collect();
        assert_eq!(batches, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6, 7, 8]]);
    }

    #[test]
    fn test_zero_batch_size_is_one() {
        let batches: Vec<_> = BatchSampler::new(SequentialSampler::new(3), 0, false).collect();
        assert_eq!(batches, vec![vec![0], vec![1], vec![2]]);
    }
}
