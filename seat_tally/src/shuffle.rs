/*!
Sources of randomness for the counts.

STV shuffles the ballots once before they are distributed, and the plurality
counts shuffle the candidates tied at the cut-off. The source is injected so
that a count can be made reproducible.
*/
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Permutes a slice in place.
pub trait Shuffler {
    fn shuffle<T>(&mut self, items: &mut [T]);
}

/// Leaves everything in input order. All the tie-breaks become a function of
/// the input order.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct KeepOrder;

impl Shuffler for KeepOrder {
    fn shuffle<T>(&mut self, _items: &mut [T]) {}
}

/// Uniform shuffle seeded by the operating system. Two runs will not give the
/// same permutation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadShuffler;

impl Shuffler for ThreadShuffler {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut rand::thread_rng());
    }
}

/// A reproducible uniform shuffle, derived from a seed with a cryptographic hash.
///
/// Every call draws a different permutation, and the sequence of permutations
/// only depends on the seed. Each call hashes the seed and the call number
/// into the state of a `StdRng`.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeededShuffler {
    seed: u32,
    num_calls: u32,
}

impl SeededShuffler {
    pub fn new(seed: u32) -> SeededShuffler {
        SeededShuffler { seed, num_calls: 0 }
    }

    fn rng(&self) -> StdRng {
        let data = format!("{:08}{:08}", self.seed, self.num_calls);
        let digest = sha256::digest(data.as_str());
        // A sha256 digest is 64 hex characters.
        let state = u64::from_str_radix(digest.get(..16).unwrap_or("0"), 16).unwrap_or(0);
        StdRng::seed_from_u64(state)
    }
}

impl Shuffler for SeededShuffler {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng());
        debug!(
            "SeededShuffler: seed {} call {}: shuffled {} items",
            self.seed,
            self.num_calls,
            items.len()
        );
        self.num_calls += 1;
    }
}

impl<S: Shuffler> Shuffler for &mut S {
    fn shuffle<T>(&mut self, items: &mut [T]) {
        (**self).shuffle(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn keep_order_is_a_no_op() {
        let mut v = vec![1, 2, 3, 4];
        KeepOrder.shuffle(&mut v);
        assert_eq!(v, vec![1, 2, 3, 4]);
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let mut v1: Vec<u32> = (0..50).collect();
        let mut v2: Vec<u32> = (0..50).collect();
        SeededShuffler::new(42).shuffle(&mut v1);
        SeededShuffler::new(42).shuffle(&mut v2);
        assert_eq!(v1, v2);
        // Still a permutation.
        let mut sorted = v1.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<u32>>());
    }

    #[test]
    fn seeded_shuffle_changes_between_calls() {
        let mut s = SeededShuffler::new(7);
        let mut v1: Vec<u32> = (0..50).collect();
        let mut v2: Vec<u32> = (0..50).collect();
        s.shuffle(&mut v1);
        s.shuffle(&mut v2);
        assert_ne!(v1, v2);
    }

    #[test]
    fn seeded_permutations_are_evenly_spread() {
        let mut s = SeededShuffler::new(3);
        let mut counts: HashMap<Vec<u32>, u32> = HashMap::new();
        for _ in 0..6000 {
            let mut v = vec![0, 1, 2];
            s.shuffle(&mut v);
            *counts.entry(v).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 6);
        for (perm, n) in counts.iter() {
            assert!((800..1200).contains(n), "{:?} drawn {} times", perm, n);
        }
    }

    #[test]
    fn thread_shuffle_keeps_all_the_items() {
        let mut v: Vec<u32> = (0..20).collect();
        ThreadShuffler.shuffle(&mut v);
        v.sort();
        assert_eq!(v, (0..20).collect::<Vec<u32>>());
    }
}
