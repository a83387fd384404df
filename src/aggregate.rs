//! Folds the finalized k-mer index into a table of (weight, inverse-weight)
//! pairs keyed by canonical split, plus the scoring functions used to rank
//! them. Grounded on `graph.cpp`'s `add_weights`, `add_singleton_weights`,
//! and `compile_split_list`.

use std::collections::HashMap;

use crate::bitops::BitBag;
use crate::color::ColorSet;
use crate::index::{Index, SingletonCounters};

/// Scoring function applied to a split's (weight, inverse-weight) pair.
/// `Geom2` is the pseudo-count variant and the default: it tolerates splits
/// where one side has zero observations, which `Geom` would always score
/// zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mean {
    Arith,
    Geom,
    Geom2,
}

impl Mean {
    pub fn score(&self, weight: u32, inverse: u32) -> f64 {
        match self {
            Mean::Arith => (weight as f64 + inverse as f64) / 2.0,
            Mean::Geom => (weight as f64).sqrt() * (inverse as f64).sqrt(),
            Mean::Geom2 => ((weight + 1) as f64).sqrt() * ((inverse + 1) as f64).sqrt(),
        }
    }
}

impl std::str::FromStr for Mean {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arith" => Ok(Mean::Arith),
            "geom" => Ok(Mean::Geom),
            "geom2" => Ok(Mean::Geom2),
            other => Err(format!("unknown mean function: {other}")),
        }
    }
}

/// Maps each canonical split to `[weight, inverse_weight]`.
pub struct ColorTable<B> {
    table: HashMap<ColorSet<B>, [u32; 2]>,
}

impl<B: BitBag + std::hash::Hash> ColorTable<B> {
    pub fn new() -> Self {
        ColorTable { table: HashMap::new() }
    }

    /// Walks every live index entry, canonicalizes its color set, and
    /// increments the weight/inverse-weight counter for that split.
    pub fn accumulate_live<K: Eq + std::hash::Hash + Copy>(
        &mut self,
        index: &Index<K, B>,
        n: u32,
        mask: &ColorSet<B>,
    ) {
        index.for_each_live(|_, colors| {
            let (canonical, inverted) = colors.canonicalize(n, mask);
            if canonical.is_empty() {
                return;
            }
            let entry = self.table.entry(canonical).or_insert([0, 0]);
            entry[inverted as usize] += 1;
        });
    }

    /// Records a single observation of an already-canonicalized split,
    /// incrementing the weight or inverse-weight side. Used when splits are
    /// folded in one at a time from a source that isn't a live [`Index`]
    /// (e.g. a colored de-Bruijn graph file).
    pub fn record(&mut self, canonical: ColorSet<B>, inverted: bool) {
        let entry = self.table.entry(canonical).or_insert([0, 0]);
        entry[inverted as usize] += 1;
    }

    /// Adds the trivial singleton split for every color with remaining
    /// singleton k-mers: these always canonicalize to the single-color side
    /// (never inverted, since a 1-color set is the minority side whenever
    /// n>2).
    pub fn accumulate_singletons(&mut self, counters: &SingletonCounters) {
        for color in 0..counters.len() {
            let count = counters.get(color);
            if count == 0 {
                continue;
            }
            let singleton = ColorSet::singleton(color);
            let entry = self.table.entry(singleton).or_insert([0, 0]);
            entry[0] += count;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColorSet<B>, &[u32; 2])> {
        self.table.iter()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<B: BitBag + std::hash::Hash> Default for ColorTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitops::Word64;

    #[test]
    fn geom2_tolerates_zero_side() {
        assert!(Mean::Geom2.score(5, 0) > 0.0);
        assert_eq!(Mean::Geom.score(5, 0), 0.0);
    }

    #[test]
    fn accumulate_live_canonicalizes_and_counts() {
        let idx: Index<u64, Word64> = Index::new(4);
        let shard_of = |k: &u64| (*k as usize) % crate::index::SHARD_COUNT;
        idx.submit(1, 0, shard_of);
        idx.submit(1, 1, shard_of);
        idx.submit(1, 2, shard_of);

        let mask = ColorSet { bits: Word64::low_mask(4) };
        let mut table: ColorTable<Word64> = ColorTable::new();
        table.accumulate_live(&idx, 4, &mask);
        assert_eq!(table.len(), 1);
        let (_, weights) = table.iter().next().unwrap();
        // {0,1,2} canonicalizes to its complement {3} since popcount 3 > 4/2.
        assert_eq!(weights[1], 1);
    }
}
