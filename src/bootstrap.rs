//! Bootstrap resampling of split support. Grounded on `graph.cpp`'s
//! `bootstrap`: for every split, redraw each side's k-mer count from
//! `Binomial(total_kmers, 1/total_kmers)`, repeated `weight` times, and
//! recompute the mean.
//!
//! `std::binomial_distribution` has no direct counterpart in `rand`
//! (binomial support was split out after 0.7), so replicate counts are
//! drawn via `rand_distr::Binomial`.

use std::collections::HashMap;

use rand::Rng;
use rand_distr::{Binomial, Distribution};

use crate::aggregate::{ColorTable, Mean};
use crate::bitops::BitBag;
use crate::color::ColorSet;
use crate::splits::{compile_split_list, SplitList};

/// Draws one bootstrap replicate's split list from `table`.
pub fn bootstrap_replicate<B: BitBag + std::hash::Hash, R: Rng>(
    table: &ColorTable<B>,
    mean: Mean,
    cap: usize,
    total_kmers: u64,
    rng: &mut R,
) -> SplitList<B> {
    if total_kmers == 0 {
        return SplitList::new(cap);
    }
    let dist = Binomial::new(total_kmers, 1.0 / total_kmers as f64)
        .expect("total_kmers > 0 implies a valid binomial parameterization");

    let mut list = SplitList::new(cap);
    for (colors, weights) in table.iter() {
        let mut resampled = [0u32, 0u32];
        for side in 0..2 {
            for _ in 0..weights[side] {
                resampled[side] = resampled[side].saturating_add(dist.sample(rng) as u32);
            }
        }
        let score = mean.score(resampled[0], resampled[1]);
        if score > 0.0 {
            list.insert(score, *colors);
        }
    }
    list
}

/// Runs `replicates` bootstrap rounds and returns, for each canonical
/// split, the fraction of replicates in which it appeared in the replicate
/// top list (the Newick support value).
pub fn support_values<B: BitBag + std::hash::Hash + Eq + Copy, R: Rng>(
    table: &ColorTable<B>,
    mean: Mean,
    cap: usize,
    total_kmers: u64,
    replicates: u32,
    rng: &mut R,
) -> HashMap<ColorSet<B>, f64> {
    let mut counts: HashMap<ColorSet<B>, u32> = HashMap::new();
    for _ in 0..replicates {
        let list = bootstrap_replicate(table, mean, cap, total_kmers, rng);
        for entry in list.entries() {
            *counts.entry(entry.colors).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(k, v)| (k, v as f64 / replicates as f64))
        .collect()
}

/// Convenience wrapper matching `compile_split_list`'s signature, used when
/// bootstrap is disabled (replicates == 0): just the observed split list,
/// no support values.
pub fn observed_split_list<B: BitBag + std::hash::Hash>(
    table: &ColorTable<B>,
    mean: Mean,
    cap: usize,
) -> SplitList<B> {
    compile_split_list(table, mean, cap)
}
