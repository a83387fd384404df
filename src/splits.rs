//! The bounded, score-descending top-T split list. Grounded on `graph.cpp`'s
//! `multimap_<double, color_t, greater<double>>` and `compile_split_list`'s
//! insert-then-evict-last pattern.

use crate::aggregate::{ColorTable, Mean};
use crate::bitops::BitBag;
use crate::color::ColorSet;

/// A small, monotonically increasing perturbation applied to break exact
/// score ties in insertion order, so the list has a total order even when
/// two splits happen to score identically. Mirrors the trie-backed
/// `TopSplits` path's tie handling; the perturbation is small enough
/// (1e-9 relative to typical weights) that it never reorders genuinely
/// distinct scores.
const TIE_BREAK_EPSILON: f64 = 1e-9;

#[derive(Clone, Debug)]
pub struct SplitListEntry<B> {
    pub score: f64,
    pub colors: ColorSet<B>,
}

pub struct SplitList<B> {
    entries: Vec<SplitListEntry<B>>,
    cap: usize,
    inserted: u64,
}

impl<B: BitBag> SplitList<B> {
    /// `cap == 0` means unbounded.
    pub fn new(cap: usize) -> Self {
        SplitList { entries: Vec::new(), cap, inserted: 0 }
    }

    pub fn current_min(&self) -> f64 {
        if self.cap == 0 || self.entries.len() < self.cap {
            f64::MIN
        } else {
            self.entries.last().map(|e| e.score).unwrap_or(f64::MIN)
        }
    }

    pub fn insert(&mut self, score: f64, colors: ColorSet<B>) {
        if score < self.current_min() {
            return;
        }
        self.inserted += 1;
        let perturbed = score - (self.inserted as f64) * TIE_BREAK_EPSILON;
        let pos = self
            .entries
            .partition_point(|e| e.score > perturbed);
        self.entries.insert(pos, SplitListEntry { score: perturbed, colors });
        if self.cap > 0 && self.entries.len() > self.cap {
            self.entries.pop();
        }
    }

    pub fn entries(&self) -> &[SplitListEntry<B>] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<SplitListEntry<B>> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, index: usize) -> SplitListEntry<B> {
        self.entries.remove(index)
    }
}

/// Builds a capped, score-descending split list from a finalized color
/// table, matching `compile_split_list`.
pub fn compile_split_list<B: BitBag + std::hash::Hash>(
    table: &ColorTable<B>,
    mean: Mean,
    cap: usize,
) -> SplitList<B> {
    let mut list = SplitList::new(cap);
    for (colors, weights) in table.iter() {
        let score = mean.score(weights[0], weights[1]);
        if score > 0.0 {
            list.insert(score, *colors);
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitops::Word64;

    fn cs(bits: u64) -> ColorSet<Word64> {
        ColorSet { bits: Word64::from_u64(bits) }
    }

    #[test]
    fn caps_at_t_and_keeps_highest_scores() {
        let mut list: SplitList<Word64> = SplitList::new(2);
        list.insert(1.0, cs(1));
        list.insert(3.0, cs(2));
        list.insert(2.0, cs(3));
        assert_eq!(list.len(), 2);
        assert!(list.entries()[0].score > list.entries()[1].score);
        // the score=1.0 entry should have been evicted
        assert!(list.entries().iter().all(|e| e.colors.bits.as_u64() != 1));
    }

    #[test]
    fn unbounded_when_cap_is_zero() {
        let mut list: SplitList<Word64> = SplitList::new(0);
        for i in 0..50 {
            list.insert(i as f64, cs(i));
        }
        assert_eq!(list.len(), 50);
    }
}
