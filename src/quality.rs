//! Per-worker coverage quality filter. Grounded on `graph.cpp`'s
//! `emplace_kmer`/`emplace_kmer_tmp` closures and their thread-indexed
//! pending maps — redesigned here as state owned by each worker rather
//! than a shared map keyed by thread id, since each worker already owns
//! its slice of the work.

use std::collections::HashMap;
use std::collections::HashSet;
use std::hash::Hash;

/// Per-color coverage threshold: a k-mer from color `c` is released to the
/// index only once it has been seen `q_table[c]` times by this worker.
#[derive(Clone)]
pub struct QualityFilter<K> {
    q_table: Vec<u32>,
    pending_set: HashSet<K>,
    pending_counts: HashMap<K, u32>,
}

impl<K: Eq + Hash + Copy> QualityFilter<K> {
    pub fn new(q_table: Vec<u32>) -> Self {
        QualityFilter {
            q_table,
            pending_set: HashSet::new(),
            pending_counts: HashMap::new(),
        }
    }

    pub fn uniform(n_colors: usize, q: u32) -> Self {
        Self::new(vec![q; n_colors])
    }

    /// Returns `true` if `kmer` observed from `color` should now be
    /// submitted to the index.
    pub fn observe(&mut self, kmer: K, color: usize) -> bool {
        let q = self.q_table.get(color).copied().unwrap_or(1);
        if q <= 1 {
            return true;
        }
        if q == 2 {
            if self.pending_set.remove(&kmer) {
                true
            } else {
                self.pending_set.insert(kmer);
                false
            }
        } else {
            let count = self.pending_counts.entry(kmer).or_insert(0);
            *count += 1;
            if *count >= q - 1 {
                self.pending_counts.remove(&kmer);
                true
            } else {
                false
            }
        }
    }

    /// Discards all pending (not-yet-released) state; called once at the
    /// end of this worker's stream.
    pub fn finish(&mut self) {
        self.pending_set.clear();
        self.pending_counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q2_releases_on_second_sighting() {
        let mut f: QualityFilter<u64> = QualityFilter::uniform(1, 2);
        assert!(!f.observe(5, 0));
        assert!(f.observe(5, 0));
    }

    #[test]
    fn q3_releases_on_second_sighting_due_to_q_minus_1() {
        let mut f: QualityFilter<u64> = QualityFilter::uniform(1, 3);
        assert!(!f.observe(5, 0));
        assert!(f.observe(5, 0));
    }

    #[test]
    fn q0_and_q1_pass_through() {
        let mut f: QualityFilter<u64> = QualityFilter::uniform(1, 1);
        assert!(f.observe(5, 0));
        assert!(f.observe(5, 0));
    }

    #[test]
    fn per_color_threshold_table() {
        let mut f: QualityFilter<u64> = QualityFilter::new(vec![1, 2]);
        assert!(f.observe(1, 0));
        assert!(!f.observe(1, 1));
        assert!(f.observe(1, 1));
    }
}
