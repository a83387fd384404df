//! The sharded, concurrently-updated k-mer index. Grounded on
//! `graph.cpp`'s `kmer_table`/`singleton_kmer_table` pair, its
//! `table_count = 2^14+1` shard count, and the `hash_kmer` submission
//! protocol (live map takes priority, then singleton migration, then new
//! singleton insertion).

use std::collections::HashMap;
use std::hash::Hash;

use crate::bitops::BitBag;
use crate::color::ColorSet;
use crate::spinlock::SpinLock;

/// Fixed shard count: an odd number just above 2^14, matching the
/// original's `table_count = (0b1u << 14) + 1`. Odd and not a power of two
/// so that k-mer values (which are themselves often multiples of small
/// powers of two from the 2-bit packing) distribute evenly across shards.
pub const SHARD_COUNT: usize = (1 << 14) + 1;

struct Shard<K, B> {
    live: HashMap<K, ColorSet<B>>,
    singleton: HashMap<K, u32>,
}

impl<K: Eq + Hash, B> Default for Shard<K, B> {
    fn default() -> Self {
        Shard {
            live: HashMap::new(),
            singleton: HashMap::new(),
        }
    }
}

/// Per-color counts of currently-singleton k-mers (invariant I2: always
/// equal to the number of singleton-map entries pointing at that color,
/// summed across shards).
pub struct SingletonCounters {
    counters: Vec<SpinLock<u32>>,
}

impl SingletonCounters {
    pub fn new(n: usize) -> Self {
        SingletonCounters {
            counters: (0..n).map(|_| SpinLock::new(0)).collect(),
        }
    }

    pub fn increment(&self, color: usize) {
        *self.counters[color].lock() += 1;
    }

    pub fn decrement(&self, color: usize) {
        let mut guard = self.counters[color].lock();
        *guard = guard.saturating_sub(1);
    }

    pub fn get(&self, color: usize) -> u32 {
        *self.counters[color].lock()
    }

    pub fn len(&self) -> usize {
        self.counters.len()
    }
}

/// The full sharded index: one lock-protected `Shard` per bucket, plus the
/// global singleton counters. `K` is the canonical k-mer key type (DNA or
/// amino, already bit-packed); `B` is the color-set backend.
pub struct Index<K, B> {
    shards: Vec<SpinLock<Shard<K, B>>>,
    pub singleton_counters: SingletonCounters,
}

impl<K, B> Index<K, B>
where
    K: Eq + Hash + Copy,
    B: BitBag,
{
    pub fn new(n_colors: usize) -> Self {
        let mut shards = Vec::with_capacity(SHARD_COUNT);
        shards.resize_with(SHARD_COUNT, || SpinLock::new(Shard::default()));
        Index {
            shards,
            singleton_counters: SingletonCounters::new(n_colors),
        }
    }

    /// Submits one `(kmer, color)` observation. `shard_of` maps a k-mer to
    /// its shard index (see [`crate::hashing`]).
    pub fn submit(&self, kmer: K, color: usize, shard_of: impl Fn(&K) -> usize) {
        let bin = shard_of(&kmer) % SHARD_COUNT;
        let mut shard = self.shards[bin].lock();

        if let Some(colors) = shard.live.get_mut(&kmer) {
            colors.set(color);
            return;
        }

        if let Some(&existing) = shard.singleton.get(&kmer) {
            if existing as usize == color {
                return; // duplicate observation within the same genome
            }
            shard.singleton.remove(&kmer);
            let mut pair = ColorSet::empty();
            pair.set(existing as usize);
            pair.set(color);
            shard.live.insert(kmer, pair);
            drop(shard);
            self.singleton_counters.decrement(existing as usize);
            return;
        }

        shard.singleton.insert(kmer, color as u32);
        drop(shard);
        self.singleton_counters.increment(color);
    }

    /// Visits every live (non-singleton) entry. Order across shards is
    /// unspecified; downstream aggregation is order-insensitive.
    pub fn for_each_live(&self, mut f: impl FnMut(&K, &ColorSet<B>)) {
        for shard in &self.shards {
            let guard = shard.lock();
            for (k, v) in guard.live.iter() {
                f(k, v);
            }
        }
    }

    pub fn shard_count(&self) -> usize {
        SHARD_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitops::Word64;

    fn shard_of(k: &u64) -> usize {
        (*k as usize) % SHARD_COUNT
    }

    #[test]
    fn singleton_then_migration() {
        let idx: Index<u64, Word64> = Index::new(4);
        idx.submit(42, 0, shard_of);
        assert_eq!(idx.singleton_counters.get(0), 1);

        let mut seen_live = false;
        idx.for_each_live(|_, _| seen_live = true);
        assert!(!seen_live);

        idx.submit(42, 1, shard_of);
        assert_eq!(idx.singleton_counters.get(0), 0);

        let mut colors: Option<ColorSet<Word64>> = None;
        idx.for_each_live(|k, c| {
            if *k == 42 {
                colors = Some(*c);
            }
        });
        let colors = colors.expect("migrated kmer should be live");
        assert!(colors.test(0) && colors.test(1));
    }

    #[test]
    fn duplicate_within_same_color_is_noop() {
        let idx: Index<u64, Word64> = Index::new(2);
        idx.submit(7, 0, shard_of);
        idx.submit(7, 0, shard_of);
        assert_eq!(idx.singleton_counters.get(0), 1);
    }

    #[test]
    fn third_color_just_adds_bit() {
        let idx: Index<u64, Word64> = Index::new(3);
        idx.submit(9, 0, shard_of);
        idx.submit(9, 1, shard_of);
        idx.submit(9, 2, shard_of);
        let mut colors: Option<ColorSet<Word64>> = None;
        idx.for_each_live(|_, c| colors = Some(*c));
        let colors = colors.unwrap();
        assert_eq!(colors.popcount(), 3);
    }
}
