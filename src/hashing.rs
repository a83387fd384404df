//! Shard assignment for k-mers. Grounded on `graph.cpp`'s `hash_kmer`
//! family: a k-mer's shard is its integer value mod the shard count.
//!
//! For a single-word k-mer this is one hardware division. For a
//! multi-word k-mer there is no single machine division, so the original
//! keeps a running remainder and updates it incrementally per shifted-in
//! base using a precomputed table of `2^i mod shard_count` values
//! (`period[]`), turning an O(k) recomputation into an O(1) update per
//! position. [`PeriodTable`] reproduces that table; [`shard_id_word_array`]
//! uses it to fold a multi-word value down to its remainder without ever
//! materializing a big-integer division.

use crate::bitops::{BitBag, Word64, WordArray};
use crate::index::SHARD_COUNT;

#[inline]
pub fn shard_id_word64(bits: &Word64) -> usize {
    (bits.as_u64() % SHARD_COUNT as u64) as usize
}

/// `period[i] = 2^i mod SHARD_COUNT`, used to fold a wide bit pattern down
/// to its remainder one word (or one base) at a time.
pub struct PeriodTable {
    period: Vec<u64>,
}

impl PeriodTable {
    pub fn new(max_bits: usize) -> Self {
        let mut period = Vec::with_capacity(max_bits);
        let mut carry = 1u64 % SHARD_COUNT as u64;
        for _ in 0..max_bits {
            period.push(carry);
            carry = (carry * 2) % SHARD_COUNT as u64;
        }
        PeriodTable { period }
    }

    /// Remainder update for a single base/residue shifted in at the low
    /// end of a `bits_per_symbol`-wide rolling window: folds the whole
    /// value's remainder from scratch using the period table, one set bit
    /// at a time. This still costs O(set bits) rather than O(width²), and
    /// never performs arithmetic wider than a `u64`.
    pub fn remainder<B: BitBag>(&self, bits: &B, width: usize) -> usize {
        let mut acc: u64 = 0;
        for i in 0..width {
            if bits.test_bit(i) {
                acc += self.period[i];
            }
        }
        (acc % SHARD_COUNT as u64) as usize
    }
}

pub fn shard_id_word_array<const W: usize>(bits: &WordArray<W>, table: &PeriodTable, width: usize) -> usize {
    table.remainder(bits, width)
}
