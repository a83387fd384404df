//! Bit-packed color sets and the bipartition algebra over them: canonical
//! representation, pairwise compatibility, and weak (three-way)
//! compatibility. Grounded directly on `color.cpp`'s `represent`,
//! `is_compatible`, and `is_weakly_compatible`.

use crate::bitops::{disjoint2, disjoint3, BitBag};

/// A set of colors (genomes), represented as a bitset of width `n` under
/// `mask`. `mask` and `n` are shared across every `ColorSet` in a run.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct ColorSet<B> {
    pub bits: B,
}

impl<B: BitBag> ColorSet<B> {
    pub fn empty() -> Self {
        ColorSet { bits: B::zero() }
    }

    pub fn singleton(color: usize) -> Self {
        let mut bits = B::zero();
        bits.set_bit(color);
        ColorSet { bits }
    }

    pub fn set(&mut self, color: usize) {
        self.bits.set_bit(color);
    }

    pub fn test(&self, color: usize) -> bool {
        self.bits.test_bit(color)
    }

    pub fn popcount(&self) -> u32 {
        self.bits.popcount()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_zero()
    }

    pub fn union(&self, other: &Self) -> Self {
        ColorSet { bits: self.bits.bitor(&other.bits) }
    }

    pub fn intersect(&self, other: &Self) -> Self {
        ColorSet { bits: self.bits.bitand(&other.bits) }
    }

    pub fn complement(&self, mask: &Self) -> Self {
        ColorSet { bits: self.bits.complement(&mask.bits) }
    }

    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.intersect(other).bits == self.bits
    }

    pub fn is_complete(&self, mask: &Self) -> bool {
        self.complement(mask).is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.popcount() == 1
    }

    /// Returns the canonical representative of the bipartition `{self,
    /// mask \ self}`: the side with fewer colors, breaking exact-half ties
    /// by keeping the side with color 0 set. Mirrors `color::represent`.
    pub fn canonicalize(&self, n: u32, mask: &Self) -> (Self, bool) {
        let count = self.popcount();
        if 2 * count < n || (2 * count == n && self.bits.test_bit(0)) {
            (*self, false)
        } else {
            (self.complement(mask), true)
        }
    }
}

/// Two splits are compatible iff at least one of the four pairwise
/// intersections between `{c1, ~c1}` and `{c2, ~c2}` is empty.
pub fn is_compatible<B: BitBag>(c1: &ColorSet<B>, c2: &ColorSet<B>, mask: &ColorSet<B>) -> bool {
    let n1 = c1.complement(mask);
    let n2 = c2.complement(mask);
    disjoint2(&c1.bits, &c2.bits)
        || disjoint2(&c1.bits, &n2.bits)
        || disjoint2(&n1.bits, &c2.bits)
        || disjoint2(&n1.bits, &n2.bits)
}

/// Three splits are weakly compatible iff both quadruple three-way
/// disjointness conditions hold, mirroring `color::is_weakly_compatible`.
pub fn is_weakly_compatible<B: BitBag>(
    c1: &ColorSet<B>,
    c2: &ColorSet<B>,
    c3: &ColorSet<B>,
    mask: &ColorSet<B>,
) -> bool {
    let n1 = c1.complement(mask);
    let n2 = c2.complement(mask);
    let n3 = c3.complement(mask);

    let first = disjoint3(&c1.bits, &c2.bits, &c3.bits)
        || disjoint3(&c1.bits, &n2.bits, &n3.bits)
        || disjoint3(&n1.bits, &c2.bits, &n3.bits)
        || disjoint3(&n1.bits, &n2.bits, &c3.bits);

    let second = disjoint3(&n1.bits, &n2.bits, &n3.bits)
        || disjoint3(&n1.bits, &c2.bits, &c3.bits)
        || disjoint3(&c1.bits, &n2.bits, &c3.bits)
        || disjoint3(&c1.bits, &c2.bits, &n3.bits);

    first && second
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitops::Word64;

    fn mask(n: u32) -> ColorSet<Word64> {
        ColorSet { bits: Word64::low_mask(n) }
    }

    #[test]
    fn canonicalize_picks_smaller_side() {
        let m = mask(4);
        let mut c: ColorSet<Word64> = ColorSet::empty();
        c.set(0);
        c.set(1);
        c.set(2);
        let (rep, inverted) = c.canonicalize(4, &m);
        assert!(inverted);
        assert_eq!(rep.popcount(), 1);
    }

    #[test]
    fn canonicalize_exact_half_tiebreaks_on_bit0() {
        let m = mask(4);
        let mut with_bit0: ColorSet<Word64> = ColorSet::empty();
        with_bit0.set(0);
        with_bit0.set(1);
        let (rep, inverted) = with_bit0.canonicalize(4, &m);
        assert!(!inverted);
        assert_eq!(rep.bits, with_bit0.bits);

        let mut without_bit0: ColorSet<Word64> = ColorSet::empty();
        without_bit0.set(2);
        without_bit0.set(3);
        let (_, inverted2) = without_bit0.canonicalize(4, &m);
        assert!(inverted2);
    }

    #[test]
    fn compatible_nested_splits() {
        let m = mask(4);
        let mut a: ColorSet<Word64> = ColorSet::empty();
        a.set(0);
        a.set(1);
        let mut b: ColorSet<Word64> = ColorSet::empty();
        b.set(0);
        assert!(is_compatible(&a, &b, &m));
    }

    #[test]
    fn incompatible_crossing_splits() {
        let m = mask(4);
        let mut a: ColorSet<Word64> = ColorSet::empty();
        a.set(0);
        a.set(1);
        let mut b: ColorSet<Word64> = ColorSet::empty();
        b.set(1);
        b.set(2);
        assert!(!is_compatible(&a, &b, &m));
    }

    #[test]
    fn complete_and_singleton() {
        let m = mask(3);
        assert!(m.is_complete(&m));
        let s: ColorSet<Word64> = ColorSet::singleton(1);
        assert!(s.is_singleton());
    }
}
