//! Greedy compatibility filters over a descending-score split list.
//! Grounded on `graph.cpp`'s `filter_strict`, `filter_n_tree`,
//! `filter_weakly`, `test_strict`, and `test_weakly`.

use crate::bitops::BitBag;
use crate::color::{is_compatible, is_weakly_compatible, ColorSet};
use crate::splits::{SplitList, SplitListEntry};

fn test_strict<B: BitBag>(candidate: &ColorSet<B>, kept: &[ColorSet<B>], mask: &ColorSet<B>) -> bool {
    kept.iter().all(|elem| is_compatible(elem, candidate, mask))
}

fn test_weakly<B: BitBag>(candidate: &ColorSet<B>, kept: &[ColorSet<B>], mask: &ColorSet<B>) -> bool {
    for elem1 in kept {
        if !is_compatible(elem1, candidate, mask) {
            for elem2 in kept {
                if !is_weakly_compatible(elem1, elem2, candidate, mask) {
                    return false;
                }
            }
        }
    }
    true
}

/// Walks the list in score-descending order, keeping a split iff it is
/// pairwise compatible with every split already kept; drops the rest.
/// Returns the kept splits in the order they were accepted (== score order).
pub fn filter_strict<B: BitBag + Clone>(
    list: SplitList<B>,
    mask: &ColorSet<B>,
) -> Vec<SplitListEntry<B>> {
    let mut tree: Vec<ColorSet<B>> = Vec::new();
    let mut kept = Vec::new();
    for entry in list.into_entries() {
        if test_strict(&entry.colors, &tree, mask) {
            tree.push(entry.colors);
            kept.push(entry);
        }
    }
    kept
}

/// First-fit n-tree filter: `n` independent strict-compatible trees; a
/// split is kept in the first tree it fits into.
pub fn filter_n_tree<B: BitBag + Clone>(
    list: SplitList<B>,
    mask: &ColorSet<B>,
    n: usize,
) -> Vec<Vec<SplitListEntry<B>>> {
    let mut forest: Vec<Vec<ColorSet<B>>> = vec![Vec::new(); n];
    let mut kept: Vec<Vec<SplitListEntry<B>>> = (0..n).map(|_| Vec::new()).collect();
    for entry in list.into_entries() {
        for (tree, kept_tree) in forest.iter_mut().zip(kept.iter_mut()) {
            if test_strict(&entry.colors, tree, mask) {
                tree.push(entry.colors);
                kept_tree.push(entry);
                break;
            }
        }
    }
    kept
}

/// Greedy weakly-compatible filter: keeps a split iff every pair of
/// already-kept splits remains weakly compatible together with it.
pub fn filter_weakly<B: BitBag + Clone>(
    list: SplitList<B>,
    mask: &ColorSet<B>,
) -> Vec<SplitListEntry<B>> {
    let mut network: Vec<ColorSet<B>> = Vec::new();
    let mut kept = Vec::new();
    for entry in list.into_entries() {
        if test_weakly(&entry.colors, &network, mask) {
            network.push(entry.colors);
            kept.push(entry);
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitops::Word64;

    fn cs(bits: u64) -> ColorSet<Word64> {
        ColorSet { bits: Word64::from_u64(bits) }
    }

    fn mask4() -> ColorSet<Word64> {
        ColorSet { bits: Word64::low_mask(4) }
    }

    #[test]
    fn strict_filter_drops_crossing_split() {
        let mask = mask4();
        let mut list: SplitList<Word64> = SplitList::new(0);
        // {0,1}|{2,3} scores higher than {1,2}|{0,3} which crosses it.
        list.insert(10.0, cs(0b0011));
        list.insert(5.0, cs(0b0110));
        let kept = filter_strict(list, &mask);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].colors.bits.as_u64(), 0b0011);
    }

    #[test]
    fn n_tree_first_fit_places_incompatible_split_in_second_tree() {
        let mask = mask4();
        let mut list: SplitList<Word64> = SplitList::new(0);
        list.insert(10.0, cs(0b0011));
        list.insert(5.0, cs(0b0110));
        let forest = filter_n_tree(list, &mask, 2);
        assert_eq!(forest[0].len(), 1);
        assert_eq!(forest[1].len(), 1);
    }
}
