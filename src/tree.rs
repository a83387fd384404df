//! Tree construction from a strict-compatible split set, and Newick
//! serialization. Grounded on `graph.cpp`'s `node`/`newSet`, `refine_tree`,
//! `build_tree`, and `print_tree`.

use std::collections::HashMap;

use crate::bitops::BitBag;
use crate::color::ColorSet;
use crate::error::SansError;
use crate::splits::SplitListEntry;

pub struct TreeNode<B> {
    pub taxa: ColorSet<B>,
    pub weight: f64,
    pub children: Vec<TreeNode<B>>,
}

impl<B: BitBag> TreeNode<B> {
    fn leaf(taxa: ColorSet<B>, weight: f64) -> Self {
        TreeNode { taxa, weight, children: Vec::new() }
    }
}

/// Recursively refines `node` by `split`, following the five cases in
/// `refine_tree`: too small to matter, exact match, fully nested (recurse),
/// partially covering exactly one child (recurse with the complement), or
/// spanning two-or-more children (introduce a new interior node).
fn refine_tree<B: BitBag + Clone>(
    node: &mut TreeNode<B>,
    split: &ColorSet<B>,
    all_taxa: &ColorSet<B>,
    weight: f64,
) -> Result<(), SansError> {
    if split.popcount() < 2 || all_taxa.popcount() - split.popcount() < 2 {
        return Ok(());
    }

    for child in node.children.iter_mut() {
        if child.taxa.bits == split.bits {
            return Ok(());
        }
        if split.is_subset_of(&child.taxa) {
            return refine_tree(child, split, all_taxa, weight);
        }
    }

    let mut fully_covered_idx: Vec<usize> = Vec::new();
    let mut partial_idx: Option<usize> = None;

    for (i, child) in node.children.iter().enumerate() {
        if child.taxa.is_subset_of(split) {
            fully_covered_idx.push(i);
        } else if !child.taxa.intersect(split).is_empty() {
            if partial_idx.is_some() {
                return Err(SansError::Invariant("splits are incompatible".into()));
            }
            partial_idx = Some(i);
        }
    }

    if let Some(pidx) = partial_idx {
        if fully_covered_idx.len() == node.children.len() - 1 {
            let inverse = split.complement(all_taxa);
            if inverse.is_subset_of(&node.children[pidx].taxa) {
                return refine_tree(&mut node.children[pidx], &inverse, all_taxa, weight);
            }
            return Err(SansError::Invariant("splits are incompatible".into()));
        }
        return Err(SansError::Invariant("splits are incompatible".into()));
    } else if fully_covered_idx.len() > 1 {
        let mut new_taxa = ColorSet::empty();
        for &i in &fully_covered_idx {
            new_taxa = new_taxa.union(&node.children[i].taxa);
        }
        let mut grouped = Vec::new();
        // drain in descending index order so earlier indices stay valid
        let mut sorted_idx = fully_covered_idx.clone();
        sorted_idx.sort_unstable_by(|a, b| b.cmp(a));
        for i in sorted_idx {
            grouped.push(node.children.remove(i));
        }
        grouped.reverse();
        node.children.push(TreeNode { taxa: new_taxa, weight, children: grouped });
        Ok(())
    } else {
        Err(SansError::Invariant(
            "just one fully covered subset and nothing else".into(),
        ))
    }
}

/// Builds a multifurcating tree from `n` leaves and a descending-score,
/// strict-compatible split list, looking up each split's (and each leaf's)
/// weight in `weights`.
pub fn build_tree<B: BitBag + Clone + std::hash::Hash>(
    splits: &[SplitListEntry<B>],
    n: u32,
    mask: &ColorSet<B>,
    weights: &HashMap<ColorSet<B>, f64>,
) -> Result<TreeNode<B>, SansError> {
    let mut children = Vec::with_capacity(n as usize);
    for i in 0..n {
        let leaf = ColorSet::singleton(i as usize);
        let weight = weights.get(&leaf).copied().unwrap_or(0.0);
        children.push(TreeNode::leaf(leaf, weight));
    }
    let mut root = TreeNode { taxa: *mask, weight: 0.0, children };

    for entry in splits {
        refine_tree(&mut root, &entry.colors, mask, entry.score)?;
    }
    Ok(root)
}

/// Serializes a tree to Newick. `names[i]` is the label for leaf color `i`.
/// `support` optionally maps an interior node's taxa set to a fractional
/// bootstrap support value, printed between `)` and `:`.
pub fn to_newick<B: BitBag>(
    root: &TreeNode<B>,
    names: &[String],
    support: Option<&HashMap<ColorSet<B>, f64>>,
) -> Result<String, SansError>
where
    ColorSet<B>: std::hash::Hash + Eq,
{
    let body = print_node(root, names, support)?;
    Ok(format!("{body};\n"))
}

fn print_node<B: BitBag>(
    node: &TreeNode<B>,
    names: &[String],
    support: Option<&HashMap<ColorSet<B>, f64>>,
) -> Result<String, SansError>
where
    ColorSet<B>: std::hash::Hash + Eq,
{
    if node.children.is_empty() {
        match node.taxa.popcount() {
            0 => Err(SansError::Invariant("child with no taxon".into())),
            1 => {
                let idx = node.taxa.bits.tzcnt() as usize;
                let name = names.get(idx).cloned().unwrap_or_else(|| idx.to_string());
                Ok(format!("{name}:{}", node.weight))
            }
            _ => Err(SansError::Invariant("child with more than one taxon".into())),
        }
    } else {
        let mut parts = Vec::with_capacity(node.children.len());
        for child in &node.children {
            parts.push(print_node(child, names, support)?);
        }
        let mut s = format!("({})", parts.join(","));
        if let Some(map) = support {
            if let Some(value) = map.get(&node.taxa) {
                s.push_str(&value.to_string());
            }
        }
        s.push(':');
        s.push_str(&node.weight.to_string());
        Ok(s)
    }
}
