//! End-to-end pipeline tests: feed literal sequences through the real
//! extractor, index, aggregation, scoring, compatibility filter, and tree
//! stages together, rather than exercising any one module in isolation.

use std::collections::HashMap;

use kmersplit::aggregate::{ColorTable, Mean};
use kmersplit::bitops::{BitBag, Word64};
use kmersplit::color::ColorSet;
use kmersplit::compat::filter_strict;
use kmersplit::extractor::DnaExtractor;
use kmersplit::index::Index;
use kmersplit::kmer::KmerDna;
use kmersplit::splits::compile_split_list;
use kmersplit::tree::{build_tree, to_newick};

type Kmer = KmerDna<Word64>;

fn submit_genome(index: &Index<Kmer, Word64>, color: usize, k: u32, seq: &[u8]) {
    let mut extractor: DnaExtractor<Word64> = DnaExtractor::new(k, false, None, None);
    for &c in seq {
        extractor.feed(c, |kmer| {
            index.submit(kmer, color, |k| (k.bits.as_u64() % index.shard_count() as u64) as usize);
        });
    }
}

fn mask(n: u32) -> ColorSet<Word64> {
    ColorSet { bits: Word64::low_mask(n) }
}

#[test]
fn singleton_migration_and_singleton_split_agree_on_canonical_form() {
    let n = 3u32;
    let index: Index<Kmer, Word64> = Index::new(n as usize);
    let k = 5;
    // genome0 and genome1 share every k-mer; genome2 is disjoint from both.
    submit_genome(&index, 0, k, b"ACGTACGTACGT");
    submit_genome(&index, 1, k, b"ACGTACGTACGT");
    submit_genome(&index, 2, k, b"TTGGCCAATTGG");

    let mut table: ColorTable<Word64> = ColorTable::new();
    let m = mask(n);
    table.accumulate_live(&index, n, &m);
    table.accumulate_singletons(&index.singleton_counters);

    // {0,1} (from the shared live k-mers) and {2} (from genome2's untouched
    // singletons) both canonicalize to the same representative: the
    // single-color side, since n=3 makes a 2-color set the majority.
    assert_eq!(table.len(), 1);
    let (colors, weights) = table.iter().next().unwrap();
    assert_eq!(colors.popcount(), 1);
    assert!(colors.test(2));
    assert!(weights[0] > 0, "genome2's own singleton k-mers contribute weight[0]");
    assert!(weights[1] > 0, "genome0/genome1's shared live k-mers contribute weight[1]");
}

#[test]
fn four_genome_conflicting_splits_strict_filter_drops_one() {
    let n = 4u32;
    let index: Index<Kmer, Word64> = Index::new(n as usize);
    let k = 4;
    // genome0 & genome1 share "ACGT" -> split {0,1}|{2,3}.
    submit_genome(&index, 0, k, b"ACGT");
    // genome1 also carries a second, unrelated k-mer "TTGG" (separated by an
    // invalid base so the window resets instead of blending the two).
    submit_genome(&index, 1, k, b"ACGTNTTGG");
    // genome2 shares that second k-mer -> split {1,2}|{0,3}, crossing the first.
    submit_genome(&index, 2, k, b"TTGG");
    // genome3 has a k-mer nobody else shares -> trivial singleton split.
    submit_genome(&index, 3, k, b"CCAA");

    let mut table: ColorTable<Word64> = ColorTable::new();
    let m = mask(n);
    table.accumulate_live(&index, n, &m);
    table.accumulate_singletons(&index.singleton_counters);
    assert_eq!(table.len(), 3);

    let list = compile_split_list(&table, Mean::Geom2, 0);
    assert_eq!(list.len(), 3);

    let kept = filter_strict(list, &m);
    // the two crossing splits can't both survive; the trivial singleton
    // split is compatible with everything and always survives.
    assert_eq!(kept.len(), 2);
    let has_singleton = kept.iter().any(|e| e.colors.popcount() == 1);
    assert!(has_singleton);
}

#[test]
fn three_genome_pipeline_produces_valid_newick() {
    let n = 3u32;
    let index: Index<Kmer, Word64> = Index::new(n as usize);
    let k = 5;
    submit_genome(&index, 0, k, b"ACGTACGTACGT");
    submit_genome(&index, 1, k, b"ACGTACGTACGT");
    submit_genome(&index, 2, k, b"TTGGCCAATTGG");

    let mut table: ColorTable<Word64> = ColorTable::new();
    let m = mask(n);
    table.accumulate_live(&index, n, &m);
    table.accumulate_singletons(&index.singleton_counters);

    let list = compile_split_list(&table, Mean::Geom2, 0);
    let weights: HashMap<ColorSet<Word64>, f64> =
        list.entries().iter().map(|e| (e.colors, e.score)).collect();
    let kept = filter_strict(list, &m);

    let root = build_tree(&kept, n, &m, &weights).expect("single informative split is compatible");
    let names = vec!["g0".to_string(), "g1".to_string(), "g2".to_string()];
    let newick = to_newick(&root, &names, None).expect("valid tree serializes");
    assert!(newick.ends_with(";\n"));
    for name in &names {
        assert!(newick.contains(name));
    }
}
