//! Owns every piece of run state and drives the pipeline end to end:
//! extraction (parallel across genomes) -> aggregation -> top-list
//! compilation -> optional compatibility filter -> optional bootstrap ->
//! output. Replaces the original's global mutable singletons
//! (`graph::table_count`, `color::n`, `color::mask`, ...) with one owned
//! value built from the parsed CLI arguments and passed by reference
//! everywhere, per the concurrency redesign notes.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::SeedableRng;
use rayon::prelude::*;

use crate::aggregate::{ColorTable, Mean};
use crate::args::{Cli, Filter};
use crate::bitops::{BitBag, Bits};
use crate::bootstrap::support_values;
use crate::color::ColorSet;
use crate::compat::{filter_n_tree, filter_strict, filter_weakly};
use crate::error::SansError;
use crate::extractor::{AminoExtractor, DnaExtractor};
use crate::hashing::shard_id_word64;
use crate::index::Index;
use crate::io::graph::read_graph_kmers;
use crate::io::seq::{open_input_list, GenomeInput, SeqReader};
use crate::io::splits_io::{self, read_tsv};
use crate::io::translate::GeneticCode;
use crate::kmer::{KmerAmino, KmerDna};
use crate::quality::QualityFilter;
use crate::splits::{compile_split_list, SplitList, SplitListEntry};
use crate::tree::{build_tree, to_newick};

enum InputMode {
    Genomes(Vec<GenomeInput>),
    Graph(PathBuf),
    Splits(PathBuf),
}

pub struct RunConfig {
    mode: InputMode,
    pub k: u32,
    pub amino: bool,
    pub reverse: bool,
    pub window: Option<u32>,
    pub iupac: Option<u32>,
    pub q: u32,
    pub mean: Mean,
    pub top: crate::args::TopSize,
    pub filter: Option<Filter>,
    pub bootstrap: u32,
    pub threads: usize,
    pub verbose: bool,
    pub code: Option<GeneticCode>,
    pub output: Option<PathBuf>,
    pub newick: Option<PathBuf>,
}

/// A split list is either built from a weight/inverse-weight color table
/// (genome or graph input, scored by `mean`) or read back already-scored
/// from a `--splits` file, which skips scoring entirely.
enum Source {
    Table(ColorTable<Bits>),
    Prescored(SplitList<Bits>),
}

/// Outcome of assembling input from whichever mode was selected: the
/// scoring source, the genome names (index == color id), and the total
/// number of k-mers observed (0 for the `--splits` shortcut, which never
/// touches raw sequence and so has no bootstrap resampling basis).
struct Assembled {
    source: Source,
    names: Vec<String>,
    total_kmers: u64,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self, SansError> {
        cli.validate()?;
        let mode = if let Some(path) = &cli.input {
            InputMode::Genomes(open_input_list(path)?)
        } else if let Some(path) = &cli.graph {
            InputMode::Graph(path.clone())
        } else {
            InputMode::Splits(cli.splits.clone().expect("validate() guarantees one input source"))
        };
        let k = cli.default_kmer_length();
        let code = cli.code.map(GeneticCode::by_id).transpose()?;
        Ok(RunConfig {
            mode,
            k,
            amino: cli.amino,
            reverse: !cli.norev && !cli.amino,
            window: if cli.window > 1 { Some(cli.window) } else { None },
            iupac: cli.iupac,
            q: cli.qualify,
            mean: cli.mean,
            top: cli.top,
            filter: cli.filter,
            bootstrap: cli.bootstrap,
            threads: cli.threads.unwrap_or_else(num_cpus::get),
            verbose: cli.verbose,
            code,
            output: cli.output.clone(),
            newick: cli.newick.clone(),
        })
    }

    fn log(&self, msg: &str) {
        if self.verbose {
            eprintln!("{msg}");
        }
    }

    /// Runs the full pipeline and writes the configured outputs.
    pub fn run(&self) -> Result<(), SansError> {
        let assembled = match &self.mode {
            InputMode::Genomes(genomes) => self.assemble_from_genomes(genomes)?,
            InputMode::Graph(path) => self.assemble_from_graph(path)?,
            InputMode::Splits(path) => self.assemble_from_splits(path)?,
        };

        let n = assembled.names.len() as u32;
        let mask = ColorSet { bits: Bits::low_mask(n) };
        let top_cap = self.top.resolve(assembled.names.len().max(1));

        let list = match &assembled.source {
            Source::Table(table) => {
                self.log(&format!("{} distinct splits in the color table", table.len()));
                compile_split_list(table, self.mean, top_cap)
            }
            Source::Prescored(list) => {
                let mut capped = SplitList::new(top_cap);
                for entry in list.entries() {
                    capped.insert(entry.score, entry.colors);
                }
                capped
            }
        };
        self.log(&format!("top list has {} splits", list.len()));

        let weight_lookup: HashMap<ColorSet<Bits>, f64> =
            list.entries().iter().map(|e| (e.colors, e.score)).collect();

        let filtered: Vec<SplitListEntry<Bits>> = match self.filter {
            Some(Filter::Strict) | None => filter_strict(list, &mask),
            Some(Filter::Weakly) => filter_weakly(list, &mask),
            Some(Filter::NTree(trees)) => {
                filter_n_tree(list, &mask, trees as usize).into_iter().flatten().collect()
            }
        };

        let support = if self.bootstrap > 0 && assembled.total_kmers > 0 {
            if let Source::Table(table) = &assembled.source {
                let mut rng = rand::rngs::StdRng::seed_from_u64(0x5a17_5a17);
                Some(support_values(
                    table,
                    self.mean,
                    top_cap,
                    assembled.total_kmers,
                    self.bootstrap,
                    &mut rng,
                ))
            } else {
                None
            }
        } else {
            None
        };

        if let Some(path) = &self.output {
            splits_io::write_tsv(path, &filtered, &assembled.names)?;
        }

        if let Some(path) = &self.newick {
            let root = build_tree(&filtered, n, &mask, &weight_lookup)?;
            let newick = to_newick(&root, &assembled.names, support.as_ref())?;
            std::fs::write(path, newick).map_err(SansError::Io)?;
        }

        Ok(())
    }

    fn assemble_from_splits(&self, path: &PathBuf) -> Result<Assembled, SansError> {
        let names = splits_io::distinct_names(path)?;
        let mut name_to_color = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            name_to_color.insert(name.clone(), i);
        }
        let entries: Vec<SplitListEntry<Bits>> = read_tsv(path, &name_to_color)?;
        let mut list = SplitList::new(0);
        for entry in entries {
            list.insert(entry.score, entry.colors);
        }
        Ok(Assembled { source: Source::Prescored(list), names, total_kmers: 0 })
    }

    fn assemble_from_graph(&self, path: &PathBuf) -> Result<Assembled, SansError> {
        let records = read_graph_kmers(path)?;
        let width = records
            .iter()
            .map(|r| 64 - r.color_mask.leading_zeros())
            .max()
            .unwrap_or(1)
            .max(1);
        let names: Vec<String> = (0..width).map(|i| format!("genome{i}")).collect();
        let mask = ColorSet { bits: Bits::low_mask(width) };
        let mut table: ColorTable<Bits> = ColorTable::new();
        for record in &records {
            let mut colors: ColorSet<Bits> = ColorSet::empty();
            for i in 0..width {
                if record.color_mask & (1 << i) != 0 {
                    colors.set(i as usize);
                }
            }
            let (canonical, inverted) = colors.canonicalize(width, &mask);
            if canonical.is_empty() {
                continue;
            }
            table.record(canonical, inverted);
        }
        Ok(Assembled {
            source: Source::Table(table),
            names,
            total_kmers: records.len() as u64,
        })
    }

    fn assemble_from_genomes(&self, genomes: &[GenomeInput]) -> Result<Assembled, SansError> {
        let n = genomes.len() as u32;
        if n == 0 {
            return Err(SansError::Configuration("no genomes to process".into()));
        }
        let total_kmers = AtomicU64::new(0);
        let mut table: ColorTable<Bits> = ColorTable::new();
        let mask = ColorSet { bits: Bits::low_mask(n) };

        if self.amino || self.code.is_some() {
            let index: Index<KmerAmino<Bits>, Bits> = Index::new(n as usize);
            self.extract_amino(genomes, &index, &total_kmers)?;
            table.accumulate_live(&index, n, &mask);
            table.accumulate_singletons(&index.singleton_counters);
        } else {
            let index: Index<KmerDna<Bits>, Bits> = Index::new(n as usize);
            self.extract_dna(genomes, &index, &total_kmers)?;
            table.accumulate_live(&index, n, &mask);
            table.accumulate_singletons(&index.singleton_counters);
        }

        Ok(Assembled {
            source: Source::Table(table),
            names: genomes.iter().map(|g| g.name.clone()).collect(),
            total_kmers: total_kmers.load(Ordering::Relaxed),
        })
    }

    fn extract_dna(
        &self,
        genomes: &[GenomeInput],
        index: &Index<KmerDna<Bits>, Bits>,
        total_kmers: &AtomicU64,
    ) -> Result<(), SansError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| SansError::Configuration(format!("failed to build thread pool: {e}")))?;

        let q = self.q;
        let results: Vec<Result<(), SansError>> = pool.install(|| {
            genomes
                .par_iter()
                .enumerate()
                .map(|(color, genome)| -> Result<(), SansError> {
                    let mut quality: QualityFilter<KmerDna<Bits>> = QualityFilter::uniform(1, q);
                    let mut extractor: DnaExtractor<Bits> =
                        DnaExtractor::new(self.k, self.reverse, self.window, self.iupac);
                    let mut local_count = 0u64;
                    for file in &genome.files {
                        let mut reader = SeqReader::open(file)?;
                        while let Some(record) = reader.next_record()? {
                            for &c in &record.seq {
                                extractor.feed(c, |kmer| {
                                    local_count += 1;
                                    if quality.observe(kmer, 0) {
                                        index.submit(kmer, color, |k| shard_of_dna(k));
                                    }
                                });
                            }
                        }
                    }
                    quality.finish();
                    total_kmers.fetch_add(local_count, Ordering::Relaxed);
                    Ok(())
                })
                .collect()
        });
        results.into_iter().collect::<Result<Vec<()>, _>>()?;
        Ok(())
    }

    fn extract_amino(
        &self,
        genomes: &[GenomeInput],
        index: &Index<KmerAmino<Bits>, Bits>,
        total_kmers: &AtomicU64,
    ) -> Result<(), SansError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()
            .map_err(|e| SansError::Configuration(format!("failed to build thread pool: {e}")))?;

        let q = self.q;
        let code = &self.code;
        let results: Vec<Result<(), SansError>> = pool.install(|| {
            genomes
                .par_iter()
                .enumerate()
                .map(|(color, genome)| -> Result<(), SansError> {
                    let mut quality: QualityFilter<KmerAmino<Bits>> = QualityFilter::uniform(1, q);
                    let mut extractor: AminoExtractor<Bits> = AminoExtractor::new(self.k, self.window);
                    let mut local_count = 0u64;
                    for file in &genome.files {
                        let mut reader = SeqReader::open(file)?;
                        while let Some(record) = reader.next_record()? {
                            let residues: Vec<u8> = match code {
                                Some(table) => table.translate(&record.seq),
                                None => record.seq.clone(),
                            };
                            for &c in &residues {
                                extractor.feed(c, |kmer| {
                                    local_count += 1;
                                    if quality.observe(kmer, 0) {
                                        index.submit(kmer, color, |k| shard_of_amino(k));
                                    }
                                });
                            }
                        }
                    }
                    quality.finish();
                    total_kmers.fetch_add(local_count, Ordering::Relaxed);
                    Ok(())
                })
                .collect()
        });
        results.into_iter().collect::<Result<Vec<()>, _>>()?;
        Ok(())
    }
}

#[cfg(all(feature = "small", not(feature = "large")))]
fn shard_of_dna(kmer: &KmerDna<Bits>) -> usize {
    shard_id_word64(&kmer.bits)
}

#[cfg(feature = "large")]
fn shard_of_dna(kmer: &KmerDna<Bits>) -> usize {
    let width = (2 * kmer.k) as usize;
    let table = crate::hashing::PeriodTable::new(width.max(1));
    crate::hashing::shard_id_word_array(&kmer.bits, &table, width)
}

#[cfg(all(feature = "small", not(feature = "large")))]
fn shard_of_amino(kmer: &KmerAmino<Bits>) -> usize {
    shard_id_word64(&kmer.bits)
}

#[cfg(feature = "large")]
fn shard_of_amino(kmer: &KmerAmino<Bits>) -> usize {
    let width = (5 * kmer.k) as usize;
    let table = crate::hashing::PeriodTable::new(width.max(1));
    crate::hashing::shard_id_word_array(&kmer.bits, &table, width)
}
