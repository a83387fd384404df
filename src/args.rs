//! Command-line surface. One flat `clap::Parser` struct, matching the
//! `kr2r::args` style of deriving flags directly onto a struct with
//! `value_parser` ranges rather than hand-rolled validation.

use std::path::PathBuf;

use clap::Parser;

use crate::aggregate::Mean;
use crate::error::SansError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    Strict,
    Weakly,
    NTree(u64),
}

impl std::str::FromStr for Filter {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(Filter::Strict),
            "weakly" => Ok(Filter::Weakly),
            other => {
                if let Some(n) = other.strip_suffix("-tree") {
                    n.parse::<u64>()
                        .map(Filter::NTree)
                        .map_err(|_| format!("invalid n-tree count: {other}"))
                } else {
                    Err(format!("unknown filter: {other}"))
                }
            }
        }
    }
}

/// Top-T list size: a plain integer, or an integer with a trailing `n`
/// meaning "multiplied by the genome count".
#[derive(Copy, Clone, Debug)]
pub struct TopSize {
    pub value: u64,
    pub per_genome: bool,
}

impl std::str::FromStr for TopSize {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(prefix) = s.strip_suffix('n') {
            let value = prefix
                .parse::<u64>()
                .map_err(|_| format!("invalid top-list size: {s}"))?;
            Ok(TopSize { value, per_genome: true })
        } else {
            let value = s.parse::<u64>().map_err(|_| format!("invalid top-list size: {s}"))?;
            Ok(TopSize { value, per_genome: false })
        }
    }
}

impl TopSize {
    pub fn resolve(&self, n_genomes: usize) -> usize {
        if self.per_genome {
            (self.value as usize) * n_genomes
        } else {
            self.value as usize
        }
    }
}

/// Computes weighted phylogenomic splits from k-mer/color sets across a set
/// of genomes, without alignment or a reference.
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// file of files: one genome per line
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// colored de-Bruijn graph input (this tool's own k-mer/mask format)
    #[arg(short, long)]
    pub graph: Option<PathBuf>,

    /// preexisting splits file (bypasses the k-mer index)
    #[arg(short, long)]
    pub splits: Option<PathBuf>,

    /// TSV splits output
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Newick tree output (requires --filter strict or an n-tree filter)
    #[arg(short = 'N', long)]
    pub newick: Option<PathBuf>,

    /// k-mer length
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub kmer: Option<u32>,

    /// minimizer window size
    #[arg(short, long, default_value_t = 1)]
    pub window: u32,

    /// scoring function
    #[arg(short, long, default_value = "geom2")]
    pub mean: Mean,

    /// compatibility filter
    #[arg(short, long)]
    pub filter: Option<Filter>,

    /// IUPAC ambiguity expansion budget
    #[arg(short = 'x', long)]
    pub iupac: Option<u32>,

    /// per-color coverage threshold
    #[arg(short, long, default_value_t = 1)]
    pub qualify: u32,

    /// disable reverse complements
    #[arg(short, long)]
    pub norev: bool,

    /// amino acid input (implies --norev)
    #[arg(short, long)]
    pub amino: bool,

    /// translate DNA via an NCBI genetic code table before k-mer extraction
    #[arg(short = 'c', long)]
    pub code: Option<u32>,

    /// top-T list size (trailing 'n' multiplies by genome count)
    #[arg(short, long, default_value = "1000n")]
    pub top: TopSize,

    /// bootstrap replicate count (0 disables bootstrap)
    #[arg(short, long, default_value_t = 0)]
    pub bootstrap: u32,

    /// worker thread count (defaults to the number of logical CPUs)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// print progress to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn validate(&self) -> Result<(), SansError> {
        if self.input.is_none() && self.graph.is_none() && self.splits.is_none() {
            return Err(SansError::Configuration(
                "one of --input, --graph, or --splits is required".into(),
            ));
        }
        if self.newick.is_some() {
            match self.filter {
                Some(Filter::Strict) | Some(Filter::NTree(_)) => {}
                _ => {
                    return Err(SansError::Configuration(
                        "--newick requires --filter strict or an n-tree filter".into(),
                    ))
                }
            }
        }
        if self.amino && self.code.is_some() {
            return Err(SansError::Configuration(
                "--code translates DNA to amino acid input; it cannot be combined with --amino".into(),
            ));
        }
        Ok(())
    }

    pub fn default_kmer_length(&self) -> u32 {
        self.kmer.unwrap_or(if self.amino { 10 } else { 31 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_size_parses_plain_and_per_genome() {
        let plain: TopSize = "500".parse().unwrap();
        assert_eq!(plain.resolve(10), 500);
        let per_genome: TopSize = "50n".parse().unwrap();
        assert_eq!(per_genome.resolve(10), 500);
    }

    #[test]
    fn filter_parses_n_tree_suffix() {
        let f: Filter = "3-tree".parse().unwrap();
        assert_eq!(f, Filter::NTree(3));
    }

    #[test]
    fn newick_without_compatible_filter_is_rejected() {
        let cli = Cli {
            input: Some(PathBuf::from("in.txt")),
            graph: None,
            splits: None,
            output: None,
            newick: Some(PathBuf::from("out.nwk")),
            kmer: None,
            window: 1,
            mean: Mean::Geom2,
            filter: Some(Filter::Weakly),
            iupac: None,
            qualify: 1,
            norev: false,
            amino: false,
            code: None,
            top: "1000n".parse().unwrap(),
            bootstrap: 0,
            threads: None,
            verbose: false,
        };
        assert!(cli.validate().is_err());
    }
}
