//! Alignment-free, reference-free computation of weighted phylogenomic
//! splits from k-mer/color sets across a collection of genomes, without a
//! reference or multiple sequence alignment.
//!
//! Module layout mirrors the pipeline: bit storage ([`bitops`]) underlies
//! both k-mers ([`kmer`]) and color sets ([`color`]); the concurrent index
//! ([`index`], [`hashing`], [`spinlock`], [`quality`]) turns a stream of
//! k-mers into color sets; aggregation and scoring ([`aggregate`],
//! [`splits`]) turn those into a ranked split list; [`compat`] and [`tree`]
//! turn a split list into a compatible network or tree; [`bootstrap`] adds
//! resampled support values; [`io`] and [`args`] are the external surface;
//! [`orchestrator`] wires all of it together for the binary.

pub mod aggregate;
pub mod args;
pub mod bitops;
pub mod bootstrap;
pub mod color;
pub mod compat;
pub mod error;
pub mod extractor;
pub mod hashing;
pub mod index;
pub mod io;
pub mod kmer;
pub mod orchestrator;
pub mod quality;
pub mod spinlock;
pub mod splits;
pub mod tree;

pub use error::{SansError, SansResult};
pub use orchestrator::RunConfig;
