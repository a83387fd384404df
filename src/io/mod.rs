pub mod graph;
pub mod seq;
pub mod splits_io;
pub mod translate;

pub use seq::{open_input_list, GenomeInput, SeqReader, SequenceRecord};
