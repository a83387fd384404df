//! Colored de-Bruijn graph input. This does not parse a third-party graph
//! library's binary format (e.g. Bifrost's `ColoredCDBG`, as built in
//! `Splits.cpp::buildTrie`) — it accepts this tool's own simple line
//! format, `<kmer>\t<hex color mask>`, and treats each annotation as if
//! every set bit in the mask had been independently observed for that
//! k-mer. Parsing a third-party graph binary is a documented extension
//! point, not implemented here.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::SansError;
use crate::kmer::dna_base_value;

pub struct GraphKmerRecord {
    pub kmer_text: String,
    pub color_mask: u64,
}

pub fn read_graph_kmers(path: &Path) -> Result<Vec<GraphKmerRecord>, SansError> {
    let file = File::open(path)
        .map_err(|e| SansError::Input(format!("cannot open {}: {e}", path.display())))?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(SansError::Io)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, '\t');
        let kmer_text = parts
            .next()
            .ok_or_else(|| SansError::Input(format!("malformed graph line: {line}")))?
            .to_string();
        let mask_str = parts
            .next()
            .ok_or_else(|| SansError::Input(format!("missing color mask in line: {line}")))?;
        let color_mask = u64::from_str_radix(mask_str.trim_start_matches("0x"), 16)
            .map_err(|_| SansError::Input(format!("invalid hex color mask: {mask_str}")))?;
        if kmer_text.bytes().any(|b| dna_base_value(b).is_none()) {
            return Err(SansError::Input(format!(
                "non-DNA character in graph k-mer: {kmer_text}"
            )));
        }
        records.push(GraphKmerRecord { kmer_text, color_mask });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_kmer_and_hex_mask() {
        let path = std::env::temp_dir().join("kmersplit_test_graph.tsv");
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, "ACGT\t0x5").unwrap();
        }
        let records = read_graph_kmers(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].color_mask, 0x5);
        std::fs::remove_file(&path).ok();
    }
}
