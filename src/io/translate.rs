//! NCBI genetic code translation tables, used to translate DNA codons to
//! amino acids before k-mer extraction when `--amino --code` is requested
//! on nucleotide input.

use crate::error::SansError;

/// Codon index: A=0,C=1,G=2,T=3, packed as `base0*16 + base1*4 + base2`.
fn codon_index(codon: [u8; 3]) -> Option<usize> {
    let mut idx = 0usize;
    for &b in &codon {
        let v = crate::kmer::dna_base_value(b)? as usize;
        idx = idx * 4 + v;
    }
    Some(idx)
}

/// NCBI translation table 1, the standard code, ordered by the codon index
/// above (AAA, AAC, AAG, AAT, ACA, ...).
const STANDARD: [u8; 64] = *b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF";

/// NCBI translation table 2, vertebrate mitochondrial code: differs from
/// the standard table at AGA/AGG (stop instead of Arg), ATA (Met instead
/// of Ile), and TGA (Trp instead of stop).
fn vertebrate_mito() -> [u8; 64] {
    let mut table = STANDARD;
    table[codon_index(*b"AGA").unwrap()] = b'*';
    table[codon_index(*b"AGG").unwrap()] = b'*';
    table[codon_index(*b"ATA").unwrap()] = b'M';
    table[codon_index(*b"TGA").unwrap()] = b'W';
    table
}

pub struct GeneticCode {
    table: [u8; 64],
}

impl GeneticCode {
    pub fn by_id(id: u32) -> Result<Self, SansError> {
        match id {
            1 => Ok(GeneticCode { table: STANDARD }),
            2 => Ok(GeneticCode { table: vertebrate_mito() }),
            other => Err(SansError::Configuration(format!(
                "unsupported genetic code table id: {other}"
            ))),
        }
    }

    pub fn translate_codon(&self, codon: [u8; 3]) -> Option<u8> {
        codon_index(codon).map(|idx| self.table[idx])
    }

    /// Translates a full nucleotide sequence into amino acid residues,
    /// reading frame 0, stopping at the last complete codon.
    pub fn translate(&self, seq: &[u8]) -> Vec<u8> {
        seq.chunks_exact(3)
            .filter_map(|chunk| self.translate_codon([chunk[0], chunk[1], chunk[2]]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_translates_start_codon() {
        let code = GeneticCode::by_id(1).unwrap();
        assert_eq!(code.translate_codon(*b"ATG"), Some(b'M'));
    }

    #[test]
    fn mito_table_treats_aga_as_stop() {
        let code = GeneticCode::by_id(2).unwrap();
        assert_eq!(code.translate_codon(*b"AGA"), Some(b'*'));
    }

    #[test]
    fn unknown_table_id_is_configuration_error() {
        assert!(GeneticCode::by_id(99).is_err());
    }

    #[test]
    fn translate_stops_at_last_full_codon() {
        let code = GeneticCode::by_id(1).unwrap();
        let aa = code.translate(b"ATGAAT");
        assert_eq!(aa, b"MN");
    }
}
