//! Sequence file discovery and gzip-aware FASTA/FASTQ reading. Grounded on
//! `seqkmer::reader::dyn_reader` (gzip magic-byte detection) and
//! `seqkmer::fasta::FastaReader` (header/body `read_until` parsing).

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::SansError;

/// One labelled genome: a name and the ordered list of files that make it
/// up (a genome may span several FASTA files).
#[derive(Debug, Clone)]
pub struct GenomeInput {
    pub name: String,
    pub files: Vec<PathBuf>,
}

fn is_gzipped(file: &mut File) -> io::Result<bool> {
    let mut buffer = [0u8; 2];
    let n = file.read(&mut buffer)?;
    use std::io::Seek;
    file.rewind()?;
    Ok(n == 2 && buffer == [0x1F, 0x8B])
}

fn dyn_reader(path: &Path) -> Result<Box<dyn Read + Send>, SansError> {
    let mut file = File::open(path).map_err(|e| {
        SansError::Input(format!("cannot open {}: {e}", path.display()))
    })?;
    if is_gzipped(&mut file)? {
        Ok(Box::new(GzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Parses a "file of files": one genome per line. A line is either a
/// single path (the genome's name is the file stem), several
/// space-separated paths (one genome, multiple files), or the kmtricks-style
/// `name : path1 ; path2 ; ... !` form.
pub fn open_input_list(path: &Path) -> Result<Vec<GenomeInput>, SansError> {
    let file = File::open(path)
        .map_err(|e| SansError::Input(format!("cannot open {}: {e}", path.display())))?;
    let reader = BufReader::new(file);
    let mut genomes = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(SansError::Io)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(colon) = line.find(':') {
            let name = line[..colon].trim().to_string();
            let rest = line[colon + 1..].trim_end_matches('!').trim();
            let files = rest
                .split(';')
                .map(|p| PathBuf::from(p.trim()))
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            genomes.push(GenomeInput { name, files });
        } else {
            let files: Vec<PathBuf> = line.split_whitespace().map(PathBuf::from).collect();
            if files.is_empty() {
                continue;
            }
            let name = files[0]
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| files[0].display().to_string());
            genomes.push(GenomeInput { name, files });
        }
    }
    Ok(genomes)
}

#[derive(Debug, Default)]
pub struct SequenceRecord {
    pub header: Vec<u8>,
    pub seq: Vec<u8>,
}

enum Format {
    Fasta,
    Fastq,
}

/// Streams FASTA or FASTQ records (gzip-transparent) from one file,
/// auto-detecting the format from the first non-empty byte (`>` or `@`).
pub struct SeqReader {
    reader: BufReader<Box<dyn Read + Send>>,
    format: Option<Format>,
    pending_header: Vec<u8>,
}

impl SeqReader {
    pub fn open(path: &Path) -> Result<Self, SansError> {
        let inner = dyn_reader(path)?;
        Ok(SeqReader {
            reader: BufReader::with_capacity(8 * 1024 * 1024, inner),
            format: None,
            pending_header: Vec::new(),
        })
    }

    fn detect_format(&mut self) -> Result<(), SansError> {
        let buf = self.reader.fill_buf().map_err(SansError::Io)?;
        self.format = match buf.first() {
            Some(b'>') => Some(Format::Fasta),
            Some(b'@') => Some(Format::Fastq),
            Some(other) => {
                return Err(SansError::Input(format!(
                    "unrecognized sequence file start byte {other:#x}"
                )))
            }
            None => None,
        };
        Ok(())
    }

    pub fn next_record(&mut self) -> Result<Option<SequenceRecord>, SansError> {
        if self.format.is_none() {
            self.detect_format()?;
        }
        match self.format {
            Some(Format::Fasta) => self.next_fasta(),
            Some(Format::Fastq) => self.next_fastq(),
            None => Ok(None),
        }
    }

    fn next_fasta(&mut self) -> Result<Option<SequenceRecord>, SansError> {
        let mut header = if self.pending_header.is_empty() {
            let mut h = Vec::new();
            if self.reader.read_until(b'\n', &mut h).map_err(SansError::Io)? == 0 {
                return Ok(None);
            }
            h
        } else {
            std::mem::take(&mut self.pending_header)
        };
        trim_end(&mut header);

        let mut seq = Vec::new();
        loop {
            let mut line = Vec::new();
            let n = self.reader.read_until(b'\n', &mut line).map_err(SansError::Io)?;
            if n == 0 {
                break;
            }
            if line.starts_with(b">") {
                self.pending_header = line;
                break;
            }
            trim_end(&mut line);
            seq.extend_from_slice(&line);
        }
        Ok(Some(SequenceRecord { header, seq }))
    }

    fn next_fastq(&mut self) -> Result<Option<SequenceRecord>, SansError> {
        let mut header = Vec::new();
        if self.reader.read_until(b'\n', &mut header).map_err(SansError::Io)? == 0 {
            return Ok(None);
        }
        trim_end(&mut header);

        let mut seq = Vec::new();
        self.reader.read_until(b'\n', &mut seq).map_err(SansError::Io)?;
        trim_end(&mut seq);

        let mut plus = Vec::new();
        self.reader.read_until(b'\n', &mut plus).map_err(SansError::Io)?;
        let mut qual = Vec::new();
        self.reader.read_until(b'\n', &mut qual).map_err(SansError::Io)?;

        Ok(Some(SequenceRecord { header, seq }))
    }
}

fn trim_end(buffer: &mut Vec<u8>) {
    while let Some(&b'\n' | &b'\r') = buffer.last() {
        buffer.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_file_of_files_plain_lines() {
        let dir = std::env::temp_dir();
        let list_path = dir.join("kmersplit_test_fof.txt");
        {
            let mut f = File::create(&list_path).unwrap();
            writeln!(f, "/tmp/genomeA.fa").unwrap();
            writeln!(f, "g2 : /tmp/g2_1.fa ; /tmp/g2_2.fa !").unwrap();
        }
        let genomes = open_input_list(&list_path).unwrap();
        assert_eq!(genomes.len(), 2);
        assert_eq!(genomes[0].name, "genomeA");
        assert_eq!(genomes[1].name, "g2");
        assert_eq!(genomes[1].files.len(), 2);
        std::fs::remove_file(&list_path).ok();
    }
}
