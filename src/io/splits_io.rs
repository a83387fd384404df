//! TSV splits file format: `score<TAB>name1<TAB>name2<TAB>...` per line,
//! one side of the bipartition (the canonicalized, smaller side). Grounded
//! on `Splits.cpp::printFile`'s `weight<TAB>colors` output shape.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::bitops::BitBag;
use crate::color::ColorSet;
use crate::error::SansError;
use crate::splits::SplitListEntry;

pub fn write_tsv<B: BitBag>(
    path: &Path,
    entries: &[SplitListEntry<B>],
    names: &[String],
) -> Result<(), SansError> {
    let mut file = File::create(path)
        .map_err(|e| SansError::Input(format!("cannot create {}: {e}", path.display())))?;
    for entry in entries {
        write!(file, "{}", entry.score).map_err(SansError::Io)?;
        for i in 0..names.len() {
            if entry.colors.test(i) {
                write!(file, "\t{}", names[i]).map_err(SansError::Io)?;
            }
        }
        writeln!(file).map_err(SansError::Io)?;
    }
    Ok(())
}

/// Scans a splits TSV once to collect the distinct genome names it
/// mentions, in first-seen order, so a `--splits`-only run (no `--input`
/// file of files) can assign color indices without separate name input.
pub fn distinct_names(path: &Path) -> Result<Vec<String>, SansError> {
    let file = File::open(path)
        .map_err(|e| SansError::Input(format!("cannot open {}: {e}", path.display())))?;
    let reader = BufReader::new(file);
    let mut names = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for line in reader.lines() {
        let line = line.map_err(SansError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        for name in line.split('\t').skip(1) {
            if seen.insert(name.to_string()) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Reads a previously-written TSV splits file, resolving names back to
/// color indices via `name_to_color`.
pub fn read_tsv<B: BitBag>(
    path: &Path,
    name_to_color: &HashMap<String, usize>,
) -> Result<Vec<SplitListEntry<B>>, SansError> {
    let file = File::open(path)
        .map_err(|e| SansError::Input(format!("cannot open {}: {e}", path.display())))?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(SansError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        let score: f64 = fields
            .next()
            .ok_or_else(|| SansError::Input(format!("malformed splits line: {line}")))?
            .parse()
            .map_err(|_| SansError::Input(format!("non-numeric score in line: {line}")))?;
        let mut colors = ColorSet::empty();
        for name in fields {
            let color = *name_to_color
                .get(name)
                .ok_or_else(|| SansError::Input(format!("unknown color name: {name}")))?;
            colors.set(color);
        }
        entries.push(SplitListEntry { score, colors });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitops::Word64;

    #[test]
    fn round_trips_a_split_list() {
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let mut name_to_color = HashMap::new();
        for (i, n) in names.iter().enumerate() {
            name_to_color.insert(n.clone(), i);
        }
        let mut colors: ColorSet<Word64> = ColorSet::empty();
        colors.set(0);
        colors.set(2);
        let entries = vec![SplitListEntry { score: 4.5, colors }];

        let path = std::env::temp_dir().join("kmersplit_test_splits.tsv");
        write_tsv(&path, &entries, &names).unwrap();
        let read_back: Vec<SplitListEntry<Word64>> = read_tsv(&path, &name_to_color).unwrap();
        assert_eq!(read_back.len(), 1);
        assert_eq!(read_back[0].score, 4.5);
        assert_eq!(read_back[0].colors.bits.as_u64(), colors.bits.as_u64());
        std::fs::remove_file(&path).ok();
    }
}
