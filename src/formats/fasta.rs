//! FASTA reader for genome sequence files

use crate::core::error::GenomeError;
use crate::core::io::read_lines;
use std::path::Path;

/// One FASTA record: full header label (without `>`) and sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    pub label: String,
    pub seq: String,
}

impl FastaRecord {
    /// The sequence identifier: the label up to the first whitespace
    ///
    /// # Examples
    /// ```
    /// use ensembl_install::formats::fasta::FastaRecord;
    /// let rec = FastaRecord { label: "1 dna:chromosome chromosome:GRCh38:1:1:248956422:1 REF".into(), seq: String::new() };
    /// assert_eq!(rec.name(), "1");
    /// ```
    pub fn name(&self) -> &str {
        self.label.split_whitespace().next().unwrap_or("")
    }
}

/// Parse FASTA lines into records.
///
/// Blank lines are ignored and sequence lines are concatenated with any
/// whitespace removed. `path` is only used for error reporting.
pub fn parse_fasta_lines<S: AsRef<str>>(lines: &[S], path: &Path) -> Result<Vec<FastaRecord>, GenomeError> {
    let mut records = Vec::new();
    let mut current: Option<FastaRecord> = None;

    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(label) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                records.push(done);
            }
            current = Some(FastaRecord {
                label: label.trim().to_string(),
                seq: String::new(),
            });
        } else {
            match current.as_mut() {
                Some(rec) => rec.seq.extend(line.chars().filter(|c| !c.is_whitespace())),
                None => {
                    return Err(GenomeError::MissingHeader {
                        path: path.to_path_buf(),
                        line: idx + 1,
                    })
                }
            }
        }
    }
    if let Some(done) = current {
        records.push(done);
    }
    Ok(records)
}

/// Read every record of a (possibly compressed) FASTA file
pub fn read_fasta_file(path: &Path) -> Result<Vec<FastaRecord>, GenomeError> {
    let lines = read_lines(path)?;
    parse_fasta_lines(&lines, path)
}
