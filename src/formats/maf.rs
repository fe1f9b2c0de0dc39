//! MAF (Multiple Alignment Format) block parser
//!
//! Reads alignment blocks from a MAF stream, see
//! <https://genome.ucsc.edu/FAQ/FAQformat.html#format5>.
//!
//! # Format
//!
//! ```text
//! ##maf version=1
//! a score=23262.0
//! s hg18.chr7    27578828 38 + 158545518 AAA-GGGAATGTTAACCAAATGA---ATTGTCTCTTACGGTG
//! s panTro1.chr6 28741140 38 + 161576975 AAA-GGGAATGTTAACCAAATGA---ATTGTCTCTTACGGTG
//!
//! a score=5062.0
//! ...
//! ```
//!
//! A line starting with `a` opens a block and closes the previous one. Only
//! `s` lines inside a block are decoded; `s` lines mentioning `ancestral` in
//! their first 100 characters are reconstructed ancestors and are skipped.
//! The final line of the stream closes the last block and is not part of it
//! (MAF files end with a blank line).

use crate::core::error::{MafParseError, MafResult};
use crate::core::io::open_input;
use crate::core::AlignmentRegionId;
use indexmap::IndexMap;
use std::io::BufRead;
use std::path::Path;

/// Prefix of a block header line
pub const BLOCK_MARKER: char = 'a';

/// Prefix of a sequence line
pub const SEQUENCE_MARKER: char = 's';

/// Token marking reconstructed ancestral sequences
pub const ANCESTRAL_TOKEN: &str = "ancestral";

/// How many leading characters are searched for [`ANCESTRAL_TOKEN`]
pub const ANCESTRAL_WINDOW: usize = 100;

/// One alignment block: identity -> gapped sequence, in line order
#[derive(Debug, Clone, Default)]
pub struct MafBlock {
    /// Sequences keyed by strand-normalized identity
    pub sequences: IndexMap<AlignmentRegionId, String>,
    /// Sequence lines whose identity repeated an earlier line (last one wins)
    pub overwritten: usize,
    /// 1-based line number of the block header
    pub header_line: usize,
}

impl MafBlock {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Whether the gapped sequences differ in length
    pub fn is_ragged(&self) -> bool {
        let mut lengths = self.sequences.values().map(String::len);
        match lengths.next() {
            Some(first) => lengths.any(|l| l != first),
            None => false,
        }
    }
}

/// Counters collected while parsing one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MafParseStats {
    /// Blocks yielded (one per block header)
    pub blocks: usize,
    /// Blocks without any retained sequence line
    pub empty_blocks: usize,
    /// Sequence lines decoded
    pub sequences: usize,
    /// Sequence lines skipped as ancestral
    pub ancestral: usize,
    /// Sequence lines that overwrote an identical identity in the same block
    pub overwritten: usize,
    /// Blocks whose gapped sequences differ in length
    pub ragged_blocks: usize,
}

impl MafParseStats {
    /// Add the counters of another stream
    pub fn merge(&mut self, other: &MafParseStats) {
        self.blocks += other.blocks;
        self.empty_blocks += other.empty_blocks;
        self.sequences += other.sequences;
        self.ancestral += other.ancestral;
        self.overwritten += other.overwritten;
        self.ragged_blocks += other.ragged_blocks;
    }
}

/// Whether `token` occurs within the first `window` characters of `line`
fn prefix_contains(line: &str, window: usize, token: &str) -> bool {
    let end = line.char_indices().nth(window).map_or(line.len(), |(i, _)| i);
    line[..end].contains(token)
}

/// Single-pass iterator over the blocks of a MAF stream
///
/// Yields one [`MafBlock`] per block header, in stream order. After an error
/// the iterator is exhausted.
pub struct MafReader<R: BufRead> {
    reader: R,
    buffer: String,
    // next unprocessed line and its 1-based number
    peeked: Option<(usize, String)>,
    line_number: usize,
    // header line of the block opened by the last block marker seen
    open_header: Option<usize>,
    finished: bool,
    stats: MafParseStats,
}

impl<R: BufRead> MafReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::with_capacity(4096),
            peeked: None,
            line_number: 0,
            open_header: None,
            finished: false,
            stats: MafParseStats::default(),
        }
    }

    /// Counters for everything parsed so far
    pub fn stats(&self) -> &MafParseStats {
        &self.stats
    }

    fn read_raw(&mut self) -> MafResult<Option<(usize, String)>> {
        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let line = self.buffer.trim_end_matches(['\n', '\r']);
        Ok(Some((self.line_number, line.to_string())))
    }

    /// Next line, flagged with whether it is the final line of the stream
    fn advance(&mut self) -> MafResult<Option<(usize, String, bool)>> {
        let current = match self.peeked.take() {
            Some(line) => Some(line),
            None => self.read_raw()?,
        };
        let Some((number, line)) = current else {
            return Ok(None);
        };
        self.peeked = self.read_raw()?;
        Ok(Some((number, line, self.peeked.is_none())))
    }

    fn next_block(&mut self) -> MafResult<Option<MafBlock>> {
        let header_line = match self.open_header.take() {
            Some(number) => number,
            // skip the file header up to the first block
            None => loop {
                match self.advance()? {
                    None => return Ok(None),
                    Some((number, line, _)) if line.starts_with(BLOCK_MARKER) => break number,
                    Some(_) => continue,
                }
            },
        };
        let mut block = MafBlock {
            header_line,
            ..MafBlock::default()
        };

        loop {
            let Some((number, line, last)) = self.advance()? else {
                self.finished = true;
                break;
            };
            if line.starts_with(BLOCK_MARKER) {
                self.open_header = Some(number);
                break;
            }
            if last {
                self.finished = true;
                break;
            }
            if !line.starts_with(SEQUENCE_MARKER) {
                continue;
            }
            if prefix_contains(&line, ANCESTRAL_WINDOW, ANCESTRAL_TOKEN) {
                self.stats.ancestral += 1;
                continue;
            }

            let (id, seq) = AlignmentRegionId::parse_line(&line, number)?;
            let seq = seq.to_string();
            if block.sequences.insert(id, seq).is_some() {
                block.overwritten += 1;
            }
            self.stats.sequences += 1;
        }

        self.stats.blocks += 1;
        self.stats.overwritten += block.overwritten;
        if block.is_empty() {
            self.stats.empty_blocks += 1;
        }
        if block.is_ragged() {
            self.stats.ragged_blocks += 1;
        }
        Ok(Some(block))
    }
}

impl<R: BufRead> Iterator for MafReader<R> {
    type Item = MafResult<MafBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished && self.open_header.is_none() {
            return None;
        }
        match self.next_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                self.open_header = None;
                self.peeked = None;
                Some(Err(e))
            }
        }
    }
}

/// Open a MAF file (plain or compressed) for block iteration
pub fn read_maf_file(path: &Path) -> MafResult<MafReader<Box<dyn BufRead + Send>>> {
    Ok(MafReader::new(open_input(path)?))
}

/// Parse every block of a MAF stream held in memory
pub fn parse_maf_bytes(data: &[u8]) -> MafResult<Vec<MafBlock>> {
    MafReader::new(data).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Strand;

    const TWO_BLOCKS: &str = "##maf version=1 scoring=tba.v8
# tba.v8 (((human chimp) baboon) (mouse rat))

a score=23262.0
s human.chr7 27578828 38 + 158545518 AAA-GGGAATGTTAACCAAATGA---ATTGTCTCTTACGGTG
s chimp.chr6 28741140 38 + 161576975 AAA-GGGAATGTTAACCAAATGA---ATTGTCTCTTACGGTG

a score=5062.0
s human.chr7 27699739 6 + 158545518 TAAAGA
s chimp.chr6 28862317 6 + 161576975 TAAAGA
s mouse.chr6 53303881 6 - 151104725 TAAAGA

";

    #[test]
    fn test_two_blocks() {
        let blocks = parse_maf_bytes(TWO_BLOCKS.as_bytes()).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 2);
        assert_eq!(blocks[1].len(), 3);
        assert_eq!(blocks[0].header_line, 4);
    }

    #[test]
    fn test_reverse_strand_identity() {
        let blocks = parse_maf_bytes(TWO_BLOCKS.as_bytes()).unwrap();
        let (mouse, seq) = blocks[1].sequences.get_index(2).unwrap();
        assert_eq!(mouse.species(), "mouse");
        assert_eq!(mouse.strand(), Strand::Minus);
        assert_eq!(mouse.start(), 151104725 - (53303881 + 6));
        assert_eq!(mouse.len(), 6);
        assert_eq!(seq, "TAAAGA");
    }

    #[test]
    fn test_no_markers_no_blocks() {
        let data = "##maf version=1\n# comment\ns human.1 0 4 + 10 ACGT\n\n";
        assert!(parse_maf_bytes(data.as_bytes()).unwrap().is_empty());
        assert!(parse_maf_bytes(b"").unwrap().is_empty());
    }

    #[test]
    fn test_single_block_runs_to_end() {
        let data = "a score=1\ns human.1 0 4 + 10 ACGT\ns mouse.1 2 4 + 10 ACGT\n\n";
        let blocks = parse_maf_bytes(data.as_bytes()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 2);
    }

    #[test]
    fn test_final_line_is_not_part_of_last_block() {
        let data = "a score=1\ns human.1 0 4 + 10 ACGT\ns mouse.1 2 4 + 10 ACGT";
        let blocks = parse_maf_bytes(data.as_bytes()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].len(), 1);
        assert_eq!(blocks[0].sequences.get_index(0).unwrap().0.species(), "human");
    }

    #[test]
    fn test_trailing_marker_gives_empty_block() {
        let data = "a score=1\ns human.1 0 4 + 10 ACGT\n\na score=2";
        let blocks = parse_maf_bytes(data.as_bytes()).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].len(), 1);
        assert!(blocks[1].is_empty());
    }

    #[test]
    fn test_ancestral_lines_skipped() {
        let data = "a score=1
s human.1 0 4 + 10 ACGT
s ancestral_sequences.Ancestor_1 0 4 + 10 ACGT
s mouse.1 0 4 + 10 ACGT

";
        let mut reader = MafReader::new(data.as_bytes());
        let block = reader.next().unwrap().unwrap();
        assert_eq!(block.len(), 2);
        assert!(block.sequences.keys().all(|id| !id.species().contains("ancestral")));
        assert_eq!(reader.stats().ancestral, 1);
    }

    #[test]
    fn test_ancestral_only_checked_in_window() {
        let padding = " ".repeat(120);
        let data = format!("a\ns human.1 0 4 + 10 ACGT{}ancestral\n\n", padding);
        // the token sits past the window, so the line is parsed (and rejected for its extra field)
        let err = parse_maf_bytes(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MafParseError::FieldCount { found: 8, .. }));
    }

    #[test]
    fn test_duplicate_identity_last_wins() {
        let data = "a score=1
s human.1 0 4 + 10 ACGT
s human.1 0 4 + 10 TTTT

";
        let mut reader = MafReader::new(data.as_bytes());
        let block = reader.next().unwrap().unwrap();
        assert_eq!(block.len(), 1);
        assert_eq!(block.overwritten, 1);
        assert_eq!(block.sequences.values().next().unwrap(), "TTTT");
        assert!(reader.next().is_none());
        assert_eq!(reader.stats().overwritten, 1);
    }

    #[test]
    fn test_non_sequence_lines_ignored() {
        let data = "a score=1
s human.1 0 4 + 10 ACGT
i human.1 N 0 C 0
e mouse.1 0 100 + 1000 I
q human.1 9999

";
        let blocks = parse_maf_bytes(data.as_bytes()).unwrap();
        assert_eq!(blocks[0].len(), 1);
    }

    #[test]
    fn test_ragged_block_counted() {
        let data = "a\ns human.1 0 4 + 10 ACGT\ns mouse.1 0 4 + 10 AC-GT\n\n";
        let mut reader = MafReader::new(data.as_bytes());
        let block = reader.next().unwrap().unwrap();
        assert!(block.is_ragged());
        assert!(reader.next().is_none());
        assert_eq!(reader.stats().ragged_blocks, 1);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let data = "##maf\na\ns human.1 0 4 + 10\n\n";
        let err = parse_maf_bytes(data.as_bytes()).unwrap_err();
        assert!(matches!(err, MafParseError::FieldCount { line: 3, found: 6, .. }));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let data = "a\ns bad\n\na\ns human.1 0 4 + 10 ACGT\n\n";
        let mut reader = MafReader::new(data.as_bytes());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_crlf_line_endings() {
        let data = "a score=1\r\ns human.1 0 4 + 10 ACGT\r\n\r\n";
        let blocks = parse_maf_bytes(data.as_bytes()).unwrap();
        assert_eq!(blocks[0].sequences.values().next().unwrap(), "ACGT");
    }
}
