//! Gap-span encoding of gapped sequences
//!
//! A gapped sequence such as `--AC-GT---` is stored as its ungapped residues
//! (`ACGT`) plus an ordered list of `(residue_run, gap_run)` pairs
//! (`[(0, 2), (2, 1), (2, 3)]`). The same encoding is used for alignment rows
//! and for installed genome sequences.

use memchr::memchr;

/// Gap character used by MAF and Ensembl FASTA
pub const GAP: u8 = b'-';

/// One run of residues followed by one run of gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GapSpan {
    /// Number of consecutive non-gap residues
    pub residues: u32,
    /// Number of consecutive gap characters that follow them
    pub gaps: u32,
}

impl GapSpan {
    pub fn new(residues: u32, gaps: u32) -> Self {
        Self { residues, gaps }
    }
}

/// Ungapped residues plus the spans needed to restore the gaps
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GapSpans {
    /// Concatenated non-gap residues
    pub ungapped: Vec<u8>,
    /// Residue/gap runs in sequence order
    pub spans: Vec<GapSpan>,
}

impl GapSpans {
    /// Total length of the gapped sequence these spans describe
    pub fn aligned_len(&self) -> usize {
        self.spans
            .iter()
            .map(|s| s.residues as usize + s.gaps as usize)
            .sum()
    }

    /// Total number of gap characters
    pub fn gap_count(&self) -> usize {
        self.spans.iter().map(|s| s.gaps as usize).sum()
    }

    /// Serialize the spans as little-endian `u32` pairs
    pub fn spans_to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.spans.len() * 8);
        for span in &self.spans {
            bytes.extend_from_slice(&span.residues.to_le_bytes());
            bytes.extend_from_slice(&span.gaps.to_le_bytes());
        }
        bytes
    }

    /// Inverse of [`GapSpans::spans_to_bytes`]; `None` if the length is not a multiple of 8
    pub fn spans_from_bytes(bytes: &[u8]) -> Option<Vec<GapSpan>> {
        if bytes.len() % 8 != 0 {
            return None;
        }
        let word = |b: &[u8]| u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        Some(
            bytes
                .chunks_exact(8)
                .map(|pair| GapSpan::new(word(&pair[..4]), word(&pair[4..])))
                .collect(),
        )
    }

    /// Restore the gapped sequence
    pub fn expand(&self) -> Option<Vec<u8>> {
        expand_gaps(&self.ungapped, &self.spans, GAP)
    }
}

/// Encode a gapped sequence into ungapped residues and gap spans.
///
/// Leading gaps give a first span with zero residues; an all-gap sequence is
/// a single `(0, len)` span; an empty sequence has no spans. Interior spans
/// never have both counts zero.
///
/// # Examples
/// ```
/// use ensembl_install::core::gaps::{encode_gaps, GapSpan};
/// let enc = encode_gaps(b"--AC-GT---", b'-');
/// assert_eq!(enc.ungapped, b"ACGT");
/// assert_eq!(enc.spans, vec![GapSpan::new(0, 2), GapSpan::new(2, 1), GapSpan::new(2, 3)]);
/// ```
pub fn encode_gaps(seq: &[u8], gap: u8) -> GapSpans {
    let mut ungapped = Vec::with_capacity(seq.len());
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < seq.len() {
        let residue_end = memchr(gap, &seq[pos..]).map_or(seq.len(), |i| pos + i);
        ungapped.extend_from_slice(&seq[pos..residue_end]);
        let gap_end = seq[residue_end..]
            .iter()
            .position(|&b| b != gap)
            .map_or(seq.len(), |i| residue_end + i);
        spans.push(GapSpan::new(
            (residue_end - pos) as u32,
            (gap_end - residue_end) as u32,
        ));
        pos = gap_end;
    }

    GapSpans { ungapped, spans }
}

/// Re-insert gaps into ungapped residues.
///
/// Returns `None` when the spans consume a different number of residues
/// than `ungapped` holds.
pub fn expand_gaps(ungapped: &[u8], spans: &[GapSpan], gap: u8) -> Option<Vec<u8>> {
    let total: usize = spans.iter().map(|s| s.residues as usize + s.gaps as usize).sum();
    let mut out = Vec::with_capacity(total);
    let mut pos = 0;
    for span in spans {
        let end = pos + span.residues as usize;
        out.extend_from_slice(ungapped.get(pos..end)?);
        out.resize(out.len() + span.gaps as usize, gap);
        pos = end;
    }
    (pos == ungapped.len()).then_some(out)
}
