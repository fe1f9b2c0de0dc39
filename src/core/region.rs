//! Strand-normalized alignment coordinates
//!
//! MAF reports reverse-strand intervals relative to the reverse-complemented
//! source sequence. Everything stored by this crate is re-expressed on the
//! forward strand so that intervals from either strand compare directly.

use crate::core::error::{MafParseError, MafResult};
use std::fmt;

/// Strand direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum Strand {
    #[default]
    Plus,
    Minus,
}

impl Strand {
    /// Get the complement strand
    ///
    /// # Examples
    /// ```
    /// use ensembl_install::core::Strand;
    /// assert_eq!(Strand::Plus.complement(), Strand::Minus);
    /// assert_eq!(Strand::Minus.complement(), Strand::Plus);
    /// ```
    pub fn complement(&self) -> Self {
        match self {
            Strand::Plus => Strand::Minus,
            Strand::Minus => Strand::Plus,
        }
    }

    /// Parse strand from a string field
    ///
    /// # Examples
    /// ```
    /// use ensembl_install::core::Strand;
    /// assert_eq!(Strand::parse("+"), Some(Strand::Plus));
    /// assert_eq!(Strand::parse("-"), Some(Strand::Minus));
    /// assert_eq!(Strand::parse("."), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Flip a reverse-strand start onto the forward strand.
///
/// `start` and `size` are as written on a MAF `s` line for the strand given;
/// forward-strand starts are returned unchanged. Returns `None` when the
/// interval does not fit inside `coord_length`.
///
/// # Examples
/// ```
/// use ensembl_install::core::{forward_start, Strand};
/// assert_eq!(forward_start(10, 5, Strand::Plus, 100), Some(10));
/// assert_eq!(forward_start(10, 5, Strand::Minus, 100), Some(85));
/// assert_eq!(forward_start(98, 5, Strand::Minus, 100), None);
/// ```
pub fn forward_start(start: u64, size: u64, strand: Strand, coord_length: u64) -> Option<u64> {
    let end = start.checked_add(size)?;
    if end > coord_length {
        return None;
    }
    match strand {
        Strand::Plus => Some(start),
        Strand::Minus => Some(coord_length - end),
    }
}

/// Identity of the interval one species contributes to one alignment block.
///
/// `start`/`end` are 0-based half-open and always on the forward strand;
/// `strand` records the orientation of the aligned residues.
/// Invariant: `start < end <= coord_length`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AlignmentRegionId {
    species: String,
    seqid: String,
    start: u64,
    end: u64,
    strand: Strand,
    coord_length: u64,
}

impl AlignmentRegionId {
    /// Build an identity from raw MAF fields, normalizing reverse-strand coordinates.
    ///
    /// `line` is only used for error reporting.
    pub fn from_maf_fields(
        species: &str,
        seqid: &str,
        start: u64,
        size: u64,
        strand: Strand,
        coord_length: u64,
        line: usize,
    ) -> MafResult<Self> {
        let invalid = || MafParseError::InvalidCoordinates {
            line,
            start,
            size,
            length: coord_length,
        };
        if size == 0 {
            return Err(invalid());
        }
        let start_normalized = forward_start(start, size, strand, coord_length).ok_or_else(invalid)?;
        Ok(Self {
            species: species.to_string(),
            seqid: seqid.to_string(),
            start: start_normalized,
            end: start_normalized + size,
            strand,
            coord_length,
        })
    }

    /// Parse one MAF sequence line into its identity and gapped sequence.
    ///
    /// The line must tokenize into exactly 7 whitespace-separated fields:
    /// `s species.seqid start size strand src_size text`.
    ///
    /// # Examples
    /// ```
    /// use ensembl_install::core::{AlignmentRegionId, Strand};
    /// let (id, seq) = AlignmentRegionId::parse_line("s human.chr1 10 4 - 100 AC-GT", 1).unwrap();
    /// assert_eq!((id.start(), id.end()), (86, 90));
    /// assert_eq!(id.strand(), Strand::Minus);
    /// assert_eq!(seq, "AC-GT");
    /// ```
    pub fn parse_line(line: &str, line_number: usize) -> MafResult<(Self, &str)> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 7 {
            return Err(MafParseError::FieldCount {
                line: line_number,
                found: fields.len(),
                content: line.chars().take(100).collect(),
            });
        }

        let (species, seqid) = fields[1].split_once('.').ok_or_else(|| MafParseError::InvalidSource {
            line: line_number,
            value: fields[1].to_string(),
        })?;

        let number = |field: &'static str, value: &str| -> MafResult<u64> {
            value.parse::<u64>().map_err(|_| MafParseError::InvalidNumber {
                line: line_number,
                field,
                value: value.to_string(),
            })
        };
        let start = number("start", fields[2])?;
        let size = number("size", fields[3])?;
        let strand = Strand::parse(fields[4]).ok_or_else(|| MafParseError::InvalidStrand {
            line: line_number,
            value: fields[4].to_string(),
        })?;
        let coord_length = number("src_size", fields[5])?;

        let id = Self::from_maf_fields(species, seqid, start, size, strand, coord_length, line_number)?;
        Ok((id, fields[6]))
    }

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn seqid(&self) -> &str {
        &self.seqid
    }

    /// Forward-strand start (0-based)
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Forward-strand end (exclusive)
    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Length of the whole source sequence
    pub fn coord_length(&self) -> u64 {
        self.coord_length
    }

    /// Number of residues covered
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for AlignmentRegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}-{}:{}",
            self.species, self.seqid, self.start, self.end, self.strand
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_line_keeps_start() {
        let (id, seq) = AlignmentRegionId::parse_line("s mouse.1 100 5 + 1000 ACG-TA", 3).unwrap();
        assert_eq!(id.species(), "mouse");
        assert_eq!(id.seqid(), "1");
        assert_eq!(id.start(), 100);
        assert_eq!(id.end(), 105);
        assert_eq!(id.strand(), Strand::Plus);
        assert_eq!(id.coord_length(), 1000);
        assert_eq!(seq, "ACG-TA");
    }

    #[test]
    fn test_reverse_line_flips_start() {
        let (id, _) = AlignmentRegionId::parse_line("s mouse.1 100 5 - 1000 ACGTA", 3).unwrap();
        // 1000 - (100 + 5)
        assert_eq!(id.start(), 895);
        assert_eq!(id.end(), 900);
        assert_eq!(id.len(), 5);
    }

    #[test]
    fn test_seqid_keeps_remaining_dots() {
        let (id, _) =
            AlignmentRegionId::parse_line("s homo_sapiens.KI270728.1 0 3 + 10 ACG", 1).unwrap();
        assert_eq!(id.species(), "homo_sapiens");
        assert_eq!(id.seqid(), "KI270728.1");
    }

    #[test]
    fn test_wrong_field_count() {
        let err = AlignmentRegionId::parse_line("s mouse.1 100 5 + 1000", 7).unwrap_err();
        assert!(matches!(err, MafParseError::FieldCount { line: 7, found: 6, .. }));
    }

    #[test]
    fn test_extra_field_rejected() {
        let err = AlignmentRegionId::parse_line("s mouse.1 100 5 + 1000 AC GT", 1).unwrap_err();
        assert!(matches!(err, MafParseError::FieldCount { found: 8, .. }));
    }

    #[test]
    fn test_bad_number() {
        let err = AlignmentRegionId::parse_line("s mouse.1 1x0 5 + 1000 ACGTA", 2).unwrap_err();
        assert!(matches!(err, MafParseError::InvalidNumber { field: "start", .. }));
    }

    #[test]
    fn test_missing_dot() {
        let err = AlignmentRegionId::parse_line("s mouse 1 5 + 1000 ACGTA", 2).unwrap_err();
        assert!(matches!(err, MafParseError::InvalidSource { .. }));
    }

    #[test]
    fn test_bad_strand() {
        let err = AlignmentRegionId::parse_line("s mouse.1 1 5 . 1000 ACGTA", 2).unwrap_err();
        assert!(matches!(err, MafParseError::InvalidStrand { .. }));
    }

    #[test]
    fn test_interval_past_sequence_end() {
        let err = AlignmentRegionId::parse_line("s mouse.1 998 5 - 1000 ACGTA", 2).unwrap_err();
        assert!(matches!(err, MafParseError::InvalidCoordinates { .. }));
    }

    #[test]
    fn test_identity_equality_covers_all_fields() {
        let a = AlignmentRegionId::from_maf_fields("human", "1", 0, 5, Strand::Plus, 10, 1).unwrap();
        let b = AlignmentRegionId::from_maf_fields("human", "1", 0, 5, Strand::Plus, 10, 99).unwrap();
        let c = AlignmentRegionId::from_maf_fields("human", "1", 5, 5, Strand::Minus, 10, 1).unwrap();
        assert_eq!(a, b);
        // same forward interval, different strand
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "human:1:0-5:+");
    }
}
