//! GFF3 annotation adapter
//!
//! Zero-copy parsing of GFF3 feature lines for the annotation store.
//! GFF uses 1-based closed coordinates; records are converted to 0-based
//! half-open on the way into the store.

use crate::core::error::GffParseError;
use crate::core::Strand;
use memchr::memchr;

/// Directive that ends the feature section of a GFF3 file
pub const FASTA_DIRECTIVE: &str = "##FASTA";

/// Zero-copy GFF3 record view
/// GFF format: seqid, source, type, start, end, score, strand, phase, attributes
#[derive(Debug)]
pub struct GffRecordView<'a> {
    /// Sequence name (chromosome)
    pub seqid: &'a str,
    /// Source field
    pub source: &'a str,
    /// Feature type
    pub biotype: &'a str,
    /// Start position (1-based)
    pub start: u64,
    /// End position (1-based, inclusive)
    pub end: u64,
    /// Score field (as string, may be ".")
    pub score: &'a str,
    /// Strand, `None` for unstranded features
    pub strand: Option<Strand>,
    /// Phase field
    pub phase: &'a str,
    /// Attributes field
    pub attributes: &'a str,
}

impl<'a> GffRecordView<'a> {
    /// Parse a GFF3 line; GFF requires 9 tab-separated fields
    pub fn parse(line: &'a [u8], line_number: usize) -> Result<Self, GffParseError> {
        // Find field boundaries using memchr for tab characters
        let mut field_bounds = Vec::with_capacity(9);
        let mut start_pos = 0;
        loop {
            match memchr(b'\t', &line[start_pos..]) {
                Some(tab_pos) => {
                    let end_pos = start_pos + tab_pos;
                    field_bounds.push((start_pos, end_pos));
                    start_pos = end_pos + 1;
                }
                None => {
                    field_bounds.push((start_pos, line.len()));
                    break;
                }
            }
        }

        if field_bounds.len() < 9 {
            return Err(GffParseError::TooFewFields {
                line: line_number,
                found: field_bounds.len(),
            });
        }

        let get_field = |idx: usize, field: &'static str| -> Result<&'a str, GffParseError> {
            let (start, end) = field_bounds[idx];
            std::str::from_utf8(&line[start..end]).map_err(|_| GffParseError::InvalidUtf8 {
                line: line_number,
                field,
            })
        };
        let get_number = |idx: usize, field: &'static str| -> Result<u64, GffParseError> {
            let value = get_field(idx, field)?;
            value.parse().map_err(|_| GffParseError::InvalidNumber {
                line: line_number,
                field,
                value: value.to_string(),
            })
        };

        let strand_str = get_field(6, "strand")?;
        let strand = match strand_str {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            "." | "?" => None,
            _ => {
                return Err(GffParseError::InvalidStrand {
                    line: line_number,
                    value: strand_str.to_string(),
                })
            }
        };

        let start = get_number(3, "start")?;
        let end = get_number(4, "end")?;
        if start == 0 || end < start {
            return Err(GffParseError::InvalidNumber {
                line: line_number,
                field: "start",
                value: format!("{}..{}", start, end),
            });
        }

        Ok(Self {
            seqid: get_field(0, "seqid")?,
            source: get_field(1, "source")?,
            biotype: get_field(2, "type")?,
            start,
            end,
            score: get_field(5, "score")?,
            strand,
            phase: get_field(7, "phase")?,
            attributes: get_field(8, "attributes")?,
        })
    }

    /// 0-based start
    pub fn start0(&self) -> u64 {
        self.start - 1
    }

    /// Get the feature size (end - start + 1 for 1-based coordinates)
    pub fn size(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value of a `key=value` attribute
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.attributes.split(';').find_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            (k == key).then_some(v)
        })
    }

    /// Feature name: `Name`, falling back to `ID`
    pub fn name(&self) -> Option<&'a str> {
        self.attribute("Name").or_else(|| self.attribute("ID"))
    }

    /// Parent identifier
    pub fn parent(&self) -> Option<&'a str> {
        self.attribute("Parent")
    }
}
