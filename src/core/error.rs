//! Error types for ensembl-install
//!
//! Defines all error types used throughout the library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for installation operations
#[derive(Debug, Error)]
pub enum InstallError {
    /// MAF parsing errors
    #[error("MAF parse error: {0}")]
    MafParse(#[from] MafParseError),

    /// Homology table errors
    #[error("Homology error: {0}")]
    Homology(#[from] HomologyError),

    /// Genome sequence errors
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// Annotation (GFF3) errors
    #[error("Annotation error: {0}")]
    Annotation(#[from] GffParseError),

    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Species name resolution errors
    #[error("Species error: {0}")]
    Species(#[from] SpeciesError),

    /// A configured input directory is missing
    #[error("Missing input directory: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// One or more files failed during a parallel stage
    #[error("{} file(s) failed:\n{}", .0.len(), format_failures(.0))]
    FileFailures(Vec<FileFailure>),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single failed file from a parallel stage
#[derive(Debug)]
pub struct FileFailure {
    /// The file the task was working on
    pub path: PathBuf,
    /// Why it failed
    pub error: Box<InstallError>,
}

fn format_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("  {}: {}", f.path.display(), f.error))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors that can occur while parsing a Multiple Alignment Format stream
#[derive(Debug, Error)]
pub enum MafParseError {
    /// Sequence line did not split into the 7 expected fields
    #[error("Line {line}: expected 7 fields, found {found}: {content}")]
    FieldCount {
        line: usize,
        found: usize,
        content: String,
    },

    /// Source field is not of the form `species.seqid`
    #[error("Line {line}: source '{value}' is not of the form species.seqid")]
    InvalidSource { line: usize, value: String },

    /// Failed to parse integer
    #[error("Line {line}: invalid {field} value '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// Strand must be '+' or '-'
    #[error("Line {line}: strand must be '+' or '-', got '{value}'")]
    InvalidStrand { line: usize, value: String },

    /// Coordinates do not describe a non-empty interval inside the source sequence
    #[error("Line {line}: invalid coordinates start={start} size={size} length={length}")]
    InvalidCoordinates {
        line: usize,
        start: u64,
        size: u64,
        length: u64,
    },

    /// I/O error during parsing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading homology tables
#[derive(Debug, Error)]
pub enum HomologyError {
    /// The header does not carry the expected columns
    #[error("{}: header mismatch, expected {expected:?}, found {found:?}", .path.display())]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// The file has no header row at all
    #[error("{}: empty homology table", .0.display())]
    MissingHeader(PathBuf),

    /// A data row is shorter than the header
    #[error("{}: line {line} has {found} fields, expected at least {expected}", .path.display())]
    ShortRow {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while loading genome sequences
#[derive(Debug, Error)]
pub enum GenomeError {
    /// Sequence identifiers occur more than once for one species
    #[error("Some seqids are not unique for '{species}': {}", format_duplicates(.duplicates))]
    DuplicateSeqIds {
        species: String,
        duplicates: Vec<(String, usize)>,
    },

    /// Sequence data before the first '>' header
    #[error("{}: line {line}: sequence data before first FASTA header", .path.display())]
    MissingHeader { path: PathBuf, line: usize },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_duplicates(duplicates: &[(String, usize)]) -> String {
    duplicates
        .iter()
        .map(|(name, count)| format!("{}={}", name, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors that can occur during GFF3 parsing
#[derive(Debug, Error)]
pub enum GffParseError {
    /// Too few tab-separated fields
    #[error("Line {line}: too few fields: expected 9, found {found}")]
    TooFewFields { line: usize, found: usize },

    /// Invalid UTF-8 in a field
    #[error("Line {line}: invalid UTF-8 in field {field}")]
    InvalidUtf8 { line: usize, field: &'static str },

    /// Failed to parse a coordinate
    #[error("Line {line}: invalid {field} value '{value}'")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        value: String,
    },

    /// Invalid strand
    #[error("Line {line}: invalid strand '{value}'")]
    InvalidStrand { line: usize, value: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the persistent store boundary
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite errors
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Column order does not name the table's columns
    #[error("Column order {given:?} does not match table columns {expected:?}")]
    ColumnOrder {
        given: Vec<String>,
        expected: Vec<String>,
    },

    /// A record did not carry one value per column
    #[error("Record has {found} values, expected {expected}")]
    RecordWidth { expected: usize, found: usize },

    /// Stored payload could not be decoded
    #[error("Corrupt stored value for '{0}'")]
    Corrupt(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by species name resolution
#[derive(Debug, Error)]
pub enum SpeciesError {
    /// Name is not a known latin, common or db-prefix name
    #[error("Unknown species name: {0}")]
    Unknown(String),

    /// Latin name contains '_', which looks like a db prefix
    #[error("'_' in species name '{0}', not a Latin name?")]
    NotLatin(String),

    /// A species table row is malformed
    #[error("Species table line {line}: {message}")]
    InvalidRow { line: usize, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for installation operations
pub type Result<T> = std::result::Result<T, InstallError>;

/// Result type alias for MAF parsing
pub type MafResult<T> = std::result::Result<T, MafParseError>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
