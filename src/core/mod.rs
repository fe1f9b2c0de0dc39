//! Core value types and shared infrastructure
//!
//! Coordinate identities, gap-span encoding, the sequence codec, input I/O,
//! the species table, configuration and the bounded worker pool.

pub mod codec;
pub mod config;
pub mod error;
pub mod gaps;
pub mod io;
pub mod pool;
mod region;
pub mod species;

pub use config::Config;
pub use error::{
    FileFailure, GenomeError, GffParseError, HomologyError, InstallError, MafParseError, MafResult, Result,
    SpeciesError, StoreError, StoreResult,
};
pub use gaps::{encode_gaps, expand_gaps, GapSpan, GapSpans};
pub use io::{CompressionFormat, SmartReader, DEFAULT_BUFFER_SIZE, LARGE_BUFFER_SIZE, MMAP_THRESHOLD};
pub use region::{forward_start, AlignmentRegionId, Strand};
pub use species::SpeciesNameMap;
