//! ensembl-install - load Ensembl comparative genomics data into local stores
//!
//! Ingests multi-species genome sequences, MAF whole-genome alignments and
//! Compara homology tables from a staging directory into SQLite stores.
//!
//! # Features
//!
//! - Strand-normalized alignment identities with compact gap-span encoding
//! - Bounded parallel parsing with per-file failure reporting
//! - Transparent gzip/bzip2 input
//! - Injected species name table, no global state
//!
//! # Example
//!
//! ```ignore
//! use ensembl_install::core::{Config, SpeciesNameMap};
//! use ensembl_install::install::local_install_compara;
//!
//! let names = SpeciesNameMap::bundled()?;
//! let config = Config::new("staging", "install")
//!     .with_species(&["human", "mouse"], &names)?
//!     .with_align_names(&["10_primates.epo"]);
//! let summaries = local_install_compara(&config, &names, false)?;
//! ```

pub mod core;
pub mod formats;
pub mod install;
pub mod store;

// Re-export commonly used types
pub use core::{
    AlignmentRegionId, Config, GapSpan, GapSpans, InstallError, MafParseError, SpeciesNameMap, Strand,
};
pub use formats::{MafBlock, MafReader};
