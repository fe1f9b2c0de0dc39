//! Ingestion pipelines
//!
//! Each stage reads the staging tree laid out by [`Config`](crate::core::Config)
//! and writes its stores under the install root. Parsing runs on the bounded
//! worker pool; every store is written from the calling thread only.

mod aligns;
mod annotations;
mod genomes;
mod homologies;

pub use aligns::{is_align_file, load_align_file, local_install_compara, AlignFileResult, AlignSummary};
pub use annotations::{
    is_gff3_file, local_install_annotations, materialize_annotations, parse_gff_lines, AnnotationOutcome,
};
pub use genomes::{find_duplicates, is_fasta_file, local_install_genomes, rename_records, GenomeSummary};
pub use homologies::{is_homology_file, local_install_homology, HomologySummary};

use log::info;
use std::io;
use std::path::Path;

/// Remove an install subtree before a forced reinstall
pub(crate) fn remove_dir_if_exists(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        info!("Removing {}", dir.display());
        std::fs::remove_dir_all(dir)?;
    }
    Ok(())
}
