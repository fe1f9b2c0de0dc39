//! Homology ingestion
//!
//! Species directories under `<staging>/compara/homologies` are processed one
//! after another; every table in a directory is bulk-read, filtered to rows
//! between installed species and written as one batch. Running the
//! directories in parallel buys little wall time at a large memory cost.

use crate::core::error::{FileFailure, InstallError, Result};
use crate::core::io::{file_name, list_dirs, list_files};
use crate::core::{Config, SpeciesNameMap};
use crate::formats::homology::HomologyLoader;
use crate::install::remove_dir_if_exists;
use crate::store::{HomologyDb, RecordStore, HOMOLOGYDB_NAME};
use log::{info, warn};
use std::path::PathBuf;

/// Outcome of one homology install
#[derive(Debug, Clone)]
pub struct HomologySummary {
    /// `None` when no rows matched and the store was removed
    pub db_path: Option<PathBuf>,
    /// Rows written by this run
    pub records: usize,
    pub files: usize,
}

/// Whether `name` is a homology table
pub fn is_homology_file(name: &str) -> bool {
    name.ends_with(".tsv.gz") || name.ends_with(".tsv")
}

/// Install homologies between the configured species.
///
/// A table with the wrong header fails on its own; the other tables are
/// still installed and the failures are reported at the end. If the store
/// holds no rows afterwards it is deleted.
pub fn local_install_homology(
    config: &Config,
    names: &SpeciesNameMap,
    force_overwrite: bool,
) -> Result<HomologySummary> {
    let install_dir = config.install_homologies();
    if force_overwrite {
        remove_dir_if_exists(&install_dir)?;
    }
    std::fs::create_dir_all(&install_dir)?;

    let loader = HomologyLoader::new(config.db_names.iter().cloned());
    let db_path = install_dir.join(HOMOLOGYDB_NAME);
    let mut db = HomologyDb::open(&db_path)?;
    let mut failures = Vec::new();
    let mut records = 0;
    let mut files = 0;

    for dir in list_dirs(&config.staging_homologies())? {
        let paths = list_files(&dir, is_homology_file)?;
        let mut rows = Vec::new();
        for path in paths {
            files += 1;
            match loader.load_file(&path) {
                Ok(loaded) => rows.extend(loaded),
                Err(e) => failures.push(FileFailure {
                    path,
                    error: Box::new(e.into()),
                }),
            }
        }
        info!("{}: {} homology row(s)", names.label(&file_name(&dir)), rows.len());
        db.add_rows(&rows)?;
        records += rows.len();
    }

    let stored = db.len()?;
    db.close()?;
    let db_path = if stored == 0 {
        warn!("No homologies matched the installed species, removing {}", db_path.display());
        std::fs::remove_file(&db_path)?;
        None
    } else {
        info!("{} homology row(s) in {}", stored, db_path.display());
        Some(db_path)
    };

    if !failures.is_empty() {
        return Err(InstallError::FileFailures(failures));
    }
    Ok(HomologySummary {
        db_path,
        records,
        files,
    })
}
