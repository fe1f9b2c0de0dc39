//! Annotation materialization
//!
//! Loads `<staging>/genomes/<db>/gff3/*.gff3*` into
//! `<install>/genomes/<db>/annotations.sqlitedb`. A destination that already
//! exists is left alone, so re-running is free. The store is built under a
//! temporary name and renamed into place once complete.

use crate::core::error::{GffParseError, Result};
use crate::core::io::{list_files, read_lines};
use crate::core::pool::{as_completed, collect_by_path};
use crate::core::{Config, SpeciesNameMap};
use crate::formats::gff::{GffRecordView, FASTA_DIRECTIVE};
use crate::store::{AnnotationDb, GffFeature, RecordStore, ANNOTDB_NAME};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What happened to one destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationOutcome {
    /// Destination already present, nothing done
    Skipped,
    /// No GFF3 input for the species
    NoInput,
    /// Store created with this many features
    Loaded(usize),
}

pub fn is_gff3_file(name: &str) -> bool {
    name.ends_with(".gff3.gz") || name.ends_with(".gff3")
}

/// Features of GFF3 text; stops at `##FASTA`
pub fn parse_gff_lines<S: AsRef<str>>(lines: &[S]) -> std::result::Result<Vec<GffFeature>, GffParseError> {
    let mut features = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim_end();
        if line.starts_with(FASTA_DIRECTIVE) {
            break;
        }
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let view = GffRecordView::parse(line.as_bytes(), idx + 1)?;
        features.push(GffFeature::from_view(&view));
    }
    Ok(features)
}

/// Load `gff_files` into `dest` unless `dest` already exists
pub fn materialize_annotations(gff_files: &[PathBuf], dest: &Path) -> Result<AnnotationOutcome> {
    if dest.exists() {
        debug!("{} exists, skipping", dest.display());
        return Ok(AnnotationOutcome::Skipped);
    }
    if gff_files.is_empty() {
        return Ok(AnnotationOutcome::NoInput);
    }

    let partial = dest.with_extension("partial");
    if partial.exists() {
        std::fs::remove_file(&partial)?;
    }
    let mut db = AnnotationDb::open(&partial)?;
    for path in gff_files {
        let features = parse_gff_lines(&read_lines(path)?)?;
        debug!("{}: {} feature(s)", path.display(), features.len());
        db.add_records(&features)?;
    }
    let count = db.len()?;
    db.close()?;
    std::fs::rename(&partial, dest)?;
    Ok(AnnotationOutcome::Loaded(count))
}

/// Materialize annotations for every configured species on the worker pool
pub fn local_install_annotations(
    config: &Config,
    names: &SpeciesNameMap,
) -> Result<Vec<(String, AnnotationOutcome)>> {
    let mut inputs: HashMap<PathBuf, Vec<PathBuf>> = HashMap::new();
    let mut species: HashMap<PathBuf, String> = HashMap::new();
    for db_name in &config.db_names {
        let gff_dir = config.staging_genomes().join(db_name).join("gff3");
        let install_dir = config.install_genomes().join(db_name);
        std::fs::create_dir_all(&install_dir)?;
        let dest = install_dir.join(ANNOTDB_NAME);
        inputs.insert(dest.clone(), list_files(&gff_dir, is_gff3_file)?);
        species.insert(dest, db_name.clone());
    }

    let dests: Vec<PathBuf> = config
        .db_names
        .iter()
        .map(|db_name| config.install_genomes().join(db_name).join(ANNOTDB_NAME))
        .collect();
    let completed = as_completed(dests, config.max_workers, move |dest: &PathBuf| {
        let files = inputs.get(dest).cloned().unwrap_or_default();
        materialize_annotations(&files, dest)
    })?;
    let outcomes = collect_by_path(completed, |_| {})?;

    let mut report = Vec::with_capacity(outcomes.len());
    for (dest, outcome) in outcomes {
        let db_name = species.remove(&dest).unwrap_or_default();
        match outcome {
            AnnotationOutcome::Loaded(count) => info!("{}: {} annotation feature(s)", names.label(&db_name), count),
            AnnotationOutcome::Skipped => info!("{}: annotations already installed", names.label(&db_name)),
            AnnotationOutcome::NoInput => debug!("{}: no GFF3 files", db_name),
        }
        report.push((db_name, outcome));
    }
    Ok(report)
}
