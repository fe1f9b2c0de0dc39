//! Genome sequence ingestion
//!
//! Per species, every FASTA file under `<staging>/genomes/<db>/fasta` is read
//! on the worker pool. Sequence ids are cut to their first word and must be
//! unique across the species' files. The sequences are compressed and stored
//! in `<install>/genomes/<db>/genome_sequence.sqlitedb`.

use crate::core::error::{GenomeError, InstallError, Result};
use crate::core::io::list_files;
use crate::core::pool::{as_completed, collect_by_path};
use crate::core::{Config, SpeciesNameMap};
use crate::formats::fasta::{read_fasta_file, FastaRecord};
use crate::install::remove_dir_if_exists;
use crate::store::{CompressedGenomeSeqsDb, CompressedSeq, RecordStore, SEQDB_NAME};
use log::{debug, info};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;

const FASTA_SUFFIXES: [&str; 6] = [".fa", ".fa.gz", ".fasta", ".fasta.gz", ".fna", ".fna.gz"];

/// Outcome of installing one species' genome
#[derive(Debug, Clone)]
pub struct GenomeSummary {
    pub db_name: String,
    pub db_path: PathBuf,
    pub files: usize,
    pub sequences: usize,
    /// Total residues stored
    pub residues: u64,
}

pub fn is_fasta_file(name: &str) -> bool {
    FASTA_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}

/// Replace FASTA labels by their first word
pub fn rename_records(records: Vec<FastaRecord>) -> Vec<(String, String)> {
    records
        .into_iter()
        .map(|record| {
            let name = record.name().to_string();
            (name, record.seq)
        })
        .collect()
}

/// Names occurring more than once, with their counts, sorted by name
pub fn find_duplicates<'a, I>(names: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for name in names {
        *counts.entry(name).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}

/// Install the genomes of every configured species.
///
/// A species without a staging directory is an error; one without FASTA
/// files gets an empty store. With `force_overwrite` the whole genome
/// install tree is removed first, including species not in this run.
pub fn local_install_genomes(
    config: &Config,
    names: &SpeciesNameMap,
    force_overwrite: bool,
) -> Result<Vec<GenomeSummary>> {
    if force_overwrite {
        remove_dir_if_exists(&config.install_genomes())?;
    }
    let mut summaries = Vec::with_capacity(config.db_names.len());
    for db_name in &config.db_names {
        summaries.push(install_genome(config, names, db_name)?);
    }
    Ok(summaries)
}

fn install_genome(
    config: &Config,
    names: &SpeciesNameMap,
    db_name: &str,
) -> Result<GenomeSummary> {
    let staging_dir = config.staging_genomes().join(db_name);
    if !staging_dir.is_dir() {
        return Err(InstallError::MissingDirectory(staging_dir));
    }
    let install_dir = config.install_genomes().join(db_name);
    std::fs::create_dir_all(&install_dir)?;

    let paths = list_files(&staging_dir.join("fasta"), is_fasta_file)?;
    let files = paths.len();
    info!("Installing {} genome from {} file(s)", names.label(db_name), files);

    let completed = as_completed(paths, config.max_workers, |path: &PathBuf| read_fasta_file(path))?;
    let by_file = collect_by_path(completed, |path| debug!("read {}", path.display()))?;
    let seqs = rename_records(by_file.into_values().flatten().collect());

    let duplicates = find_duplicates(seqs.iter().map(|(name, _)| name.as_str()));
    if !duplicates.is_empty() {
        return Err(GenomeError::DuplicateSeqIds {
            species: db_name.to_string(),
            duplicates,
        }
        .into());
    }

    let compressed = seqs
        .par_iter()
        .map(|(name, seq)| CompressedSeq::new(name, seq))
        .collect::<std::io::Result<Vec<_>>>()?;
    let residues: u64 = compressed.iter().map(|c| c.length).sum();

    let db_path = install_dir.join(SEQDB_NAME);
    let mut db = CompressedGenomeSeqsDb::open(&db_path)?;
    db.set_species(db_name)?;
    db.add_compressed_records(&compressed)?;
    info!("{}: {} sequence(s), {} residue(s)", names.label(db_name), db.len()?, residues);
    db.close()?;

    Ok(GenomeSummary {
        db_name: db_name.to_string(),
        db_path,
        files,
        sequences: compressed.len(),
        residues,
    })
}
