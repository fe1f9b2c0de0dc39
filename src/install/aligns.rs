//! Alignment ingestion
//!
//! Every `<align_name>*maf*` file under `<staging>/compara/aligns/<align_name>`
//! is parsed on the worker pool. Blocks are numbered from 0 per file in parse
//! order, and all records of one alignment are written to
//! `<install>/compara/aligns/<align_name>.sqlitedb` as a single batch.

use crate::core::error::{FileFailure, InstallError, MafParseError, Result};
use crate::core::io::{file_name, list_files};
use crate::core::pool::{as_completed, partition_by_path};
use crate::core::{Config, SpeciesNameMap};
use crate::formats::maf::{read_maf_file, MafParseStats};
use crate::install::remove_dir_if_exists;
use crate::store::{align_db_name, AlignDb, AlignRecord, RecordStore};
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Records and counters produced by one MAF file
#[derive(Debug, Clone, Default)]
pub struct AlignFileResult {
    pub records: Vec<AlignRecord>,
    pub stats: MafParseStats,
}

/// Outcome of installing one alignment
#[derive(Debug, Clone)]
pub struct AlignSummary {
    pub align_name: String,
    pub db_path: PathBuf,
    pub files: usize,
    /// Records written by this run
    pub records: usize,
    pub stats: MafParseStats,
}

/// Whether `name` is a MAF file belonging to `align_name`
pub fn is_align_file(name: &str, align_name: &str) -> bool {
    name.strip_prefix(align_name).is_some_and(|rest| rest.contains("maf"))
}

/// Parse one MAF file into installable records.
///
/// Block ids start at 0 and follow parse order. Empty blocks produce no
/// records but still take an id.
pub fn load_align_file(path: &Path) -> std::result::Result<AlignFileResult, MafParseError> {
    let source = file_name(path);
    let mut reader = read_maf_file(path)?;
    let mut records = Vec::new();
    for (block_id, block) in (&mut reader).enumerate() {
        let block = block?;
        records.extend(
            block
                .sequences
                .iter()
                .map(|(id, seq)| AlignRecord::from_block_member(id, seq, block_id as u64, &source)),
        );
    }
    Ok(AlignFileResult {
        records,
        stats: reader.stats().clone(),
    })
}

/// Install every configured alignment.
///
/// With `force_overwrite` the whole alignment install directory is removed
/// first; otherwise writes are added to any existing stores. A file that
/// fails to parse contributes nothing, but the other files and alignments
/// are still written; the failures are returned together at the end.
pub fn local_install_compara(
    config: &Config,
    names: &SpeciesNameMap,
    force_overwrite: bool,
) -> Result<Vec<AlignSummary>> {
    let install_dir = config.install_aligns();
    if force_overwrite {
        remove_dir_if_exists(&install_dir)?;
    }
    std::fs::create_dir_all(&install_dir)?;

    let mut summaries = Vec::with_capacity(config.align_names.len());
    let mut failures = Vec::new();
    for align_name in &config.align_names {
        let (summary, failed) = install_alignment(config, names, align_name, &install_dir)?;
        summaries.push(summary);
        failures.extend(failed);
    }
    if !failures.is_empty() {
        return Err(InstallError::FileFailures(failures));
    }
    Ok(summaries)
}

fn install_alignment(
    config: &Config,
    names: &SpeciesNameMap,
    align_name: &str,
    install_dir: &Path,
) -> Result<(AlignSummary, Vec<FileFailure>)> {
    let staging_dir = config.staging_aligns().join(align_name);
    let paths = list_files(&staging_dir, |name| is_align_file(name, align_name))?;
    let total = paths.len();
    if total == 0 {
        warn!("No alignment files for {} in {}", align_name, staging_dir.display());
    } else {
        info!("Installing {} from {} file(s)", align_name, total);
    }

    let mut done = 0;
    let completed = as_completed(paths, config.max_workers, |path: &PathBuf| load_align_file(path))?;
    let (by_file, failures) = partition_by_path(completed, |path| {
        done += 1;
        debug!("[{}/{}] parsed {}", done, total, path.display());
    });
    for failure in &failures {
        warn!("{}: skipping {}: {}", align_name, failure.path.display(), failure.error);
    }

    let mut stats = MafParseStats::default();
    let mut records = Vec::new();
    for (_, result) in by_file {
        stats.merge(&result.stats);
        records.extend(result.records);
    }
    report_stats(align_name, &stats);

    let mut per_species: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *per_species.entry(record.species.as_str()).or_default() += 1;
    }
    for (species, count) in per_species {
        debug!("  {}: {} record(s)", names.label(species), count);
    }

    let db_path = install_dir.join(align_db_name(align_name));
    let mut db = AlignDb::open(&db_path)?;
    db.add_records(&records)?;
    info!("{}: {} record(s) in store after install", align_name, db.len()?);
    db.close()?;

    let summary = AlignSummary {
        align_name: align_name.to_string(),
        db_path,
        files: total,
        records: records.len(),
        stats,
    };
    Ok((summary, failures))
}

fn report_stats(align_name: &str, stats: &MafParseStats) {
    info!(
        "{}: {} block(s), {} sequence(s), {} ancestral line(s) skipped",
        align_name, stats.blocks, stats.sequences, stats.ancestral
    );
    if stats.overwritten > 0 {
        warn!("{}: {} duplicate identities overwritten within blocks", align_name, stats.overwritten);
    }
    if stats.ragged_blocks > 0 {
        warn!("{}: {} block(s) with unequal aligned lengths", align_name, stats.ragged_blocks);
    }
    if stats.empty_blocks > 0 {
        warn!("{}: {} empty block(s) skipped", align_name, stats.empty_blocks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAF: &str = "##maf version=1
a score=1
s homo_sapiens.1 10 4 + 100 AC-GT
s mus_musculus.2 20 5 - 50 ACGGT

a score=2
s ancestral_sequences.x 0 3 + 10 ACG

";

    #[test]
    fn test_align_file_filter() {
        assert!(is_align_file("10_primates.epo.1_1.maf.gz", "10_primates.epo"));
        assert!(is_align_file("10_primates.epo.maf", "10_primates.epo"));
        assert!(!is_align_file("10_primates.epo.1.emf.gz", "10_primates.epo"));
        assert!(!is_align_file("README.maf", "10_primates.epo"));
        assert!(!is_align_file("maf_set.1.emf", "maf_set"));
        assert!(is_align_file("maf_set.1.maf", "maf_set"));
    }

    #[test]
    fn test_load_align_file_numbers_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.maf");
        std::fs::write(&path, MAF).unwrap();

        let result = load_align_file(&path).unwrap();
        assert_eq!(result.stats.blocks, 2);
        assert_eq!(result.stats.ancestral, 1);
        assert_eq!(result.stats.empty_blocks, 1);
        assert_eq!(result.records.len(), 2);
        assert!(result.records.iter().all(|r| r.block_id == 0 && r.source == "x.maf"));
        let mouse = &result.records[1];
        assert_eq!(mouse.start, 25);
        assert_eq!(mouse.end, 30);
        assert_eq!(result.records[0].seq, b"ACGT");
    }

    #[test]
    fn test_bad_file_is_reported_with_its_path() {
        let dir = TempDir::new().unwrap();
        let staging = dir.path().join("staging");
        let align_dir = staging.join("compara").join("aligns").join("aln");
        std::fs::create_dir_all(&align_dir).unwrap();
        std::fs::write(align_dir.join("aln.1.maf"), MAF).unwrap();
        std::fs::write(align_dir.join("aln.2.maf"), "a\ns human.1 x 4 + 100 ACGT\n\n").unwrap();

        let config = Config::new(&staging, dir.path().join("install")).with_align_names(&["aln"]);
        let names = SpeciesNameMap::bundled().unwrap();
        match local_install_compara(&config, &names, false).unwrap_err() {
            crate::core::InstallError::FileFailures(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(file_name(&failures[0].path), "aln.2.maf");
            }
            other => panic!("unexpected error {other}"),
        }
        let db = AlignDb::open(config.install_aligns().join(align_db_name("aln"))).unwrap();
        assert_eq!(db.len().unwrap(), 2);
        assert_eq!(db.get_block("aln.1.maf", 0).unwrap().len(), 2);
    }
}
