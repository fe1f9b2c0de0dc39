//! Installation settings and the staging/install directory layout

use crate::core::error::SpeciesError;
use crate::core::species::SpeciesNameMap;
use std::path::{Path, PathBuf};

/// Upper bound on per-stage worker threads
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Directory name shared by alignments and homologies
pub const COMPARA_NAME: &str = "compara";

/// Settings for one install run
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the downloaded (raw) files
    pub staging_path: PathBuf,
    /// Root of the installed stores
    pub install_path: PathBuf,
    /// Ensembl db prefixes of the species to install, e.g. `homo_sapiens`
    pub db_names: Vec<String>,
    /// Alignment names, e.g. `10_primates.epo`
    pub align_names: Vec<String>,
    /// Maximum worker threads per parallel stage
    pub max_workers: usize,
}

impl Config {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(staging_path: P, install_path: Q) -> Self {
        Self {
            staging_path: staging_path.as_ref().to_path_buf(),
            install_path: install_path.as_ref().to_path_buf(),
            db_names: Vec::new(),
            align_names: Vec::new(),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }

    /// Resolve species given as latin, common or db-prefix names into db prefixes.
    ///
    /// Order is kept and repeats are dropped.
    pub fn with_species<S: AsRef<str>>(
        mut self,
        species: &[S],
        names: &SpeciesNameMap,
    ) -> Result<Self, SpeciesError> {
        for name in species {
            let prefix = names.get_db_prefix(name.as_ref())?.to_string();
            if !self.db_names.contains(&prefix) {
                self.db_names.push(prefix);
            }
        }
        Ok(self)
    }

    pub fn with_align_names<S: AsRef<str>>(mut self, align_names: &[S]) -> Self {
        self.align_names = align_names.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn staging_genomes(&self) -> PathBuf {
        self.staging_path.join("genomes")
    }

    pub fn install_genomes(&self) -> PathBuf {
        self.install_path.join("genomes")
    }

    pub fn staging_homologies(&self) -> PathBuf {
        self.staging_path.join(COMPARA_NAME).join("homologies")
    }

    pub fn install_homologies(&self) -> PathBuf {
        self.install_path.join(COMPARA_NAME).join("homologies")
    }

    pub fn staging_aligns(&self) -> PathBuf {
        self.staging_path.join(COMPARA_NAME).join("aligns")
    }

    pub fn install_aligns(&self) -> PathBuf {
        self.install_path.join(COMPARA_NAME).join("aligns")
    }
}
