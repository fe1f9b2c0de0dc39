//! Ensembl Compara homology tables
//!
//! Tab-delimited, one relationship per row. The first row is a header that
//! must name every column in [`SOURCE_COLUMNS`]; those columns are projected
//! (in that order), filtered to rows where both species are installed, and
//! remapped to the 8-column [`HomologyRow`] with the file name appended.

use crate::core::error::HomologyError;
use crate::core::io::{file_name, read_lines};
use std::collections::HashSet;
use std::path::Path;

/// Columns read from the Ensembl homology dumps
pub const SOURCE_COLUMNS: [&str; 7] = [
    "homology_type",
    "species",
    "gene_stable_id",
    "protein_stable_id",
    "homology_species",
    "homology_gene_stable_id",
    "homology_protein_stable_id",
];

/// Columns of the homology store, in [`HomologyRow::values`] order
pub const DEST_COLUMNS: [&str; 8] = [
    "relationship",
    "species_1",
    "gene_id_1",
    "prot_id_1",
    "species_2",
    "gene_id_2",
    "prot_id_2",
    "source",
];

/// One normalized homology relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HomologyRow {
    pub relationship: String,
    pub species_1: String,
    pub gene_id_1: String,
    pub prot_id_1: String,
    pub species_2: String,
    pub gene_id_2: String,
    pub prot_id_2: String,
    /// Name of the file the row came from
    pub source: String,
}

impl HomologyRow {
    /// Build a row from the 7 source values plus the file name
    pub fn from_source(values: [&str; 7], source: &str) -> Self {
        let [relationship, species_1, gene_id_1, prot_id_1, species_2, gene_id_2, prot_id_2] = values;
        Self {
            relationship: relationship.to_string(),
            species_1: species_1.to_string(),
            gene_id_1: gene_id_1.to_string(),
            prot_id_1: prot_id_1.to_string(),
            species_2: species_2.to_string(),
            gene_id_2: gene_id_2.to_string(),
            prot_id_2: prot_id_2.to_string(),
            source: source.to_string(),
        }
    }

    /// Values in [`DEST_COLUMNS`] order
    pub fn values(&self) -> [&str; 8] {
        [
            &self.relationship,
            &self.species_1,
            &self.gene_id_1,
            &self.prot_id_1,
            &self.species_2,
            &self.gene_id_2,
            &self.prot_id_2,
            &self.source,
        ]
    }
}

/// Loads homology tables, keeping rows between allowed species only
#[derive(Debug, Clone)]
pub struct HomologyLoader {
    allowed_species: HashSet<String>,
}

impl HomologyLoader {
    pub fn new<I, S>(allowed_species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_species: allowed_species.into_iter().map(Into::into).collect(),
        }
    }

    /// Both species of a relationship must be allowed
    pub fn matching_species(&self, species_1: &str, species_2: &str) -> bool {
        self.allowed_species.contains(species_1) && self.allowed_species.contains(species_2)
    }

    /// Project, filter and remap the lines of one table.
    ///
    /// `path` names the table for the `source` column and for errors.
    pub fn load_lines<S: AsRef<str>>(&self, lines: &[S], path: &Path) -> Result<Vec<HomologyRow>, HomologyError> {
        let mut lines = lines.iter().enumerate().filter(|(_, l)| !l.as_ref().trim().is_empty());
        let (_, header) = lines
            .next()
            .ok_or_else(|| HomologyError::MissingHeader(path.to_path_buf()))?;
        let header: Vec<&str> = header.as_ref().split('\t').map(str::trim).collect();

        let mut columns = [0usize; 7];
        for (slot, name) in columns.iter_mut().zip(SOURCE_COLUMNS) {
            *slot = header.iter().position(|h| *h == name).ok_or_else(|| {
                HomologyError::SchemaMismatch {
                    path: path.to_path_buf(),
                    expected: SOURCE_COLUMNS.iter().map(|s| s.to_string()).collect(),
                    found: header.iter().map(|s| s.to_string()).collect(),
                }
            })?;
        }
        let width = columns.iter().max().map_or(0, |m| m + 1);

        let source = file_name(path);
        let mut rows = Vec::new();
        for (idx, line) in lines {
            let fields: Vec<&str> = line.as_ref().split('\t').collect();
            if fields.len() < width {
                return Err(HomologyError::ShortRow {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    expected: width,
                    found: fields.len(),
                });
            }
            let values = columns.map(|c| fields[c].trim());
            if self.matching_species(values[1], values[4]) {
                rows.push(HomologyRow::from_source(values, &source));
            }
        }
        Ok(rows)
    }

    /// Load one (possibly compressed) table
    ///
    /// The file is read in bulk, which is much faster than line-by-line reads.
    pub fn load_file(&self, path: &Path) -> Result<Vec<HomologyRow>, HomologyError> {
        let lines = read_lines(path)?;
        self.load_lines(&lines, path)
    }

    /// Load several tables into one batch
    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<HomologyRow>, HomologyError> {
        let mut all = Vec::new();
        for path in paths {
            all.extend(self.load_file(path.as_ref())?);
        }
        Ok(all)
    }
}
