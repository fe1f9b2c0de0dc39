//! Species name resolution
//!
//! Maps between latin names (`Homo sapiens`), common names (`Human`) and
//! Ensembl database prefixes (`homo_sapiens`). Lookups are case-insensitive.
//! A map is built once at startup and passed to whatever needs it.

use crate::core::error::SpeciesError;
use log::warn;
use std::collections::HashMap;
use std::path::Path;

/// The species table shipped with the crate
pub const BUNDLED_SPECIES: &str = include_str!("../../resources/species.tsv");

#[derive(Debug, Clone)]
struct SpeciesEntry {
    latin: String,
    common: String,
    db_prefix: String,
}

/// Latin name, common name and db prefix mappings
#[derive(Debug, Clone, Default)]
pub struct SpeciesNameMap {
    // keyed by lowercased latin name
    entries: HashMap<String, SpeciesEntry>,
    // lowercased common name -> lowercased latin name
    by_common: HashMap<String, String>,
    // db prefix -> lowercased latin name
    by_prefix: HashMap<String, String>,
}

/// Convert a latin name into its Ensembl db prefix
///
/// # Examples
/// ```
/// use ensembl_install::core::species::db_prefix;
/// assert_eq!(db_prefix("Homo sapiens"), "homo_sapiens");
/// ```
pub fn db_prefix(latin: &str) -> String {
    latin.trim().to_lowercase().replace(' ', "_")
}

impl SpeciesNameMap {
    /// An empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// The bundled table
    pub fn bundled() -> Result<Self, SpeciesError> {
        let mut map = Self::new();
        map.amend_from_table(BUNDLED_SPECIES)?;
        Ok(map)
    }

    /// The bundled table, amended by an optional override table on disk
    pub fn load(overrides: Option<&Path>) -> Result<Self, SpeciesError> {
        let mut map = Self::bundled()?;
        if let Some(path) = overrides {
            let text = std::fs::read_to_string(path)?;
            map.amend_from_table(&text)?;
        }
        Ok(map)
    }

    /// Add every row of a tab-delimited `Species name<TAB>Common name` table.
    ///
    /// A first row whose first column is `Species name` is treated as a header.
    pub fn amend_from_table(&mut self, text: &str) -> Result<(), SpeciesError> {
        for (idx, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if idx == 0 && fields[0].eq_ignore_ascii_case("species name") {
                continue;
            }
            if fields.len() < 2 || fields[0].is_empty() || fields[1].is_empty() {
                return Err(SpeciesError::InvalidRow {
                    line: idx + 1,
                    message: format!("expected 2 tab-separated names, got '{}'", line),
                });
            }
            self.amend_species(fields[0], fields[1])?;
        }
        Ok(())
    }

    /// Add a species, replacing any existing record for the same latin name
    pub fn amend_species(&mut self, latin: &str, common: &str) -> Result<(), SpeciesError> {
        let latin = latin.trim();
        let common = common.trim();
        if latin.contains('_') {
            return Err(SpeciesError::NotLatin(latin.to_string()));
        }
        let key = latin.to_lowercase();
        self.purge(&key);

        let entry = SpeciesEntry {
            latin: latin.to_string(),
            common: common.to_string(),
            db_prefix: db_prefix(latin),
        };
        self.by_common.insert(common.to_lowercase(), key.clone());
        self.by_prefix.insert(entry.db_prefix.clone(), key.clone());
        self.entries.insert(key, entry);
        Ok(())
    }

    fn purge(&mut self, key: &str) {
        if let Some(old) = self.entries.remove(key) {
            self.by_common.remove(&old.common.to_lowercase());
            self.by_prefix.remove(&old.db_prefix);
        }
    }

    fn find(&self, name: &str) -> Option<&SpeciesEntry> {
        let name = name.trim().to_lowercase();
        self.entries
            .get(&name)
            .or_else(|| self.by_prefix.get(&name).and_then(|k| self.entries.get(k)))
            .or_else(|| self.by_common.get(&name).and_then(|k| self.entries.get(k)))
    }

    /// Whether `name` is a known latin name, common name or db prefix
    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Common name for a latin name, common name or db prefix
    pub fn get_common_name(&self, name: &str) -> Result<&str, SpeciesError> {
        self.find(name)
            .map(|e| e.common.as_str())
            .ok_or_else(|| SpeciesError::Unknown(name.to_string()))
    }

    /// Latin name for a latin name, common name or db prefix
    pub fn get_species_name(&self, name: &str) -> Result<&str, SpeciesError> {
        self.find(name)
            .map(|e| e.latin.as_str())
            .ok_or_else(|| SpeciesError::Unknown(name.to_string()))
    }

    /// Ensembl db prefix for a latin name, common name or db prefix
    pub fn get_db_prefix(&self, name: &str) -> Result<&str, SpeciesError> {
        self.find(name)
            .map(|e| e.db_prefix.as_str())
            .ok_or_else(|| SpeciesError::Unknown(name.to_string()))
    }

    /// Label for progress output; unknown names fall back to the name itself
    pub fn label(&self, name: &str) -> String {
        match self.get_common_name(name) {
            Ok(common) => common.to_string(),
            Err(e) => {
                warn!("{}", e);
                name.to_string()
            }
        }
    }

    /// Sorted latin names
    pub fn species_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.values().map(|e| e.latin.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// `(latin, common, db_prefix)` rows sorted by latin name
    pub fn rows(&self) -> Vec<(&str, &str, &str)> {
        let mut rows: Vec<_> = self
            .entries
            .values()
            .map(|e| (e.latin.as_str(), e.common.as_str(), e.db_prefix.as_str()))
            .collect();
        rows.sort_unstable();
        rows
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
