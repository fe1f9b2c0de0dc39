//! Persistent stores
//!
//! SQLite-backed stores for installed alignments, homologies, genome
//! sequences and annotations. Each store owns one connection; every
//! `add_*` call is a single transaction. Stores are written by one thread
//! at a time and closed explicitly.

mod align_db;
mod annotation_db;
mod genome_db;
mod homology_db;

pub use align_db::{AlignDb, AlignRecord, ALIGN_COLUMNS};
pub use annotation_db::{AnnotationDb, GffFeature};
pub use genome_db::{CompressedGenomeSeqsDb, CompressedSeq};
pub use homology_db::HomologyDb;

use crate::core::error::{StoreError, StoreResult};
use rusqlite::Connection;
use std::path::Path;

/// File name of the per-species genome sequence store
pub const SEQDB_NAME: &str = "genome_sequence.sqlitedb";

/// File name of the per-species annotation store
pub const ANNOTDB_NAME: &str = "annotations.sqlitedb";

/// File name of the homology store
pub const HOMOLOGYDB_NAME: &str = "homologies.sqlitedb";

/// File name of the alignment store for `align_name`
pub fn align_db_name(align_name: &str) -> String {
    format!("{}.sqlitedb", align_name)
}

/// Operations shared by every store
pub trait RecordStore: Sized {
    /// Path of the backing file
    fn source(&self) -> &Path;

    /// Number of records currently stored
    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Flush and release the store
    fn close(self) -> StoreResult<()>;
}

/// Open (creating if needed) a database file tuned for bulk loading
pub(crate) fn open_connection(path: &Path) -> StoreResult<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let connection = Connection::open(path)?;
    connection.execute_batch(
        "PRAGMA synchronous = OFF;
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(connection)
}

pub(crate) fn count_rows(connection: &Connection, table: &str) -> StoreResult<usize> {
    let count: i64 = connection.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
    Ok(count as usize)
}

pub(crate) fn close_connection(connection: Connection) -> StoreResult<()> {
    connection.close().map_err(|(_, e)| StoreError::Sqlite(e))
}

pub(crate) fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
