//! Compressed genome sequence store
//!
//! One row per sequence, keyed by seqid, holding the zlib-compressed
//! residues and the uncompressed length. A small `tags` table records
//! which species the store belongs to.

use crate::core::codec::{compress, decompress};
use crate::core::error::{StoreError, StoreResult};
use crate::store::{close_connection, count_rows, open_connection, to_i64, RecordStore};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// One compressed sequence ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedSeq {
    pub seqid: String,
    /// Uncompressed length in residues
    pub length: u64,
    pub data: Vec<u8>,
}

impl CompressedSeq {
    /// Compress `seq` under `seqid`
    pub fn new(seqid: &str, seq: &str) -> std::io::Result<Self> {
        Ok(Self {
            seqid: seqid.to_string(),
            length: seq.len() as u64,
            data: compress(seq.as_bytes())?,
        })
    }
}

/// Store of one species' genome (`genome_sequence.sqlitedb`)
#[derive(Debug)]
pub struct CompressedGenomeSeqsDb {
    connection: Connection,
    path: PathBuf,
}

impl CompressedGenomeSeqsDb {
    /// Open or create the store
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let connection = open_connection(&path)?;
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS genome (
                seqid TEXT PRIMARY KEY,
                seq BLOB NOT NULL,
                length INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tags (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self { connection, path })
    }

    /// Record the species this genome belongs to
    pub fn set_species(&mut self, species: &str) -> StoreResult<()> {
        self.connection.execute(
            "INSERT OR REPLACE INTO tags(key, value) VALUES ('species', ?1)",
            params![species],
        )?;
        Ok(())
    }

    pub fn species(&self) -> StoreResult<Option<String>> {
        let value: Option<String> = self
            .connection
            .query_row("SELECT value FROM tags WHERE key = 'species'", [], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Insert compressed sequences in one transaction; an existing seqid is replaced
    pub fn add_compressed_records(&mut self, records: &[CompressedSeq]) -> StoreResult<()> {
        let transaction = self.connection.transaction()?;
        {
            let mut insert =
                transaction.prepare("INSERT OR REPLACE INTO genome(seqid, seq, length) VALUES (?1, ?2, ?3)")?;
            for record in records {
                insert.execute(params![record.seqid, record.data, to_i64(record.length)])?;
            }
        }
        transaction.commit()?;
        Ok(())
    }

    /// Decompressed sequence for `seqid`, if present
    pub fn get_seq(&self, seqid: &str) -> StoreResult<Option<String>> {
        let data: Option<Vec<u8>> = self
            .connection
            .query_row("SELECT seq FROM genome WHERE seqid = ?1", params![seqid], |row| row.get(0))
            .optional()?;
        let Some(data) = data else {
            return Ok(None);
        };
        let bytes = decompress(&data).map_err(|_| StoreError::Corrupt(seqid.to_string()))?;
        let seq = String::from_utf8(bytes).map_err(|_| StoreError::Corrupt(seqid.to_string()))?;
        Ok(Some(seq))
    }

    /// Uncompressed length of `seqid`
    pub fn get_length(&self, seqid: &str) -> StoreResult<Option<u64>> {
        let length: Option<i64> = self
            .connection
            .query_row("SELECT length FROM genome WHERE seqid = ?1", params![seqid], |row| row.get(0))
            .optional()?;
        Ok(length.map(|l| l as u64))
    }

    /// Stored seqids in sorted order
    pub fn seqids(&self) -> StoreResult<Vec<String>> {
        let mut statement = self.connection.prepare("SELECT seqid FROM genome ORDER BY seqid")?;
        let rows = statement.query_map([], |row| row.get::<_, String>(0))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

impl RecordStore for CompressedGenomeSeqsDb {
    fn source(&self) -> &Path {
        &self.path
    }

    fn len(&self) -> StoreResult<usize> {
        count_rows(&self.connection, "genome")
    }

    fn close(self) -> StoreResult<()> {
        close_connection(self.connection)
    }
}
