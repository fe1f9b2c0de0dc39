//! Alignment store: one row per (block, species) sequence

use crate::core::error::{StoreError, StoreResult};
use crate::core::gaps::{expand_gaps, GapSpan, GapSpans, GAP};
use crate::core::{AlignmentRegionId, Strand};
use crate::store::{close_connection, count_rows, open_connection, to_i64, RecordStore};
use rusqlite::{params, Connection, Row};
use std::path::{Path, PathBuf};

/// Column order of the `align` table
pub const ALIGN_COLUMNS: [&str; 10] = [
    "species",
    "seqid",
    "start",
    "end",
    "strand",
    "coord_length",
    "block_id",
    "source",
    "seq",
    "gap_spans",
];

/// One installed alignment row
///
/// `block_id` is only unique within `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignRecord {
    pub species: String,
    pub seqid: String,
    /// Forward-strand start (0-based)
    pub start: u64,
    /// Forward-strand end (exclusive)
    pub end: u64,
    pub strand: Strand,
    pub coord_length: u64,
    pub block_id: u64,
    /// File name the block was read from
    pub source: String,
    /// Ungapped residues
    pub seq: Vec<u8>,
    pub gap_spans: Vec<GapSpan>,
}

impl AlignRecord {
    /// Build a record from a parsed block member, replacing the gapped
    /// sequence by its ungapped residues and gap spans
    pub fn from_block_member(id: &AlignmentRegionId, gapped: &str, block_id: u64, source: &str) -> Self {
        let GapSpans { ungapped, spans } = crate::core::gaps::encode_gaps(gapped.as_bytes(), GAP);
        Self {
            species: id.species().to_string(),
            seqid: id.seqid().to_string(),
            start: id.start(),
            end: id.end(),
            strand: id.strand(),
            coord_length: id.coord_length(),
            block_id,
            source: source.to_string(),
            seq: ungapped,
            gap_spans: spans,
        }
    }

    /// The aligned (gapped) sequence
    pub fn gapped_seq(&self) -> Option<String> {
        let bytes = expand_gaps(&self.seq, &self.gap_spans, GAP)?;
        String::from_utf8(bytes).ok()
    }

    fn from_row(row: &Row) -> rusqlite::Result<(Self, String, Vec<u8>)> {
        let strand: String = row.get(4)?;
        let spans: Vec<u8> = row.get(9)?;
        let record = Self {
            species: row.get(0)?,
            seqid: row.get(1)?,
            start: row.get::<_, i64>(2)? as u64,
            end: row.get::<_, i64>(3)? as u64,
            strand: Strand::parse(&strand).unwrap_or_default(),
            coord_length: row.get::<_, i64>(5)? as u64,
            block_id: row.get::<_, i64>(6)? as u64,
            source: row.get(7)?,
            seq: row.get::<_, String>(8)?.into_bytes(),
            gap_spans: Vec::new(),
        };
        Ok((record, strand, spans))
    }
}

/// Store for one named alignment (`<align_name>.sqlitedb`)
#[derive(Debug)]
pub struct AlignDb {
    connection: Connection,
    path: PathBuf,
}

impl AlignDb {
    /// Open or create the store; existing rows are kept
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let connection = open_connection(&path)?;
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS align (
                species TEXT NOT NULL,
                seqid TEXT NOT NULL,
                start INTEGER NOT NULL,
                \"end\" INTEGER NOT NULL,
                strand TEXT NOT NULL,
                coord_length INTEGER NOT NULL,
                block_id INTEGER NOT NULL,
                source TEXT NOT NULL,
                seq TEXT NOT NULL,
                gap_spans BLOB NOT NULL
            );
            CREATE INDEX IF NOT EXISTS align_block ON align(source, block_id);
            CREATE INDEX IF NOT EXISTS align_coord ON align(species, seqid, start, \"end\");",
        )?;
        Ok(Self { connection, path })
    }

    /// Insert a batch of records in one transaction
    pub fn add_records(&mut self, records: &[AlignRecord]) -> StoreResult<()> {
        let transaction = self.connection.transaction()?;
        {
            let mut insert = transaction.prepare(
                "INSERT INTO align(species, seqid, start, \"end\", strand, coord_length, block_id, source, seq, gap_spans)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for record in records {
                let spans = GapSpans {
                    ungapped: Vec::new(),
                    spans: record.gap_spans.clone(),
                };
                insert.execute(params![
                    record.species,
                    record.seqid,
                    to_i64(record.start),
                    to_i64(record.end),
                    record.strand.to_string(),
                    to_i64(record.coord_length),
                    to_i64(record.block_id),
                    record.source,
                    String::from_utf8_lossy(&record.seq).into_owned(),
                    spans.spans_to_bytes(),
                ])?;
            }
        }
        transaction.commit()?;
        Ok(())
    }

    fn query(&self, sql: &str, params: impl rusqlite::Params) -> StoreResult<Vec<AlignRecord>> {
        let mut statement = self.connection.prepare(sql)?;
        let rows = statement.query_map(params, AlignRecord::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            let (mut record, strand, spans) = row?;
            if Strand::parse(&strand).is_none() {
                return Err(StoreError::Corrupt(format!("strand '{}'", strand)));
            }
            record.gap_spans = GapSpans::spans_from_bytes(&spans)
                .ok_or_else(|| StoreError::Corrupt(format!("gap spans of {}:{}", record.source, record.block_id)))?;
            records.push(record);
        }
        Ok(records)
    }

    /// All members of one block of one source file
    pub fn get_block(&self, source: &str, block_id: u64) -> StoreResult<Vec<AlignRecord>> {
        self.query(
            "SELECT species, seqid, start, \"end\", strand, coord_length, block_id, source, seq, gap_spans
             FROM align WHERE source = ?1 AND block_id = ?2 ORDER BY rowid",
            params![source, to_i64(block_id)],
        )
    }

    /// Records of `species` overlapping `[start, end)` on `seqid`
    pub fn get_overlapping(&self, species: &str, seqid: &str, start: u64, end: u64) -> StoreResult<Vec<AlignRecord>> {
        self.query(
            "SELECT species, seqid, start, \"end\", strand, coord_length, block_id, source, seq, gap_spans
             FROM align WHERE species = ?1 AND seqid = ?2 AND start < ?4 AND \"end\" > ?3 ORDER BY start",
            params![species, seqid, to_i64(start), to_i64(end)],
        )
    }

    /// Distinct `(source, block_id)` pairs
    pub fn block_count(&self) -> StoreResult<usize> {
        let count: i64 = self.connection.query_row(
            "SELECT COUNT(*) FROM (SELECT DISTINCT source, block_id FROM align)",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

impl RecordStore for AlignDb {
    fn source(&self) -> &Path {
        &self.path
    }

    fn len(&self) -> StoreResult<usize> {
        count_rows(&self.connection, "align")
    }

    fn close(self) -> StoreResult<()> {
        close_connection(self.connection)
    }
}
