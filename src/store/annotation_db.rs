//! GFF3 annotation store (`annotations.sqlitedb`)

use crate::core::error::StoreResult;
use crate::core::Strand;
use crate::formats::gff::GffRecordView;
use crate::store::{close_connection, count_rows, open_connection, to_i64, RecordStore};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

/// Owned GFF3 feature with 0-based half-open coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct GffFeature {
    pub seqid: String,
    pub source: String,
    pub biotype: String,
    pub start: u64,
    pub end: u64,
    pub score: Option<f64>,
    pub strand: Option<Strand>,
    pub phase: Option<u8>,
    pub name: Option<String>,
    pub parent_id: Option<String>,
    pub attributes: String,
}

impl GffFeature {
    pub fn from_view(view: &GffRecordView<'_>) -> Self {
        Self {
            seqid: view.seqid.to_string(),
            source: view.source.to_string(),
            biotype: view.biotype.to_string(),
            start: view.start0(),
            end: view.end,
            score: view.score.parse().ok(),
            strand: view.strand,
            phase: view.phase.parse().ok(),
            name: view.name().map(str::to_string),
            parent_id: view.parent().map(str::to_string),
            attributes: view.attributes.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct AnnotationDb {
    connection: Connection,
    path: PathBuf,
}

impl AnnotationDb {
    /// Open or create the store
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let connection = open_connection(&path)?;
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS gff (
                seqid TEXT NOT NULL,
                source TEXT NOT NULL,
                biotype TEXT NOT NULL,
                start INTEGER NOT NULL,
                \"end\" INTEGER NOT NULL,
                score REAL,
                strand TEXT,
                phase INTEGER,
                name TEXT,
                parent_id TEXT,
                attributes TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS gff_coord ON gff(seqid, start, \"end\");
            CREATE INDEX IF NOT EXISTS gff_name ON gff(name);",
        )?;
        Ok(Self { connection, path })
    }

    pub fn add_records(&mut self, records: &[GffFeature]) -> StoreResult<()> {
        let transaction = self.connection.transaction()?;
        {
            let mut insert = transaction.prepare(
                "INSERT INTO gff(seqid, source, biotype, start, \"end\", score, strand, phase, name, parent_id, attributes)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for record in records {
                insert.execute(params![
                    record.seqid,
                    record.source,
                    record.biotype,
                    to_i64(record.start),
                    to_i64(record.end),
                    record.score,
                    record.strand.map(|s| s.to_string()),
                    record.phase,
                    record.name,
                    record.parent_id,
                    record.attributes,
                ])?;
            }
        }
        transaction.commit()?;
        Ok(())
    }

    /// Features overlapping `[start, end)` on `seqid`, ordered by start
    pub fn get_features_matching(&self, seqid: &str, start: u64, end: u64) -> StoreResult<Vec<GffFeature>> {
        let mut statement = self.connection.prepare(
            "SELECT seqid, source, biotype, start, \"end\", score, strand, phase, name, parent_id, attributes
             FROM gff WHERE seqid = ?1 AND start < ?3 AND \"end\" > ?2 ORDER BY start, rowid",
        )?;
        let rows = statement.query_map(params![seqid, to_i64(start), to_i64(end)], |row| {
            let strand: Option<String> = row.get(6)?;
            Ok(GffFeature {
                seqid: row.get(0)?,
                source: row.get(1)?,
                biotype: row.get(2)?,
                start: row.get::<_, i64>(3)? as u64,
                end: row.get::<_, i64>(4)? as u64,
                score: row.get(5)?,
                strand: strand.as_deref().and_then(Strand::parse),
                phase: row.get(7)?,
                name: row.get(8)?,
                parent_id: row.get(9)?,
                attributes: row.get(10)?,
            })
        })?;
        let mut features = Vec::new();
        for row in rows {
            features.push(row?);
        }
        Ok(features)
    }
}

impl RecordStore for AnnotationDb {
    fn source(&self) -> &Path {
        &self.path
    }

    fn len(&self) -> StoreResult<usize> {
        count_rows(&self.connection, "gff")
    }

    fn close(self) -> StoreResult<()> {
        close_connection(self.connection)
    }
}
