//! Homology store

use crate::core::error::{StoreError, StoreResult};
use crate::formats::homology::{HomologyRow, DEST_COLUMNS};
use crate::store::{close_connection, count_rows, open_connection, RecordStore};
use rusqlite::{params, params_from_iter, Connection};
use std::path::{Path, PathBuf};

/// Store of homology relationships (`homologies.sqlitedb`)
#[derive(Debug)]
pub struct HomologyDb {
    connection: Connection,
    path: PathBuf,
}

impl HomologyDb {
    /// Open or create the store; existing rows are kept
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let connection = open_connection(&path)?;
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS homology (
                relationship TEXT NOT NULL,
                species_1 TEXT NOT NULL,
                gene_id_1 TEXT NOT NULL,
                prot_id_1 TEXT NOT NULL,
                species_2 TEXT NOT NULL,
                gene_id_2 TEXT NOT NULL,
                prot_id_2 TEXT NOT NULL,
                source TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS homology_gene_1 ON homology(gene_id_1);
            CREATE INDEX IF NOT EXISTS homology_gene_2 ON homology(gene_id_2);",
        )?;
        Ok(Self { connection, path })
    }

    /// Insert records whose values are given in `col_order`.
    ///
    /// `col_order` must name every table column exactly once and each
    /// record must carry one value per column.
    pub fn add_records<R, S>(&mut self, records: &[R], col_order: &[&str]) -> StoreResult<()>
    where
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut sorted: Vec<&str> = col_order.to_vec();
        sorted.sort_unstable();
        let mut expected: Vec<&str> = DEST_COLUMNS.to_vec();
        expected.sort_unstable();
        if sorted != expected {
            return Err(StoreError::ColumnOrder {
                given: col_order.iter().map(|c| c.to_string()).collect(),
                expected: DEST_COLUMNS.iter().map(|c| c.to_string()).collect(),
            });
        }

        let placeholders: Vec<String> = (1..=col_order.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO homology({}) VALUES ({})",
            col_order.join(", "),
            placeholders.join(", ")
        );

        let transaction = self.connection.transaction()?;
        {
            let mut insert = transaction.prepare(&sql)?;
            for record in records {
                let values = record.as_ref();
                if values.len() != col_order.len() {
                    return Err(StoreError::RecordWidth {
                        expected: col_order.len(),
                        found: values.len(),
                    });
                }
                insert.execute(params_from_iter(values.iter().map(|v| v.as_ref())))?;
            }
        }
        transaction.commit()?;
        Ok(())
    }

    /// Insert normalized rows
    pub fn add_rows(&mut self, rows: &[HomologyRow]) -> StoreResult<()> {
        let values: Vec<[&str; 8]> = rows.iter().map(HomologyRow::values).collect();
        self.add_records(&values, &DEST_COLUMNS)
    }

    /// Every relationship that involves `gene_id` on either side
    pub fn get_related_to(&self, gene_id: &str) -> StoreResult<Vec<HomologyRow>> {
        let mut statement = self.connection.prepare(
            "SELECT relationship, species_1, gene_id_1, prot_id_1, species_2, gene_id_2, prot_id_2, source
             FROM homology WHERE gene_id_1 = ?1 OR gene_id_2 = ?1 ORDER BY rowid",
        )?;
        let rows = statement.query_map(params![gene_id], |row| {
            Ok(HomologyRow {
                relationship: row.get(0)?,
                species_1: row.get(1)?,
                gene_id_1: row.get(2)?,
                prot_id_1: row.get(3)?,
                species_2: row.get(4)?,
                gene_id_2: row.get(5)?,
                prot_id_2: row.get(6)?,
                source: row.get(7)?,
            })
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }
}

impl RecordStore for HomologyDb {
    fn source(&self) -> &Path {
        &self.path
    }

    fn len(&self) -> StoreResult<usize> {
        count_rows(&self.connection, "homology")
    }

    fn close(self) -> StoreResult<()> {
        close_connection(self.connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(gene_1: &str, gene_2: &str) -> HomologyRow {
        HomologyRow::from_source(
            ["ortholog_one2one", "human", gene_1, "P1", "mouse", gene_2, "P2"],
            "t.tsv",
        )
    }

    #[test]
    fn test_add_rows_and_query() {
        let dir = TempDir::new().unwrap();
        let mut db = HomologyDb::open(dir.path().join("homologies.sqlitedb")).unwrap();
        db.add_rows(&[row("G1", "G2"), row("G3", "G1"), row("G4", "G5")]).unwrap();
        assert_eq!(db.len().unwrap(), 3);
        let related = db.get_related_to("G1").unwrap();
        assert_eq!(related.len(), 2);
        assert_eq!(related[0], row("G1", "G2"));
        db.close().unwrap();
    }

    #[test]
    fn test_permuted_column_order() {
        let dir = TempDir::new().unwrap();
        let mut db = HomologyDb::open(dir.path().join("h.sqlitedb")).unwrap();
        let order = [
            "source",
            "relationship",
            "species_1",
            "gene_id_1",
            "prot_id_1",
            "species_2",
            "gene_id_2",
            "prot_id_2",
        ];
        let record = vec!["t.tsv", "paralog", "a", "G1", "P1", "a", "G2", "P2"];
        db.add_records(&[record], &order).unwrap();
        let related = db.get_related_to("G2").unwrap();
        assert_eq!(related[0].relationship, "paralog");
        assert_eq!(related[0].source, "t.tsv");
    }

    #[test]
    fn test_invalid_column_order() {
        let dir = TempDir::new().unwrap();
        let mut db = HomologyDb::open(dir.path().join("h.sqlitedb")).unwrap();
        let record = vec!["a"; 8];
        let mut order = DEST_COLUMNS;
        order[7] = "origin";
        assert!(matches!(
            db.add_records(&[record], &order),
            Err(StoreError::ColumnOrder { .. })
        ));
        assert!(db.is_empty().unwrap());
    }

    #[test]
    fn test_record_width() {
        let dir = TempDir::new().unwrap();
        let mut db = HomologyDb::open(dir.path().join("h.sqlitedb")).unwrap();
        let record = vec!["a"; 7];
        assert!(matches!(
            db.add_records(&[record], &DEST_COLUMNS),
            Err(StoreError::RecordWidth { expected: 8, found: 7 })
        ));
        assert_eq!(db.len().unwrap(), 0);
    }
}
