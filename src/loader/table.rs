use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Result};
use flate2::read::GzDecoder;
use rusqlite::Connection;

/// A raw tabular dataset: ordered column names plus string-typed rows.
///
/// Rows may be ragged (shorter than the header); [`RawTable::value`] pads
/// with the empty string instead of panicking.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of a column by name, case-insensitive.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }

    /// Cell value at (row, column index); empty string for short rows.
    pub fn value(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Append a column with one value per existing row.
    /// `values` is truncated or padded with empty strings as needed.
    pub fn push_column(&mut self, name: &str, mut values: Vec<String>) {
        values.resize(self.rows.len(), String::new());
        self.columns.push(name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read a gzipped `;`-delimited table.
///
/// Rows that fail to decode are dropped with a warning rather than
/// aborting the load. Cell text is recovered lossily; the source files
/// ship in mixed encodings.
pub fn read_csv_gz(path: &Path) -> Result<RawTable> {
    let file = File::open(path)?;
    let reader: Box<dyn Read> = Box::new(GzDecoder::new(file));

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (i, record) in rdr.byte_records().enumerate() {
        match record {
            Ok(rec) => {
                rows.push(
                    rec.iter()
                        .map(|f| String::from_utf8_lossy(f).trim().to_string())
                        .collect(),
                );
            }
            Err(e) => {
                log::warn!("{}: dropping row {}: {}", path.display(), i + 1, e);
            }
        }
    }

    Ok(RawTable { columns, rows })
}

/// Read the contractor table out of a local SQLite store.
///
/// The table name varies across dataset revisions, so the first user table
/// whose name mentions "contratista" is used, falling back to the first
/// user table in the file.
pub fn read_sqlite(path: &Path) -> Result<RawTable> {
    let conn = Connection::open(path)?;

    let table = pick_table(&conn)?;
    let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\"", table))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let ncols = columns.len();

    let mapped = stmt.query_map([], |row| {
        let mut cells = Vec::with_capacity(ncols);
        for i in 0..ncols {
            let value: rusqlite::types::Value = row.get(i)?;
            cells.push(match value {
                rusqlite::types::Value::Null => String::new(),
                rusqlite::types::Value::Integer(n) => n.to_string(),
                rusqlite::types::Value::Real(f) => f.to_string(),
                rusqlite::types::Value::Text(s) => s.trim().to_string(),
                rusqlite::types::Value::Blob(_) => String::new(),
            });
        }
        Ok(cells)
    })?;

    let mut rows = Vec::new();
    for (i, row) in mapped.enumerate() {
        match row {
            Ok(cells) => rows.push(cells),
            Err(e) => log::warn!("{}: dropping row {}: {}", path.display(), i + 1, e),
        }
    }

    Ok(RawTable { columns, rows })
}

fn pick_table(conn: &Connection) -> Result<String> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let names: Vec<String> = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .filter_map(|r| r.ok())
        .collect();

    names
        .iter()
        .find(|n| n.to_lowercase().contains("contratista"))
        .or_else(|| names.first())
        .cloned()
        .ok_or_else(|| anyhow!("no tables found in SQLite store"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    pub(crate) fn write_csv_gz(path: &Path, content: &str) {
        let file = File::create(path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        enc.write_all(content.as_bytes()).unwrap();
        enc.finish().unwrap();
    }

    #[test]
    fn test_read_csv_gz() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv.gz");
        write_csv_gz(&path, "a;b;c\n1;2;3\nx;y;z\n");

        let table = read_csv_gz(&path).unwrap();
        assert_eq!(table.columns, vec!["a", "b", "c"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(1, 2), "z");
    }

    #[test]
    fn test_ragged_rows_pad_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv.gz");
        write_csv_gz(&path, "a;b;c\n1;2\n");

        let table = read_csv_gz(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.value(0, 2), "");
    }

    #[test]
    fn test_push_column_pads() {
        let mut table = RawTable {
            columns: vec!["a".to_string()],
            rows: vec![vec!["1".to_string()], vec!["2".to_string()]],
        };
        table.push_column("b", vec!["x".to_string()]);
        assert_eq!(table.value(0, 1), "x");
        assert_eq!(table.value(1, 1), "");
    }

    #[test]
    fn test_read_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE contratistas (nombre TEXT, nit TEXT, alerta TEXT);
                 INSERT INTO contratistas VALUES ('ACME SAS', '900123', 'HIGH');
                 INSERT INTO contratistas VALUES ('Beta Ltda', NULL, NULL);",
            )
            .unwrap();
        }

        let table = read_sqlite(&path).unwrap();
        assert_eq!(table.columns, vec!["nombre", "nit", "alerta"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.value(0, 0), "ACME SAS");
        assert_eq!(table.value(1, 1), "");
    }

    #[test]
    fn test_pick_table_prefers_contractor_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE aux (x TEXT);
                 CREATE TABLE contratista_final (nombre TEXT);",
            )
            .unwrap();
        }
        let conn = Connection::open(&path).unwrap();
        assert_eq!(pick_table(&conn).unwrap(), "contratista_final");
    }
}
