//! Loosely-typed tabular payloads.
//!
//! [`Table`] is the common currency between the query-result cache, the
//! warehouse client, and the Dune client: rows of named, untyped columns.
//! Cells are strings; typing only happens at the warehouse upload boundary,
//! where the destination schema drives coercion
//! (see [`BigQueryClient::upload_table`](crate::gcp::bigquery::BigQueryClient::upload_table)).
//!
//! CSV is the wire and cache format. Cache blobs are stored as CSV and Dune
//! result bodies arrive as CSV, so the codec lives here rather than on any
//! one client.

use serde::{Deserialize, Serialize};

/// Errors from tabular payload encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The CSV payload could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O failure while flushing the CSV writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A row's width does not match the table's column count.
    #[error("Row has {actual} cells but the table has {expected} columns")]
    WidthMismatch {
        /// Number of columns in the table
        expected: usize,
        /// Number of cells in the offending row
        actual: usize,
    },
}

/// Rows of named, untyped columns.
///
/// The row/column invariant (every row is exactly as wide as `columns`) is
/// enforced on construction and mutation, so readers can index rows by
/// [`column_index`](Table::column_index) without bounds anxiety.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Create a table from columns and pre-built rows.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::WidthMismatch`] if any row's width differs from
    /// the column count.
    pub fn with_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, TableError> {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Append a row.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::WidthMismatch`] if the row's width differs from
    /// the column count.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), TableError> {
        if row.len() != self.columns.len() {
            return Err(TableError::WidthMismatch {
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names, in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows, in order.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `(row, column name)`, if both exist.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Serialize to CSV bytes (header row followed by data rows).
    pub fn to_csv(&self) -> Result<Vec<u8>, TableError> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        writer.into_inner().map_err(|e| TableError::Io(e.into_error()))
    }

    /// Deserialize from CSV bytes. The first record is taken as the header.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut table = Table::new(columns);
        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect())?;
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::with_rows(
            vec!["chain".into(), "height".into()],
            vec![
                vec!["ethereum".into(), "19000000".into()],
                vec!["base".into(), "12000000".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_cells() {
        let table = sample();
        let bytes = table.to_csv().unwrap();
        let parsed = Table::from_csv(&bytes).unwrap();
        assert_eq!(parsed, table);
    }

    #[test]
    fn test_column_lookup() {
        let table = sample();
        assert_eq!(table.column_index("height"), Some(1));
        assert_eq!(table.column_index("missing"), None);
        assert_eq!(table.get(1, "chain"), Some("base"));
        assert_eq!(table.get(2, "chain"), None);
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        let err = table.push_row(vec!["only-one".into()]).unwrap_err();
        assert!(matches!(
            err,
            TableError::WidthMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_cells_with_commas_and_quotes_survive() {
        let table = Table::with_rows(
            vec!["note".into()],
            vec![vec!["hello, \"world\"".into()]],
        )
        .unwrap();
        let parsed = Table::from_csv(&table.to_csv().unwrap()).unwrap();
        assert_eq!(parsed.get(0, "note"), Some("hello, \"world\""));
    }

    #[test]
    fn test_empty_table_round_trip() {
        let table = Table::new(vec!["a".into(), "b".into()]);
        let parsed = Table::from_csv(&table.to_csv().unwrap()).unwrap();
        assert_eq!(parsed.columns(), table.columns());
        assert!(parsed.is_empty());
    }
}
