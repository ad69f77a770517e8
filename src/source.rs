//! Tabular row sources
//!
//! A source is one uploaded table: an identifier, its column names in
//! declaration order, and the rows as column → value mappings. Only the CSV
//! reader lives here; spreadsheet readers build a [`SourceTable`] with
//! [`SourceTable::from_rows`].

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur while reading a source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read source '{source_id}': {message}")]
    Read { source_id: String, message: String },

    #[error("source '{source_id}' has no header row")]
    NoHeader { source_id: String },
}

impl SourceError {
    pub fn read(source_id: impl Into<String>, message: impl ToString) -> Self {
        Self::Read {
            source_id: source_id.into(),
            message: message.to_string(),
        }
    }
}

/// One raw row: column name → cell text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and in-memory sources
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    /// Cell value for a column; blank cells read as `None`
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// A table of raw rows with a known column order
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub id: String,
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

impl SourceTable {
    /// Build a table from in-memory rows with an explicit column order
    pub fn from_rows(id: impl Into<String>, columns: Vec<String>, rows: Vec<RawRecord>) -> Self {
        Self {
            id: id.into(),
            columns,
            rows,
        }
    }

    /// Read a CSV file; the file stem becomes the source id
    pub fn from_csv_path(path: &Path) -> Result<Self, SourceError> {
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let file = std::fs::File::open(path).map_err(|e| SourceError::read(&id, e))?;
        Self::from_csv_reader(id, file)
    }

    /// Read CSV data with a header row. Comma and semicolon delimiters are
    /// both common in spreadsheet exports; the header decides which is used.
    pub fn from_csv_reader(
        id: impl Into<String>,
        mut reader: impl Read,
    ) -> Result<Self, SourceError> {
        let id = id.into();
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| SourceError::read(&id, e))?;

        let header_line = data.split(|b| *b == b'\n').next().unwrap_or_default();
        let semicolons = header_line.iter().filter(|b| **b == b';').count();
        let commas = header_line.iter().filter(|b| **b == b',').count();
        let delimiter = if semicolons > commas { b';' } else { b',' };

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(data.as_slice());

        let columns: Vec<String> = csv_reader
            .headers()
            .map_err(|e| SourceError::read(&id, e))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        if columns.iter().all(|c| c.is_empty()) {
            return Err(SourceError::NoHeader { source_id: id });
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record.map_err(|e| SourceError::read(&id, e))?;
            let mut row = RawRecord::new();
            for (column, value) in columns.iter().zip(record.iter()) {
                row.insert(column.clone(), value);
            }
            rows.push(row);
        }

        Ok(Self { id, columns, rows })
    }
}
