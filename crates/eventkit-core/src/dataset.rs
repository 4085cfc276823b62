//! Tabular dataset — CSV-backed rows of raw cell text
//!
//! Cells are kept as the text found in the source file so that a cleaned
//! file can be written back with every original field intact. Typed views
//! (numeric values, inferred column kinds) are computed on demand.

use std::collections::HashSet;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Cell texts treated as missing values (after trimming)
pub const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None", "."];

/// True if a cell holds a missing value
pub fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// Inferred storage kind of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// Missing-value count for one column
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MissingInfo {
    pub column: String,
    pub missing: usize,
    pub percent: f64,
}

/// An in-memory table with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    fingerprint: String,
}

impl Dataset {
    /// Build a dataset from headers and rows; short rows are padded with empty cells
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        let mut ds = Self {
            headers,
            rows,
            fingerprint: String::new(),
        };
        ds.fingerprint = fingerprint(&ds.to_csv_bytes().unwrap_or_default());
        ds
    }

    /// Read a CSV file with a header row
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read dataset");
        Self::from_reader(bytes.as_slice())
    }

    /// Read CSV with a header row from any reader
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| Error::IoError(e.to_string()))?;

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(Error::CsvError("input has no header row".to_string()));
        }

        let width = headers.len();
        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() > width {
                return Err(Error::CsvError(format!(
                    "record {} has {} fields, but the header has {}",
                    i + 1,
                    record.len(),
                    width
                )));
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        Ok(Self {
            headers,
            rows,
            fingerprint: fingerprint(&bytes),
        })
    }

    /// Write as CSV with a header row
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush().map_err(|e| Error::IoError(e.to_string()))?;
        Ok(())
    }

    /// Write as a CSV file, replacing any existing file
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_csv_bytes()?;
        fs::write(path, bytes).map_err(|e| Error::io(path, e))
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    // ── Shape and access ───────────────────────────────────

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.headers.len()
    }

    /// SHA-256 (hex) of the bytes this dataset was read from
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Index of the column with exactly this name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of one column; missing values are `None`
    pub fn column(&self, idx: usize) -> impl Iterator<Item = Option<&str>> + '_ {
        self.rows.iter().map(move |row| {
            let cell = row[idx].as_str();
            if is_missing(cell) {
                None
            } else {
                Some(cell)
            }
        })
    }

    /// Columns whose lowercase name contains any keyword, in header order
    pub fn columns_matching(&self, keywords: &[&str]) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(_, h)| {
                let lower = h.to_lowercase();
                keywords.iter().any(|k| lower.contains(k))
            })
            .map(|(i, _)| i)
            .collect()
    }

    pub fn missing_count(&self, idx: usize) -> usize {
        self.column(idx).filter(Option::is_none).count()
    }

    /// Missing counts for every column, in header order
    pub fn missing_by_column(&self) -> Vec<MissingInfo> {
        (0..self.n_cols())
            .map(|idx| {
                let missing = self.missing_count(idx);
                MissingInfo {
                    column: self.headers[idx].clone(),
                    missing,
                    percent: crate::stats::percent(missing, self.n_rows()),
                }
            })
            .collect()
    }

    /// Distinct present values; missing cells are not counted
    pub fn unique_count(&self, idx: usize) -> usize {
        self.column(idx).flatten().collect::<HashSet<_>>().len()
    }

    /// Infer the column kind from its present cells
    ///
    /// A column with no present cells is `Float`, the way statistics
    /// packages load an all-missing column.
    pub fn column_kind(&self, idx: usize) -> ColumnKind {
        let mut kind = ColumnKind::Float;
        let mut any = false;
        for cell in self.column(idx).flatten() {
            let cell = cell.trim();
            if cell.parse::<i64>().is_ok() {
                if !any {
                    kind = ColumnKind::Integer;
                }
            } else if cell.parse::<f64>().is_ok() {
                kind = ColumnKind::Float;
            } else {
                return ColumnKind::Text;
            }
            any = true;
        }
        kind
    }

    /// Present numeric values of a column (unparsable cells are skipped)
    pub fn numeric_values(&self, idx: usize) -> Vec<f64> {
        self.column(idx)
            .flatten()
            .filter_map(|c| c.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .collect()
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

}

/// Hex SHA-256 of a byte slice
pub fn fingerprint(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
