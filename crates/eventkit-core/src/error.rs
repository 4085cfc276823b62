//! Error types for eventkit
//!
//! All fallible operations return `Result<T, Error>`.
//! Per-record normalization failures are not errors: those records are
//! dropped by the filtering passes and never surface here.

use thiserror::Error;

/// eventkit error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Required column absent from the input header
    #[error("Schema error: no '{}' column found in input (available: {})", .column, .available.join(", "))]
    SchemaError {
        column: String,
        available: Vec<String>,
    },

    /// Input unreadable or output unwritable
    #[error("I/O error: {0}")]
    IoError(String),

    /// Malformed CSV content
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Raw identifier has no canonical form
    #[error("Normalization error: {0}")]
    NormalizationError(String),

    /// Invalid configuration file or value
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    pub(crate) fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        Error::IoError(format!("{}: {}", path.display(), err))
    }

    /// Fatal schema problems, as opposed to environment problems (I/O, CSV, config)
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::SchemaError { .. })
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::Io(io) => Error::IoError(io.to_string()),
            _ => Error::CsvError(err.to_string()),
        }
    }
}

/// Result type alias for eventkit operations
pub type Result<T> = std::result::Result<T, Error>;
