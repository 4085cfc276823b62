//! CUSIP file cleaning — normalize, drop, deduplicate, write
//!
//! Pipeline: `read CSV → check schema → normalize → drop absent → drop duplicates → write CSV`
//!
//! A missing identifier column aborts before anything is written. Individual
//! records that cannot be normalized are dropped without error. Running the
//! pipeline twice on the same input produces byte-identical output.

use std::path::Path;

use crate::dataset::{is_missing, Dataset};
use crate::dedup;
use crate::{Error, Result};

/// Column names used by the cleaning pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanOptions {
    /// Column holding raw identifiers
    pub column: String,
    /// Column receiving the canonical identifier (replaced if it exists)
    pub output_column: String,
}

impl Default for CleanOptions {
    fn default() -> Self {
        Self {
            column: "cusip".to_string(),
            output_column: "cusip_clean".to_string(),
        }
    }
}

/// Record counts from one cleaning run
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CleanStats {
    pub input_records: usize,
    pub dropped_invalid: usize,
    pub dropped_duplicate: usize,
    pub retained: usize,
    /// SHA-256 of the written CSV
    pub output_fingerprint: String,
}

/// Cleaned dataset plus the counts that produced it
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    pub dataset: Dataset,
    pub stats: CleanStats,
}

/// Clean an in-memory dataset
///
/// # Errors
/// Returns `SchemaError` if `options.column` is not in the header.
pub fn clean_dataset(dataset: Dataset, options: &CleanOptions) -> Result<CleanOutcome> {
    let idx = dataset
        .column_index(&options.column)
        .ok_or_else(|| Error::SchemaError {
            column: options.column.clone(),
            available: dataset.headers().to_vec(),
        })?;

    let input_records = dataset.n_rows();
    let (mut headers, rows) = dataset.into_parts();

    let keyed = dedup::normalize_all(rows, |row| {
        let cell = row[idx].as_str();
        (!is_missing(cell)).then_some(cell)
    });
    let present = dedup::drop_absent(keyed);
    let present_count = present.len();
    let unique = dedup::drop_duplicates(present);
    let retained = unique.len();

    let out_idx = headers.iter().position(|h| h == &options.output_column);
    if out_idx.is_none() {
        headers.push(options.output_column.clone());
    }
    let rows = unique
        .into_iter()
        .map(|(cusip, mut row)| {
            match out_idx {
                Some(i) => row[i] = cusip.into_string(),
                None => row.push(cusip.into_string()),
            }
            row
        })
        .collect();

    let dataset = Dataset::new(headers, rows);
    let stats = CleanStats {
        input_records,
        dropped_invalid: input_records - present_count,
        dropped_duplicate: present_count - retained,
        retained,
        output_fingerprint: dataset.fingerprint().to_string(),
    };
    tracing::debug!(
        dropped_invalid = stats.dropped_invalid,
        dropped_duplicate = stats.dropped_duplicate,
        "filtered records"
    );

    Ok(CleanOutcome { dataset, stats })
}

/// Clean a CSV file and write the result
///
/// # Errors
/// `IoError` if the input can't be read or the output can't be written,
/// `CsvError` for malformed input, `SchemaError` for a missing identifier
/// column. No output file is written on any error before the write step.
pub fn clean_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    options: &CleanOptions,
) -> Result<CleanStats> {
    let input = input.as_ref();
    let output = output.as_ref();

    let dataset = Dataset::from_path(input)?;
    let outcome = clean_dataset(dataset, options)?;
    tracing::info!(
        retained = outcome.stats.retained,
        input = %input.display(),
        "Processed {} records with clean CUSIPs",
        outcome.stats.retained
    );

    outcome.dataset.write_path(output)?;
    tracing::info!(output = %output.display(), "clean CUSIP file saved");
    Ok(outcome.stats)
}
