//! Dataset structure examination
//!
//! Describes a dataset before any cleaning: shape, column kinds, missing
//! values, a sample of rows, numeric summaries, likely identifier and date
//! columns, and columns that look like event-study variables.
//!
//! Column discovery is by case-insensitive substring match on the header,
//! so `"ar"` also matches `"year"` or `"market_cap"`. The listing is a hint
//! for a human, not a schema.

use std::collections::HashSet;

use crate::dataset::{ColumnKind, Dataset, MissingInfo};
use crate::report::thousands;
use crate::stats::Summary;

pub const ID_KEYWORDS: &[&str] = &["id", "permno", "gvkey", "cusip", "ticker", "symbol"];
pub const DATE_KEYWORDS: &[&str] = &["date", "time", "year", "month", "day"];
pub const EVENT_KEYWORDS: &[&str] = &[
    "ret", "return", "price", "prc", "event", "announce", "car", "ar", "abnormal",
];

const SAMPLE_ROWS: usize = 5;
const KEY_COLUMN_LIMIT: usize = 5;
const SAMPLE_VALUES: usize = 3;

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ColumnInfo {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub summary: Summary,
}

/// An identifier- or date-like column and its cardinality
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct KeyColumn {
    pub column: String,
    pub unique: usize,
    /// Up to three distinct values, only for text date columns
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sample_values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EventVariable {
    pub column: String,
    /// Present for numeric columns with at least one value
    pub summary: Option<Summary>,
}

/// Everything learned about a dataset's structure
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StructureSummary {
    pub source: String,
    pub fingerprint: String,
    pub rows: usize,
    pub columns: Vec<ColumnInfo>,
    /// Only columns with at least one missing value
    pub missing: Vec<MissingInfo>,
    pub headers: Vec<String>,
    pub sample: Vec<Vec<String>>,
    pub numeric: Vec<NumericSummary>,
    pub id_columns: Vec<KeyColumn>,
    pub date_columns: Vec<KeyColumn>,
    pub event_variables: Vec<EventVariable>,
}

/// Examine a dataset; `source` labels it in output
pub fn examine(dataset: &Dataset, source: &str) -> StructureSummary {
    let kinds: Vec<ColumnKind> = (0..dataset.n_cols())
        .map(|i| dataset.column_kind(i))
        .collect();
    let name = |i: usize| dataset.headers()[i].clone();

    let columns = kinds
        .iter()
        .enumerate()
        .map(|(i, &kind)| ColumnInfo { name: name(i), kind })
        .collect();

    let missing = dataset
        .missing_by_column()
        .into_iter()
        .filter(|m| m.missing > 0)
        .collect();

    let numeric = (0..dataset.n_cols())
        .filter(|&i| kinds[i].is_numeric())
        .filter_map(|i| {
            Summary::of(&dataset.numeric_values(i)).map(|summary| NumericSummary {
                column: name(i),
                summary,
            })
        })
        .collect();

    let id_columns = dataset
        .columns_matching(ID_KEYWORDS)
        .into_iter()
        .take(KEY_COLUMN_LIMIT)
        .map(|i| KeyColumn {
            column: name(i),
            unique: dataset.unique_count(i),
            sample_values: Vec::new(),
        })
        .collect();

    let date_columns = dataset
        .columns_matching(DATE_KEYWORDS)
        .into_iter()
        .take(KEY_COLUMN_LIMIT)
        .map(|i| KeyColumn {
            column: name(i),
            unique: dataset.unique_count(i),
            sample_values: if kinds[i] == ColumnKind::Text {
                distinct_values(dataset, i, SAMPLE_VALUES)
            } else {
                Vec::new()
            },
        })
        .collect();

    let event_variables = dataset
        .columns_matching(EVENT_KEYWORDS)
        .into_iter()
        .map(|i| EventVariable {
            column: name(i),
            summary: if kinds[i].is_numeric() {
                Summary::of(&dataset.numeric_values(i))
            } else {
                None
            },
        })
        .collect();

    tracing::debug!(source, rows = dataset.n_rows(), cols = dataset.n_cols(), "examined dataset");

    StructureSummary {
        source: source.to_string(),
        fingerprint: dataset.fingerprint().to_string(),
        rows: dataset.n_rows(),
        columns,
        missing,
        headers: dataset.headers().to_vec(),
        sample: dataset.head(SAMPLE_ROWS).to_vec(),
        numeric,
        id_columns,
        date_columns,
        event_variables,
    }
}

/// First `limit` distinct present values, in order of appearance
fn distinct_values(dataset: &Dataset, idx: usize, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    dataset
        .column(idx)
        .flatten()
        .filter(|v| seen.insert(*v))
        .take(limit)
        .map(str::to_string)
        .collect()
}

/// Render the saved structure summary report
pub fn render_report(summary: &StructureSummary) -> String {
    let mut out = String::new();
    out.push_str("Dataset Structure Summary\n");
    out.push_str("========================\n\n");
    out.push_str(&format!("File: {}\n", summary.source));
    out.push_str(&format!(
        "Shape: {} rows × {} columns\n\n",
        thousands(summary.rows),
        summary.columns.len()
    ));

    out.push_str("Columns:\n");
    for (i, col) in summary.columns.iter().enumerate() {
        out.push_str(&format!("{:2}. {} ({})\n", i + 1, col.name, col.kind));
    }

    out.push_str("\nPotential Event Study Variables:\n");
    for var in &summary.event_variables {
        out.push_str(&format!("  - {}\n", var.column));
    }
    out
}
