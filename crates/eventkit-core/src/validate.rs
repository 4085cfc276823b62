//! Event-study dataset validator — required variables, dates, returns, identifiers, panel
//!
//! The validator accumulates findings rather than stopping at the first
//! problem, so one run gives a complete picture of the dataset.
//!
//! # Checks
//!
//! 1. **Required variables** — each configured name matches some column
//! 2. **Dates** — `date` columns are numeric or parse as calendar dates
//! 3. **Returns** — missing share and extreme values of return columns
//! 4. **Identifiers** — cardinality and missing firm identifiers
//! 5. **Panel structure** — duplicate firm-date rows, time-series lengths
//! 6. **Completeness** — missing values per column

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};

use crate::dataset::{ColumnKind, Dataset, MissingInfo};
use crate::report::thousands;
use crate::stats::{self, Summary};
use crate::{Error, Result};

const RETURN_KEYWORDS: &[&str] = &["ret", "return"];
const RETURN_EXCLUDE: &str = "abnormal";
const IDENTIFIER_KEYWORDS: &[&str] = &["id", "permno", "gvkey", "cusip"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d%b%Y", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ── Configuration ─────────────────────────────────────────

/// Validation thresholds and required variables
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Substrings that must each match at least one column name
    pub required_vars: Vec<String>,
    /// Returns below this are extreme (-0.5 = -50%)
    pub extreme_low: f64,
    /// Returns above this are extreme (2.0 = +200%)
    pub extreme_high: f64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            required_vars: vec![
                "firm_id".to_string(),
                "event_date".to_string(),
                "stock_return".to_string(),
            ],
            extreme_low: -0.5,
            extreme_high: 2.0,
        }
    }
}

impl ValidationConfig {
    /// Parse a JSON config; omitted keys keep their defaults
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| Error::ConfigError(e.to_string()))?;
        if config.extreme_low >= config.extreme_high {
            return Err(Error::ConfigError(format!(
                "extreme_low ({}) must be below extreme_high ({})",
                config.extreme_low, config.extreme_high
            )));
        }
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&text)
    }
}

// ── Findings ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RequiredCheck {
    pub variable: String,
    /// First column whose name contains the variable
    pub matched: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    Numeric,
    Parsable,
    Unparsable,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct DateCheck {
    pub column: String,
    pub format: DateFormat,
    pub missing: usize,
    pub missing_percent: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReturnDistribution {
    pub extreme_low: usize,
    pub extreme_high: usize,
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReturnCheck {
    pub column: String,
    pub missing: usize,
    pub missing_percent: f64,
    /// Only for numeric columns
    pub distribution: Option<ReturnDistribution>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct IdentifierCheck {
    pub column: String,
    pub unique: usize,
    /// Average observations per distinct identifier
    pub obs_per_firm: Option<f64>,
    pub missing: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PanelCheck {
    pub id_column: String,
    pub date_column: String,
    /// Rows repeating an earlier (id, date) pair
    pub duplicate_obs: usize,
    /// Observations per firm; `None` when every identifier is missing
    pub series_length: Option<SeriesLength>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SeriesLength {
    pub mean: f64,
    pub median: f64,
    pub min: usize,
    pub max: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Completeness {
    /// Columns with missing values, most missing first
    pub missing: Vec<MissingInfo>,
    pub complete_vars: usize,
    pub total_vars: usize,
}

/// All validation findings for one dataset
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationReport {
    pub source: String,
    pub fingerprint: String,
    pub rows: usize,
    pub cols: usize,
    pub required: Vec<RequiredCheck>,
    pub dates: Vec<DateCheck>,
    pub returns: Vec<ReturnCheck>,
    pub identifiers: Vec<IdentifierCheck>,
    pub panel: Option<PanelCheck>,
    pub completeness: Completeness,
}

impl ValidationReport {
    /// Required variables with no matching column
    pub fn missing_required(&self) -> Vec<&str> {
        self.required
            .iter()
            .filter(|r| r.matched.is_none())
            .map(|r| r.variable.as_str())
            .collect()
    }

    /// True if the dataset has problems that block an event study
    ///
    /// Missing required variables, unparsable dates, and duplicate firm-date
    /// observations are errors; missing values and extreme returns are not.
    pub fn has_errors(&self) -> bool {
        !self.missing_required().is_empty()
            || self.dates.iter().any(|d| d.format == DateFormat::Unparsable)
            || self.panel.as_ref().is_some_and(|p| p.duplicate_obs > 0)
    }
}

// ── Validation ────────────────────────────────────────────

/// Run every check against a dataset; `source` labels it in output
pub fn validate(dataset: &Dataset, config: &ValidationConfig, source: &str) -> ValidationReport {
    let rows = dataset.n_rows();
    let name = |i: usize| dataset.headers()[i].clone();

    // ── Check 1: Required variables ────────────────────
    let required = config
        .required_vars
        .iter()
        .map(|var| RequiredCheck {
            variable: var.clone(),
            matched: dataset
                .columns_matching(&[var.to_lowercase().as_str()])
                .first()
                .map(|&i| name(i)),
        })
        .collect();

    // ── Check 2: Dates ─────────────────────────────────
    let date_cols = dataset.columns_matching(&["date"]);
    let dates = date_cols
        .iter()
        .map(|&i| {
            let missing = dataset.missing_count(i);
            DateCheck {
                column: name(i),
                format: date_format(dataset, i),
                missing,
                missing_percent: stats::percent(missing, rows),
            }
        })
        .collect();

    // ── Check 3: Returns ───────────────────────────────
    let returns = dataset
        .columns_matching(RETURN_KEYWORDS)
        .into_iter()
        .filter(|&i| !dataset.headers()[i].to_lowercase().contains(RETURN_EXCLUDE))
        .map(|i| {
            let missing = dataset.missing_count(i);
            let distribution = dataset.column_kind(i).is_numeric().then(|| {
                let values = dataset.numeric_values(i);
                ReturnDistribution {
                    extreme_low: values.iter().filter(|&&v| v < config.extreme_low).count(),
                    extreme_high: values.iter().filter(|&&v| v > config.extreme_high).count(),
                    summary: Summary::of(&values),
                }
            });
            ReturnCheck {
                column: name(i),
                missing,
                missing_percent: stats::percent(missing, rows),
                distribution,
            }
        })
        .collect();

    // ── Check 4: Identifiers ───────────────────────────
    let id_cols = dataset.columns_matching(IDENTIFIER_KEYWORDS);
    let identifiers = id_cols
        .iter()
        .map(|&i| {
            let unique = dataset.unique_count(i);
            IdentifierCheck {
                column: name(i),
                unique,
                obs_per_firm: (unique > 0).then(|| rows as f64 / unique as f64),
                missing: dataset.missing_count(i),
            }
        })
        .collect();

    // ── Check 5: Panel structure ───────────────────────
    let panel = match (id_cols.first(), date_cols.first()) {
        (Some(&id), Some(&date)) => Some(panel_check(dataset, id, date)),
        _ => None,
    };

    // ── Check 6: Completeness ──────────────────────────
    let mut missing = dataset.missing_by_column();
    let complete_vars = missing.iter().filter(|m| m.missing == 0).count();
    missing.retain(|m| m.missing > 0);
    missing.sort_by(|a, b| b.missing.cmp(&a.missing));

    tracing::debug!(source, rows, cols = dataset.n_cols(), "validated dataset");

    ValidationReport {
        source: source.to_string(),
        fingerprint: dataset.fingerprint().to_string(),
        rows,
        cols: dataset.n_cols(),
        required,
        dates,
        returns,
        identifiers,
        panel,
        completeness: Completeness {
            missing,
            complete_vars,
            total_vars: dataset.n_cols(),
        },
    }
}

/// Classify a date column: numeric, or text that does or doesn't parse
fn date_format(dataset: &Dataset, idx: usize) -> DateFormat {
    if dataset.column_kind(idx) != ColumnKind::Text {
        return DateFormat::Numeric;
    }
    match dataset.column(idx).flatten().find(|v| !parses_as_date(v)) {
        Some(bad) => {
            tracing::warn!(column = %dataset.headers()[idx], value = bad, "unparsable date");
            DateFormat::Unparsable
        }
        None => DateFormat::Parsable,
    }
}

/// True if `text` is a calendar date or timestamp in a recognized layout
pub fn parses_as_date(text: &str) -> bool {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(text, f).is_ok())
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(text, f).is_ok())
        || DateTime::parse_from_rfc3339(text).is_ok()
}

fn panel_check(dataset: &Dataset, id: usize, date: usize) -> PanelCheck {
    let mut seen = HashSet::new();
    let mut duplicate_obs = 0;
    let mut per_firm: HashMap<&str, usize> = HashMap::new();

    for (firm, day) in dataset.column(id).zip(dataset.column(date)) {
        if !seen.insert((firm, day)) {
            duplicate_obs += 1;
        }
        if let Some(firm) = firm {
            *per_firm.entry(firm).or_default() += 1;
        }
    }

    let lengths: Vec<usize> = per_firm.into_values().collect();
    let series_length = stats::median_of_counts(&lengths).map(|median| SeriesLength {
        mean: lengths.iter().sum::<usize>() as f64 / lengths.len() as f64,
        median,
        min: lengths.iter().copied().min().unwrap_or(0),
        max: lengths.iter().copied().max().unwrap_or(0),
    });

    PanelCheck {
        id_column: dataset.headers()[id].clone(),
        date_column: dataset.headers()[date].clone(),
        duplicate_obs,
        series_length,
    }
}

// ── Report ────────────────────────────────────────────────

/// Render the saved validation report
pub fn render_report(report: &ValidationReport, validated_at: &DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("Data Validation Report\n");
    out.push_str("=====================\n\n");
    out.push_str(&format!("File: {}\n", report.source));
    out.push_str(&format!(
        "Validation Date: {}\n",
        validated_at.format("%Y-%m-%d %H:%M:%S")
    ));
    out.push_str(&format!(
        "Shape: {} rows × {} columns\n",
        thousands(report.rows),
        report.cols
    ));
    out.push_str(&format!("SHA-256: {}\n\n", report.fingerprint));

    out.push_str("Data Quality Summary:\n");
    out.push_str(&format!(
        "- Complete variables: {}/{}\n",
        report.completeness.complete_vars, report.completeness.total_vars
    ));
    if let Some(first) = report.identifiers.first() {
        out.push_str(&format!("- Unique firms: {}\n", thousands(first.unique)));
    }
    if let Some(panel) = report.panel.as_ref().filter(|p| p.duplicate_obs > 0) {
        out.push_str(&format!(
            "- Duplicate observations: {}\n",
            thousands(panel.duplicate_obs)
        ));
    }
    let missing_required = report.missing_required();
    if !missing_required.is_empty() {
        out.push_str(&format!(
            "- Missing required variables: {}\n",
            missing_required.join(", ")
        ));
    }

    out.push_str("\nVariables with missing data:\n");
    for m in &report.completeness.missing {
        out.push_str(&format!(
            "  {}: {} ({:.1}%)\n",
            m.column,
            thousands(m.missing),
            m.percent
        ));
    }
    out
}
