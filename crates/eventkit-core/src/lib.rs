//! eventkit core — preparation and auditing of event-study datasets
//!
//! Normalizes CUSIP identifiers into a canonical merge key, and describes
//! and validates the tabular datasets they live in.
//!
//! # Architecture
//!
//! ```text
//! CSV → Dataset → cusip::normalize → dedup passes → Cleaned CSV
//!          ↓
//!       examine  → StructureSummary → report
//!          ↓
//!       validate → ValidationReport → report
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces identical output
//! - **Canonical**: every canonical CUSIP matches `[A-Z0-9]{8}`
//! - **Order preserving**: filtering keeps the first occurrence of each identifier
//! - **All or nothing**: schema errors abort before any output is written

pub mod cleaner;
pub mod cusip;
pub mod dataset;
pub mod dedup;
pub mod error;
pub mod examine;
pub mod report;
pub mod stats;
pub mod validate;

pub use cleaner::{clean_dataset, clean_file, CleanOptions, CleanOutcome, CleanStats};
pub use cusip::{normalize, Cusip};
pub use dataset::{ColumnKind, Dataset};
pub use error::{Error, Result};
pub use examine::{examine, StructureSummary};
pub use validate::{validate, ValidationConfig, ValidationReport};
