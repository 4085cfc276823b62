//! Report output helpers

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Default location of the structure summary report
pub const DEFAULT_STRUCTURE_REPORT: &str = "data/processed/dataset_structure_summary.txt";

/// Default location of the validation report
pub const DEFAULT_VALIDATION_REPORT: &str = "data/processed/data_validation_report.txt";

/// Write a text report, creating parent directories as needed
pub fn write_report(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| Error::io(path, e))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}

/// Format an integer with comma thousands separators
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
