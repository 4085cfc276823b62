//! Console rendering of examination and validation results

use colored::Colorize;

use eventkit_core::examine::StructureSummary;
use eventkit_core::report::thousands;
use eventkit_core::stats::Summary;
use eventkit_core::validate::{DateFormat, ValidationReport};

fn heading(title: &str) {
    println!("{}", format!("=== {} ===", title).bold());
}

fn ok(msg: &str) -> String {
    format!("{} {}", "✓".green(), msg)
}

fn bad(msg: &str) -> String {
    format!("{} {}", "✗".red(), msg)
}

fn warn(msg: &str) -> String {
    format!("{} {}", "⚠".yellow(), msg)
}

fn fmt_std(summary: &Summary) -> String {
    summary
        .std
        .map(|s| format!("{:.4}", s))
        .unwrap_or_else(|| "NaN".to_string())
}

// ── examine ───────────────────────────────────────────────

pub fn print_structure(s: &StructureSummary) {
    heading("Dataset Overview");
    println!("File: {}", s.source);
    println!("Shape: {} rows × {} columns", thousands(s.rows), s.columns.len());
    println!();

    heading("Column Names");
    for (i, col) in s.columns.iter().enumerate() {
        println!("{:2}. {}", i + 1, col.name);
    }
    println!();

    heading("Data Types");
    for col in &s.columns {
        println!("{:<20} {}", col.name, col.kind);
    }
    println!();

    heading("Missing Values");
    for m in &s.missing {
        println!("{:<20} {:>6} ({:>5.1}%)", m.column, thousands(m.missing), m.percent);
    }
    println!();

    heading(&format!("Sample Data (First {} Rows)", s.sample.len()));
    print_table(&s.headers, &s.sample);
    println!();

    heading("Summary Statistics");
    if s.numeric.is_empty() {
        println!("No numeric columns found");
    } else {
        println!(
            "{:<20} {:>8} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "", "count", "mean", "std", "min", "25%", "50%", "75%", "max"
        );
        for n in &s.numeric {
            let m = &n.summary;
            println!(
                "{:<20} {:>8} {:>12.4} {:>12} {:>12.4} {:>12.4} {:>12.4} {:>12.4} {:>12.4}",
                n.column,
                m.count,
                m.mean,
                fmt_std(m),
                m.min,
                m.q25,
                m.median,
                m.q75,
                m.max
            );
        }
    }
    println!();

    heading("Unique Values in Key Columns");
    for k in s.id_columns.iter().chain(&s.date_columns) {
        println!("{:<20} {:>6} unique values", k.column, thousands(k.unique));
        if !k.sample_values.is_empty() {
            println!("  Sample values: {:?}", k.sample_values);
        }
    }
    println!();

    heading("Potential Event Study Variables");
    if s.event_variables.is_empty() {
        println!("No obvious event study variables found");
    } else {
        println!("Found potential event study variables:");
        for var in &s.event_variables {
            println!("  - {}", var.column);
            if let Some(m) = &var.summary {
                println!("    Range: {:.4} to {:.4}", m.min, m.max);
                println!("    Mean: {:.4}, Std: {}", m.mean, fmt_std(m));
            }
        }
    }
    println!();
}

fn print_table(headers: &[String], rows: &[Vec<String>]) {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:>w$}", c, w = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };
    println!("{}", line(headers));
    for row in rows {
        println!("{}", line(row.as_slice()));
    }
}

// ── validate ──────────────────────────────────────────────

pub fn print_validation(r: &ValidationReport) {
    heading("Event Study Data Validation");
    println!("Dataset: {}", r.source);
    println!("Shape: {} rows × {} columns", thousands(r.rows), r.cols);
    println!();

    heading("Required Variable Check");
    for check in &r.required {
        if let Some(col) = &check.matched {
            println!("{}", ok(&format!("Found {}: {}", check.variable, col)));
        }
    }
    let missing = r.missing_required();
    if !missing.is_empty() {
        println!("{}", bad(&format!("Missing required variables: {:?}", missing)));
    }
    println!();

    heading("Date Validation");
    for d in &r.dates {
        println!("Checking {}:", d.column);
        let line = match d.format {
            DateFormat::Numeric => ok("Numeric date format"),
            DateFormat::Parsable => ok("String dates appear valid"),
            DateFormat::Unparsable => bad("Cannot parse string dates"),
        };
        println!("  {}", line);
        if d.missing > 0 {
            let msg = format!(
                "{} missing dates ({:.1}%)",
                thousands(d.missing),
                d.missing_percent
            );
            println!("  {}", warn(&msg));
        } else {
            println!("  {}", ok("No missing dates"));
        }
    }
    println!();

    heading("Return Data Validation");
    for ret in &r.returns {
        println!("Checking {}:", ret.column);
        println!(
            "  Missing values: {} ({:.1}%)",
            thousands(ret.missing),
            ret.missing_percent
        );
        if let Some(dist) = &ret.distribution {
            println!("  Extreme returns (low): {}", thousands(dist.extreme_low));
            println!("  Extreme returns (high): {}", thousands(dist.extreme_high));
            if let Some(m) = &dist.summary {
                println!("  Mean: {:.4}", m.mean);
                println!("  Std Dev: {}", fmt_std(m));
                println!("  Range: {:.4} to {:.4}", m.min, m.max);
            }
        }
    }
    println!();

    heading("Firm Identifier Validation");
    for id in &r.identifiers {
        println!("Checking {}:", id.column);
        println!("  Unique values: {}", thousands(id.unique));
        if let Some(avg) = id.obs_per_firm {
            println!("  Obs per firm (avg): {:.1}", avg);
        }
        if id.missing > 0 {
            println!("  {}", warn(&format!("Missing IDs: {}", thousands(id.missing))));
        } else {
            println!("  {}", ok("No missing IDs"));
        }
    }
    println!();

    heading("Panel Structure Validation");
    if let Some(panel) = &r.panel {
        if panel.duplicate_obs > 0 {
            let msg = format!(
                "Duplicate firm-date observations: {}",
                thousands(panel.duplicate_obs)
            );
            println!("  {}", warn(&msg));
        } else {
            println!("  {}", ok("No duplicate firm-date observations"));
        }
        if let Some(len) = &panel.series_length {
            println!(
                "  Time series length - Mean: {:.1}, Median: {:.1}",
                len.mean, len.median
            );
            println!("  Min length: {}, Max length: {}", len.min, len.max);
        }
    }
    println!();

    heading("Data Completeness Summary");
    println!("Variables with missing data:");
    for m in &r.completeness.missing {
        println!("  {:<20} {:>6} ({:>5.1}%)", m.column, thousands(m.missing), m.percent);
    }
    println!();
    println!(
        "Complete variables: {}/{}",
        r.completeness.complete_vars, r.completeness.total_vars
    );
    println!();
}
