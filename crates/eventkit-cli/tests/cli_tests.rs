//! Integration tests for the eventkit CLI
//!
//! These tests invoke the actual eventkit-cli binary and verify:
//! - Exit codes (0 = success, 1 = schema/validation failure, 2 = error)
//! - stdout/stderr output
//! - JSON output format
//! - Files written (and not written) by each command

use std::fs;
use std::path::PathBuf;
use std::process::Command;

// ── Helpers ───────────────────────────────────────────────

fn eventkit_bin() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_BIN_EXE_eventkit-cli"));
    if !path.exists() {
        path = PathBuf::from("target/debug/eventkit-cli");
    }
    path
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(format!("../../tests/fixtures/{}", name))
}

fn run_eventkit(args: &[&str]) -> std::process::Output {
    Command::new(eventkit_bin())
        .args(args)
        .arg("--no-color")
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute eventkit-cli")
}

fn path_str(p: &std::path::Path) -> &str {
    p.to_str().unwrap()
}

// ── Version ───────────────────────────────────────────────

#[test]
fn test_version_command() {
    let output = run_eventkit(&["version"]);
    assert!(output.status.success(), "version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("eventkit"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_flag() {
    let output = Command::new(eventkit_bin())
        .arg("--version")
        .output()
        .expect("failed to execute eventkit-cli");
    assert!(output.status.success(), "--version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

// ── Normalize ─────────────────────────────────────────────

#[test]
fn test_normalize_prints_canonical_codes() {
    let output = run_eventkit(&["normalize", "037833100", "ab1234 0", "12-34"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines, vec!["03783310", "AB123400", "-"]);
}

#[test]
fn test_normalize_requires_input() {
    let output = run_eventkit(&["normalize"]);
    assert!(!output.status.success(), "missing args should fail");
}

// ── Clean CUSIPs ──────────────────────────────────────────

#[test]
fn test_clean_cusips_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.csv");
    let output = run_eventkit(&["clean-cusips", path_str(&fixture("cusips.csv")), path_str(&out)]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Processed 4 records with clean CUSIPs"));
    assert!(stdout.contains("Clean CUSIP file saved to:"));

    let written = fs::read_to_string(&out).unwrap();
    let lines: Vec<_> = written.lines().collect();
    assert_eq!(lines[0], "permno,cusip,name,cusip_clean");
    assert_eq!(lines[1], "10001,037833100,Apple,03783310");
    assert_eq!(lines[2], "10107,594918104,Microsoft,59491810");
    assert_eq!(lines[3], "10400,ab12340,Lowercase,AB123400");
    assert_eq!(lines[4], "10500,zz999999,Zed,ZZ999999");
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_clean_cusips_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.csv");
    let output = run_eventkit(&[
        "clean-cusips",
        "--json",
        path_str(&fixture("cusips.csv")),
        path_str(&out),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    assert_eq!(json["input_records"], 8);
    assert_eq!(json["dropped_invalid"], 2);
    assert_eq!(json["dropped_duplicate"], 2);
    assert_eq!(json["retained"], 4);
    assert_eq!(json["output_fingerprint"].as_str().unwrap().len(), 64);
}

#[test]
fn test_clean_cusips_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.csv");
    let output = run_eventkit(&["clean-cusips", path_str(&fixture("no_cusip.csv")), path_str(&out)]);
    assert_eq!(output.status.code(), Some(1), "schema error should exit 1");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
    assert!(stderr.contains("'cusip'"));
    assert!(!out.exists(), "no output should be written on schema error");
}

#[test]
fn test_clean_cusips_custom_column() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.csv");
    let output = run_eventkit(&[
        "clean-cusips",
        "--column",
        "ticker",
        "--output-column",
        "ticker_key",
        path_str(&fixture("no_cusip.csv")),
        path_str(&out),
    ]);
    assert!(output.status.success());
    // Tickers are shorter than six characters, so nothing survives
    let written = fs::read_to_string(&out).unwrap();
    assert_eq!(written.trim(), "permno,ticker,ticker_key");
}

#[test]
fn test_clean_cusips_nonexistent_input() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.csv");
    let output = run_eventkit(&["clean-cusips", "nonexistent.csv", path_str(&out)]);
    assert_eq!(output.status.code(), Some(2), "missing file should exit 2");
    assert!(!out.exists());
}

#[test]
fn test_clean_cusips_unwritable_output() {
    let output = run_eventkit(&[
        "clean-cusips",
        path_str(&fixture("cusips.csv")),
        "/nonexistent-dir/sub/clean.csv",
    ]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_clean_cusips_rerun_identical() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    run_eventkit(&["clean-cusips", path_str(&fixture("cusips.csv")), path_str(&a)]);
    run_eventkit(&["clean-cusips", path_str(&fixture("cusips.csv")), path_str(&b)]);
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn test_clean_cusips_quiet() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("clean.csv");
    let output = run_eventkit(&[
        "--quiet",
        "clean-cusips",
        path_str(&fixture("cusips.csv")),
        path_str(&out),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty(), "quiet mode should produce no stdout");
    assert!(out.exists());
}

// ── Examine ───────────────────────────────────────────────

#[test]
fn test_examine_prints_sections_and_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("reports/structure.txt");
    let output = run_eventkit(&[
        "examine",
        path_str(&fixture("events.csv")),
        "--report",
        path_str(&report),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Dataset Overview ==="));
    assert!(stdout.contains("Shape: 8 rows × 6 columns"));
    assert!(stdout.contains("=== Summary Statistics ==="));
    assert!(stdout.contains("Found potential event study variables:"));
    assert!(stdout.contains("Summary saved to:"));

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("Dataset Structure Summary"));
    assert!(text.contains(" 3. event_date (text)"));
    assert!(text.contains("  - stock_return"));
}

#[test]
fn test_examine_json_output() {
    let output = run_eventkit(&["examine", "--json", "--no-report", path_str(&fixture("events.csv"))]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    assert_eq!(json["rows"], 8);
    assert_eq!(json["columns"].as_array().unwrap().len(), 6);
    assert_eq!(json["columns"][2]["kind"], "text");
    assert_eq!(json["sample"].as_array().unwrap().len(), 5);
}

#[test]
fn test_examine_nonexistent_file() {
    let output = run_eventkit(&["examine", "--no-report", "nonexistent.csv"]);
    assert_eq!(output.status.code(), Some(2));
}

// ── Validate ──────────────────────────────────────────────

#[test]
fn test_validate_clean_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("validation.txt");
    let output = run_eventkit(&[
        "validate",
        "--strict",
        path_str(&fixture("events.csv")),
        "--report",
        path_str(&report),
    ]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Found firm_id: firm_id"));
    assert!(stdout.contains("✓ String dates appear valid"));
    assert!(stdout.contains("✓ No duplicate firm-date observations"));
    assert!(stdout.contains("Complete variables: 2/6"));

    let text = fs::read_to_string(&report).unwrap();
    assert!(text.starts_with("Data Validation Report"));
    assert!(text.contains("Validation Date: "));
    assert!(text.contains("- Unique firms: 3"));
}

#[test]
fn test_validate_duplicates_non_strict_succeeds() {
    let output = run_eventkit(&["validate", "--no-report", path_str(&fixture("duplicate_panel.csv"))]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Duplicate firm-date observations: 1"));
}

#[test]
fn test_validate_strict_fails_on_duplicates() {
    let output = run_eventkit(&[
        "validate",
        "--strict",
        "--no-report",
        path_str(&fixture("duplicate_panel.csv")),
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_validate_strict_fails_on_bad_dates() {
    let output = run_eventkit(&[
        "validate",
        "--strict",
        "--no-report",
        path_str(&fixture("bad_dates.csv")),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✗ Cannot parse string dates"));
}

#[test]
fn test_validate_json_output() {
    let output = run_eventkit(&[
        "validate",
        "--json",
        "--no-report",
        path_str(&fixture("duplicate_panel.csv")),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("should be valid JSON");
    assert_eq!(json["panel"]["duplicate_obs"], 1);
    assert_eq!(json["returns"][0]["distribution"]["extreme_low"], 1);
    assert_eq!(json["returns"][0]["distribution"]["extreme_high"], 1);
}

#[test]
fn test_validate_with_config() {
    let output = run_eventkit(&[
        "validate",
        "--json",
        "--no-report",
        "--config",
        path_str(&fixture("thresholds.json")),
        path_str(&fixture("duplicate_panel.csv")),
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["required"].as_array().unwrap().len(), 2);
    assert_eq!(json["returns"][0]["distribution"]["extreme_low"], 1);
    assert_eq!(json["returns"][0]["distribution"]["extreme_high"], 1);
}

#[test]
fn test_validate_bad_config() {
    let output = run_eventkit(&[
        "validate",
        "--no-report",
        "--config",
        path_str(&fixture("bad_config.json")),
        path_str(&fixture("events.csv")),
    ]);
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration error"));
}

#[test]
fn test_validate_nonexistent_file() {
    let output = run_eventkit(&["validate", "--no-report", "nonexistent.csv"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_cli_validate_determinism_100_iterations() {
    let first = run_eventkit(&[
        "validate",
        "--json",
        "--no-report",
        path_str(&fixture("events.csv")),
    ]);
    for i in 0..100 {
        let output = run_eventkit(&[
            "validate",
            "--json",
            "--no-report",
            path_str(&fixture("events.csv")),
        ]);
        assert_eq!(first.stdout, output.stdout, "Non-determinism at iteration {}", i);
    }
}
