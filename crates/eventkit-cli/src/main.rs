mod console;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process;

use eventkit_core::report::{self, DEFAULT_STRUCTURE_REPORT, DEFAULT_VALIDATION_REPORT};
use eventkit_core::{cusip, examine, validate, CleanOptions, Dataset, Error, ValidationConfig};

/// eventkit — event study dataset preparation
///
/// Clean CUSIP identifiers, examine dataset structure, and validate data quality.
#[derive(Parser)]
#[command(name = "eventkit", version, about, long_about = None)]
struct Cli {
    /// Suppress normal output (errors still go to stderr)
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize CUSIPs in a CSV file, drop invalid and duplicate records
    CleanCusips {
        /// Input CSV file
        input: PathBuf,
        /// Output CSV file
        output: PathBuf,
        /// Column holding raw CUSIPs
        #[arg(long, default_value = "cusip")]
        column: String,
        /// Column receiving canonical CUSIPs
        #[arg(long, default_value = "cusip_clean")]
        output_column: String,
        /// Output counts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical form of one or more raw CUSIPs
    Normalize {
        /// Raw identifiers
        #[arg(required = true)]
        raw: Vec<String>,
    },

    /// Describe the structure of a dataset
    Examine {
        /// Path to CSV file
        file: PathBuf,
        /// Where to save the summary report
        #[arg(long, default_value = DEFAULT_STRUCTURE_REPORT, conflicts_with = "no_report")]
        report: PathBuf,
        /// Don't write a summary report
        #[arg(long)]
        no_report: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check data quality of an event study dataset
    Validate {
        /// Path to CSV file
        file: PathBuf,
        /// JSON file with validation thresholds
        #[arg(long)]
        config: Option<PathBuf>,
        /// Where to save the validation report
        #[arg(long, default_value = DEFAULT_VALIDATION_REPORT, conflicts_with = "no_report")]
        report: PathBuf,
        /// Don't write a validation report
        #[arg(long)]
        no_report: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
        /// Exit 1 if blocking problems are found
        #[arg(long)]
        strict: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    let quiet = cli.quiet;
    let exit_code = match cli.command {
        Commands::CleanCusips {
            input,
            output,
            column,
            output_column,
            json,
        } => cmd_clean(
            &input,
            &output,
            CleanOptions {
                column,
                output_column,
            },
            json,
            quiet,
        ),
        Commands::Normalize { raw } => cmd_normalize(&raw, quiet),
        Commands::Examine {
            file,
            report,
            no_report,
            json,
        } => cmd_examine(&file, (!no_report).then_some(report.as_path()), json, quiet),
        Commands::Validate {
            file,
            config,
            report,
            no_report,
            json,
            strict,
        } => cmd_validate(
            &file,
            config.as_deref(),
            (!no_report).then_some(report.as_path()),
            json,
            strict,
            quiet,
        ),
        Commands::Version => {
            if !quiet {
                println!(
                    "eventkit {} (eventkit-core {})",
                    env!("CARGO_PKG_VERSION"),
                    env!("CARGO_PKG_VERSION")
                );
            }
            0
        }
    };

    process::exit(exit_code);
}

/// Log to stderr; RUST_LOG wins over --verbose
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print an error and map it to an exit code: 1 for schema problems, 2 otherwise
fn fail(err: &Error) -> i32 {
    eprintln!("{} {}", "error:".red().bold(), err);
    if err.is_schema_error() {
        1
    } else {
        2
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            2
        }
    }
}

// ── Commands ──────────────────────────────────────────────

fn cmd_clean(input: &Path, output: &Path, options: CleanOptions, json: bool, quiet: bool) -> i32 {
    tracing::debug!(input = %input.display(), column = %options.column, "cleaning CUSIPs");
    let stats = match eventkit_core::clean_file(input, output, &options) {
        Ok(stats) => stats,
        Err(e) => return fail(&e),
    };

    if json {
        return print_json(&stats);
    }
    if !quiet {
        println!("Processed {} records with clean CUSIPs", stats.retained);
        println!("Clean CUSIP file saved to: {}", output.display());
    }
    0
}

fn cmd_normalize(raw: &[String], quiet: bool) -> i32 {
    if quiet {
        return 0;
    }
    for r in raw {
        match cusip::normalize(Some(r.as_str())) {
            Some(c) => println!("{}", c),
            None => println!("-"),
        }
    }
    0
}

fn cmd_examine(file: &Path, report_path: Option<&Path>, json: bool, quiet: bool) -> i32 {
    let dataset = match Dataset::from_path(file) {
        Ok(ds) => ds,
        Err(e) => return fail(&e),
    };
    let summary = examine(&dataset, &file.display().to_string());

    if json {
        let code = print_json(&summary);
        if code != 0 {
            return code;
        }
    } else if !quiet {
        console::print_structure(&summary);
    }

    if let Some(path) = report_path {
        if let Err(e) = report::write_report(path, &examine::render_report(&summary)) {
            return fail(&e);
        }
        if !quiet && !json {
            println!("Summary saved to: {}", path.display());
        }
    }
    0
}

fn cmd_validate(
    file: &Path,
    config: Option<&Path>,
    report_path: Option<&Path>,
    json: bool,
    strict: bool,
    quiet: bool,
) -> i32 {
    let config = match config.map(ValidationConfig::from_path).transpose() {
        Ok(c) => c.unwrap_or_default(),
        Err(e) => return fail(&e),
    };
    tracing::debug!(?config, "validation config");
    let dataset = match Dataset::from_path(file) {
        Ok(ds) => ds,
        Err(e) => return fail(&e),
    };
    let result = validate(&dataset, &config, &file.display().to_string());

    if json {
        let code = print_json(&result);
        if code != 0 {
            return code;
        }
    } else if !quiet {
        console::print_validation(&result);
    }

    if let Some(path) = report_path {
        let text = validate::render_report(&result, &chrono::Local::now());
        if let Err(e) = report::write_report(path, &text) {
            return fail(&e);
        }
        if !quiet && !json {
            println!("Validation report saved to: {}", path.display());
        }
    }

    if strict && result.has_errors() {
        1
    } else {
        0
    }
}
