//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// gcplog -- turn Google Cloud Logging entries into normalized log records.
///
/// Use `gcplog <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "gcplog", version, about, long_about = None)]
pub struct Cli {
    /// Path to the gcplog.toml configuration file (optional for `format`).
    #[arg(short, long, global = true, default_value = "gcplog.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Format log entries (one JSON document per line) into normalized records.
    Format(FormatArgs),

    /// Work with relabel rule files.
    Relabel(RelabelArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- format ----

/// Format log entries read from a file or stdin.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// Input file with one entry per line (default: stdin).
    pub input: Option<PathBuf>,

    /// Treat each line as a Pub/Sub push request body instead of a bare LogEntry.
    #[arg(long)]
    pub push: bool,

    /// YAML file with additional relabel rules, applied after the configured ones.
    #[arg(long)]
    pub relabel_file: Option<PathBuf>,

    /// Static label added to every record (repeatable), e.g. `--label job=gcplog`.
    #[arg(short, long = "label", value_name = "NAME=VALUE", value_parser = parse_label)]
    pub labels: Vec<(String, String)>,

    /// Use the entry timestamp instead of the processing time.
    #[arg(long)]
    pub use_incoming_timestamp: bool,

    /// Always use the full raw entry as the log line.
    #[arg(long)]
    pub use_full_line: bool,
}

/// Parse a `NAME=VALUE` pair.
fn parse_label(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    if name.is_empty() {
        return Err(format!("label name is empty in '{s}'"));
    }
    Ok((name.to_owned(), value.to_owned()))
}

// ---- relabel ----

/// Work with relabel rule files.
#[derive(Args, Debug)]
pub struct RelabelArgs {
    #[command(subcommand)]
    pub action: RelabelCommand,
}

#[derive(Subcommand, Debug)]
pub enum RelabelCommand {
    /// Compile a YAML relabel rule file and report errors.
    Check {
        /// Path to the YAML rule file.
        file: PathBuf,
    },
}

// ---- config ----

/// Manage gcplog configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, target).
        #[arg(long)]
        section: Option<String>,
    },
}
