//! `gcplog format` command handler
//!
//! Reads newline-delimited input (one LogEntry or one push request body per line),
//! runs every line through the formatter and renders the resulting records.

use std::io::Write;
use std::path::Path;

use metrics::counter;
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use gcplog_core::config::TargetConfig;
use gcplog_core::metrics::{
    ENTRIES_DROPPED_TOTAL, ENTRIES_FORMATTED_TOTAL, ENTRIES_TOTAL, FORMAT_ERRORS_TOTAL,
    LABEL_REASON,
};
use gcplog_core::types::LogRecord;
use gcplog_formatter::GcpLogFormatter;

use crate::cli::FormatArgs;
use crate::commands::{load_config_or_default, relabel};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `format` command.
///
/// # Errors
///
/// Returns `CliError::Format` when at least one line failed to convert. Records
/// from the remaining lines are still rendered first.
pub async fn execute(
    args: FormatArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config_or_default(config_path).await?;
    let target = build_target(config.target, &args).await?;
    let formatter = GcpLogFormatter::from_target_config(&target)?;
    debug!(formatter = ?formatter, "formatter ready");

    let input = read_input(args.input.as_deref()).await?;
    let report = process(&formatter, &input, args.push);

    info!(
        total = report.total,
        formatted = report.formatted,
        dropped = report.dropped,
        failed = report.failed,
        "format finished"
    );

    writer.render(&report)?;

    if report.failed > 0 {
        return Err(CliError::Format(format!(
            "{} of {} entries failed",
            report.failed, report.total
        )));
    }

    Ok(())
}

/// Layer command-line flags on top of the configured target.
///
/// Flags only ever switch policies on; `--label` values override configured
/// static labels of the same name; rules from `--relabel-file` run after the
/// configured rules.
pub async fn build_target(
    mut target: TargetConfig,
    args: &FormatArgs,
) -> Result<TargetConfig, CliError> {
    if args.use_incoming_timestamp {
        target.use_incoming_timestamp = true;
    }
    if args.use_full_line {
        target.use_full_line = true;
    }

    for (name, value) in &args.labels {
        target
            .labels
            .insert(name.as_str(), value.as_str())
            .map_err(|e| CliError::Config(format!("--label {}: {}", name, e)))?;
    }

    if let Some(path) = &args.relabel_file {
        let extra = relabel::load_relabel_file(path).await?;
        info!(
            path = %path.display(),
            rules = extra.len(),
            "loaded additional relabel rules"
        );
        target.relabel_configs.extend(extra);
    }

    Ok(target)
}

async fn read_input(path: Option<&Path>) -> Result<Vec<u8>, CliError> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading entries from file");
            Ok(tokio::fs::read(path).await?)
        }
        None => {
            debug!("reading entries from stdin");
            let mut buf = Vec::new();
            tokio::io::stdin().read_to_end(&mut buf).await?;
            Ok(buf)
        }
    }
}

/// Format every non-blank line of `input`.
///
/// Line numbers in the report are 1-based and count blank lines, so they match
/// the input file. Failures are collected, never fatal.
///
/// Outcomes are also counted through the `metrics` facade. The CLI installs no
/// recorder, so the counters only reach an exporter when the embedding host
/// installs one (for example `metrics-exporter-prometheus`).
pub fn process(formatter: &GcpLogFormatter, input: &[u8], push: bool) -> FormatReport {
    let mut report = FormatReport::default();

    for (idx, line) in input.split(|b| *b == b'\n').enumerate() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        report.total += 1;
        counter!(ENTRIES_TOTAL).increment(1);

        let result = if push {
            formatter.format_push(line)
        } else {
            formatter.format(line)
        };

        match result {
            Ok(Some(record)) => {
                report.formatted += 1;
                counter!(ENTRIES_FORMATTED_TOTAL).increment(1);
                report.records.push(record);
            }
            Ok(None) => {
                report.dropped += 1;
                counter!(ENTRIES_DROPPED_TOTAL).increment(1);
            }
            Err(e) => {
                let kind = e.kind();
                warn!(line = idx + 1, reason = kind, error = %e, "failed to format entry");
                counter!(FORMAT_ERRORS_TOTAL, LABEL_REASON => kind).increment(1);
                report.failed += 1;
                report.errors.push(EntryFailure {
                    line: idx + 1,
                    kind: kind.to_owned(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

/// Outcome of a `gcplog format` run.
#[derive(Debug, Default, Serialize)]
pub struct FormatReport {
    pub total: usize,
    pub formatted: usize,
    pub dropped: usize,
    pub failed: usize,
    pub records: Vec<LogRecord>,
    pub errors: Vec<EntryFailure>,
}

/// A single line that could not be formatted.
#[derive(Debug, Serialize)]
pub struct EntryFailure {
    /// 1-based input line number
    pub line: usize,
    /// Stable failure category (`decode`, `timestamp_parse`, ...)
    pub kind: String,
    pub error: String,
}

impl Render for FormatReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        for record in &self.records {
            writeln!(w, "{}", record)?;
        }

        for failure in &self.errors {
            writeln!(
                w,
                "{} line {} ({}): {}",
                "error".red().bold(),
                failure.line,
                failure.kind,
                failure.error
            )?;
        }

        let failed = if self.failed > 0 {
            self.failed.to_string().red()
        } else {
            self.failed.to_string().normal()
        };
        writeln!(
            w,
            "{} entries: {} formatted, {} dropped, {} failed",
            self.total.to_string().bold(),
            self.formatted.to_string().green(),
            self.dropped.to_string().yellow(),
            failed
        )?;

        Ok(())
    }
}
