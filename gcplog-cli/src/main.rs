//! gcplog CLI entry point

use clap::Parser;

use gcplog_cli::cli::{Cli, Commands};
use gcplog_cli::commands;
use gcplog_cli::error::CliError;
use gcplog_cli::logging::init_tracing;
use gcplog_cli::output::OutputWriter;
use gcplog_core::config::{GcpLogConfig, GeneralConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut general = load_general_config(&cli).await;
    if let Some(level) = cli.log_level.clone() {
        general.log_level = level;
    }

    if let Err(e) = init_tracing(&general) {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
    // No recorder is installed here; metrics are no-ops unless a host provides one.
    gcplog_core::metrics::describe_all();

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }
}

/// Dispatch to the subcommand handler.
async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Format(args) => commands::format::execute(args, &cli.config, &writer).await,
        Commands::Relabel(args) => commands::relabel::execute(args, &writer).await,
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
    }
}

/// Logging settings are needed before the subcommand runs, so a broken or
/// missing config file falls back to defaults here. The subcommand reports
/// the actual config error.
async fn load_general_config(cli: &Cli) -> GeneralConfig {
    match GcpLogConfig::from_file(&cli.config).await {
        Ok(mut config) => {
            config.apply_env_overrides();
            config.general
        }
        Err(_) => {
            let mut config = GcpLogConfig::default();
            config.apply_env_overrides();
            config.general
        }
    }
}
