//! Command handlers -- one module per subcommand

pub mod config;
pub mod format;
pub mod relabel;

use std::path::Path;

use gcplog_core::config::GcpLogConfig;

use crate::error::CliError;

/// Load the configuration, falling back to defaults when the file does not exist.
///
/// Env overrides and validation are applied in both cases.
pub async fn load_config_or_default(path: &Path) -> Result<GcpLogConfig, CliError> {
    if tokio::fs::try_exists(path).await? {
        return Ok(GcpLogConfig::load(path).await?);
    }

    tracing::debug!(path = %path.display(), "config file not found, using defaults");
    let mut config = GcpLogConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
