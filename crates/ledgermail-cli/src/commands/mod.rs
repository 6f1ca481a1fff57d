//! Subcommand implementations.

pub mod config;
pub mod extract;
pub mod parse;
pub mod run;

use std::path::{Path, PathBuf};

use ledgermail_core::PipelineConfig;
use tracing::debug;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ledgermail")
        .join("config.json")
}

/// Load configuration: explicit file, then the default file, then the environment.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<PipelineConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return Ok(PipelineConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        return Ok(PipelineConfig::from_file(&default_path)?);
    }

    debug!("No config file, reading environment");
    Ok(PipelineConfig::from_env())
}
