use finrag_core::config::{CliConfigOverrides, Credentials, LayeredConfig};
use finrag_retrieval::{build_pipeline, AnswerPipeline};
use std::path::Path;

use crate::errors::{self, CliError};

/// Resolve configuration: defaults, then file, environment, and flags
pub fn resolve_config(
    file: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig, CliError> {
    let config = LayeredConfig::with_defaults();
    let config = match file {
        Some(path) => config.load_from_file(path).map_err(|e| errors::configuration(&e))?,
        None => config,
    };
    let mut config = config.load_from_env().map_err(|e| errors::configuration(&e))?;
    config.update_from_cli(overrides).map_err(|e| errors::configuration(&e))?;
    Ok(config)
}

/// Build the answer pipeline; fails before any question is read when credentials are missing
pub fn connect(config: &LayeredConfig) -> Result<AnswerPipeline, CliError> {
    let credentials = Credentials::from_env().map_err(|e| errors::configuration(&e))?;
    build_pipeline(config, &credentials).map_err(|e| errors::from_finrag(&e))
}
