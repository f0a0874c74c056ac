use std::path::Path;

use crate::config::{CliConfig, Settings};
use crate::error::CliError;

pub fn run_config_show(settings: &Settings) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

pub fn run_config_init(config_path: &Path, settings: &Settings, force: bool) -> Result<(), CliError> {
    if config_path.exists() && !force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }

    CliConfig::from(settings)
        .save_to_path(config_path)
        .map_err(CliError::Config)?;
    println!("{}", config_path.display());
    Ok(())
}
