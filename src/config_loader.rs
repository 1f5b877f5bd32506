use crate::config::Config;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::{info, warn};
use std::fs::File;
use std::path::Path;

/// Load and parse configuration from a YAML file
pub fn load_config(config_path: &Path) -> Result<Config> {
    info!("Loading configuration from: {:?}", config_path);

    // Open the configuration file
    let file = File::open(config_path)
        .wrap_err_with(|| format!("Failed to open configuration '{}'", config_path.display()))?;

    // Parse the YAML content
    let config: Config = serde_yaml::from_reader(file)
        .wrap_err_with(|| format!("Failed to parse configuration '{}'", config_path.display()))?;

    // Validate the configuration
    config.validate()?;

    if config.network.operator_cidr.is_none() {
        warn!("No operator_cidr configured; the jump host admits SSH from the management subnet only");
    }

    info!("Fleet requests {} device(s)", config.fleet_spec().total_requested());

    Ok(config)
}

/// Render the built-in example configuration as YAML
pub fn example_config_yaml() -> Result<String> {
    serde_yaml::to_string(&Config::default()).wrap_err("Failed to serialize example configuration")
}
