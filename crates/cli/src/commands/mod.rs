pub mod config_cmd;
pub mod demo;
pub mod tools;

use std::path::Path;

use ferroact_config::{ConfigError, RuntimeConfig};

/// Load from `path` when given, otherwise from the default location.
pub fn load_config(path: Option<&Path>) -> Result<RuntimeConfig, ConfigError> {
    match path {
        Some(path) => {
            let mut config = RuntimeConfig::load_from(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            Ok(config)
        }
        None => RuntimeConfig::load(),
    }
}
