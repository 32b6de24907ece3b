use serde::{Deserialize, Serialize};

use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

impl Config {
    /// Load configuration from a TOML file. A missing file yields defaults;
    /// a malformed file is an error.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config_str = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(_) => return Ok(Self::default()),
        };
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }
}
