use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::amount::Amount;
use crate::common::Coordinate;
use crate::error::{LedgerError, Result};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LedgerConfig {
    pub node: NodeConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub fees: FeeConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NodeConfig {
    pub log_level: String,
    #[serde(default = "default_genesis")]
    pub genesis: String,
    #[serde(default = "default_state_path")]
    pub state_path: String,
}

fn default_genesis() -> String {
    "genesis.json".to_string()
}

fn default_state_path() -> String {
    "./data/state.bin".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ChainConfig {
    /// Coordinate this ledger runs on; `{0, 0}` is the main chain.
    #[serde(default)]
    pub coord: Coordinate,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FeeConfig {
    /// Fee charged per transaction when a block does not set one.
    pub base_fee: Amount,
}

impl Default for FeeConfig {
    fn default() -> Self {
        FeeConfig {
            base_fee: Amount::new_coin(0, 10_000_000_000_000_000),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            node: NodeConfig {
                log_level: "info".to_string(),
                genesis: default_genesis(),
                state_path: default_state_path(),
            },
            chain: ChainConfig::default(),
            fees: FeeConfig::default(),
        }
    }
}

impl LedgerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Reads `path`, falling back to defaults when it is unreadable. A missing
    /// file is created with the defaults.
    ///
    /// Runs before logging is set up, so the outcome is only logged once a
    /// subscriber exists; see [`LedgerConfig::describe`].
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, ConfigSource) {
        let path = path.as_ref();
        if path.exists() {
            match Self::load(path) {
                Ok(c) => (c, ConfigSource::File),
                Err(e) => (Self::default(), ConfigSource::Invalid(e.to_string())),
            }
        } else {
            let config = Self::default();
            if let Ok(s) = toml::to_string_pretty(&config) {
                let _ = std::fs::write(path, s);
            }
            (config, ConfigSource::Created)
        }
    }

    pub fn describe(path: impl AsRef<Path>, source: &ConfigSource) {
        let path = path.as_ref().display();
        match source {
            ConfigSource::File => info!("Config loaded from {}", path),
            ConfigSource::Created => info!("Config file not found at '{}'. Created default.", path),
            ConfigSource::Invalid(e) => warn!("Error reading config {}: {}. Using defaults.", path, e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Created,
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: LedgerConfig = toml::from_str(
            r#"
            [node]
            log_level = "debug"

            [chain]
            coord = { height = 3, index = 1 }
            "#,
        )
        .unwrap();
        assert_eq!(config.node.log_level, "debug");
        assert_eq!(config.node.state_path, "./data/state.bin");
        assert_eq!(config.chain.coord, Coordinate::new(3, 1));
        assert_eq!(config.fees.base_fee, "0.01".parse().unwrap());
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = LedgerConfig::default();
        let s = toml::to_string_pretty(&config).unwrap();
        assert_eq!(toml::from_str::<LedgerConfig>(&s).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_created() {
        let path = std::env::temp_dir().join(format!("compass-config-{}.toml", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let (config, source) = LedgerConfig::load_or_default(&path);
        assert_eq!(source, ConfigSource::Created);
        assert_eq!(config, LedgerConfig::default());
        let (_, source) = LedgerConfig::load_or_default(&path);
        assert_eq!(source, ConfigSource::File);
        let _ = std::fs::remove_file(&path);
    }
}
