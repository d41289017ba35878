use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bridge::handles::DEFAULT_HANDLE_SPACE;

/// Smallest handle space a config may ask for.
pub const MIN_HANDLE_SPACE: u32 = DEFAULT_HANDLE_SPACE;

/// Environment variable the binary reads the config path from.
pub const CONFIG_ENV: &str = "DOMBRIDGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read bridge config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("handle_space must be at least {}, got {0}", MIN_HANDLE_SPACE)]
    HandleSpaceTooSmall(u32),
}

/// How far a click walks once it has found an interactive node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingPolicy {
    /// Notify the nearest interactive ancestor only.
    #[default]
    FirstMatch,
    /// Notify every interactive ancestor up to the mount point, innermost first.
    AllAncestors,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Handles are drawn from `1..=handle_space`.
    pub handle_space: u32,
    pub routing: RoutingPolicy,
    /// Selector used by hosts that mount without naming one.
    pub default_mount: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            handle_space: DEFAULT_HANDLE_SPACE,
            routing: RoutingPolicy::default(),
            default_mount: "body".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Loads the config at `config_path`; a missing path or file yields
    /// the defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)?;
                serde_yaml::from_str(&contents)?
            }
            _ => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(std::env::var(CONFIG_ENV).ok().map(PathBuf::from))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.handle_space < MIN_HANDLE_SPACE {
            return Err(ConfigError::HandleSpaceTooSmall(self.handle_space));
        }
        Ok(())
    }
}
