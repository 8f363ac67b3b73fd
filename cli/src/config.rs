//! TOML configuration for the CLI
//!
//! Missing files and missing tables fall back to defaults. Values that would
//! break accrual or mission scheduling are rejected on load.

use economics::{EarnError, EarningConfig, LatencyConfig, MissionConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{0}")]
    Invalid(#[from] EarnError),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wallet: WalletConfig,

    #[serde(default)]
    pub earning: EarningConfig,

    #[serde(default)]
    pub missions: MissionConfig,

    #[serde(default)]
    pub latency: LatencyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletConfig {
    #[serde(default = "default_address")]
    pub address: String,

    /// Jitter token prices on every price view
    #[serde(default = "default_price_jitter")]
    pub price_jitter: bool,
}

fn default_address() -> String {
    wallet::DEMO_ADDRESS.to_string()
}

fn default_price_jitter() -> bool {
    true
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            price_jitter: default_price_jitter(),
        }
    }
}

impl Config {
    /// `<config dir>/pvs-wallet/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pvs-wallet")
            .join("config.toml")
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.earning.validate()?;
        self.missions.validate()?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
