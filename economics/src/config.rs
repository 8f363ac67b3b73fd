//! Tunables for the earning layer.
//!
//! Every field has a serde default so partial TOML tables load cleanly.

use crate::constants::{
    DEFAULT_BASE_RATE, DEFAULT_LATENCY_MS, MISSION_COOLDOWN_HOURS, MISSION_EXPIRY_HOURS,
    MS_PER_HOUR,
};
use crate::error::{EarnError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

fn invalid(message: String) -> EarnError {
    EarnError::InvalidConfig(message)
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!(
            "{} must be a finite non-negative number, got {}",
            name, value
        )));
    }
    Ok(())
}

fn positive_hours(name: &str, hours: i64) -> Result<Duration> {
    if hours <= 0 {
        return Err(invalid(format!("{} must be positive, got {}", name, hours)));
    }
    Duration::try_hours(hours)
        .ok_or_else(|| invalid(format!("{} is out of range: {}", name, hours)))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoosterConfig {
    pub id: String,
    pub name: String,
    /// Bonus fraction added to the multiplier while active (0.1 = +10%)
    pub bonus: f64,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningConfig {
    #[serde(default = "default_token_id")]
    pub token_id: String,

    #[serde(default = "default_base_rate")]
    pub base_rate: f64,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Hours of unclaimed accrual a new session starts with
    #[serde(default = "default_accrued_hours")]
    pub accrued_hours: f64,

    #[serde(default = "default_boosters")]
    pub boosters: Vec<BoosterConfig>,
}

fn default_token_id() -> String {
    wallet::PVS_TOKEN_ID.to_string()
}

fn default_base_rate() -> f64 {
    DEFAULT_BASE_RATE
}

fn default_active() -> bool {
    true
}

fn default_accrued_hours() -> f64 {
    1.0
}

fn default_boosters() -> Vec<BoosterConfig> {
    vec![
        BoosterConfig {
            id: "cosmic-explorer".to_string(),
            name: "Cosmic Explorer".to_string(),
            bonus: 0.1,
            active: true,
        },
        BoosterConfig {
            id: "digital-pioneer".to_string(),
            name: "Digital Pioneer".to_string(),
            bonus: 0.1,
            active: true,
        },
        BoosterConfig {
            id: "quantum-miner".to_string(),
            name: "Quantum Miner".to_string(),
            bonus: 0.25,
            active: false,
        },
    ]
}

impl EarningConfig {
    /// Rates, bonuses and the accrual backdate must be finite and non-negative
    pub fn validate(&self) -> Result<()> {
        non_negative("base_rate", self.base_rate)?;
        non_negative("accrued_hours", self.accrued_hours)?;
        for booster in &self.boosters {
            non_negative(&format!("bonus of booster {}", booster.id), booster.bonus)?;
        }
        let backdate = self.accrued_duration()?;
        if DateTime::<Utc>::UNIX_EPOCH.checked_sub_signed(backdate).is_none() {
            return Err(invalid(format!(
                "accrued_hours is out of range: {}",
                self.accrued_hours
            )));
        }
        Ok(())
    }

    /// `accrued_hours` as a duration
    pub fn accrued_duration(&self) -> Result<Duration> {
        non_negative("accrued_hours", self.accrued_hours)?;
        let millis = self.accrued_hours * MS_PER_HOUR;
        if millis >= i64::MAX as f64 {
            return Err(invalid(format!(
                "accrued_hours is out of range: {}",
                self.accrued_hours
            )));
        }
        Duration::try_milliseconds(millis as i64).ok_or_else(|| {
            invalid(format!(
                "accrued_hours is out of range: {}",
                self.accrued_hours
            ))
        })
    }
}

impl Default for EarningConfig {
    fn default() -> Self {
        Self {
            token_id: default_token_id(),
            base_rate: default_base_rate(),
            active: default_active(),
            accrued_hours: default_accrued_hours(),
            boosters: default_boosters(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionConfig {
    #[serde(default = "default_token_id")]
    pub token_id: String,

    #[serde(default = "default_cooldown_hours")]
    pub cooldown_hours: i64,

    #[serde(default = "default_expiry_hours")]
    pub expiry_hours: i64,

    /// Fixed RNG seed for reproducible mission batches
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_cooldown_hours() -> i64 {
    MISSION_COOLDOWN_HOURS
}

fn default_expiry_hours() -> i64 {
    MISSION_EXPIRY_HOURS
}

impl MissionConfig {
    /// Cooldown and expiry must be positive and representable
    pub fn validate(&self) -> Result<()> {
        self.cooldown()?;
        self.expiry()?;
        Ok(())
    }

    pub fn cooldown(&self) -> Result<Duration> {
        positive_hours("cooldown_hours", self.cooldown_hours)
    }

    pub fn expiry(&self) -> Result<Duration> {
        positive_hours("expiry_hours", self.expiry_hours)
    }
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            token_id: default_token_id(),
            cooldown_hours: default_cooldown_hours(),
            expiry_hours: default_expiry_hours(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LatencyConfig {
    #[serde(default = "default_latency_ms")]
    pub millis: u64,
}

fn default_latency_ms() -> u64 {
    DEFAULT_LATENCY_MS
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            millis: default_latency_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_boost_is_one_point_two() {
        let config = EarningConfig::default();
        let active: f64 = config
            .boosters
            .iter()
            .filter(|b| b.active)
            .map(|b| b.bonus)
            .sum();
        assert!((1.0 + active - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(EarningConfig::default().validate(), Ok(()));
        assert_eq!(MissionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_negative_or_nan_rates() {
        let mut config = EarningConfig::default();
        config.base_rate = -5.0;
        assert!(matches!(config.validate(), Err(EarnError::InvalidConfig(_))));

        config.base_rate = f64::NAN;
        assert!(matches!(config.validate(), Err(EarnError::InvalidConfig(_))));

        let mut config = EarningConfig::default();
        config.boosters[0].bonus = -3.0;
        assert!(matches!(config.validate(), Err(EarnError::InvalidConfig(_))));

        let mut config = EarningConfig::default();
        config.accrued_hours = -1.0;
        assert!(matches!(config.validate(), Err(EarnError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_unrepresentable_accrual() {
        let mut config = EarningConfig::default();
        config.accrued_hours = 1e18;
        assert!(matches!(
            config.accrued_duration(),
            Err(EarnError::InvalidConfig(_))
        ));
        config.accrued_hours = 1e12;
        assert!(config.accrued_duration().is_ok());
        assert!(matches!(config.validate(), Err(EarnError::InvalidConfig(_))));
        config.accrued_hours = f64::INFINITY;
        assert!(matches!(config.validate(), Err(EarnError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_bad_mission_windows() {
        for (cooldown, expiry) in [(0, 24), (-1, 24), (20, 0), (20, -5), (i64::MAX / 10, 24)] {
            let config = MissionConfig {
                cooldown_hours: cooldown,
                expiry_hours: expiry,
                ..MissionConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(EarnError::InvalidConfig(_))),
                "cooldown {} expiry {} accepted",
                cooldown,
                expiry
            );
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MissionConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.cooldown_hours, MISSION_COOLDOWN_HOURS);
        assert_eq!(config.expiry_hours, MISSION_EXPIRY_HOURS);
    }
}
