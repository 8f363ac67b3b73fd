//! PVS Economics Module
//!
//! Implements the earning layer of the wallet:
//! - Time-based reward accrual (rate x boost x elapsed hours)
//! - Staking and NFT boosters
//! - Daily missions and referral rewards
//! - A session that serializes all mutations behind one lock

pub mod clock;
pub mod config;
pub mod earning;
pub mod error;
pub mod missions;
pub mod session;

pub use clock::{Clock, FixedLatency, Latency, ManualClock, NoLatency, SystemClock};
pub use config::{BoosterConfig, EarningConfig, LatencyConfig, MissionConfig};
pub use earning::{hours_between, Booster, EarningAccount, EarningEngine};
pub use error::{EarnError, Result};
pub use missions::{Mission, MissionScheduler, MissionTemplate, Referral, MISSION_TEMPLATES};
pub use session::{PendingTicker, Session, SessionState};

/// Economic constants
pub mod constants {
    /// Floor for the hourly base rate after unstaking
    pub const MIN_BASE_RATE: f64 = 5.0;

    /// Base rate a fresh account starts with (tokens per hour)
    pub const DEFAULT_BASE_RATE: f64 = 5.0;

    /// Staking `amount` adds `amount / STAKE_RATE_DIVISOR` to the hourly rate
    pub const STAKE_RATE_DIVISOR: f64 = 100.0;

    /// Staking `amount` adds `amount / STAKE_BOOST_DIVISOR` to the boost
    pub const STAKE_BOOST_DIVISOR: f64 = 1000.0;

    /// Boost multiplier never drops below 1.0x
    pub const MIN_BOOST_MULTIPLIER: f64 = 1.0;

    /// Hours between mission batches (20 hours)
    pub const MISSION_COOLDOWN_HOURS: i64 = 20;

    /// Lifetime of a mission once generated (24 hours)
    pub const MISSION_EXPIRY_HOURS: i64 = 24;

    /// Missions per batch
    pub const MISSION_BATCH_SIZE: usize = 3;

    /// Reward credited per registered referral
    pub const REFERRAL_REWARD: f64 = 50.0;

    /// Simulated backend round trip in milliseconds
    pub const DEFAULT_LATENCY_MS: u64 = 1000;

    /// Milliseconds per hour
    pub const MS_PER_HOUR: f64 = 3_600_000.0;
}
