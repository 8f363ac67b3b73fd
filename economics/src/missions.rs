//! Daily missions and referral rewards
//!
//! Missions come in batches of three. A batch is replaced wholesale once the
//! cooldown has elapsed since the previous refresh. Expiry is informational:
//! it is shown to the user but does not block completing or claiming.

use crate::config::MissionConfig;
use crate::constants::{MISSION_BATCH_SIZE, REFERRAL_REWARD};
use crate::error::{EarnError, Result};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use uuid::Builder;
use wallet::{NewTransaction, TransactionKind, WalletLedger};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionTemplate {
    pub title: &'static str,
    pub description: &'static str,
    pub reward: f64,
}

/// Pool each batch is drawn from
pub const MISSION_TEMPLATES: [MissionTemplate; 6] = [
    MissionTemplate {
        title: "Daily Check-in",
        description: "Open the app and check your earnings.",
        reward: 5.0,
    },
    MissionTemplate {
        title: "Explore DApps",
        description: "Visit 3 different DApps in the browser.",
        reward: 10.0,
    },
    MissionTemplate {
        title: "Share Your Code",
        description: "Share your referral code with a friend.",
        reward: 15.0,
    },
    MissionTemplate {
        title: "Stake Tokens",
        description: "Stake any amount of $PVS to boost your rate.",
        reward: 20.0,
    },
    MissionTemplate {
        title: "Send a Transaction",
        description: "Send tokens to any address.",
        reward: 10.0,
    },
    MissionTemplate {
        title: "Activate a Booster",
        description: "Turn on one of your NFT boosters.",
        reward: 12.0,
    },
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: f64,
    pub expires_at: DateTime<Utc>,
    pub completed: bool,
}

impl Mission {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, zero once expired
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Duration {
        if self.is_expired(now) {
            Duration::zero()
        } else {
            self.expires_at - now
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Referral {
    pub code: String,
    pub total_referrals: u32,
    pub total_earned: f64,
}

pub struct MissionScheduler {
    missions: Vec<Mission>,
    last_refresh: DateTime<Utc>,
    cooldown: Duration,
    expiry: Duration,
    token_id: String,
    referral: Referral,
    rng: StdRng,
}

impl MissionScheduler {
    /// Create a scheduler and generate the first batch at `now`. Cooldown and
    /// expiry must be positive.
    pub fn new(config: &MissionConfig, now: DateTime<Utc>) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(config, now, rng)
    }

    pub fn with_rng(config: &MissionConfig, now: DateTime<Utc>, mut rng: StdRng) -> Result<Self> {
        let cooldown = config.cooldown()?;
        let expiry = config.expiry()?;
        let code = referral_code(&mut rng);
        let mut scheduler = Self {
            missions: Vec::new(),
            last_refresh: now,
            cooldown,
            expiry,
            token_id: config.token_id.clone(),
            referral: Referral {
                code,
                total_referrals: 0,
                total_earned: 0.0,
            },
            rng,
        };
        scheduler.missions = scheduler.generate_batch(now);
        Ok(scheduler)
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn mission(&self, id: &str) -> Option<&Mission> {
        self.missions.iter().find(|m| m.id == id)
    }

    pub fn last_refresh(&self) -> DateTime<Utc> {
        self.last_refresh
    }

    /// When the next batch becomes available
    pub fn next_refresh_at(&self) -> DateTime<Utc> {
        saturating_add(self.last_refresh, self.cooldown)
    }

    pub fn referral(&self) -> &Referral {
        &self.referral
    }

    fn generate_batch(&mut self, now: DateTime<Utc>) -> Vec<Mission> {
        let expires_at = saturating_add(now, self.expiry);
        let templates: Vec<MissionTemplate> = MISSION_TEMPLATES
            .choose_multiple(&mut self.rng, MISSION_BATCH_SIZE)
            .copied()
            .collect();

        templates
            .into_iter()
            .map(|t| Mission {
                id: Builder::from_random_bytes(self.rng.random())
                    .into_uuid()
                    .to_string(),
                title: t.title.to_string(),
                description: t.description.to_string(),
                reward: t.reward,
                expires_at,
                completed: false,
            })
            .collect()
    }

    /// Replace the batch if the cooldown has elapsed. Returns whether it did.
    pub fn refresh_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.last_refresh < self.cooldown {
            debug!("Missions not due until {}", self.next_refresh_at());
            return false;
        }
        self.missions = self.generate_batch(now);
        self.last_refresh = now;
        info!("Generated {} new missions", self.missions.len());
        true
    }

    /// Mark a mission done. Completing it again is harmless.
    pub fn complete_mission(&mut self, id: &str) -> Result<()> {
        let mission = self
            .missions
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| EarnError::MissionNotFound(id.to_string()))?;
        mission.completed = true;
        info!("Mission completed: {}", mission.title);
        Ok(())
    }

    /// Pay out a completed mission and drop it from the list
    pub fn claim_mission_reward<L>(
        &mut self,
        id: &str,
        ledger: &mut L,
        now: DateTime<Utc>,
    ) -> Result<f64>
    where
        L: WalletLedger + ?Sized,
    {
        let index = self
            .missions
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EarnError::MissionNotFound(id.to_string()))?;
        if !self.missions[index].completed {
            warn!("Claim rejected: mission {} not completed", id);
            return Err(EarnError::MissionNotCompleted(id.to_string()));
        }

        let reward = self.missions[index].reward;
        credit(ledger, &self.token_id, reward, now)?;
        let mission = self.missions.remove(index);

        info!("Claimed {} for mission {}", reward, mission.title);
        Ok(reward)
    }

    /// Credit the referral reward for one newly referred user
    pub fn register_referral<L>(&mut self, ledger: &mut L, now: DateTime<Utc>) -> Result<f64>
    where
        L: WalletLedger + ?Sized,
    {
        credit(ledger, &self.token_id, REFERRAL_REWARD, now)?;
        self.referral.total_referrals += 1;
        self.referral.total_earned += REFERRAL_REWARD;

        info!(
            "Referral registered ({} total)",
            self.referral.total_referrals
        );
        Ok(REFERRAL_REWARD)
    }
}

/// Windows far in the future clamp to the latest representable instant
fn saturating_add(at: DateTime<Utc>, by: Duration) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

impl std::fmt::Debug for MissionScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("MissionScheduler")
            .field("missions", &self.missions.len())
            .field("last_refresh", &self.last_refresh)
            .field("referral", &self.referral.code)
            .finish_non_exhaustive()
    }
}

fn credit<L>(ledger: &mut L, token_id: &str, amount: f64, now: DateTime<Utc>) -> Result<()>
where
    L: WalletLedger + ?Sized,
{
    let balance = ledger
        .balance(token_id)
        .ok_or_else(|| wallet::WalletError::TokenNotFound(token_id.to_string()))?;
    ledger.set_balance(token_id, balance + amount)?;
    ledger.append_transaction(NewTransaction::completed(
        TransactionKind::Earn,
        amount,
        token_id,
        now,
    ));
    Ok(())
}

fn referral_code(rng: &mut StdRng) -> String {
    let suffix: String = (0..6)
        .map(|_| rng.sample(Alphanumeric) as char)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    format!("PVS-{}", suffix)
}
