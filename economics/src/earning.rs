//! Reward accrual, staking and boosters
//!
//! Pending rewards are never stored. They are derived from the account on
//! demand:
//!
//! ```text
//! pending(now) = base_rate * boost_multiplier * hours(now - last_claim_at)
//! ```
//!
//! and are zero while the account is paused. Every mutating operation
//! validates first and only then touches the wallet and the account, so a
//! rejected call leaves both untouched.

use crate::config::EarningConfig;
use crate::constants::{
    MIN_BASE_RATE, MIN_BOOST_MULTIPLIER, MS_PER_HOUR, STAKE_BOOST_DIVISOR, STAKE_RATE_DIVISOR,
};
use crate::error::{EarnError, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use wallet::{NewTransaction, TransactionKind, WalletLedger};

/// Fractional hours from `from` to `to`; zero if `to` is earlier
pub fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let millis = (to - from).num_milliseconds();
    if millis <= 0 {
        0.0
    } else {
        millis as f64 / MS_PER_HOUR
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booster {
    pub id: String,
    pub name: String,
    /// Fraction added to the multiplier while active (0.1 = +10%)
    pub bonus: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningAccount {
    pub token_id: String,
    pub is_active: bool,
    pub base_rate: f64,
    pub boost_multiplier: f64,
    pub total_earned: f64,
    pub last_claim_at: DateTime<Utc>,
    pub staked_amount: f64,
    pub boosters: Vec<Booster>,
}

impl EarningAccount {
    /// Active account with nothing staked. Later boosters with a duplicate
    /// id are dropped.
    pub fn new(
        token_id: impl Into<String>,
        base_rate: f64,
        boosters: Vec<Booster>,
        last_claim_at: DateTime<Utc>,
    ) -> Self {
        let mut unique: Vec<Booster> = Vec::with_capacity(boosters.len());
        for booster in boosters {
            if unique.iter().any(|b| b.id == booster.id) {
                warn!("Duplicate booster id {} ignored", booster.id);
                continue;
            }
            unique.push(booster);
        }

        let mut account = Self {
            token_id: token_id.into(),
            is_active: true,
            base_rate,
            boost_multiplier: MIN_BOOST_MULTIPLIER,
            total_earned: 0.0,
            last_claim_at,
            staked_amount: 0.0,
            boosters: unique,
        };
        account.recompute_boost();
        account
    }

    /// Sum of bonuses from active boosters
    pub fn booster_bonus(&self) -> f64 {
        self.boosters
            .iter()
            .filter(|b| b.is_active)
            .map(|b| b.bonus)
            .sum()
    }

    /// Bonus contributed by staked tokens
    pub fn staking_bonus(&self) -> f64 {
        self.staked_amount / STAKE_BOOST_DIVISOR
    }

    fn recompute_boost(&mut self) {
        self.boost_multiplier =
            (1.0 + self.booster_bonus() + self.staking_bonus()).max(MIN_BOOST_MULTIPLIER);
    }

    /// Tokens earned per hour at the current boost
    pub fn effective_rate(&self) -> f64 {
        self.base_rate * self.boost_multiplier
    }

    pub fn pending(&self, now: DateTime<Utc>) -> f64 {
        if !self.is_active {
            return 0.0;
        }
        (self.effective_rate() * hours_between(self.last_claim_at, now)).max(0.0)
    }
}

/// Owns the earning account and applies claims, stakes and boosters against
/// a wallet ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarningEngine {
    account: EarningAccount,
}

impl EarningEngine {
    pub fn new(account: EarningAccount) -> Self {
        Self { account }
    }

    /// Build from configuration; accrual is backdated by `accrued_hours`.
    /// Negative, non-finite or out-of-range values are rejected.
    pub fn from_config(config: &EarningConfig, now: DateTime<Utc>) -> Result<Self> {
        config.validate()?;
        let backdate = config.accrued_duration()?;
        let last_claim_at = now.checked_sub_signed(backdate).ok_or_else(|| {
            EarnError::InvalidConfig(format!(
                "accrued_hours is out of range: {}",
                config.accrued_hours
            ))
        })?;

        let boosters = config
            .boosters
            .iter()
            .map(|b| Booster {
                id: b.id.clone(),
                name: b.name.clone(),
                bonus: b.bonus,
                is_active: b.active,
            })
            .collect();

        let mut account =
            EarningAccount::new(config.token_id.clone(), config.base_rate, boosters, last_claim_at);
        account.is_active = config.active;
        Ok(Self::new(account))
    }

    pub fn account(&self) -> &EarningAccount {
        &self.account
    }

    pub fn boosters(&self) -> &[Booster] {
        &self.account.boosters
    }

    /// Rewards accrued since the last claim. Pure.
    pub fn calculate_pending_earnings(&self, now: DateTime<Utc>) -> f64 {
        self.account.pending(now)
    }

    /// Fold pending rewards into the earned total and the wallet.
    ///
    /// Fails with `NothingToClaim` when nothing has accrued, which is also
    /// what an immediate second claim gets: the first one reset the clock.
    pub fn claim_earnings<L>(&mut self, ledger: &mut L, now: DateTime<Utc>) -> Result<f64>
    where
        L: WalletLedger + ?Sized,
    {
        let pending = self.calculate_pending_earnings(now);
        if pending <= 0.0 {
            debug!("Claim skipped: nothing pending");
            return Err(EarnError::NothingToClaim);
        }

        let token_id = self.account.token_id.clone();
        let balance = current_balance(ledger, &token_id)?;
        ledger.set_balance(&token_id, balance + pending)?;

        self.account.total_earned += pending;
        self.account.last_claim_at = now;
        ledger.append_transaction(NewTransaction::completed(
            TransactionKind::Earn,
            pending,
            token_id,
            now,
        ));

        info!(
            "Claimed {:.6} (total earned {:.6})",
            pending, self.account.total_earned
        );
        Ok(pending)
    }

    /// Lock wallet tokens to raise the base rate and the boost
    pub fn stake_tokens<L>(&mut self, ledger: &mut L, amount: f64, now: DateTime<Utc>) -> Result<()>
    where
        L: WalletLedger + ?Sized,
    {
        validate_amount(amount)?;
        let token_id = self.account.token_id.clone();
        let available = current_balance(ledger, &token_id)?;
        if amount > available {
            warn!("Stake rejected: {} requested, {} available", amount, available);
            return Err(EarnError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        ledger.set_balance(&token_id, available - amount)?;

        self.account.staked_amount += amount;
        self.account.base_rate += amount / STAKE_RATE_DIVISOR;
        self.account.recompute_boost();
        ledger.append_transaction(NewTransaction::completed(
            TransactionKind::Stake,
            amount,
            token_id,
            now,
        ));

        info!(
            "Staked {} (total {}, rate {:.2}/h, boost {:.3}x)",
            amount,
            self.account.staked_amount,
            self.account.base_rate,
            self.account.boost_multiplier
        );
        Ok(())
    }

    /// Return staked tokens to the wallet. Rate and boost fall back but never
    /// below their floors.
    pub fn unstake_tokens<L>(
        &mut self,
        ledger: &mut L,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Result<()>
    where
        L: WalletLedger + ?Sized,
    {
        validate_amount(amount)?;
        let staked = self.account.staked_amount;
        if amount > staked {
            warn!("Unstake rejected: {} requested, {} staked", amount, staked);
            return Err(EarnError::InsufficientStake {
                requested: amount,
                staked,
            });
        }
        let token_id = self.account.token_id.clone();
        let balance = current_balance(ledger, &token_id)?;

        ledger.set_balance(&token_id, balance + amount)?;

        self.account.staked_amount = (staked - amount).max(0.0);
        self.account.base_rate =
            (self.account.base_rate - amount / STAKE_RATE_DIVISOR).max(MIN_BASE_RATE);
        self.account.recompute_boost();
        ledger.append_transaction(NewTransaction::completed(
            TransactionKind::Unstake,
            amount,
            token_id,
            now,
        ));

        info!(
            "Unstaked {} (remaining {}, rate {:.2}/h, boost {:.3}x)",
            amount,
            self.account.staked_amount,
            self.account.base_rate,
            self.account.boost_multiplier
        );
        Ok(())
    }

    /// Flip a booster on or off. Returns the new state.
    pub fn toggle_booster(&mut self, id: &str) -> Result<bool> {
        let booster = self
            .account
            .boosters
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| EarnError::BoosterNotFound(id.to_string()))?;
        booster.is_active = !booster.is_active;
        let active = booster.is_active;

        self.account.recompute_boost();
        info!(
            "Booster {} {} (boost {:.3}x)",
            id,
            if active { "activated" } else { "deactivated" },
            self.account.boost_multiplier
        );
        Ok(active)
    }

    /// Stop accrual. Anything pending is claimed first so nothing is lost.
    /// Returns the amount settled.
    pub fn pause<L>(&mut self, ledger: &mut L, now: DateTime<Utc>) -> Result<f64>
    where
        L: WalletLedger + ?Sized,
    {
        if !self.account.is_active {
            return Ok(0.0);
        }
        let settled = match self.claim_earnings(ledger, now) {
            Ok(amount) => amount,
            Err(EarnError::NothingToClaim) => 0.0,
            Err(e) => return Err(e),
        };
        self.account.is_active = false;
        info!("Earning paused");
        Ok(settled)
    }

    /// Restart accrual from `now`
    pub fn resume(&mut self, now: DateTime<Utc>) {
        if self.account.is_active {
            return;
        }
        self.account.is_active = true;
        self.account.last_claim_at = now;
        info!("Earning resumed");
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        warn!("Rejected invalid amount {}", amount);
        return Err(EarnError::InvalidAmount(amount));
    }
    Ok(())
}

fn current_balance<L>(ledger: &L, token_id: &str) -> Result<f64>
where
    L: WalletLedger + ?Sized,
{
    ledger
        .balance(token_id)
        .ok_or_else(|| wallet::WalletError::TokenNotFound(token_id.to_string()).into())
}
