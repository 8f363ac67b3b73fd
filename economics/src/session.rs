//! Wallet session: the single writer for wallet, earning and mission state
//!
//! All state sits behind one mutex so every operation is one atomic step.
//! Backend-style operations wait the configured latency first and hold a busy
//! flag meanwhile; a second operation started during that window gets
//! `EarnError::Busy` instead of queueing.

use crate::clock::{Clock, Latency};
use crate::earning::EarningEngine;
use crate::error::{EarnError, Result};
use crate::missions::MissionScheduler;
use log::{debug, info};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use wallet::{Transaction, TransactionStatus, Wallet, WalletLedger};

#[derive(Debug)]
pub struct SessionState {
    pub wallet: Wallet,
    pub earning: EarningEngine,
    pub missions: MissionScheduler,
}

pub struct Session<C, L> {
    state: Arc<Mutex<SessionState>>,
    busy: Arc<AtomicBool>,
    clock: C,
    latency: L,
}

impl<C: Clone, L: Clone> Clone for Session<C, L> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            busy: Arc::clone(&self.busy),
            clock: self.clock.clone(),
            latency: self.latency.clone(),
        }
    }
}

/// Clears the busy flag when the operation ends, however it ends
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<C: Clock, L: Latency> Session<C, L> {
    pub fn new(state: SessionState, clock: C, latency: L) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            busy: Arc::new(AtomicBool::new(false)),
            clock,
            latency,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Whether a backend-style operation is outstanding
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<BusyGuard> {
        if self.busy.swap(true, Ordering::AcqRel) {
            debug!("Operation rejected: session busy");
            return Err(EarnError::Busy);
        }
        Ok(BusyGuard(Arc::clone(&self.busy)))
    }

    /// Read the state under the lock
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let state = self.state.lock();
        f(&*state)
    }

    pub fn pending_earnings(&self) -> f64 {
        let now = self.clock.now();
        self.state.lock().earning.calculate_pending_earnings(now)
    }

    pub fn refresh_missions(&self) -> bool {
        let now = self.clock.now();
        self.state.lock().missions.refresh_if_due(now)
    }

    pub fn toggle_booster(&self, id: &str) -> Result<bool> {
        self.state.lock().earning.toggle_booster(id)
    }

    pub fn pause_earning(&self) -> Result<f64> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let SessionState {
            wallet, earning, ..
        } = &mut *state;
        earning.pause(wallet, now)
    }

    pub fn resume_earning(&self) {
        let now = self.clock.now();
        self.state.lock().earning.resume(now);
    }

    pub fn register_referral(&self) -> Result<f64> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let SessionState {
            wallet, missions, ..
        } = &mut *state;
        missions.register_referral(wallet, now)
    }

    pub async fn claim_earnings(&self) -> Result<f64> {
        let _busy = self.begin()?;
        self.latency.wait().await;

        let now = self.clock.now();
        let mut state = self.state.lock();
        let SessionState {
            wallet, earning, ..
        } = &mut *state;
        earning.claim_earnings(wallet, now)
    }

    pub async fn stake_tokens(&self, amount: f64) -> Result<()> {
        let _busy = self.begin()?;
        self.latency.wait().await;

        let now = self.clock.now();
        let mut state = self.state.lock();
        let SessionState {
            wallet, earning, ..
        } = &mut *state;
        earning.stake_tokens(wallet, amount, now)
    }

    pub async fn unstake_tokens(&self, amount: f64) -> Result<()> {
        let _busy = self.begin()?;
        self.latency.wait().await;

        let now = self.clock.now();
        let mut state = self.state.lock();
        let SessionState {
            wallet, earning, ..
        } = &mut *state;
        earning.unstake_tokens(wallet, amount, now)
    }

    pub async fn complete_mission(&self, id: &str) -> Result<()> {
        let _busy = self.begin()?;
        self.latency.wait().await;

        self.state.lock().missions.complete_mission(id)
    }

    pub async fn claim_mission_reward(&self, id: &str) -> Result<f64> {
        let _busy = self.begin()?;
        self.latency.wait().await;

        let now = self.clock.now();
        let mut state = self.state.lock();
        let SessionState {
            wallet, missions, ..
        } = &mut *state;
        missions.claim_mission_reward(id, wallet, now)
    }

    /// Send tokens. The transfer is recorded as pending (balance already
    /// debited), and marked completed once the simulated round trip is over.
    pub async fn send_token(&self, to: &str, amount: f64, token_id: &str) -> Result<Transaction> {
        let _busy = self.begin()?;

        let tx = {
            let now = self.clock.now();
            let mut state = self.state.lock();
            state
                .wallet
                .send_token(to, amount, token_id, now, TransactionStatus::Pending)?
        };

        self.latency.wait().await;

        let mut state = self.state.lock();
        state
            .wallet
            .settle_transaction(&tx.id, TransactionStatus::Completed)?;
        let settled = state
            .wallet
            .transaction(&tx.id)
            .cloned()
            .unwrap_or(tx);
        info!("Send {} confirmed", settled.id);
        Ok(settled)
    }

    /// Token balance as the wallet sees it
    pub fn balance(&self, token_id: &str) -> Option<f64> {
        self.state.lock().wallet.balance(token_id)
    }

    pub fn refresh_prices<R: Rng + ?Sized>(&self, rng: &mut R) {
        self.state.lock().wallet.refresh_prices(rng);
    }
}

impl<C, L> Session<C, L>
where
    C: Clock + Clone + 'static,
    L: Latency + Clone + 'static,
{
    /// Recompute pending earnings every `period` for display. The ticker only
    /// reads state; dropping it stops the task.
    pub fn pending_ticker(&self, period: std::time::Duration) -> PendingTicker {
        let (tx, rx) = watch::channel(self.pending_earnings());
        let session = self.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if tx.send(session.pending_earnings()).is_err() {
                    break;
                }
            }
        });

        PendingTicker { rx, handle }
    }
}

pub struct PendingTicker {
    rx: watch::Receiver<f64>,
    handle: JoinHandle<()>,
}

impl PendingTicker {
    /// Latest value published by the ticker
    pub fn current(&self) -> f64 {
        *self.rx.borrow()
    }

    /// Wait for the next tick and return its value
    pub async fn next(&mut self) -> Option<f64> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

impl Drop for PendingTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
