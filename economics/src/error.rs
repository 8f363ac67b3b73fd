//! Earning and mission error types

use thiserror::Error;
use wallet::WalletError;

#[derive(Error, Debug, PartialEq)]
pub enum EarnError {
    #[error("Nothing to claim")]
    NothingToClaim,

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: f64, available: f64 },

    #[error("Insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: f64, staked: f64 },

    #[error("Booster not found: {0}")]
    BoosterNotFound(String),

    #[error("Mission not found: {0}")]
    MissionNotFound(String),

    #[error("Mission not completed: {0}")]
    MissionNotCompleted(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Another operation is already in progress")]
    Busy,

    #[error("Wallet error: {0}")]
    Wallet(#[from] WalletError),
}

pub type Result<T> = std::result::Result<T, EarnError>;
