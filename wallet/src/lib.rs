//! PVS Wallet Module
//!
//! In-memory wallet for the PVS demo app:
//! - Token holdings with simulated USD prices
//! - Append-only transaction log (send, receive, earn, stake, unstake)
//! - `WalletLedger` trait used by the earning and mission components
//! - thiserror for clean error handling

pub mod ledger;
pub mod token;
pub mod transaction;
pub mod wallet;

pub use ledger::WalletLedger;
pub use token::{default_tokens, Token, MAX_PRICE_JITTER, PVS_TOKEN_ID};
pub use transaction::{
    shorten_address, NewTransaction, Transaction, TransactionError, TransactionKind,
    TransactionStatus,
};
pub use wallet::{Result, Wallet, WalletError, DEMO_ADDRESS};
