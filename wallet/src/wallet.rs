//! The in-memory wallet
//!
//! Owns token balances and the transaction log. Send, receive and price
//! jitter live here; the earning engine reaches the wallet only through
//! [`WalletLedger`].

use crate::ledger::WalletLedger;
use crate::token::{default_tokens, Token};
use crate::transaction::{
    mock_hash, NewTransaction, Transaction, TransactionError, TransactionKind, TransactionStatus,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

/// Address the demo wallet is created with
pub const DEMO_ADDRESS: &str = "0x71C7656EC7ab88b098defB751B7401B5f6d8976F";

#[derive(Debug, Error, PartialEq)]
pub enum WalletError {
    #[error("Transaction error: {0}")]
    TransactionError(#[from] TransactionError),

    #[error("Token not found: {0}")]
    TokenNotFound(String),

    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientFunds { have: f64, need: f64 },

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Invalid address")]
    InvalidAddress,
}

pub type Result<T> = std::result::Result<T, WalletError>;

/// In-memory wallet: token balances plus an append-only transaction log
#[derive(Debug, Clone, Serialize)]
pub struct Wallet {
    address: String,
    tokens: Vec<Token>,
    transactions: Vec<Transaction>,
    next_sequence: u64,
}

impl Wallet {
    /// Create an empty wallet
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            tokens: Vec::new(),
            transactions: Vec::new(),
            next_sequence: 0,
        }
    }

    /// Create a wallet holding the given tokens
    pub fn with_tokens(address: impl Into<String>, tokens: Vec<Token>) -> Self {
        let mut wallet = Self::new(address);
        for token in tokens {
            wallet.add_token(token);
        }
        wallet
    }

    /// The seeded wallet the demo app starts with
    pub fn demo() -> Self {
        Self::with_tokens(DEMO_ADDRESS, default_tokens())
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Add a token, replacing any existing holding with the same id
    pub fn add_token(&mut self, token: Token) {
        match self.tokens.iter_mut().find(|t| t.id == token.id) {
            Some(existing) => *existing = token,
            None => self.tokens.push(token),
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn token(&self, token_id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == token_id)
    }

    fn token_mut(&mut self, token_id: &str) -> Result<&mut Token> {
        self.tokens
            .iter_mut()
            .find(|t| t.id == token_id)
            .ok_or_else(|| WalletError::TokenNotFound(token_id.to_string()))
    }

    /// Balance for display; unknown tokens read as zero
    pub fn token_balance(&self, token_id: &str) -> f64 {
        self.token(token_id).map(|t| t.balance).unwrap_or(0.0)
    }

    /// Portfolio value in USD
    pub fn total_usd_value(&self) -> f64 {
        self.tokens.iter().map(Token::usd_value).sum()
    }

    /// Transactions, newest first
    pub fn transactions(&self) -> Vec<&Transaction> {
        self.transactions.iter().rev().collect()
    }

    /// Transactions touching one token, newest first
    pub fn transactions_for(&self, token_id: &str) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .rev()
            .filter(|tx| tx.token_id == token_id)
            .collect()
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| tx.id == id)
    }

    /// Settle a pending transaction as completed or failed
    pub fn settle_transaction(&mut self, id: &str, status: TransactionStatus) -> Result<()> {
        let tx = self
            .transactions
            .iter_mut()
            .find(|tx| tx.id == id)
            .ok_or_else(|| TransactionError::NotFound(id.to_string()))?;
        tx.settle(status)?;
        debug!("Transaction {} settled as {}", id, status);
        Ok(())
    }

    /// Send tokens to another address.
    ///
    /// All checks run before anything changes: on error neither the balance
    /// nor the log is touched.
    pub fn send_token(
        &mut self,
        to_address: &str,
        amount: f64,
        token_id: &str,
        now: DateTime<Utc>,
        status: TransactionStatus,
    ) -> Result<Transaction> {
        let to_address = to_address.trim();
        if to_address.is_empty() {
            warn!("Send rejected: empty recipient");
            return Err(WalletError::InvalidAddress);
        }
        validate_amount(amount)?;

        let have = self
            .token(token_id)
            .map(|t| t.balance)
            .ok_or_else(|| WalletError::TokenNotFound(token_id.to_string()))?;
        if amount > have {
            warn!(
                "Send rejected: {} {} requested, {} available",
                amount, token_id, have
            );
            return Err(WalletError::InsufficientFunds { have, need: amount });
        }

        self.token_mut(token_id)?.balance = have - amount;

        let hash = mock_hash(
            &self.address,
            to_address,
            amount,
            token_id,
            now,
            self.next_sequence,
        );
        let tx = self.append_transaction(
            NewTransaction::completed(TransactionKind::Send, amount, token_id, now)
                .with_status(status)
                .with_counterparty(to_address)
                .with_hash(hash),
        );

        info!("Sent {} {} to {}", amount, token_id, to_address);
        Ok(tx)
    }

    /// Credit an incoming transfer
    pub fn receive(
        &mut self,
        from_address: &str,
        amount: f64,
        token_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Transaction> {
        validate_amount(amount)?;
        let token = self.token_mut(token_id)?;
        token.balance += amount;

        let tx = self.append_transaction(
            NewTransaction::completed(TransactionKind::Receive, amount, token_id, now)
                .with_counterparty(from_address),
        );

        info!("Received {} {} from {}", amount, token_id, from_address);
        Ok(tx)
    }

    /// Re-quote every token with random price jitter
    pub fn refresh_prices<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for token in &mut self.tokens {
            token.apply_jitter(rng);
        }
        debug!("Prices refreshed, portfolio at ${:.2}", self.total_usd_value());
    }
}

impl WalletLedger for Wallet {
    fn balance(&self, token_id: &str) -> Option<f64> {
        self.token(token_id).map(|t| t.balance)
    }

    fn set_balance(&mut self, token_id: &str, amount: f64) -> Result<()> {
        self.token_mut(token_id)?.balance = amount;
        Ok(())
    }

    fn append_transaction(&mut self, tx: NewTransaction) -> Transaction {
        let id = format!("tx-{}-{}", tx.timestamp.timestamp_millis(), self.next_sequence);
        self.next_sequence += 1;

        let record = Transaction::from_new(id, tx);
        self.transactions.push(record.clone());
        record
    }
}

fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(WalletError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::PVS_TOKEN_ID;

    const RECIPIENT: &str = "0x1234567890abcdef1234567890abcdef12345678";

    #[test]
    fn test_demo_wallet() {
        let wallet = Wallet::demo();
        assert_eq!(wallet.address(), DEMO_ADDRESS);
        assert_eq!(wallet.token_balance(PVS_TOKEN_ID), 1250.0);
        assert!(wallet.transactions().is_empty());
    }

    #[test]
    fn test_send_token() {
        let mut wallet = Wallet::demo();
        let now = Utc::now();

        let tx = wallet
            .send_token(RECIPIENT, 250.0, PVS_TOKEN_ID, now, TransactionStatus::Completed)
            .unwrap();

        assert_eq!(wallet.token_balance(PVS_TOKEN_ID), 1000.0);
        assert_eq!(tx.kind, TransactionKind::Send);
        assert_eq!(tx.counterparty.as_deref(), Some(RECIPIENT));
        assert!(tx.hash.is_some());
        assert_eq!(wallet.transactions().len(), 1);
    }

    #[test]
    fn test_send_insufficient_funds() {
        let mut wallet = Wallet::demo();
        let result = wallet.send_token(
            RECIPIENT,
            5000.0,
            PVS_TOKEN_ID,
            Utc::now(),
            TransactionStatus::Completed,
        );

        match result {
            Err(WalletError::InsufficientFunds { have, need }) => {
                assert_eq!(have, 1250.0);
                assert_eq!(need, 5000.0);
            }
            other => panic!("Expected InsufficientFunds error, got {:?}", other),
        }
        assert_eq!(wallet.token_balance(PVS_TOKEN_ID), 1250.0);
        assert!(wallet.transactions().is_empty());
    }

    #[test]
    fn test_send_rejects_bad_input() {
        let mut wallet = Wallet::demo();
        let now = Utc::now();
        let status = TransactionStatus::Completed;

        assert_eq!(
            wallet.send_token("  ", 1.0, PVS_TOKEN_ID, now, status),
            Err(WalletError::InvalidAddress)
        );
        assert_eq!(
            wallet.send_token(RECIPIENT, 0.0, PVS_TOKEN_ID, now, status),
            Err(WalletError::InvalidAmount(0.0))
        );
        assert!(matches!(
            wallet.send_token(RECIPIENT, f64::NAN, PVS_TOKEN_ID, now, status),
            Err(WalletError::InvalidAmount(_))
        ));
        assert_eq!(
            wallet.send_token(RECIPIENT, 1.0, "doge", now, status),
            Err(WalletError::TokenNotFound("doge".to_string()))
        );
        assert!(wallet.transactions().is_empty());
    }

    #[test]
    fn test_receive() {
        let mut wallet = Wallet::demo();
        wallet.receive(RECIPIENT, 0.05, "eth", Utc::now()).unwrap();
        assert!((wallet.token_balance("eth") - 1.5).abs() < 1e-9);
        assert_eq!(wallet.transactions()[0].kind, TransactionKind::Receive);
    }

    #[test]
    fn test_settle_pending_send() {
        let mut wallet = Wallet::demo();
        let tx = wallet
            .send_token(RECIPIENT, 1.0, PVS_TOKEN_ID, Utc::now(), TransactionStatus::Pending)
            .unwrap();

        wallet
            .settle_transaction(&tx.id, TransactionStatus::Completed)
            .unwrap();
        assert_eq!(
            wallet.transaction(&tx.id).unwrap().status,
            TransactionStatus::Completed
        );

        let again = wallet.settle_transaction(&tx.id, TransactionStatus::Failed);
        assert!(matches!(again, Err(WalletError::TransactionError(_))));
    }

    #[test]
    fn test_transaction_ids_unique_and_newest_first() {
        let mut wallet = Wallet::demo();
        let now = Utc::now();
        let first = wallet.append_transaction(NewTransaction::completed(
            TransactionKind::Earn,
            1.0,
            PVS_TOKEN_ID,
            now,
        ));
        let second = wallet.append_transaction(NewTransaction::completed(
            TransactionKind::Earn,
            2.0,
            PVS_TOKEN_ID,
            now,
        ));

        assert_ne!(first.id, second.id);
        let listed = wallet.transactions();
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[test]
    fn test_serialized_wallet_carries_sequence() {
        let mut wallet = Wallet::demo();
        let now = Utc::now();
        wallet.receive(RECIPIENT, 5.0, PVS_TOKEN_ID, now).unwrap();
        wallet.receive(RECIPIENT, 5.0, PVS_TOKEN_ID, now).unwrap();

        let json = serde_json::to_value(&wallet).unwrap();
        assert_eq!(json["next_sequence"], 2);
        assert_eq!(json["transactions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_set_balance_unknown_token() {
        let mut wallet = Wallet::demo();
        assert_eq!(
            wallet.set_balance("doge", 1.0),
            Err(WalletError::TokenNotFound("doge".to_string()))
        );
        assert_eq!(wallet.balance("doge"), None);
    }

    #[test]
    fn test_total_usd_value() {
        let wallet = Wallet::with_tokens(
            "0xabc",
            vec![
                Token::new("a", "A", "A", 2.0, 10.0),
                Token::new("b", "B", "B", 3.0, 1.0),
            ],
        );
        assert_eq!(wallet.total_usd_value(), 23.0);
    }
}
