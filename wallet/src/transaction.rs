//! Transaction records kept by the wallet ledger

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TransactionError {
    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Invalid status transition for {id}: {from} -> {to}")]
    InvalidStatusTransition {
        id: String,
        from: TransactionStatus,
        to: TransactionStatus,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Send,
    Receive,
    Earn,
    Stake,
    Unstake,
}

impl TransactionKind {
    /// Human label used by the history views
    pub fn title(&self) -> &'static str {
        match self {
            TransactionKind::Send => "Sent",
            TransactionKind::Receive => "Received",
            TransactionKind::Earn => "Earned",
            TransactionKind::Stake => "Staked",
            TransactionKind::Unstake => "Unstaked",
        }
    }

    /// Whether this kind adds to the wallet balance
    pub fn is_inflow(&self) -> bool {
        matches!(
            self,
            TransactionKind::Receive | TransactionKind::Earn | TransactionKind::Unstake
        )
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::Send => "send",
            TransactionKind::Receive => "receive",
            TransactionKind::Earn => "earn",
            TransactionKind::Stake => "stake",
            TransactionKind::Unstake => "unstake",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    /// Only pending transactions may settle, and only once.
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (TransactionStatus::Pending, TransactionStatus::Completed)
                | (TransactionStatus::Pending, TransactionStatus::Failed)
        )
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Everything needed to append a transaction; the ledger assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub token_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    pub counterparty: Option<String>,
    pub hash: Option<String>,
}

impl NewTransaction {
    /// A completed transaction with no counterparty (earn, stake, unstake)
    pub fn completed(
        kind: TransactionKind,
        amount: f64,
        token_id: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            amount,
            token_id: token_id.into(),
            timestamp,
            status: TransactionStatus::Completed,
            counterparty: None,
            hash: None,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_counterparty(mut self, address: impl Into<String>) -> Self {
        self.counterparty = Some(address.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub token_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Transaction {
    pub fn from_new(id: String, new: NewTransaction) -> Self {
        Self {
            id,
            kind: new.kind,
            amount: new.amount,
            token_id: new.token_id,
            timestamp: new.timestamp,
            status: new.status,
            counterparty: new.counterparty,
            hash: new.hash,
        }
    }

    /// Move a pending transaction to its final status
    pub fn settle(&mut self, status: TransactionStatus) -> Result<(), TransactionError> {
        if !self.status.can_transition_to(status) {
            return Err(TransactionError::InvalidStatusTransition {
                id: self.id.clone(),
                from: self.status,
                to: status,
            });
        }
        self.status = status;
        Ok(())
    }

    /// Amount with its sign as seen from the wallet
    pub fn signed_amount(&self) -> f64 {
        if self.kind.is_inflow() {
            self.amount
        } else {
            -self.amount
        }
    }

    /// Shortened counterparty for list rows, e.g. `0x71C7...976F`
    pub fn short_counterparty(&self) -> Option<String> {
        self.counterparty.as_deref().map(shorten_address)
    }
}

/// `0x71C7656EC7ab88b098defB751B7401B5f6d8976F` -> `0x71C7...976F`
pub fn shorten_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Mock transaction hash: there is no chain, so the hash is a digest of the
/// transfer details and the ledger sequence number.
pub fn mock_hash(
    from: &str,
    to: &str,
    amount: f64,
    token_id: &str,
    timestamp: DateTime<Utc>,
    sequence: u64,
) -> String {
    let data = format!(
        "{}:{}:{}:{}:{}:{}",
        from,
        to,
        amount,
        token_id,
        timestamp.timestamp_millis(),
        sequence
    );
    let mut hasher = Sha256::new();
    hasher.update(data.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: TransactionStatus) -> Transaction {
        Transaction::from_new(
            "tx-1".to_string(),
            NewTransaction::completed(TransactionKind::Send, 10.0, "pvs", Utc::now())
                .with_status(status),
        )
    }

    #[test]
    fn test_pending_settles_once() {
        let mut tx = sample(TransactionStatus::Pending);
        tx.settle(TransactionStatus::Completed).unwrap();
        assert_eq!(tx.status, TransactionStatus::Completed);

        let err = tx.settle(TransactionStatus::Failed).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::InvalidStatusTransition { .. }
        ));
        assert_eq!(tx.status, TransactionStatus::Completed);
    }

    #[test]
    fn test_pending_cannot_go_back_to_pending() {
        let mut tx = sample(TransactionStatus::Pending);
        assert!(tx.settle(TransactionStatus::Pending).is_err());
    }

    #[test]
    fn test_signed_amount() {
        let send = sample(TransactionStatus::Completed);
        assert_eq!(send.signed_amount(), -10.0);

        let mut earn = send.clone();
        earn.kind = TransactionKind::Earn;
        assert_eq!(earn.signed_amount(), 10.0);
    }

    #[test]
    fn test_shorten_address() {
        assert_eq!(
            shorten_address("0x71C7656EC7ab88b098defB751B7401B5f6d8976F"),
            "0x71C7...976F"
        );
        assert_eq!(shorten_address("0xabc"), "0xabc");
    }

    #[test]
    fn test_mock_hash_is_hex() {
        let hash = mock_hash("a", "b", 1.0, "pvs", Utc::now(), 7);
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66);
        assert!(hash[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }
}
