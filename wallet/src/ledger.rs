//! Contract between the wallet and the components that credit or debit it

use crate::transaction::{NewTransaction, Transaction};
use crate::wallet::WalletError;

/// Balance and history access used by the earning engine and the mission
/// scheduler. The implementor exclusively owns balances and the log.
pub trait WalletLedger {
    /// Balance of `token_id`, or `None` if the wallet does not hold that token
    fn balance(&self, token_id: &str) -> Option<f64>;

    /// Overwrite the balance of an existing token
    fn set_balance(&mut self, token_id: &str, amount: f64) -> Result<(), WalletError>;

    /// Append to the transaction log and return the stored record
    fn append_transaction(&mut self, tx: NewTransaction) -> Transaction;
}
