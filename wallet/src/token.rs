//! Token holdings and simulated market data

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Id of the wallet's native token
pub const PVS_TOKEN_ID: &str = "pvs";

/// Largest relative price move applied by one refresh (2%)
pub const MAX_PRICE_JITTER: f64 = 0.02;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub balance: f64,
    /// Price of one unit in USD
    pub usd_price: f64,
    /// 24h change in percent
    pub change_24h: f64,
}

impl Token {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
        balance: f64,
        usd_price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            name: name.into(),
            balance,
            usd_price,
            change_24h: 0.0,
        }
    }

    pub fn with_change(mut self, change_24h: f64) -> Self {
        self.change_24h = change_24h;
        self
    }

    /// USD value of the holding
    pub fn usd_value(&self) -> f64 {
        self.balance * self.usd_price
    }

    /// Nudge the price by a random amount within `MAX_PRICE_JITTER` and fold
    /// the move into the 24h change.
    pub fn apply_jitter<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let factor = rng.random_range(-MAX_PRICE_JITTER..=MAX_PRICE_JITTER);
        self.usd_price = (self.usd_price * (1.0 + factor)).max(0.0);
        self.change_24h += factor * 100.0;
    }
}

/// Holdings a fresh demo wallet starts with
pub fn default_tokens() -> Vec<Token> {
    vec![
        Token::new(PVS_TOKEN_ID, "$PVS", "$PVS Token", 1250.0, 0.85).with_change(5.2),
        Token::new("eth", "ETH", "Ethereum", 1.45, 3200.0).with_change(-1.3),
        Token::new("usdc", "USDC", "USD Coin", 500.0, 1.0),
    ]
}
