//! PVS DApp Explorer
//!
//! Catalog of known DApps with category filtering and search, plus the
//! in-app browser history.

pub mod catalog;
pub mod history;

pub use catalog::{Catalog, Category, DApp};
pub use history::{normalize_url, BrowserHistory, HistoryEntry, BLANK_PAGE};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("DApp not found: {0}")]
    DAppNotFound(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
