//! In-app browser history and visited DApps

use crate::catalog::Catalog;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

/// Page the browser shows before anything loads; never recorded
pub const BLANK_PAGE: &str = "about:blank";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub timestamp: DateTime<Utc>,
    pub is_dapp: bool,
}

/// Turn address-bar input into a loadable URL. Input without an http(s)
/// scheme gets `https://`.
pub fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserHistory {
    history: Vec<HistoryEntry>,
    visited_dapps: Vec<String>,
}

impl BrowserHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries, newest first
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Visited DApp URLs, most recent first visit first
    pub fn visited_dapps(&self) -> &[String] {
        &self.visited_dapps
    }

    pub fn add_to_history(&mut self, entry: HistoryEntry) {
        self.history.insert(0, entry);
    }

    /// Already-visited URLs keep their position
    pub fn add_visited_dapp(&mut self, url: impl Into<String>) {
        let url = url.into();
        if self.visited_dapps.contains(&url) {
            return;
        }
        self.visited_dapps.insert(0, url);
    }

    /// Clears page history; the visited DApp list is kept
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Record a finished page load. Blank pages are skipped; URLs that belong
    /// to a catalog DApp are also added to the visited list.
    pub fn record_visit(
        &mut self,
        url: &str,
        title: Option<&str>,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Option<&HistoryEntry> {
        let url = url.trim();
        if url.is_empty() || url == BLANK_PAGE {
            return None;
        }

        let is_dapp = catalog.find_by_url(url).is_some();
        let title = match title.map(str::trim) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => url.to_string(),
        };
        debug!("Visited {} (dapp: {})", url, is_dapp);

        self.add_to_history(HistoryEntry {
            url: url.to_string(),
            title,
            timestamp: now,
            is_dapp,
        });
        if is_dapp {
            self.add_visited_dapp(url);
        }
        self.history.first()
    }
}
