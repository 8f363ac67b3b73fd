//! Built-in DApp catalog

use crate::{ExplorerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    All,
    DeFi,
    #[serde(rename = "NFT")]
    Nft,
    Gaming,
    Social,
    Utility,
}

impl Category {
    /// Display order of the category tabs
    pub const TABS: [Category; 6] = [
        Category::All,
        Category::DeFi,
        Category::Nft,
        Category::Gaming,
        Category::Social,
        Category::Utility,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::DeFi => "DeFi",
            Category::Nft => "NFT",
            Category::Gaming => "Gaming",
            Category::Social => "Social",
            Category::Utility => "Utility",
        }
    }

    /// `All` matches everything
    pub fn matches(&self, category: Category) -> bool {
        *self == Category::All || *self == category
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self> {
        Category::TABS
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExplorerError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DApp {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub url: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub popular: bool,
}

impl DApp {
    fn listed(
        id: &str,
        name: &str,
        description: &str,
        category: Category,
        url: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category,
            url: url.to_string(),
            featured: false,
            popular: false,
        }
    }

    fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    fn popular(mut self) -> Self {
        self.popular = true;
        self
    }

    /// Host part of the DApp's URL
    pub fn host(&self) -> &str {
        host_of(&self.url)
    }
}

/// Host of a URL without scheme, `www.` prefix, port or path
pub(crate) fn host_of(url: &str) -> &str {
    let rest = url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(url);
    let host = rest
        .split(|c: char| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or(rest);
    let host = host.split(':').next().unwrap_or(host);
    host.strip_prefix("www.").unwrap_or(host)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    dapps: Vec<DApp>,
}

impl Catalog {
    pub fn new(dapps: Vec<DApp>) -> Self {
        Self { dapps }
    }

    pub fn all(&self) -> &[DApp] {
        &self.dapps
    }

    pub fn featured(&self) -> Vec<&DApp> {
        self.dapps.iter().filter(|d| d.featured).collect()
    }

    pub fn popular(&self) -> Vec<&DApp> {
        self.dapps.iter().filter(|d| d.popular).collect()
    }

    pub fn by_category(&self, category: Category) -> Vec<&DApp> {
        self.dapps
            .iter()
            .filter(|d| category.matches(d.category))
            .collect()
    }

    /// Case-insensitive match on name, description and category. A blank
    /// query returns everything.
    pub fn search(&self, query: &str) -> Vec<&DApp> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.dapps.iter().collect();
        }
        self.dapps
            .iter()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.description.to_lowercase().contains(&needle)
                    || d.category.label().to_lowercase() == needle
            })
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&DApp> {
        self.dapps.iter().find(|d| d.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&DApp> {
        self.find(id)
            .ok_or_else(|| ExplorerError::DAppNotFound(id.to_string()))
    }

    /// DApp whose host matches the URL's host or one of its parent domains
    pub fn find_by_url(&self, url: &str) -> Option<&DApp> {
        let host = host_of(url).to_ascii_lowercase();
        if host.is_empty() {
            return None;
        }
        self.dapps.iter().find(|d| {
            let dapp_host = d.host().to_ascii_lowercase();
            host == dapp_host || host.ends_with(&format!(".{}", dapp_host))
        })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        use Category::*;

        Self::new(vec![
            DApp::listed(
                "uniswap",
                "Uniswap",
                "Swap, earn, and build on the leading decentralized crypto trading protocol.",
                DeFi,
                "https://app.uniswap.org",
            )
            .featured(),
            DApp::listed(
                "opensea",
                "OpenSea",
                "Discover, collect, and sell extraordinary NFTs on the world's first & largest NFT marketplace.",
                Nft,
                "https://opensea.io",
            )
            .featured(),
            DApp::listed(
                "aave",
                "Aave",
                "Open source and non-custodial liquidity protocol for earning interest and borrowing assets.",
                DeFi,
                "https://app.aave.com",
            )
            .featured(),
            DApp::listed(
                "compound",
                "Compound",
                "Algorithmic, autonomous interest rate protocol built for developers.",
                DeFi,
                "https://app.compound.finance",
            )
            .popular(),
            DApp::listed(
                "curve",
                "Curve Finance",
                "Exchange liquidity pool designed for stablecoin trading.",
                DeFi,
                "https://curve.fi",
            )
            .popular(),
            DApp::listed(
                "rarible",
                "Rarible",
                "Create, sell or collect digital items secured with blockchain.",
                Nft,
                "https://rarible.com",
            )
            .popular(),
            DApp::listed(
                "sushiswap",
                "SushiSwap",
                "Community-run DEX with yield farming opportunities.",
                DeFi,
                "https://app.sushi.com",
            )
            .popular(),
            DApp::listed(
                "foundation",
                "Foundation",
                "Platform for artists and collectors to buy, sell, and auction NFTs.",
                Nft,
                "https://foundation.app",
            )
            .popular(),
            DApp::listed(
                "axieinfinity",
                "Axie Infinity",
                "Digital pet universe where players battle, collect, and earn tokens.",
                Gaming,
                "https://axieinfinity.com",
            ),
            DApp::listed(
                "decentraland",
                "Decentraland",
                "Virtual reality platform powered by the Ethereum blockchain.",
                Gaming,
                "https://decentraland.org",
            ),
            DApp::listed(
                "ens",
                "ENS Domains",
                "Decentralized naming for wallets, websites, & more.",
                Utility,
                "https://app.ens.domains",
            ),
            DApp::listed(
                "lens",
                "Lens Protocol",
                "Web3 social graph on Polygon for content creators.",
                Social,
                "https://lens.xyz",
            ),
        ])
    }
}
