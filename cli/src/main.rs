//! PVS Wallet - earning simulator CLI
//!
//! Every invocation starts a fresh in-memory session. Use `shell` to run
//! several commands against the same session.

mod config;
mod display;

use clap::{Parser, Subcommand};
use config::Config;
use economics::{
    Clock, EarningEngine, FixedLatency, MissionScheduler, Session, SessionState, SystemClock,
};
use explorer::{normalize_url, BrowserHistory, Catalog, Category};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use wallet::{default_tokens, Wallet, PVS_TOKEN_ID};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pvs-wallet")]
#[command(about = "PVS wallet with simulated earning, staking and missions", version)]
struct Cli {
    /// Config file (defaults to <config dir>/pvs-wallet/config.toml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the simulated backend latency
    #[arg(long, value_name = "MS")]
    latency_ms: Option<u64>,

    /// Print JSON instead of formatted output
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// A single line typed into `shell`
#[derive(Parser)]
#[command(no_binary_name = true)]
struct ShellLine {
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Portfolio and earning overview
    Status,

    /// Token balances and prices
    Tokens,

    /// Transaction history, newest first
    History {
        /// Only transactions of this token
        #[arg(short, long)]
        token: Option<String>,

        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Claim pending earnings
    Claim,

    /// Stake PVS to raise the earning rate
    Stake {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },

    /// Return staked PVS to the wallet
    Unstake {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },

    /// List boosters, or toggle one by id
    Boost { id: Option<String> },

    /// Stop earning (pending rewards are claimed first)
    Pause,

    /// Resume earning
    Resume,

    /// Show today's missions
    Missions,

    /// Mark a mission completed (by number or id)
    Complete { mission: String },

    /// Claim the reward of a completed mission (by number or id)
    Reward { mission: String },

    /// Show the referral code, or register a new referral
    Referral {
        #[arg(long)]
        register: bool,
    },

    /// Send tokens to an address
    Send {
        to: String,
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        #[arg(short, long, default_value = PVS_TOKEN_ID)]
        token: String,
    },

    /// Browse the DApp catalog
    Dapps {
        /// All, DeFi, NFT, Gaming, Social or Utility
        #[arg(short, long)]
        category: Option<Category>,

        /// Case-insensitive search on name and description
        #[arg(short, long)]
        search: Option<String>,
    },

    /// In-app browser
    Browser {
        #[command(subcommand)]
        action: BrowserAction,
    },

    /// Watch pending earnings tick up
    Watch {
        #[arg(short, long, default_value = "10")]
        seconds: u64,
    },

    /// Show the effective config, or write it out
    Config {
        #[arg(long)]
        write: bool,
    },

    /// Read commands from stdin against one session
    Shell,
}

#[derive(Subcommand)]
enum BrowserAction {
    /// Load a URL or a catalog DApp id
    Open {
        target: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Show history and visited DApps
    History,
    /// Clear the page history
    Clear,
}

#[derive(Serialize)]
struct StatusView<'a> {
    address: &'a str,
    total_usd: f64,
    pending: f64,
    account: &'a economics::EarningAccount,
}

struct App {
    session: Session<SystemClock, FixedLatency>,
    catalog: Catalog,
    browser: BrowserHistory,
    config: Config,
    config_path: PathBuf,
    json: bool,
}

fn build_session(
    config: &Config,
    latency_ms: u64,
) -> CliResult<Session<SystemClock, FixedLatency>> {
    let clock = SystemClock;
    let now = clock.now();
    let state = SessionState {
        wallet: Wallet::with_tokens(config.wallet.address.clone(), default_tokens()),
        earning: EarningEngine::from_config(&config.earning, now)?,
        missions: MissionScheduler::new(&config.missions, now)?,
    };
    Ok(Session::new(state, clock, FixedLatency::from_millis(latency_ms)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl App {
    /// Resolve a 1-based mission number or an id prefix
    fn resolve_mission(&self, key: &str) -> CliResult<String> {
        let ids: Vec<String> = self
            .session
            .read(|s| s.missions.missions().iter().map(|m| m.id.clone()).collect());

        if let Ok(n) = key.parse::<usize>() {
            if n >= 1 && n <= ids.len() {
                return Ok(ids[n - 1].clone());
            }
        }
        let matches: Vec<&String> = ids.iter().filter(|id| id.starts_with(key)).collect();
        match matches.as_slice() {
            [id] => Ok((*id).clone()),
            [] => Err(format!("No mission matches '{}'", key).into()),
            _ => Err(format!("'{}' matches several missions", key).into()),
        }
    }

    async fn run(&mut self, command: Command) -> CliResult<()> {
        match command {
            Command::Status => {
                if self.config.wallet.price_jitter {
                    self.session.refresh_prices(&mut rand::rng());
                }
                let pending = self.session.pending_earnings();
                self.session.read(|s| {
                    if self.json {
                        print_json(&StatusView {
                            address: s.wallet.address(),
                            total_usd: s.wallet.total_usd_value(),
                            pending,
                            account: s.earning.account(),
                        })
                    } else {
                        display::header("👛 PVS Wallet");
                        println!("{:<15} {}", "Address:".yellow().bold(), s.wallet.address());
                        display::tokens(s.wallet.tokens(), s.wallet.total_usd_value());
                        display::account(s.earning.account(), pending);
                        Ok(())
                    }
                })?;
            }

            Command::Tokens => {
                if self.config.wallet.price_jitter {
                    self.session.refresh_prices(&mut rand::rng());
                }
                self.session.read(|s| {
                    if self.json {
                        print_json(s.wallet.tokens())
                    } else {
                        display::tokens(s.wallet.tokens(), s.wallet.total_usd_value());
                        Ok(())
                    }
                })?;
            }

            Command::History { token, limit } => {
                self.session.read(|s| {
                    let mut txs = match &token {
                        Some(id) => s.wallet.transactions_for(id),
                        None => s.wallet.transactions(),
                    };
                    txs.truncate(limit);
                    if self.json {
                        print_json(&txs)
                    } else {
                        display::transactions(&txs);
                        Ok(())
                    }
                })?;
            }

            Command::Claim => {
                let claimed = self.session.claim_earnings().await?;
                if self.json {
                    print_json(&serde_json::json!({ "claimed": claimed }))?;
                } else {
                    display::success(&format!("Claimed {:.6} PVS", claimed));
                }
            }

            Command::Stake { amount } => {
                self.session.stake_tokens(amount).await?;
                self.report_account(&format!("Staked {} PVS", amount))?;
            }

            Command::Unstake { amount } => {
                self.session.unstake_tokens(amount).await?;
                self.report_account(&format!("Unstaked {} PVS", amount))?;
            }

            Command::Boost { id: None } => {
                self.session.read(|s| {
                    if self.json {
                        print_json(s.earning.boosters())
                    } else {
                        display::boosters(s.earning.boosters());
                        Ok(())
                    }
                })?;
            }

            Command::Boost { id: Some(id) } => {
                let active = self.session.toggle_booster(&id)?;
                let verb = if active { "activated" } else { "deactivated" };
                self.report_account(&format!("Booster {} {}", id, verb))?;
            }

            Command::Pause => {
                let settled = self.session.pause_earning()?;
                self.report_account(&format!("Earning paused ({:.6} PVS claimed)", settled))?;
            }

            Command::Resume => {
                self.session.resume_earning();
                self.report_account("Earning resumed")?;
            }

            Command::Missions => {
                self.session.refresh_missions();
                let now = self.session.clock().now();
                self.session.read(|s| {
                    if self.json {
                        print_json(s.missions.missions())
                    } else {
                        display::missions(
                            s.missions.missions(),
                            s.missions.next_refresh_at(),
                            now,
                        );
                        Ok(())
                    }
                })?;
            }

            Command::Complete { mission } => {
                let id = self.resolve_mission(&mission)?;
                self.session.complete_mission(&id).await?;
                if self.json {
                    print_json(&serde_json::json!({ "completed": id }))?;
                } else {
                    display::success("Mission completed");
                }
            }

            Command::Reward { mission } => {
                let id = self.resolve_mission(&mission)?;
                let reward = self.session.claim_mission_reward(&id).await?;
                if self.json {
                    print_json(&serde_json::json!({ "mission": id, "reward": reward }))?;
                } else {
                    display::success(&format!("Mission reward: {:.2} PVS", reward));
                }
            }

            Command::Referral { register } => {
                if register {
                    let reward = self.session.register_referral()?;
                    if !self.json {
                        display::success(&format!("Referral registered (+{:.2} PVS)", reward));
                    }
                }
                self.session.read(|s| {
                    if self.json {
                        print_json(s.missions.referral())
                    } else {
                        display::referral(s.missions.referral());
                        Ok(())
                    }
                })?;
            }

            Command::Send { to, amount, token } => {
                if !self.json {
                    display::hint("Broadcasting...");
                }
                let tx = self.session.send_token(&to, amount, &token).await?;
                if self.json {
                    print_json(&tx)?;
                } else {
                    display::success(&format!(
                        "Sent {} {} to {} ({})",
                        amount,
                        token.to_uppercase(),
                        tx.short_counterparty().unwrap_or_default(),
                        tx.status
                    ));
                    if let Some(hash) = &tx.hash {
                        display::hint(&format!("  {}", hash));
                    }
                }
            }

            Command::Dapps { category, search } => {
                let category = category.unwrap_or(Category::All);
                let mut dapps = match &search {
                    Some(query) => self.catalog.search(query),
                    None => self.catalog.by_category(category),
                };
                dapps.retain(|d| category.matches(d.category));

                if self.json {
                    print_json(&dapps)?;
                } else if search.is_none() && category == Category::All {
                    display::dapps("⭐ Featured", &self.catalog.featured());
                    display::dapps("🔥 Popular DApps", &self.catalog.popular());
                    display::dapps("📚 All DApps", &dapps);
                } else {
                    display::dapps(&format!("{} DApps", category), &dapps);
                }
            }

            Command::Browser { action } => self.browse(action)?,

            Command::Watch { seconds } => {
                let mut ticker = self
                    .session
                    .pending_ticker(std::time::Duration::from_secs(1));
                for _ in 0..seconds {
                    match ticker.next().await {
                        Some(pending) if self.json => {
                            println!("{}", serde_json::json!({ "pending": pending }))
                        }
                        Some(pending) => println!("  ⏱  {:.6} PVS", pending.bright_green()),
                        None => break,
                    }
                }
            }

            Command::Config { write } => {
                if write {
                    self.config.save(&self.config_path)?;
                    display::success(&format!("Wrote {}", self.config_path.display()));
                } else if self.json {
                    print_json(&self.config)?;
                } else {
                    print!("{}", self.config.to_toml()?);
                }
            }

            Command::Shell => {
                display::hint("Nested shells are not supported");
            }
        }
        Ok(())
    }

    fn browse(&mut self, action: BrowserAction) -> CliResult<()> {
        match action {
            BrowserAction::Open { target, title } => {
                let url = match self.catalog.find(&target) {
                    Some(dapp) => dapp.url.clone(),
                    None => normalize_url(&target),
                };
                let now = self.session.clock().now();
                match self
                    .browser
                    .record_visit(&url, title.as_deref(), &self.catalog, now)
                {
                    Some(entry) if self.json => print_json(entry)?,
                    Some(entry) => display::success(&format!(
                        "Opened {}{}",
                        entry.url,
                        if entry.is_dapp { " (dapp)" } else { "" }
                    )),
                    None => display::hint("Nothing to open"),
                }
            }
            BrowserAction::History => {
                if self.json {
                    print_json(&serde_json::json!({
                        "history": self.browser.history(),
                        "visited_dapps": self.browser.visited_dapps(),
                    }))?;
                } else {
                    display::history(self.browser.history(), self.browser.visited_dapps());
                }
            }
            BrowserAction::Clear => {
                self.browser.clear_history();
                display::success("History cleared");
            }
        }
        Ok(())
    }

    fn report_account(&self, message: &str) -> CliResult<()> {
        let pending = self.session.pending_earnings();
        self.session.read(|s| {
            if self.json {
                print_json(s.earning.account())
            } else {
                display::success(message);
                display::account(s.earning.account(), pending);
                Ok(())
            }
        })
    }

    async fn shell(&mut self) -> CliResult<()> {
        display::header("🪐 PVS Wallet shell");
        display::hint("Type a command (e.g. `status`, `stake 100`), `help`, or `quit`");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{} ", "pvs>".cyan().bold());
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let words: Vec<&str> = line.split_whitespace().collect();
            match words.as_slice() {
                [] => continue,
                ["quit"] | ["exit"] => break,
                _ => {}
            }

            match ShellLine::try_parse_from(words.iter().copied()) {
                Ok(parsed) => {
                    let json = self.json;
                    self.json = json || parsed.json;
                    if let Err(e) = self.run(parsed.command).await {
                        display::failure(&e.to_string());
                    }
                    self.json = json;
                }
                Err(e) => {
                    let _ = e.print();
                }
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> CliResult<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = start(Cli::parse()).await {
        display::failure(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}

async fn start(cli: Cli) -> CliResult<()> {
    let config_path = cli.config.unwrap_or_else(Config::default_path);
    let config = Config::load(&config_path)?;
    let latency_ms = cli.latency_ms.unwrap_or(config.latency.millis);
    log::debug!("Session latency {}ms", latency_ms);

    let mut app = App {
        session: build_session(&config, latency_ms)?,
        catalog: Catalog::default(),
        browser: BrowserHistory::new(),
        config,
        config_path,
        json: cli.json,
    };

    match cli.command {
        Command::Shell => app.shell().await,
        command => app.run(command).await,
    }
}
