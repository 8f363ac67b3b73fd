//! Terminal rendering for wallet, earning and explorer views

use chrono::{DateTime, Duration, Utc};
use economics::{Booster, EarningAccount, Mission, Referral};
use explorer::{DApp, HistoryEntry};
use owo_colors::OwoColorize;
use wallet::{Token, Transaction, TransactionStatus};

pub fn header(title: &str) {
    println!("\n{}", title.cyan().bold());
    println!("{}", "═══════════════════════════════════".cyan());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn failure(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn hint(message: &str) {
    println!("{}", message.dimmed());
}

pub fn tokens(tokens: &[Token], total_usd: f64) {
    header("💰 Portfolio");
    for token in tokens {
        let change = format!("{:+.2}%", token.change_24h);
        let change = if token.change_24h >= 0.0 {
            change.green().to_string()
        } else {
            change.red().to_string()
        };
        println!(
            "  {:<6} {:>14.4}  {:>12}  {}",
            token.symbol.bold(),
            token.balance,
            format!("${:.2}", token.usd_value()),
            change
        );
    }
    println!("  {:<6} {:>29}", "Total".yellow().bold(), format!("${:.2}", total_usd));
}

pub fn account(account: &EarningAccount, pending: f64) {
    header("⛏️  Earning");
    let state = if account.is_active {
        "earning".green().to_string()
    } else {
        "paused".yellow().to_string()
    };
    println!("{:<15} {}", "State:".yellow().bold(), state);
    println!(
        "{:<15} {:.2}/h x {:.3} = {:.4}/h",
        "Rate:".yellow().bold(),
        account.base_rate,
        account.boost_multiplier,
        account.effective_rate()
    );
    println!("{:<15} {:.6}", "Pending:".yellow().bold(), pending.bright_green());
    println!("{:<15} {:.6}", "Total earned:".yellow().bold(), account.total_earned);
    println!("{:<15} {:.4}", "Staked:".yellow().bold(), account.staked_amount);
    println!(
        "{:<15} {}",
        "Last claim:".yellow().bold(),
        account.last_claim_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

pub fn boosters(boosters: &[Booster]) {
    header("🚀 Boosters");
    for booster in boosters {
        let mark = if booster.is_active {
            "●".green().to_string()
        } else {
            "○".dimmed().to_string()
        };
        println!(
            "  {} {:<16} {:<18} +{:.0}%",
            mark,
            booster.id,
            booster.name,
            booster.bonus * 100.0
        );
    }
}

pub fn transactions(transactions: &[&Transaction]) {
    header("📜 Transactions");
    if transactions.is_empty() {
        hint("  No transactions yet");
        return;
    }
    for tx in transactions {
        let status = match tx.status {
            TransactionStatus::Completed => tx.status.to_string().green().to_string(),
            TransactionStatus::Pending => tx.status.to_string().yellow().to_string(),
            TransactionStatus::Failed => tx.status.to_string().red().to_string(),
        };
        let amount = format!("{:+.4} {}", tx.signed_amount(), tx.token_id.to_uppercase());
        println!(
            "  {}  {:<9} {:>20}  {:<10} {}",
            tx.timestamp.format("%m-%d %H:%M:%S"),
            tx.kind.title(),
            amount,
            status,
            tx.short_counterparty().unwrap_or_default().dimmed()
        );
    }
}

fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes();
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

pub fn missions(missions: &[Mission], next_refresh: DateTime<Utc>, now: DateTime<Utc>) {
    header("🎯 Daily Missions");
    if missions.is_empty() {
        hint("  All missions claimed");
    }
    for (i, mission) in missions.iter().enumerate() {
        let state = if mission.completed {
            "ready to claim".green().to_string()
        } else if mission.is_expired(now) {
            "expired".red().to_string()
        } else {
            format!("{} left", format_remaining(mission.time_remaining(now)))
        };
        println!(
            "  {}. {:<24} {:>6.1} PVS  {}",
            i + 1,
            mission.title.bold(),
            mission.reward,
            state
        );
        println!("     {}", mission.description.dimmed());
    }
    let wait = next_refresh - now;
    if wait > Duration::zero() {
        hint(&format!("  New missions in {}", format_remaining(wait)));
    } else {
        hint("  New missions available");
    }
}

pub fn referral(referral: &Referral) {
    header("🤝 Referral");
    println!("{:<12} {}", "Code:".yellow().bold(), referral.code.bright_blue());
    println!("{:<12} {}", "Referrals:".yellow().bold(), referral.total_referrals);
    println!("{:<12} {:.2} PVS", "Earned:".yellow().bold(), referral.total_earned);
}

pub fn dapps(title: &str, dapps: &[&DApp]) {
    header(title);
    if dapps.is_empty() {
        hint("  No DApps found");
    }
    for dapp in dapps {
        let star = if dapp.featured { "★" } else { " " };
        println!(
            "  {} {:<16} {:<8} {}",
            star.yellow(),
            dapp.name.bold(),
            dapp.category,
            dapp.url.bright_blue()
        );
        println!("    {}", dapp.description.dimmed());
    }
}

pub fn history(entries: &[HistoryEntry], visited: &[String]) {
    header("🌐 Browser History");
    if entries.is_empty() {
        hint("  History is empty");
    }
    for entry in entries {
        let tag = if entry.is_dapp { "dapp" } else { "web" };
        println!(
            "  {}  {:<4} {}",
            entry.timestamp.format("%H:%M:%S"),
            tag.magenta(),
            entry.title
        );
    }
    if !visited.is_empty() {
        println!("\n{}", "Visited DApps".yellow().bold());
        for url in visited {
            println!("  {}", url.bright_blue());
        }
    }
}
