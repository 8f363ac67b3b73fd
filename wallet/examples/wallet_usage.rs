use chrono::Utc;
use wallet::{TransactionStatus, Wallet, PVS_TOKEN_ID};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== PVS Wallet Example ===\n");

    let mut wallet = Wallet::demo();
    println!("✓ Wallet created!");
    println!("  Address: {}", wallet.address());
    for token in wallet.tokens() {
        println!("  {:>6} {:>12.4}  (${:.2})", token.symbol, token.balance, token.usd_value());
    }
    println!("  Portfolio: ${:.2}\n", wallet.total_usd_value());

    println!("Simulating receiving 0.5 ETH...");
    wallet.receive(
        "0x1234567890abcdef1234567890abcdef12345678",
        0.5,
        "eth",
        Utc::now(),
    )?;
    println!("✓ New ETH balance: {:.4}\n", wallet.token_balance("eth"));

    println!("Sending 100 $PVS...");
    let tx = wallet.send_token(
        "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd",
        100.0,
        PVS_TOKEN_ID,
        Utc::now(),
        TransactionStatus::Completed,
    )?;
    println!("✓ Transaction recorded!");
    println!("  Id:   {}", tx.id);
    println!("  Hash: {}", tx.hash.as_deref().unwrap_or("-"));
    println!("  To:   {}\n", tx.short_counterparty().unwrap_or_default());

    println!("History (newest first):");
    for tx in wallet.transactions() {
        println!("  {:<9} {:>10.4} {}", tx.kind.title(), tx.signed_amount(), tx.token_id);
    }

    Ok(())
}
