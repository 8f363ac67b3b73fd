use chrono::{Duration, Utc};
use ::wallet::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_wallet_ledger_contract() {
    init_logging();
    let mut wallet = Wallet::demo();
    let ledger: &mut dyn WalletLedger = &mut wallet;

    assert_eq!(ledger.balance(PVS_TOKEN_ID), Some(1250.0));
    ledger.set_balance(PVS_TOKEN_ID, 1300.0).unwrap();

    let tx = ledger.append_transaction(NewTransaction::completed(
        TransactionKind::Earn,
        50.0,
        PVS_TOKEN_ID,
        Utc::now(),
    ));
    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(ledger.balance(PVS_TOKEN_ID), Some(1300.0));

    assert_eq!(wallet.transactions().len(), 1);
    assert_eq!(wallet.transaction(&tx.id), Some(&tx));
}

#[test]
fn test_history_per_token() {
    init_logging();
    let mut wallet = Wallet::demo();
    let start = Utc::now();

    wallet
        .receive("0xfeedfeedfeedfeedfeedfeedfeedfeedfeedfeed", 1.0, "eth", start)
        .unwrap();
    wallet
        .send_token(
            "0xfeedfeedfeedfeedfeedfeedfeedfeedfeedfeed",
            10.0,
            "usdc",
            start + Duration::seconds(1),
            TransactionStatus::Completed,
        )
        .unwrap();
    wallet
        .send_token(
            "0xfeedfeedfeedfeedfeedfeedfeedfeedfeedfeed",
            0.25,
            "eth",
            start + Duration::seconds(2),
            TransactionStatus::Completed,
        )
        .unwrap();

    let eth: Vec<_> = wallet.transactions_for("eth");
    assert_eq!(eth.len(), 2);
    assert_eq!(eth[0].kind, TransactionKind::Send);
    assert_eq!(eth[1].kind, TransactionKind::Receive);
    assert!((wallet.token_balance("eth") - 2.2).abs() < 1e-9);
}

#[test]
fn test_transaction_json_shape() {
    let mut wallet = Wallet::demo();
    let tx = wallet
        .send_token(
            "0xfeedfeedfeedfeedfeedfeedfeedfeedfeedfeed",
            1.0,
            PVS_TOKEN_ID,
            Utc::now(),
            TransactionStatus::Pending,
        )
        .unwrap();

    let json = serde_json::to_value(&tx).unwrap();
    assert_eq!(json["kind"], "send");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["token_id"], PVS_TOKEN_ID);

    let earn = wallet.append_transaction(NewTransaction::completed(
        TransactionKind::Earn,
        1.0,
        PVS_TOKEN_ID,
        Utc::now(),
    ));
    let json = serde_json::to_value(&earn).unwrap();
    assert!(json.get("counterparty").is_none());
    assert!(json.get("hash").is_none());
}
