//! Runs the `pvs-wallet` binary against a throwaway config directory

use std::io::Write;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn pvs(dir: &TempDir, args: &[&str]) -> Output {
    let config = dir.path().join("config.toml");
    Command::new(env!("CARGO_BIN_EXE_pvs-wallet"))
        .arg("--config")
        .arg(&config)
        .args(["--latency-ms", "0"])
        .args(args)
        .output()
        .expect("failed to run pvs-wallet")
}

fn json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

#[test]
fn test_claim_reports_accrued_hour() {
    let dir = TempDir::new().unwrap();
    let value = json(&pvs(&dir, &["claim", "--json"]));

    let claimed = value["claimed"].as_f64().unwrap();
    assert!(claimed >= 6.0 && claimed < 6.1, "claimed {}", claimed);
}

#[test]
fn test_stake_updates_rate_and_boost() {
    let dir = TempDir::new().unwrap();
    let account = json(&pvs(&dir, &["stake", "1000", "--json"]));

    assert_eq!(account["base_rate"].as_f64(), Some(15.0));
    assert!((account["boost_multiplier"].as_f64().unwrap() - 2.2).abs() < 1e-9);
    assert_eq!(account["staked_amount"].as_f64(), Some(1000.0));
}

#[test]
fn test_rejected_stake_fails() {
    let dir = TempDir::new().unwrap();
    let output = pvs(&dir, &["stake", "5000"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Insufficient balance"), "stderr: {}", stderr);
}

#[test]
fn test_negative_stake_is_invalid_amount() {
    let dir = TempDir::new().unwrap();
    for args in [&["stake", "-5"][..], &["unstake", "-5"], &["send", "0xabc", "-5"]] {
        let output = pvs(&dir, args);

        assert!(!output.status.success());
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Invalid amount"), "stderr: {}", stderr);
    }
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.toml"), "[earning]\nbase_rate = -5.0\n").unwrap();

    let output = pvs(&dir, &["status"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("base_rate"), "stderr: {}", stderr);

    std::fs::write(
        dir.path().join("config.toml"),
        "[missions]\ncooldown_hours = 922337203685477580\n",
    )
    .unwrap();
    assert!(!pvs(&dir, &["status"]).status.success());
}

#[test]
fn test_dapps_by_category() {
    let dir = TempDir::new().unwrap();
    let value = json(&pvs(&dir, &["dapps", "--category", "defi", "--json"]));

    let ids: Vec<&str> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["uniswap", "aave", "compound", "curve", "sushiswap"]);
}

#[test]
fn test_config_file_is_honoured() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("config.toml"),
        "[earning]\nbase_rate = 10.0\naccrued_hours = 2.0\n",
    )
    .unwrap();

    let value = json(&pvs(&dir, &["claim", "--json"]));
    // 10/h at the default 1.2x boost for two hours
    let claimed = value["claimed"].as_f64().unwrap();
    assert!(claimed >= 24.0 && claimed < 24.1, "claimed {}", claimed);
}

#[test]
fn test_config_write() {
    let dir = TempDir::new().unwrap();
    let output = pvs(&dir, &["config", "--write"]);

    assert!(output.status.success());
    let written = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(written.contains("[earning]"));
    assert!(written.contains("[[earning.boosters]]"));
}

#[test]
fn test_shell_keeps_one_session() {
    let dir = TempDir::new().unwrap();
    let mut child = Command::new(env!("CARGO_BIN_EXE_pvs-wallet"))
        .arg("--config")
        .arg(dir.path().join("config.toml"))
        .args(["--latency-ms", "0", "shell"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"stake 1000\nunstake 1000\nstake 5000\nclaim\nquit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Unstaked 1000 PVS"), "stdout: {}", stdout);
    assert!(stdout.contains("Claimed"), "stdout: {}", stdout);
    assert!(stderr.contains("Insufficient balance"), "stderr: {}", stderr);
}
