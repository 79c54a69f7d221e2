use assert_cmd::cargo_bin;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn run(dir: &Path, args: &[&str]) -> std::process::Output {
    let mut cmd = Command::new(cargo_bin!("chainbook"));
    cmd.arg("--accounts-file")
        .arg(dir.join("accounts.txt"))
        .arg("--chain-file")
        .arg(dir.join("chain.txt"))
        .args(args);
    cmd.output().expect("Failed to execute command")
}

#[test]
fn test_state_recovery_across_runs() {
    let dir = tempdir().unwrap();

    // 1. Build up state over several separate invocations.
    assert!(run(dir.path(), &["create"]).status.success());
    assert!(run(dir.path(), &["create"]).status.success());
    assert!(run(dir.path(), &["credit", "0", "100"]).status.success());
    assert!(run(dir.path(), &["transfer", "0", "1", "40"]).status.success());

    // 2. A fresh process reloads everything from the flat files.
    let output = run(dir.path(), &["accounts"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Account 0: balance 60"));
    assert!(stdout.contains("Account 1: balance 40"));

    // 3. The chain keeps numbering where the last run left off.
    let output = run(dir.path(), &["transfer", "1", "0", "10"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("recorded as block #1"));
}

#[test]
fn test_files_use_space_separated_records() {
    let dir = tempdir().unwrap();

    assert!(run(dir.path(), &["create", "--balance", "100"]).status.success());
    assert!(run(dir.path(), &["create"]).status.success());
    assert!(run(dir.path(), &["transfer", "0", "1", "30"]).status.success());

    let accounts = std::fs::read_to_string(dir.path().join("accounts.txt")).unwrap();
    assert_eq!(accounts, "0 70\n1 30\n");

    let chain = std::fs::read_to_string(dir.path().join("chain.txt")).unwrap();
    let fields: Vec<&str> = chain.trim_end().split(' ').collect();
    assert_eq!(fields.len(), 5);
    assert_eq!(fields[0], "0");
    assert_eq!(fields[2], "0");
    assert_eq!(fields[3], "1");
    assert_eq!(fields[4], "30");
}

#[test]
fn test_json_output_parses() {
    let dir = tempdir().unwrap();

    assert!(run(dir.path(), &["create", "--balance", "75"]).status.success());
    assert!(run(dir.path(), &["create"]).status.success());
    assert!(run(dir.path(), &["transfer", "0", "1", "25"]).status.success());

    let output = run(dir.path(), &["accounts", "--json"]);
    assert!(output.status.success());
    let accounts: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(accounts[0]["id"], 0);
    assert_eq!(accounts[0]["balance"], 50);
    assert_eq!(accounts[1]["balance"], 25);

    let output = run(dir.path(), &["blocks", "--json"]);
    assert!(output.status.success());
    let blocks: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(blocks[0]["index"], 0);
    assert_eq!(blocks[0]["transaction"]["from"], 0);
    assert_eq!(blocks[0]["transaction"]["to"], 1);
    assert_eq!(blocks[0]["transaction"]["amount"], 25);

    let output = run(dir.path(), &["balance", "1", "--json"]);
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["stored"], 25);
    assert_eq!(report["replayed"], 25);
}
