//! End-to-end runs of the `hetucli` binary that need no node.

mod common;

use common::{TEST_ADDRESS, TEST_KEY};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn hetucli(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hetucli"))
        .arg("--config")
        .arg(home.join("config.yml"))
        .arg("--wallet-path")
        .arg(home.join("wallets"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_create_then_list() {
    let home = TempDir::new().unwrap();

    let created = hetucli(home.path(), &["wallet", "create", "--password", "x"]);
    assert!(created.status.success(), "{}", stdout(&created));
    let out = stdout(&created);
    assert!(out.contains("Address: 0x"));
    assert!(home.path().join("config.yml").is_file());

    let listed = hetucli(home.path(), &["wallet", "list"]);
    assert!(listed.status.success());
    let out = stdout(&listed);
    assert!(out.contains("Wallets in"));
    assert_eq!(out.lines().filter(|l| l.starts_with("  - 0x")).count(), 1);
}

#[test]
fn test_import_unlock_export() {
    let home = TempDir::new().unwrap();

    let imported = hetucli(
        home.path(),
        &["wallet", "import", TEST_KEY, "--password", "pw"],
    );
    assert!(imported.status.success(), "{}", stdout(&imported));
    assert!(stdout(&imported).contains(TEST_ADDRESS));

    let unlocked = hetucli(
        home.path(),
        &["wallet", "unlock", TEST_ADDRESS, "--password", "pw"],
    );
    assert!(unlocked.status.success());
    assert!(stdout(&unlocked).contains(&format!("Unlocked address: {}", TEST_ADDRESS)));

    let exported = hetucli(
        home.path(),
        &["wallet", "export-privkey", TEST_ADDRESS, "--password", "pw"],
    );
    assert!(exported.status.success());
    assert!(stdout(&exported).contains(&format!("Private key (hex): {}", TEST_KEY)));
}

#[test]
fn test_wrong_password_exits_nonzero() {
    let home = TempDir::new().unwrap();
    hetucli(
        home.path(),
        &["wallet", "import", TEST_KEY, "--password", "pw"],
    );

    let unlocked = hetucli(
        home.path(),
        &["wallet", "unlock", TEST_ADDRESS, "--password", "nope"],
    );
    assert_eq!(unlocked.status.code(), Some(1));
    assert!(stdout(&unlocked).contains("wrong password"));
}

#[test]
fn test_empty_wallet_dir() {
    let home = TempDir::new().unwrap();
    let listed = hetucli(home.path(), &["wallet", "list"]);
    assert!(listed.status.success());
    assert!(stdout(&listed).contains("No wallet directory found"));
}

#[test]
fn test_missing_abi_fails_without_network() {
    let home = TempDir::new().unwrap();
    let output = hetucli(
        home.path(),
        &[
            "contract",
            "call",
            "--address",
            "0x9cCb4A38a208409422969737977696B8189eF96a",
            "--abi-path",
            home.path().join("missing.abi").to_str().unwrap(),
            "--function",
            "balanceOf",
            "--rpc",
            "http://127.0.0.1:1",
        ],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("ABI not found"));
}
