//! Configuration layering: defaults, then the file, then command line values.

use hetu_cli::config::{CliOverrides, Config, ContractKey};
use hetu_cli::core::constants::DEFAULT_JSON_RPC;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_first_load_seeds_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yml");

    let config = Config::load(Some(&path), &CliOverrides::default()).unwrap();
    assert_eq!(config, Config::default());
    assert!(path.is_file());

    let reloaded = Config::from_file(&path).unwrap();
    assert_eq!(reloaded, config);
}

#[test]
fn test_precedence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yml");
    std::fs::write(
        &path,
        "json_rpc: http://file:8545\nnetwork: testnet\nwallet_path: /tmp/file-wallets\n",
    )
    .unwrap();

    let overrides = CliOverrides {
        json_rpc: Some("http://cli:8545".to_string()),
        wallet_path: Some(String::new()),
        ..CliOverrides::default()
    };
    let config = Config::load(Some(&path), &overrides).unwrap();

    assert_eq!(config.json_rpc, "http://cli:8545");
    assert_eq!(config.network, "testnet");
    // empty command line values do not clobber the file
    assert_eq!(config.wallet_path, "/tmp/file-wallets");
    assert_eq!(config.rpc_url().unwrap(), "http://cli:8545");
}

#[test]
fn test_missing_rpc_and_contract() {
    let config = Config::from_yaml_str("json_rpc: ''\nweights_address: ''\n").unwrap();
    assert_eq!(
        config.rpc_url().unwrap_err().to_string(),
        "No RPC URL found in config or CLI."
    );
    assert_eq!(
        config
            .contract_address(ContractKey::Weights)
            .unwrap_err()
            .to_string(),
        "No weights_address found in config or CLI."
    );
    assert!(config.contract_address(ContractKey::Whetu).is_ok());
}

#[test]
fn test_receipt_settings() {
    let config = Config::from_yaml_str("receipt_timeout: 5\nreceipt_poll_interval: 250\n").unwrap();
    assert_eq!(config.receipt_timeout(), Duration::from_secs(5));
    assert_eq!(config.receipt_poll_interval(), Duration::from_millis(250));
    assert_eq!(Config::default().json_rpc, DEFAULT_JSON_RPC);
}

#[test]
fn test_abi_dir_override() {
    let config = Config::from_yaml_str("abi_dir: /opt/abis\n").unwrap();
    assert_eq!(config.abi_dir(), std::path::PathBuf::from("/opt/abis"));
    assert!(Config::default().abi_dir().join("ERC20.abi").is_file());
}
