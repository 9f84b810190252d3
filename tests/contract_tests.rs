//! Contract wrappers and command flows against a scripted node.

mod common;

use clap::Parser;
use common::{receipt, MockNode, TEST_KEY};
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};
use hetu_cli::cli::{dispatch, Cli, CommandContext};
use hetu_cli::config::bundled_abi_dir;
use hetu_cli::contracts::amm::SwapSimulation;
use hetu_cli::contracts::{ContractError, ContractWrapper, Erc20, SubnetAmm, SubnetHyperparams};
use hetu_cli::{Config, Error, RpcClient};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn amm(node: &Arc<MockNode>) -> SubnetAmm {
    SubnetAmm::load(
        Address::repeat_byte(0x36),
        RpcClient::new(node.clone()),
        &bundled_abi_dir(),
    )
    .unwrap()
}

async fn run(node: &Arc<MockNode>, config: Config, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["hetucli"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).unwrap();
    let ctx = CommandContext::with_transport(config, node.clone());
    dispatch(cli.command, &ctx).await
}

#[tokio::test]
async fn test_zero_simulation_means_insufficient_liquidity() {
    let node = Arc::new(MockNode::new());
    node.reply_call("simSwapHETUForAlpha(uint256)", &[Token::Uint(U256::zero())]);
    let amm = amm(&node);

    let result = amm.sim_swap_hetu_for_alpha(U256::exp10(19)).await;
    assert_eq!(
        SwapSimulation::from_result(result),
        SwapSimulation::InsufficientLiquidity
    );
}

#[tokio::test]
async fn test_simulation_quote() {
    let node = Arc::new(MockNode::new());
    node.reply_call(
        "simSwapAlphaForHETU(uint256)",
        &[Token::Uint(U256::from(1234u64))],
    );
    let result = amm(&node).sim_swap_alpha_for_hetu(U256::exp10(18)).await;
    assert_eq!(
        SwapSimulation::from_result(result),
        SwapSimulation::Quote(U256::from(1234u64))
    );
}

#[tokio::test]
async fn test_unknown_method_fails_before_rpc() {
    let node = Arc::new(MockNode::new());
    let amm = amm(&node);

    let err = amm.handle().query("mintForFree", &[]).await.unwrap_err();
    assert!(matches!(err, ContractError::UnsupportedMethod(_)));
    assert_eq!(err.to_string(), "unsupported method: mintForFree");
    assert_eq!(node.total_calls(), 0);
}

#[test]
fn test_missing_abi_fails_before_rpc() {
    let node = Arc::new(MockNode::new());
    let dir = TempDir::new().unwrap();

    let err = SubnetAmm::load(Address::zero(), RpcClient::new(node.clone()), dir.path()).unwrap_err();
    assert!(err.to_string().starts_with("ABI not found: "));
    assert!(err.to_string().ends_with("SubnetAMM.abi"));
    assert_eq!(node.total_calls(), 0);
}

#[tokio::test]
async fn test_erc20_reads() {
    let node = Arc::new(MockNode::new());
    node.reply_call("decimals()", &[Token::Uint(U256::from(18u64))]);
    node.reply_call("symbol()", &[Token::String("WHETU".into())]);
    node.reply_call(
        "balanceOf(address)",
        &[Token::Uint(U256::exp10(18) * 3)],
    );
    let token = Erc20::load(
        Address::repeat_byte(0xbc),
        RpcClient::new(node.clone()),
        &bundled_abi_dir(),
    )
    .unwrap();

    assert_eq!(token.decimals().await.unwrap(), 18);
    assert_eq!(token.symbol().await.unwrap(), "WHETU");
    assert_eq!(
        token.balance_of(Address::repeat_byte(1)).await.unwrap(),
        U256::exp10(18) * 3
    );
    assert_eq!(node.count("eth_call"), 3);
}

#[tokio::test]
async fn test_whetu_total_supply_command() {
    let node = Arc::new(MockNode::new());
    node.reply_call("decimals()", &[Token::Uint(U256::from(18u64))]);
    node.reply_call("totalSupply()", &[Token::Uint(U256::exp10(21))]);

    run(&node, Config::default(), &["whetu", "total-supply"])
        .await
        .unwrap();
    assert_eq!(node.count("eth_call"), 2);
}

#[tokio::test]
async fn test_add_stake_without_whetu_stops_before_signing() {
    let node = Arc::new(MockNode::with_tx_defaults());
    node.reply_call(
        "hetuToken()",
        &[Token::Address(Address::repeat_byte(0xbc))],
    );
    node.reply_call("balanceOf(address)", &[Token::Uint(U256::zero())]);

    let err = run(
        &node,
        Config::default(),
        &["stake", "add-stake", "--amount", "100", "--private-key", TEST_KEY],
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("whetu deposit"));
    assert_eq!(node.count("eth_sendRawTransaction"), 0);
}

#[tokio::test]
async fn test_failed_receipt_is_an_error_with_block() {
    let node = Arc::new(MockNode::with_tx_defaults());
    node.reply_call("decimals()", &[Token::Uint(U256::from(18u64))]);
    node.reply("eth_getTransactionReceipt", receipt("0x0", "0x2a"));

    let err = run(
        &node,
        Config::default(),
        &[
            "whetu",
            "approve",
            "--spender",
            "0x9cCb4A38a208409422969737977696B8189eF96a",
            "--amount",
            "1.5",
            "--private-key",
            TEST_KEY,
        ],
    )
    .await
    .unwrap_err();

    match err.downcast_ref::<Error>() {
        Some(Error::TransactionFailed { label, block, .. }) => {
            assert_eq!(label, "Approve");
            assert_eq!(block, "42");
        }
        other => panic!("expected a failed transaction, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Approve failed in block 42");
}

#[tokio::test]
async fn test_missing_receipt_reports_pending() {
    let node = Arc::new(MockNode::with_tx_defaults());
    node.reply("eth_getBalance", json!("0xde0b6b3a7640000"));
    node.reply("eth_getTransactionReceipt", Value::Null);
    let config = Config {
        receipt_timeout: 0,
        receipt_poll_interval: 1,
        ..Config::default()
    };

    let err = run(
        &node,
        config,
        &[
            "tx",
            "send",
            "--private-key",
            TEST_KEY,
            "--to",
            "0x9cCb4A38a208409422969737977696B8189eF96a",
            "--value",
            "0.5",
        ],
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::TransactionPending { label, .. }) if label == "Transfer"
    ));
    assert_eq!(node.count("eth_sendRawTransaction"), 1);
}

#[tokio::test]
async fn test_send_more_than_balance_is_rejected() {
    let node = Arc::new(MockNode::with_tx_defaults());
    node.reply("eth_getBalance", json!("0x1"));

    let err = run(
        &node,
        Config::default(),
        &[
            "tx",
            "send",
            "--private-key",
            TEST_KEY,
            "--to",
            "0x9cCb4A38a208409422969737977696B8189eF96a",
            "--value",
            "2",
        ],
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Insufficient balance"));
    assert_eq!(node.count("eth_sendRawTransaction"), 0);
}

fn subnet_params(threshold: U256, burn: U256) -> SubnetHyperparams {
    SubnetHyperparams {
        rho: 10,
        kappa: 32767,
        immunity_period: 7200,
        tempo: 360,
        max_validators: 64,
        activity_cutoff: 5000,
        max_allowed_uids: 4096,
        max_allowed_validators: 128,
        min_allowed_weights: 1,
        max_weights_limit: 1000,
        base_burn_cost: burn,
        current_difficulty: 10_000_000,
        target_regs_per_interval: 2,
        max_regs_per_block: 1,
        weights_rate_limit: 100,
        registration_allowed: true,
        commit_reveal_enabled: false,
        commit_reveal_period: 1000,
        serving_rate_limit: 50,
        validator_threshold: threshold,
        neuron_threshold: threshold,
    }
}

fn active_subnet(netuid: u16) -> Token {
    Token::Tuple(vec![
        Token::Uint(U256::from(netuid)),
        Token::Address(Address::repeat_byte(0x01)),
        Token::Address(Address::repeat_byte(0x02)),
        Token::Address(Address::repeat_byte(0x36)),
        Token::Uint(U256::exp10(20)),
        Token::Uint(U256::exp10(20)),
        Token::Uint(U256::zero()),
        Token::Uint(U256::from(100u64)),
        Token::Bool(true),
        Token::String("alpha".into()),
        Token::String(String::new()),
    ])
}

#[tokio::test]
async fn test_dendron_regist_needs_threshold_plus_burn() {
    let node = Arc::new(MockNode::with_tx_defaults());
    node.reply_call("getSubnetInfo(uint16)", &[active_subnet(1)]);
    node.reply_call(
        "getSubnetParams(uint16)",
        &[subnet_params(U256::exp10(18), U256::exp10(17)).to_token()],
    );
    node.reply_call("isDendron(uint16,address)", &[Token::Bool(false)]);
    node.reply_call("getAvailableStake(address)", &[Token::Uint(U256::exp10(18))]);

    let err = run(
        &node,
        Config::default(),
        &["dendron", "regist", "--netuid", "1", "--private-key", TEST_KEY],
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("need 1.1 HETU"), "{}", err);
    assert_eq!(node.count("eth_sendRawTransaction"), 0);
}

#[tokio::test]
async fn test_user_role_of_unregistered_account() {
    let node = Arc::new(MockNode::new());
    node.fail_call("getDendronInfo(uint16,address)", "execution reverted");

    run(
        &node,
        Config::default(),
        &["dendron", "get-user-role", "--netuid", "1", "--account", common::TEST_ADDRESS],
    )
    .await
    .unwrap();
    assert_eq!(node.count("eth_call"), 1);
}

#[tokio::test]
async fn test_pool_status_reads_system_and_creator_info() {
    let node = Arc::new(MockNode::new());
    node.reply_call(
        "getSystemInfo()",
        &[
            Token::Address(Address::repeat_byte(0x0a)),
            Token::Address(Address::repeat_byte(0x0b)),
        ],
    );
    node.reply_call(
        "getCreatorInfo()",
        &[
            Token::Address(Address::repeat_byte(0x0c)),
            Token::Uint(U256::from(1_700_000_000u64)),
            Token::Uint(U256::from(1u64)),
        ],
    );
    let mut pool = vec![Token::Uint(U256::one())];
    pool.extend((0..7).map(|_| Token::Uint(U256::exp10(18))));
    node.reply_call("getPoolInfo()", &pool);
    node.reply_call("hetuToken()", &[Token::Address(Address::repeat_byte(0xbc))]);
    node.reply_call("alphaToken()", &[Token::Address(Address::repeat_byte(0xad))]);

    run(
        &node,
        Config::default(),
        &[
            "amm",
            "pool-status",
            "--contract",
            "0x36607E8D2cb850E3b2d14b998A25c43611d710cE",
        ],
    )
    .await
    .unwrap();
    assert_eq!(node.count("eth_call"), 5);
}

#[tokio::test]
async fn test_amm_requires_contract_or_netuid() {
    let node = Arc::new(MockNode::new());

    let err = run(&node, Config::default(), &["amm", "pool-status"])
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Must specify either --contract or --netuid");
    assert_eq!(node.total_calls(), 0);
}

#[tokio::test]
async fn test_quick_score_takes_integer_scores() {
    let node = Arc::new(MockNode::with_tx_defaults());
    node.reply("eth_getTransactionReceipt", receipt("0x1", "0x10"));

    run(
        &node,
        Config::default(),
        &[
            "weights",
            "quick-score",
            "--netuid",
            "1",
            "--targets",
            "0x0000000000000000000000000000000000000001,0x0000000000000000000000000000000000000002",
            "--scores",
            "500000,750000",
            "--private-key",
            TEST_KEY,
        ],
    )
    .await
    .unwrap();
    assert_eq!(node.raw_transactions().len(), 1);

    let err = run(
        &node,
        Config::default(),
        &[
            "weights",
            "quick-score",
            "--netuid",
            "1",
            "--targets",
            "0x0000000000000000000000000000000000000001",
            "--scores",
            "1000001",
            "--private-key",
            TEST_KEY,
        ],
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("position 1"), "{}", err);
    assert_eq!(node.raw_transactions().len(), 1);
}
