//! Core constants for the Hetu chain client.
//! Default endpoints and contract addresses match the public Hetu testnet deployment.

/// Wei per HETU (1 HETU = 1e18 wei)
pub const WEI_PER_HETU: u128 = 1_000_000_000_000_000_000;

/// Decimals of the native token and of WHETU
pub const HETU_DECIMALS: u32 = 18;

const _: () = assert!(
    WEI_PER_HETU == 10u128.pow(HETU_DECIMALS),
    "WEI_PER_HETU must equal 10^HETU_DECIMALS"
);

/// Native currency symbol
pub const HETU_SYMBOL: &str = "HETU";

/// Length of a `0x`-prefixed hex address string
pub const ADDRESS_STRING_LEN: usize = 42;

/// Default substrate-side endpoint
pub const DEFAULT_CHAIN_ENDPOINT: &str = "ws://127.0.0.1:9090";

/// Default EVM JSON-RPC endpoint
pub const DEFAULT_JSON_RPC: &str = "http://161.97.161.133:18545";

/// Default network name
pub const DEFAULT_NETWORK: &str = "local";

pub const DEFAULT_WALLET_NAME: &str = "coldkey-user1";
pub const DEFAULT_WALLET_HOTKEY: &str = "hotkey-user1";

/// Default directory holding keystore files
pub const DEFAULT_WALLET_PATH: &str = "~/.hetucli/wallets";

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "~/.hetucli/config.yml";

/// Default contract deployment addresses
pub const DEFAULT_WHETU_ADDRESS: &str = "0xBC45C2511eA43F998E659b4722D6795C482a7E07";
pub const DEFAULT_SUBNET_ADDRESS: &str = "0xaF856443EaF741eEcAD2b5Bb3ff6F9F57a00920F";
pub const DEFAULT_STAKING_ADDRESS: &str = "0x9cCb4A38a208409422969737977696B8189eF96a";
pub const DEFAULT_AMM_ADDRESS: &str = "0x36607E8D2cb850E3b2d14b998A25c43611d710cE";
pub const DEFAULT_DENDRON_ADDRESS: &str = "0x34d3911323Ef5576Ba84a5a68b814D189112020F";
pub const DEFAULT_WEIGHTS_ADDRESS: &str = "0x1011c3586a901FBea4DEB3df16cFC42922219D86";

/// Metagraph columns shown by default
pub const DEFAULT_METAGRAPH_COLS: &[&str] = &[
    "ACTIVE",
    "AXON",
    "COLDKEY",
    "CONSENSUS",
    "DIVIDENDS",
    "EMISSION",
    "HOTKEY",
    "INCENTIVE",
    "RANK",
    "STAKE",
    "TRUST",
    "UID",
    "UPDATED",
    "VAL",
    "VTRUST",
];

/// Receipt wait defaults
pub const DEFAULT_RECEIPT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1_000;

/// Gas limits per call site
pub const GAS_NATIVE_TRANSFER: u64 = 21_000;
pub const GAS_APPROVE: u64 = 100_000;
pub const GAS_WHETU_DEPOSIT: u64 = 100_000;
pub const GAS_WHETU_WITHDRAW: u64 = 100_000;
pub const GAS_REGISTER_NETWORK: u64 = 5_000_000;
pub const GAS_UPDATE_SUBNET_INFO: u64 = 300_000;
pub const GAS_ACTIVATE_SUBNET: u64 = 200_000;
pub const GAS_UPDATE_NETWORK_PARAMS: u64 = 200_000;
pub const GAS_UPDATE_SUBNET_PARAMS: u64 = 300_000;
pub const GAS_AMM_LIQUIDITY: u64 = 300_000;
pub const GAS_AMM_SWAP: u64 = 300_000;
pub const GAS_STAKE: u64 = 300_000;
pub const GAS_REGISTER_NEURON: u64 = 500_000;
pub const GAS_DEREGISTER_NEURON: u64 = 200_000;
pub const GAS_SET_WEIGHTS: u64 = 300_000;
pub const GAS_CONTRACT_CALL: u64 = 300_000;

/// Weights are fixed point with this scale (1.0 == 1_000_000)
pub const WEIGHT_SCALE: u64 = 1_000_000;

/// Amount of HETU used by `amm check-approval` for its simulated swap
pub const APPROVAL_CHECK_SWAP_HETU: &str = "10";

/// File written by `weights create-weights-template`
pub const WEIGHTS_TEMPLATE_FILE: &str = "weights_template.json";
