pub mod chain;
pub mod cli;
pub mod config;
pub mod contracts;
pub mod core;
pub mod error;
pub mod logging;
pub mod utils;
pub mod wallet;

pub use chain::{
    ConfirmPolicy, ContractCall, Error as ChainError, HttpTransport, RpcClient, Transport,
    TxOutcome, TxPipeline, TxReceipt, TxSigner,
};
pub use config::{Config, ContractKey};
pub use error::{Error, Result};

// Re-export logging module
pub use logging::{
    init_logging, is_initialized, CompactFormatter, HetuFormatter, LogFormat, LoggingConfig,
};

pub use contracts::{
    ContractError, ContractHandle, ContractKind, ContractWrapper, DendronManager, Erc20,
    GlobalStaking, MethodTable, SubnetAmm, SubnetManager, Weights, Whetu,
};

pub use utils::{address, balance};

pub use wallet::{KeystoreError, KeystoreFile, KeystoreStore, UnlockedKey};
