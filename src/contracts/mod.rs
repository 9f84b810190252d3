//! Typed wrappers around the Hetu system contracts.
//!
//! Every wrapper is a [`ContractHandle`] (address, RPC client, method table)
//! plus one Rust method per remote function. Read methods perform `eth_call`
//! and decode into typed values; write methods return an unsigned
//! [`ContractCall`] for the transaction pipeline.
//!
//! ABIs are loaded from JSON files before any network access, so a missing
//! file fails the command without contacting the node.

pub mod amm;
pub mod args;
pub mod decode;
pub mod dendron;
pub mod erc20;
pub mod staking;
pub mod subnet_manager;
pub mod weights;

use crate::chain::{self, ContractCall, RpcClient};
use ethers_core::abi::{Abi, Function, Token};
use ethers_core::types::{Address, Bytes, U256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

pub use amm::{PoolInfo, PoolStatistics, SubnetAmm, SwapPreview};
pub use dendron::{DendronInfo, DendronManager, DendronRegistration};
pub use erc20::{Erc20, Whetu};
pub use staking::{GlobalStaking, StakeInfo, SubnetAllocation};
pub use subnet_manager::{SubnetDetails, SubnetHyperparams, SubnetInfo, SubnetManager};
pub use weights::{WeightEntry, Weights};

/// Errors raised by contract wrappers.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("ABI not found: {}", .0.display())]
    AbiNotFound(PathBuf),

    #[error("Invalid ABI file {}: {source}", .path.display())]
    InvalidAbi {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Failed to encode call to {method}: {reason}")]
    Encode { method: String, reason: String },

    #[error("Failed to decode result of {method}: {reason}")]
    Decode { method: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Chain(#[from] chain::Error),
}

impl ContractError {
    pub(crate) fn decode(method: &str, reason: impl Into<String>) -> Self {
        ContractError::Decode {
            method: method.to_string(),
            reason: reason.into(),
        }
    }
}

/// Contract interfaces shipped with the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    SubnetManager,
    SubnetAmm,
    GlobalStaking,
    DendronManager,
    Weights,
    Erc20,
    Whetu,
}

impl ContractKind {
    /// File name of the ABI inside the ABI directory
    pub fn abi_file(&self) -> &'static str {
        match self {
            ContractKind::SubnetManager => "SubnetManager.abi",
            ContractKind::SubnetAmm => "SubnetAMM.abi",
            ContractKind::GlobalStaking => "GlobalStaking.abi",
            ContractKind::DendronManager => "DendronManager.abi",
            ContractKind::Weights => "Weights.abi",
            ContractKind::Erc20 => "ERC20.abi",
            ContractKind::Whetu => "WHETU.abi",
        }
    }
}

/// Load the ABI for `kind` from `dir`.
pub fn load_abi(dir: &Path, kind: ContractKind) -> Result<Abi, ContractError> {
    load_abi_file(&dir.join(kind.abi_file()))
}

/// Load a JSON ABI array from `path`.
pub fn load_abi_file(path: &Path) -> Result<Abi, ContractError> {
    if !path.is_file() {
        return Err(ContractError::AbiNotFound(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path).map_err(|_| ContractError::AbiNotFound(path.to_path_buf()))?;
    serde_json::from_str(&contents).map_err(|source| ContractError::InvalidAbi {
        path: path.to_path_buf(),
        source,
    })
}

/// Method name to function lookup, built once per ABI.
///
/// Overloaded names keep their first declaration.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    functions: BTreeMap<String, Function>,
}

impl MethodTable {
    pub fn from_abi(abi: &Abi) -> Self {
        let functions = abi
            .functions
            .iter()
            .filter_map(|(name, overloads)| overloads.first().map(|f| (name.clone(), f.clone())))
            .collect();
        Self { functions }
    }

    pub fn get(&self, name: &str) -> Result<&Function, ContractError> {
        self.functions
            .get(name)
            .ok_or_else(|| ContractError::UnsupportedMethod(name.to_string()))
    }
}

/// A contract address bound to an RPC client and its ABI.
#[derive(Clone)]
pub struct ContractHandle {
    address: Address,
    client: RpcClient,
    methods: Arc<MethodTable>,
}

impl ContractHandle {
    pub fn new(address: Address, client: RpcClient, abi: &Abi) -> Self {
        Self {
            address,
            client,
            methods: Arc::new(MethodTable::from_abi(abi)),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }

    pub fn function(&self, name: &str) -> Result<&Function, ContractError> {
        self.methods.get(name)
    }

    /// ABI-encoded calldata for `name(args)`.
    pub fn encode(&self, name: &str, args: &[Token]) -> Result<Bytes, ContractError> {
        let function = self.function(name)?;
        function
            .encode_input(args)
            .map(Bytes::from)
            .map_err(|e| ContractError::Encode {
                method: name.to_string(),
                reason: e.to_string(),
            })
    }

    /// Read-only call returning the decoded output tokens.
    pub async fn query(&self, name: &str, args: &[Token]) -> Result<Vec<Token>, ContractError> {
        let function = self.function(name)?;
        let data = self.encode(name, args)?;
        tracing::debug!(contract = ?self.address, method = name, "eth_call");
        let output = self.client.call(self.address, &data).await?;
        if output.is_empty() && !function.outputs.is_empty() {
            return Err(ContractError::decode(
                name,
                format!("empty response from {:?}, is the contract deployed?", self.address),
            ));
        }
        function
            .decode_output(&output)
            .map_err(|e| ContractError::decode(name, e.to_string()))
    }

    /// Unsigned transaction calling `name(args)`.
    pub fn call(&self, name: &str, args: &[Token], gas_limit: u64) -> Result<ContractCall, ContractError> {
        Ok(ContractCall {
            label: name.to_string(),
            to: self.address,
            data: self.encode(name, args)?,
            value: U256::zero(),
            gas_limit,
        })
    }

    /// Like [`ContractHandle::call`], attaching `value` wei.
    pub fn payable_call(
        &self,
        name: &str,
        args: &[Token],
        value: U256,
        gas_limit: u64,
    ) -> Result<ContractCall, ContractError> {
        Ok(self.call(name, args, gas_limit)?.with_value(value))
    }
}

/// A typed wrapper constructed from a [`ContractHandle`].
pub trait ContractWrapper: Sized {
    /// Interface whose ABI the wrapper is built from
    const KIND: ContractKind;

    fn from_handle(handle: ContractHandle) -> Self;

    fn handle(&self) -> &ContractHandle;

    fn address(&self) -> Address {
        self.handle().address()
    }

    /// Load the ABI from `abi_dir` and bind it to `address`.
    fn load(address: Address, client: RpcClient, abi_dir: &Path) -> Result<Self, ContractError> {
        let abi = load_abi(abi_dir, Self::KIND)?;
        Ok(Self::from_handle(ContractHandle::new(address, client, &abi)))
    }
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("methods", &self.methods.functions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::bundled_abi_dir;
    use tempfile::TempDir;

    const ALL_KINDS: [ContractKind; 7] = [
        ContractKind::SubnetManager,
        ContractKind::SubnetAmm,
        ContractKind::GlobalStaking,
        ContractKind::DendronManager,
        ContractKind::Weights,
        ContractKind::Erc20,
        ContractKind::Whetu,
    ];

    #[test]
    fn test_bundled_abis_parse() {
        for kind in ALL_KINDS {
            let abi = load_abi(&bundled_abi_dir(), kind).unwrap();
            assert!(!abi.functions.is_empty(), "{:?} has no functions", kind);
        }
    }

    #[test]
    fn test_missing_abi() {
        let dir = TempDir::new().unwrap();
        let err = load_abi(dir.path(), ContractKind::Weights).unwrap_err();
        assert!(matches!(err, ContractError::AbiNotFound(_)));
        assert!(err.to_string().starts_with("ABI not found:"));
    }

    #[test]
    fn test_invalid_abi() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Weights.abi"), "not json").unwrap();
        assert!(matches!(
            load_abi(dir.path(), ContractKind::Weights),
            Err(ContractError::InvalidAbi { .. })
        ));
    }

    #[test]
    fn test_method_table_rejects_unknown() {
        let abi = load_abi(&bundled_abi_dir(), ContractKind::Erc20).unwrap();
        let table = MethodTable::from_abi(&abi);
        assert!(table.get("balanceOf").is_ok());
        let err = table.get("selfDestruct").unwrap_err();
        assert_eq!(err.to_string(), "unsupported method: selfDestruct");
    }

    #[test]
    fn test_encode_selector() {
        let abi = load_abi(&bundled_abi_dir(), ContractKind::Erc20).unwrap();
        let handle = ContractHandle::new(
            Address::repeat_byte(0x01),
            RpcClient::http("http://127.0.0.1:1"),
            &abi,
        );
        let data = handle
            .encode("balanceOf", &[Token::Address(Address::repeat_byte(0x02))])
            .unwrap();
        assert_eq!(&data[..4], &[0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(data.len(), 36);
    }
}
