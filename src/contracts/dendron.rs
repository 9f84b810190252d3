//! Neuron registry (`DendronManager`).

use super::decode::{single_address, single_bool, single_uint, Fields};
use super::{ContractError, ContractHandle, ContractKind, ContractWrapper};
use crate::chain::ContractCall;
use crate::core::constants::{GAS_DEREGISTER_NEURON, GAS_REGISTER_NEURON};
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};

/// Registration record of one account on one subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DendronInfo {
    pub account: Address,
    pub uid: u16,
    pub is_active: bool,
    pub is_validator: bool,
    pub stake: U256,
    pub registration_block: u64,
    pub last_update: U256,
    pub axon_endpoint: String,
    pub axon_port: u32,
    pub prometheus_endpoint: String,
    pub prometheus_port: u32,
}

impl DendronInfo {
    fn read(f: &mut Fields) -> Result<Self, ContractError> {
        Ok(Self {
            account: f.address()?,
            uid: f.u16()?,
            is_active: f.bool()?,
            is_validator: f.bool()?,
            stake: f.uint()?,
            registration_block: f.u64()?,
            last_update: f.uint()?,
            axon_endpoint: f.string()?,
            axon_port: f.u32()?,
            prometheus_endpoint: f.string()?,
            prometheus_port: f.u32()?,
        })
    }

    /// "Validator", "Miner" or "Inactive".
    pub fn role(&self) -> &'static str {
        match (self.is_active, self.is_validator) {
            (false, _) => "Inactive",
            (true, true) => "Validator",
            (true, false) => "Miner",
        }
    }
}

/// Arguments of `registerNeuronWithStakeAllocation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DendronRegistration {
    pub netuid: u16,
    pub stake_amount: U256,
    pub is_validator: bool,
    pub axon_endpoint: String,
    pub axon_port: u32,
    pub prometheus_endpoint: String,
    pub prometheus_port: u32,
}

#[derive(Debug, Clone)]
pub struct DendronManager {
    handle: ContractHandle,
}

impl ContractWrapper for DendronManager {
    const KIND: ContractKind = ContractKind::DendronManager;

    fn from_handle(handle: ContractHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ContractHandle {
        &self.handle
    }
}

fn netuid_account(netuid: u16, account: Address) -> [Token; 2] {
    [Token::Uint(U256::from(netuid)), Token::Address(account)]
}

impl DendronManager {
    pub async fn dendron_info(&self, netuid: u16, account: Address) -> Result<DendronInfo, ContractError> {
        let tokens = self
            .handle
            .query("getDendronInfo", &netuid_account(netuid, account))
            .await?;
        DendronInfo::read(&mut Fields::from_struct("getDendronInfo", tokens))
    }

    /// Public mapping getter `dendrons(netuid, account)`.
    pub async fn dendrons(&self, netuid: u16, account: Address) -> Result<DendronInfo, ContractError> {
        let tokens = self
            .handle
            .query("dendrons", &netuid_account(netuid, account))
            .await?;
        DendronInfo::read(&mut Fields::from_struct("dendrons", tokens))
    }

    pub async fn subnet_dendron_count(&self, netuid: u16) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query("getSubnetDendronCount", &[Token::Uint(U256::from(netuid))])
            .await?;
        single_uint("getSubnetDendronCount", tokens)
    }

    pub async fn subnet_dendrons(&self, netuid: u16) -> Result<Vec<Address>, ContractError> {
        let tokens = self
            .handle
            .query("getSubnetDendrons", &[Token::Uint(U256::from(netuid))])
            .await?;
        Fields::new("getSubnetDendrons", tokens).addresses()
    }

    pub async fn subnet_validator_count(&self, netuid: u16) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query("getSubnetValidatorCount", &[Token::Uint(U256::from(netuid))])
            .await?;
        single_uint("getSubnetValidatorCount", tokens)
    }

    pub async fn subnet_validators(&self, netuid: u16) -> Result<Vec<Address>, ContractError> {
        let tokens = self
            .handle
            .query("getSubnetValidators", &[Token::Uint(U256::from(netuid))])
            .await?;
        Fields::new("getSubnetValidators", tokens).addresses()
    }

    pub async fn is_dendron(&self, netuid: u16, account: Address) -> Result<bool, ContractError> {
        let tokens = self
            .handle
            .query("isDendron", &netuid_account(netuid, account))
            .await?;
        single_bool("isDendron", tokens)
    }

    pub async fn is_validator(&self, netuid: u16, account: Address) -> Result<bool, ContractError> {
        let tokens = self
            .handle
            .query("isValidator", &netuid_account(netuid, account))
            .await?;
        single_bool("isValidator", tokens)
    }

    /// `index`-th registered account of a subnet.
    pub async fn dendron_list(&self, netuid: u16, index: U256) -> Result<Address, ContractError> {
        let tokens = self
            .handle
            .query(
                "dendronList",
                &[Token::Uint(U256::from(netuid)), Token::Uint(index)],
            )
            .await?;
        single_address("dendronList", tokens)
    }

    pub fn register(&self, registration: &DendronRegistration) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "registerNeuronWithStakeAllocation",
            &[
                Token::Uint(U256::from(registration.netuid)),
                Token::Uint(registration.stake_amount),
                Token::Bool(registration.is_validator),
                Token::String(registration.axon_endpoint.clone()),
                Token::Uint(U256::from(registration.axon_port)),
                Token::String(registration.prometheus_endpoint.clone()),
                Token::Uint(U256::from(registration.prometheus_port)),
            ],
            GAS_REGISTER_NEURON,
        )
    }

    pub fn deregister(&self, netuid: u16) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "deregisterNeuron",
            &[Token::Uint(U256::from(netuid))],
            GAS_DEREGISTER_NEURON,
        )
    }
}
