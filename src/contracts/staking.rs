//! Global staking pool and per-subnet allocations (`GlobalStaking`).

use super::decode::{single_address, single_uint, Fields};
use super::{ContractError, ContractHandle, ContractKind, ContractWrapper};
use crate::chain::ContractCall;
use crate::core::constants::GAS_STAKE;
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeInfo {
    pub total_staked: U256,
    pub total_allocated: U256,
    pub total_cost: U256,
    pub last_update_block: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetAllocation {
    pub allocated: U256,
    pub cost: U256,
    pub last_update_block: U256,
}

#[derive(Debug, Clone)]
pub struct GlobalStaking {
    handle: ContractHandle,
}

impl ContractWrapper for GlobalStaking {
    const KIND: ContractKind = ContractKind::GlobalStaking;

    fn from_handle(handle: ContractHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ContractHandle {
        &self.handle
    }
}

impl GlobalStaking {
    /// Stake not yet allocated to any subnet.
    pub async fn available_stake(&self, user: Address) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query("getAvailableStake", &[Token::Address(user)])
            .await?;
        single_uint("getAvailableStake", tokens)
    }

    pub async fn stake_info(&self, user: Address) -> Result<StakeInfo, ContractError> {
        let tokens = self
            .handle
            .query("getStakeInfo", &[Token::Address(user)])
            .await?;
        let mut f = Fields::from_struct("getStakeInfo", tokens);
        Ok(StakeInfo {
            total_staked: f.uint()?,
            total_allocated: f.uint()?,
            total_cost: f.uint()?,
            last_update_block: f.uint()?,
        })
    }

    pub async fn subnet_allocation(
        &self,
        user: Address,
        netuid: u16,
    ) -> Result<SubnetAllocation, ContractError> {
        let tokens = self
            .handle
            .query(
                "getSubnetAllocation",
                &[Token::Address(user), Token::Uint(U256::from(netuid))],
            )
            .await?;
        let mut f = Fields::from_struct("getSubnetAllocation", tokens);
        Ok(SubnetAllocation {
            allocated: f.uint()?,
            cost: f.uint()?,
            last_update_block: f.uint()?,
        })
    }

    pub async fn hetu_token(&self) -> Result<Address, ContractError> {
        single_address("hetuToken", self.handle.query("hetuToken", &[]).await?)
    }

    pub fn add_global_stake(&self, amount: U256) -> Result<ContractCall, ContractError> {
        self.handle
            .call("addGlobalStake", &[Token::Uint(amount)], GAS_STAKE)
    }

    pub fn remove_global_stake(&self, amount: U256) -> Result<ContractCall, ContractError> {
        self.handle
            .call("removeGlobalStake", &[Token::Uint(amount)], GAS_STAKE)
    }

    pub fn allocate_to_subnet(&self, netuid: u16, amount: U256) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "allocateToSubnet",
            &[Token::Uint(U256::from(netuid)), Token::Uint(amount)],
            GAS_STAKE,
        )
    }
}
