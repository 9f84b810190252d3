//! Per-subnet HETU/alpha constant-product pool (`SubnetAMM`).

use super::decode::{single_address, single_uint, Fields};
use super::{ContractError, ContractHandle, ContractKind, ContractWrapper};
use crate::chain::ContractCall;
use crate::core::constants::{GAS_AMM_LIQUIDITY, GAS_AMM_SWAP};
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};

/// `getPoolInfo` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolInfo {
    pub mechanism: u8,
    pub subnet_tao: U256,
    pub subnet_alpha_in: U256,
    pub subnet_alpha_out: U256,
    pub current_price: U256,
    pub moving_price: U256,
    pub total_volume: U256,
    pub minimum_liquidity: U256,
}

impl PoolInfo {
    /// True when either side of the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.subnet_tao.is_zero() || self.subnet_alpha_in.is_zero()
    }

    /// Both reserves hold at least the minimum liquidity.
    pub fn is_initialized(&self) -> bool {
        self.subnet_tao >= self.minimum_liquidity && self.subnet_alpha_in >= self.minimum_liquidity
    }

    /// Human name of the pricing mechanism.
    pub fn mechanism_name(&self) -> &'static str {
        match self.mechanism {
            0 => "Stable",
            1 => "Dynamic",
            _ => "Unknown",
        }
    }
}

/// `getStatistics` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolStatistics {
    pub current_price: U256,
    pub moving_price: U256,
    pub total_volume: U256,
    pub hetu_reserve: U256,
    pub alpha_reserve: U256,
    pub alpha_issued: U256,
}

/// `getSwapPreview` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPreview {
    pub amount_out: U256,
    pub price_impact: U256,
    pub new_price: U256,
    pub is_valid: bool,
}

/// `getCreatorInfo` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatorInfo {
    pub creator: Address,
    pub created_at: U256,
    pub netuid: u16,
}

#[derive(Debug, Clone)]
pub struct SubnetAmm {
    handle: ContractHandle,
}

impl ContractWrapper for SubnetAmm {
    const KIND: ContractKind = ContractKind::SubnetAmm;

    fn from_handle(handle: ContractHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ContractHandle {
        &self.handle
    }
}

impl SubnetAmm {
    /// Alpha price in HETU, 18 decimals.
    pub async fn alpha_price(&self) -> Result<U256, ContractError> {
        single_uint("getAlphaPrice", self.handle.query("getAlphaPrice", &[]).await?)
    }

    pub async fn pool_info(&self) -> Result<PoolInfo, ContractError> {
        let mut f = Fields::new("getPoolInfo", self.handle.query("getPoolInfo", &[]).await?);
        Ok(PoolInfo {
            mechanism: f.u8()?,
            subnet_tao: f.uint()?,
            subnet_alpha_in: f.uint()?,
            subnet_alpha_out: f.uint()?,
            current_price: f.uint()?,
            moving_price: f.uint()?,
            total_volume: f.uint()?,
            minimum_liquidity: f.uint()?,
        })
    }

    pub async fn statistics(&self) -> Result<PoolStatistics, ContractError> {
        let mut f = Fields::new("getStatistics", self.handle.query("getStatistics", &[]).await?);
        Ok(PoolStatistics {
            current_price: f.uint()?,
            moving_price: f.uint()?,
            total_volume: f.uint()?,
            hetu_reserve: f.uint()?,
            alpha_reserve: f.uint()?,
            alpha_issued: f.uint()?,
        })
    }

    pub async fn swap_preview(
        &self,
        amount_in: U256,
        hetu_to_alpha: bool,
    ) -> Result<SwapPreview, ContractError> {
        let tokens = self
            .handle
            .query(
                "getSwapPreview",
                &[Token::Uint(amount_in), Token::Bool(hetu_to_alpha)],
            )
            .await?;
        let mut f = Fields::new("getSwapPreview", tokens);
        Ok(SwapPreview {
            amount_out: f.uint()?,
            price_impact: f.uint()?,
            new_price: f.uint()?,
            is_valid: f.bool()?,
        })
    }

    pub async fn sim_swap_alpha_for_hetu(&self, alpha_in: U256) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query("simSwapAlphaForHETU", &[Token::Uint(alpha_in)])
            .await?;
        single_uint("simSwapAlphaForHETU", tokens)
    }

    pub async fn sim_swap_hetu_for_alpha(&self, hetu_in: U256) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query("simSwapHETUForAlpha", &[Token::Uint(hetu_in)])
            .await?;
        single_uint("simSwapHETUForAlpha", tokens)
    }

    pub async fn hetu_token(&self) -> Result<Address, ContractError> {
        single_address("hetuToken", self.handle.query("hetuToken", &[]).await?)
    }

    pub async fn alpha_token(&self) -> Result<Address, ContractError> {
        single_address("alphaToken", self.handle.query("alphaToken", &[]).await?)
    }

    /// `(systemAddress, subnetContract)`
    pub async fn system_info(&self) -> Result<(Address, Address), ContractError> {
        let mut f = Fields::new("getSystemInfo", self.handle.query("getSystemInfo", &[]).await?);
        Ok((f.address()?, f.address()?))
    }

    pub async fn creator_info(&self) -> Result<CreatorInfo, ContractError> {
        let mut f = Fields::new("getCreatorInfo", self.handle.query("getCreatorInfo", &[]).await?);
        Ok(CreatorInfo {
            creator: f.address()?,
            created_at: f.uint()?,
            netuid: f.u16()?,
        })
    }

    pub fn inject_liquidity(&self, hetu: U256, alpha: U256) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "injectLiquidity",
            &[Token::Uint(hetu), Token::Uint(alpha)],
            GAS_AMM_LIQUIDITY,
        )
    }

    pub fn withdraw_liquidity(
        &self,
        hetu: U256,
        alpha: U256,
        to: Address,
    ) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "withdrawLiquidity",
            &[Token::Uint(hetu), Token::Uint(alpha), Token::Address(to)],
            GAS_AMM_LIQUIDITY,
        )
    }

    pub fn swap_alpha_for_hetu(
        &self,
        alpha_in: U256,
        min_hetu_out: U256,
        to: Address,
    ) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "swapAlphaForHETU",
            &[Token::Uint(alpha_in), Token::Uint(min_hetu_out), Token::Address(to)],
            GAS_AMM_SWAP,
        )
    }

    pub fn swap_hetu_for_alpha(
        &self,
        hetu_in: U256,
        min_alpha_out: U256,
        to: Address,
    ) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "swapHETUForAlpha",
            &[Token::Uint(hetu_in), Token::Uint(min_alpha_out), Token::Address(to)],
            GAS_AMM_SWAP,
        )
    }
}

/// Outcome of a simulated swap used for liquidity checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapSimulation {
    Quote(U256),
    InsufficientLiquidity,
}

impl SwapSimulation {
    /// Classify the result of a `simSwap*` call. A revert or a zero output
    /// both mean the pool cannot serve the swap.
    pub fn from_result<E>(result: Result<U256, E>) -> Self {
        match result {
            Ok(out) if !out.is_zero() => SwapSimulation::Quote(out),
            _ => SwapSimulation::InsufficientLiquidity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_simulation_classification() {
        assert_eq!(
            SwapSimulation::from_result::<()>(Ok(U256::from(5u64))),
            SwapSimulation::Quote(U256::from(5u64))
        );
        assert_eq!(
            SwapSimulation::from_result::<()>(Ok(U256::zero())),
            SwapSimulation::InsufficientLiquidity
        );
        assert_eq!(
            SwapSimulation::from_result(Err("execution reverted")),
            SwapSimulation::InsufficientLiquidity
        );
    }

    #[test]
    fn test_pool_emptiness() {
        let mut pool = PoolInfo {
            mechanism: 1,
            subnet_tao: U256::from(10u64),
            subnet_alpha_in: U256::from(10u64),
            subnet_alpha_out: U256::zero(),
            current_price: U256::zero(),
            moving_price: U256::zero(),
            total_volume: U256::zero(),
            minimum_liquidity: U256::zero(),
        };
        assert!(!pool.is_empty());
        assert_eq!(pool.mechanism_name(), "Dynamic");
        pool.subnet_alpha_in = U256::zero();
        assert!(pool.is_empty());
    }
}
