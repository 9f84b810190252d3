//! ERC-20 tokens and the wrapped native token (WHETU).

use super::decode::{single_uint, Fields};
use super::{ContractError, ContractHandle, ContractKind, ContractWrapper};
use crate::chain::ContractCall;
use crate::core::constants::{GAS_APPROVE, GAS_WHETU_DEPOSIT, GAS_WHETU_WITHDRAW};
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};

#[derive(Debug, Clone)]
pub struct Erc20 {
    handle: ContractHandle,
}

impl ContractWrapper for Erc20 {
    const KIND: ContractKind = ContractKind::Erc20;

    fn from_handle(handle: ContractHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ContractHandle {
        &self.handle
    }
}

impl Erc20 {
    pub async fn name(&self) -> Result<String, ContractError> {
        Fields::new("name", self.handle.query("name", &[]).await?).string()
    }

    pub async fn symbol(&self) -> Result<String, ContractError> {
        Fields::new("symbol", self.handle.query("symbol", &[]).await?).string()
    }

    pub async fn decimals(&self) -> Result<u8, ContractError> {
        Fields::new("decimals", self.handle.query("decimals", &[]).await?).u8()
    }

    pub async fn total_supply(&self) -> Result<U256, ContractError> {
        single_uint("totalSupply", self.handle.query("totalSupply", &[]).await?)
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query("balanceOf", &[Token::Address(owner)])
            .await?;
        single_uint("balanceOf", tokens)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query("allowance", &[Token::Address(owner), Token::Address(spender)])
            .await?;
        single_uint("allowance", tokens)
    }

    pub fn approve(&self, spender: Address, amount: U256) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "approve",
            &[Token::Address(spender), Token::Uint(amount)],
            GAS_APPROVE,
        )
    }

    pub fn transfer(&self, to: Address, amount: U256) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "transfer",
            &[Token::Address(to), Token::Uint(amount)],
            GAS_APPROVE,
        )
    }
}

/// WHETU: ERC-20 plus native deposit and withdraw.
#[derive(Debug, Clone)]
pub struct Whetu {
    token: Erc20,
}

impl ContractWrapper for Whetu {
    const KIND: ContractKind = ContractKind::Whetu;

    fn from_handle(handle: ContractHandle) -> Self {
        Self {
            token: Erc20::from_handle(handle),
        }
    }

    fn handle(&self) -> &ContractHandle {
        self.token.handle()
    }
}

impl std::ops::Deref for Whetu {
    type Target = Erc20;

    fn deref(&self) -> &Erc20 {
        &self.token
    }
}

impl Whetu {
    /// Wrap `amount` wei of native HETU.
    pub fn deposit(&self, amount: U256) -> Result<ContractCall, ContractError> {
        self.handle()
            .payable_call("deposit", &[], amount, GAS_WHETU_DEPOSIT)
    }

    /// Unwrap `amount` wei back to native HETU.
    pub fn withdraw(&self, amount: U256) -> Result<ContractCall, ContractError> {
        self.handle()
            .call("withdraw", &[Token::Uint(amount)], GAS_WHETU_WITHDRAW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::RpcClient;
    use crate::config::bundled_abi_dir;

    fn whetu() -> Whetu {
        Whetu::load(
            Address::repeat_byte(0x01),
            RpcClient::http("http://127.0.0.1:1"),
            &bundled_abi_dir(),
        )
        .unwrap()
    }

    #[test]
    fn test_deposit_is_payable() {
        let call = whetu().deposit(U256::from(7u64)).unwrap();
        assert_eq!(call.value, U256::from(7u64));
        assert_eq!(call.label, "deposit");
        assert_eq!(call.data.len(), 4);
    }

    #[test]
    fn test_approve_encoding() {
        let call = whetu()
            .approve(Address::repeat_byte(0x02), U256::from(1u64))
            .unwrap();
        // approve(address,uint256)
        assert_eq!(&call.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(call.gas_limit, GAS_APPROVE);
        assert!(call.value.is_zero());
    }
}
