//! Hex address detection, parsing and display.

use crate::core::constants::ADDRESS_STRING_LEN;
use ethers_core::types::Address;
use ethers_core::utils::to_checksum;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid address: {0}")]
pub struct InvalidAddress(pub String);

/// True when `value` has the shape of an address: `0x` followed by 40 characters.
///
/// Only the shape is checked; anything else is treated as a wallet name by callers.
pub fn looks_like_address(value: &str) -> bool {
    value.starts_with("0x") && value.len() == ADDRESS_STRING_LEN
}

/// Parse a `0x`-prefixed 20-byte hex address (any case).
pub fn parse_address(value: &str) -> Result<Address, InvalidAddress> {
    let trimmed = value.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if hex_part.len() != 40 {
        return Err(InvalidAddress(value.to_string()));
    }
    let bytes = hex::decode(hex_part).map_err(|_| InvalidAddress(value.to_string()))?;
    Ok(Address::from_slice(&bytes))
}

/// EIP-55 mixed-case representation.
pub fn checksum(address: &Address) -> String {
    to_checksum(address, None)
}

pub fn is_zero_address(address: &Address) -> bool {
    address.is_zero()
}
