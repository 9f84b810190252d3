//! Conversions between base units (wei) and human readable token amounts.
//!
//! Amounts typed on the command line are parsed as decimal strings so no
//! precision is lost to floating point.

use crate::core::constants::{HETU_DECIMALS, HETU_SYMBOL};
use ethers_core::types::U256;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("Invalid amount '{0}'")]
    Invalid(String),
    #[error("Amount '{0}' must not be negative")]
    Negative(String),
    #[error("Amount '{amount}' has more than {decimals} decimal places")]
    TooPrecise { amount: String, decimals: u32 },
}

/// Parse a decimal string into base units for a token with `decimals`.
pub fn parse_amount(amount: &str, decimals: u32) -> Result<U256, AmountError> {
    let trimmed = amount.trim();
    if trimmed.starts_with('-') {
        return Err(AmountError::Negative(amount.to_string()));
    }
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let digits_only = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits_only(whole) || !digits_only(fraction) {
        return Err(AmountError::Invalid(amount.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(AmountError::TooPrecise {
            amount: amount.to_string(),
            decimals,
        });
    }
    let whole = if whole.is_empty() { "0" } else { whole };
    let padded = format!("{}{:0<width$}", whole, fraction, width = decimals as usize);
    U256::from_dec_str(&padded).map_err(|_| AmountError::Invalid(amount.to_string()))
}

/// Parse a HETU amount into wei.
pub fn parse_hetu(amount: &str) -> Result<U256, AmountError> {
    parse_amount(amount, HETU_DECIMALS)
}

/// Format base units with trailing fractional zeros removed (`1.5`, `0`, `12`).
pub fn format_amount(value: U256, decimals: u32) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let base = U256::exp10(decimals as usize);
    let formatted = format!(
        "{}.{:0>width$}",
        value / base,
        (value % base).to_string(),
        width = decimals as usize
    );
    trim_fraction(&formatted)
}

/// Format wei as HETU without the unit suffix.
pub fn format_hetu(wei: U256) -> String {
    format_amount(wei, HETU_DECIMALS)
}

/// Format wei as HETU with the unit suffix.
pub fn format_hetu_with_symbol(wei: U256) -> String {
    format!("{} {}", format_hetu(wei), HETU_SYMBOL)
}

fn trim_fraction(formatted: &str) -> String {
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, fraction)
            }
        }
        None => formatted.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hetu() {
        assert_eq!(
            parse_hetu("1").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(
            parse_hetu("0.5").unwrap(),
            U256::from(500_000_000_000_000_000u128)
        );
        assert_eq!(parse_hetu(".25").unwrap(), U256::from(250_000_000_000_000_000u128));
        assert_eq!(parse_hetu("0").unwrap(), U256::zero());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_hetu("abc"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_hetu("1e18"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_hetu("-1"), Err(AmountError::Negative(_))));
        assert!(matches!(parse_hetu("."), Err(AmountError::Invalid(_))));
        assert!(matches!(
            parse_amount("1.123", 2),
            Err(AmountError::TooPrecise { decimals: 2, .. })
        ));
    }

    #[test]
    fn test_format_trims_zeros() {
        assert_eq!(format_hetu(U256::from(1_500_000_000_000_000_000u128)), "1.5");
        assert_eq!(format_hetu(U256::from(2_000_000_000_000_000_000u128)), "2");
        assert_eq!(format_hetu(U256::zero()), "0");
        assert_eq!(format_hetu(U256::from(1u64)), "0.000000000000000001");
        assert_eq!(format_amount(U256::from(12345u64), 2), "123.45");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(
            format_hetu_with_symbol(U256::from(3_000_000_000_000_000_000u128)),
            "3 HETU"
        );
    }
}
