//! Property tests for amount and address handling.

use ethers_core::types::{Address, U256};
use hetu_cli::utils::address::{checksum, looks_like_address, parse_address};
use hetu_cli::utils::balance::{format_amount, parse_amount};
use proptest::prelude::*;

proptest! {
    #[test]
    fn amount_text_round_trips(value in any::<u128>(), decimals in 0u32..=18) {
        let wei = U256::from(value);
        let text = format_amount(wei, decimals);
        prop_assert_eq!(parse_amount(&text, decimals).unwrap(), wei);
    }

    #[test]
    fn formatted_amounts_have_no_trailing_zero_fraction(value in any::<u64>()) {
        let text = format_amount(U256::from(value), 18);
        if let Some((_, fraction)) = text.split_once('.') {
            prop_assert!(!fraction.is_empty());
            prop_assert!(!fraction.ends_with('0'));
        }
    }

    #[test]
    fn checksummed_addresses_parse_back(bytes in any::<[u8; 20]>()) {
        let address = Address::from(bytes);
        let text = checksum(&address);
        prop_assert!(looks_like_address(&text));
        prop_assert_eq!(parse_address(&text).unwrap(), address);
        prop_assert_eq!(parse_address(&text.to_lowercase()).unwrap(), address);
    }

    #[test]
    fn wallet_names_are_not_addresses(name in "[a-z][a-z0-9_-]{0,20}") {
        prop_assert!(!looks_like_address(&name));
    }
}
