//! Validator weight submission (`Weights`).

use super::decode::single_uint;
use super::{ContractError, ContractHandle, ContractKind, ContractWrapper};
use crate::chain::ContractCall;
use crate::core::constants::{GAS_SET_WEIGHTS, WEIGHT_SCALE};
use crate::utils::address::parse_address;
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// One `{dest, weight}` entry; weight is scaled by [`WEIGHT_SCALE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub dest: String,
    pub weight: u64,
}

impl WeightEntry {
    fn to_token(&self) -> Result<Token, ContractError> {
        if self.weight > WEIGHT_SCALE {
            return Err(ContractError::InvalidArgument(format!(
                "weight {} for {} exceeds {}",
                self.weight, self.dest, WEIGHT_SCALE
            )));
        }
        let dest = parse_address(&self.dest)
            .map_err(|e| ContractError::InvalidArgument(e.to_string()))?;
        Ok(Token::Tuple(vec![
            Token::Address(dest),
            Token::Uint(U256::from(self.weight)),
        ]))
    }
}

/// Parse a JSON array of weight entries.
pub fn parse_weights_json(json: &str) -> Result<Vec<WeightEntry>, ContractError> {
    serde_json::from_str(json)
        .map_err(|e| ContractError::InvalidArgument(format!("invalid weights JSON: {}", e)))
}

/// Weight entries from parallel target and score lists.
///
/// Scores are integers in `0..=WEIGHT_SCALE`. Errors name the 1-based position
/// of the offending item.
pub fn weights_from_scores(targets: &[String], scores: &[String]) -> Result<Vec<WeightEntry>, ContractError> {
    if targets.len() != scores.len() {
        return Err(ContractError::InvalidArgument(format!(
            "number of targets ({}) and scores ({}) must match",
            targets.len(),
            scores.len()
        )));
    }
    targets
        .iter()
        .zip(scores)
        .enumerate()
        .map(|(i, (dest, score))| {
            let position = i + 1;
            parse_address(dest).map_err(|_| {
                ContractError::InvalidArgument(format!(
                    "invalid target address at position {}: {}",
                    position, dest
                ))
            })?;
            let weight: u64 = score.trim().parse().map_err(|_| {
                ContractError::InvalidArgument(format!(
                    "invalid score format at position {}: {}",
                    position, score
                ))
            })?;
            if weight > WEIGHT_SCALE {
                return Err(ContractError::InvalidArgument(format!(
                    "invalid score at position {}: {} (must be between 0 and {})",
                    position, score, WEIGHT_SCALE
                )));
            }
            Ok(WeightEntry {
                dest: dest.clone(),
                weight,
            })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Weights {
    handle: ContractHandle,
}

impl ContractWrapper for Weights {
    const KIND: ContractKind = ContractKind::Weights;

    fn from_handle(handle: ContractHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ContractHandle {
        &self.handle
    }
}

impl Weights {
    /// Raw weight `validator` assigned to `dest` on `netuid`.
    pub async fn weight(&self, netuid: u16, validator: Address, dest: Address) -> Result<U256, ContractError> {
        let tokens = self
            .handle
            .query(
                "weights",
                &[
                    Token::Uint(U256::from(netuid)),
                    Token::Address(validator),
                    Token::Address(dest),
                ],
            )
            .await?;
        single_uint("weights", tokens)
    }

    pub fn set_weights(&self, netuid: u16, entries: &[WeightEntry]) -> Result<ContractCall, ContractError> {
        let items = entries
            .iter()
            .map(WeightEntry::to_token)
            .collect::<Result<Vec<_>, _>>()?;
        self.handle.call(
            "setWeights",
            &[Token::Uint(U256::from(netuid)), Token::Array(items)],
            GAS_SET_WEIGHTS,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights_json() {
        let entries = parse_weights_json(
            r#"[{"dest": "0x0000000000000000000000000000000000000001", "weight": 500000}]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].weight, 500_000);
        assert!(parse_weights_json("{}").is_err());
    }

    #[test]
    fn test_weight_bounds() {
        let entry = WeightEntry {
            dest: "0x0000000000000000000000000000000000000001".into(),
            weight: WEIGHT_SCALE + 1,
        };
        assert!(entry.to_token().is_err());
        let ok = WeightEntry {
            weight: WEIGHT_SCALE,
            ..entry
        };
        assert!(ok.to_token().is_ok());
    }

    #[test]
    fn test_weights_from_scores() {
        let targets = vec![
            "0x0000000000000000000000000000000000000001".to_string(),
            "0x0000000000000000000000000000000000000002".to_string(),
        ];
        let scores = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let entries = weights_from_scores(&targets, &scores(&["500000", "1000000"])).unwrap();
        assert_eq!(entries[0].weight, 500_000);
        assert_eq!(entries[1].weight, WEIGHT_SCALE);
        assert_eq!(
            weights_from_scores(&targets, &scores(&["0", "0"])).unwrap()[0].weight,
            0
        );

        assert!(weights_from_scores(&targets, &scores(&["1"])).is_err());
    }

    #[test]
    fn test_score_errors_name_position() {
        let targets = vec![
            "0x0000000000000000000000000000000000000001".to_string(),
            "0x0000000000000000000000000000000000000002".to_string(),
        ];
        let check = |scores: [&str; 2], expected: &str| {
            let scores: Vec<String> = scores.iter().map(|s| s.to_string()).collect();
            let err = weights_from_scores(&targets, &scores).unwrap_err().to_string();
            assert!(err.contains(expected), "{}", err);
        };
        check(["1", "1000001"], "invalid score at position 2");
        check(["0.5", "1"], "invalid score format at position 1");
        check(["1", "-3"], "invalid score format at position 2");

        let bad_target = vec!["alice".to_string()];
        let err = weights_from_scores(&bad_target, &["1".to_string()]).unwrap_err();
        assert!(err.to_string().contains("invalid target address at position 1"));
    }
}
