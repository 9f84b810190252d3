//! Subnet registry (`SubnetManager`).

use super::decode::{single_address, single_bool, single_uint, Fields};
use super::{ContractError, ContractHandle, ContractKind, ContractWrapper};
use crate::chain::ContractCall;
use crate::core::constants::{
    GAS_ACTIVATE_SUBNET, GAS_REGISTER_NETWORK, GAS_UPDATE_NETWORK_PARAMS,
    GAS_UPDATE_SUBNET_INFO, GAS_UPDATE_SUBNET_PARAMS,
};
use ethers_core::abi::Token;
use ethers_core::types::{Address, U256};
use serde_json::{Map, Value};

/// Registry record for one subnet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetInfo {
    pub netuid: u16,
    pub owner: Address,
    pub alpha_token: Address,
    pub amm_pool: Address,
    pub locked_amount: U256,
    pub pool_initial_tao: U256,
    pub burned_amount: U256,
    pub created_at: U256,
    pub is_active: bool,
    pub name: String,
    pub description: String,
}

impl SubnetInfo {
    pub(crate) fn read(fields: &mut Fields) -> Result<Self, ContractError> {
        Ok(Self {
            netuid: fields.u16()?,
            owner: fields.address()?,
            alpha_token: fields.address()?,
            amm_pool: fields.address()?,
            locked_amount: fields.uint()?,
            pool_initial_tao: fields.uint()?,
            burned_amount: fields.uint()?,
            created_at: fields.uint()?,
            is_active: fields.bool()?,
            name: fields.string()?,
            description: fields.string()?,
        })
    }
}

/// Per-subnet hyperparameters, in on-chain field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetHyperparams {
    pub rho: u16,
    pub kappa: u16,
    pub immunity_period: u16,
    pub tempo: u16,
    pub max_validators: u16,
    pub activity_cutoff: u16,
    pub max_allowed_uids: u16,
    pub max_allowed_validators: u16,
    pub min_allowed_weights: u16,
    pub max_weights_limit: u16,
    pub base_burn_cost: U256,
    pub current_difficulty: u64,
    pub target_regs_per_interval: u16,
    pub max_regs_per_block: u16,
    pub weights_rate_limit: u64,
    pub registration_allowed: bool,
    pub commit_reveal_enabled: bool,
    pub commit_reveal_period: u64,
    pub serving_rate_limit: u64,
    pub validator_threshold: U256,
    pub neuron_threshold: U256,
}

impl SubnetHyperparams {
    pub(crate) fn read(fields: &mut Fields) -> Result<Self, ContractError> {
        Ok(Self {
            rho: fields.u16()?,
            kappa: fields.u16()?,
            immunity_period: fields.u16()?,
            tempo: fields.u16()?,
            max_validators: fields.u16()?,
            activity_cutoff: fields.u16()?,
            max_allowed_uids: fields.u16()?,
            max_allowed_validators: fields.u16()?,
            min_allowed_weights: fields.u16()?,
            max_weights_limit: fields.u16()?,
            base_burn_cost: fields.uint()?,
            current_difficulty: fields.u64()?,
            target_regs_per_interval: fields.u16()?,
            max_regs_per_block: fields.u16()?,
            weights_rate_limit: fields.u64()?,
            registration_allowed: fields.bool()?,
            commit_reveal_enabled: fields.bool()?,
            commit_reveal_period: fields.u64()?,
            serving_rate_limit: fields.u64()?,
            validator_threshold: fields.uint()?,
            neuron_threshold: fields.uint()?,
        })
    }

    /// ABI tuple in declaration order.
    pub fn to_token(&self) -> Token {
        let u16t = |v: u16| Token::Uint(U256::from(v));
        let u64t = |v: u64| Token::Uint(U256::from(v));
        Token::Tuple(vec![
            u16t(self.rho),
            u16t(self.kappa),
            u16t(self.immunity_period),
            u16t(self.tempo),
            u16t(self.max_validators),
            u16t(self.activity_cutoff),
            u16t(self.max_allowed_uids),
            u16t(self.max_allowed_validators),
            u16t(self.min_allowed_weights),
            u16t(self.max_weights_limit),
            Token::Uint(self.base_burn_cost),
            u64t(self.current_difficulty),
            u16t(self.target_regs_per_interval),
            u16t(self.max_regs_per_block),
            u64t(self.weights_rate_limit),
            Token::Bool(self.registration_allowed),
            Token::Bool(self.commit_reveal_enabled),
            u64t(self.commit_reveal_period),
            u64t(self.serving_rate_limit),
            Token::Uint(self.validator_threshold),
            Token::Uint(self.neuron_threshold),
        ])
    }

    /// Field names and display values, in on-chain order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("rho", self.rho.to_string()),
            ("kappa", self.kappa.to_string()),
            ("immunityPeriod", self.immunity_period.to_string()),
            ("tempo", self.tempo.to_string()),
            ("maxValidators", self.max_validators.to_string()),
            ("activityCutoff", self.activity_cutoff.to_string()),
            ("maxAllowedUids", self.max_allowed_uids.to_string()),
            ("maxAllowedValidators", self.max_allowed_validators.to_string()),
            ("minAllowedWeights", self.min_allowed_weights.to_string()),
            ("maxWeightsLimit", self.max_weights_limit.to_string()),
            ("baseBurnCost", self.base_burn_cost.to_string()),
            ("currentDifficulty", self.current_difficulty.to_string()),
            ("targetRegsPerInterval", self.target_regs_per_interval.to_string()),
            ("maxRegsPerBlock", self.max_regs_per_block.to_string()),
            ("weightsRateLimit", self.weights_rate_limit.to_string()),
            ("registrationAllowed", self.registration_allowed.to_string()),
            ("commitRevealEnabled", self.commit_reveal_enabled.to_string()),
            ("commitRevealPeriod", self.commit_reveal_period.to_string()),
            ("servingRateLimit", self.serving_rate_limit.to_string()),
            ("validatorThreshold", self.validator_threshold.to_string()),
            ("neuronThreshold", self.neuron_threshold.to_string()),
        ]
    }

    /// Copy of `self` with fields replaced by entries of a JSON object.
    ///
    /// Keys use the on-chain camelCase names. Numbers may be JSON numbers or
    /// decimal strings. Unknown keys are rejected.
    pub fn with_overrides(&self, overrides: &Map<String, Value>) -> Result<Self, ContractError> {
        let known: Vec<&str> = self.entries().into_iter().map(|(k, _)| k).collect();
        if let Some(unknown) = overrides.keys().find(|k| !known.contains(&k.as_str())) {
            return Err(ContractError::InvalidArgument(format!(
                "unknown hyperparameter '{}'",
                unknown
            )));
        }

        let o = overrides;
        Ok(Self {
            rho: json_u16(o, "rho", self.rho)?,
            kappa: json_u16(o, "kappa", self.kappa)?,
            immunity_period: json_u16(o, "immunityPeriod", self.immunity_period)?,
            tempo: json_u16(o, "tempo", self.tempo)?,
            max_validators: json_u16(o, "maxValidators", self.max_validators)?,
            activity_cutoff: json_u16(o, "activityCutoff", self.activity_cutoff)?,
            max_allowed_uids: json_u16(o, "maxAllowedUids", self.max_allowed_uids)?,
            max_allowed_validators: json_u16(o, "maxAllowedValidators", self.max_allowed_validators)?,
            min_allowed_weights: json_u16(o, "minAllowedWeights", self.min_allowed_weights)?,
            max_weights_limit: json_u16(o, "maxWeightsLimit", self.max_weights_limit)?,
            base_burn_cost: json_u256(o, "baseBurnCost", self.base_burn_cost)?,
            current_difficulty: json_u64(o, "currentDifficulty", self.current_difficulty)?,
            target_regs_per_interval: json_u16(o, "targetRegsPerInterval", self.target_regs_per_interval)?,
            max_regs_per_block: json_u16(o, "maxRegsPerBlock", self.max_regs_per_block)?,
            weights_rate_limit: json_u64(o, "weightsRateLimit", self.weights_rate_limit)?,
            registration_allowed: json_bool(o, "registrationAllowed", self.registration_allowed)?,
            commit_reveal_enabled: json_bool(o, "commitRevealEnabled", self.commit_reveal_enabled)?,
            commit_reveal_period: json_u64(o, "commitRevealPeriod", self.commit_reveal_period)?,
            serving_rate_limit: json_u64(o, "servingRateLimit", self.serving_rate_limit)?,
            validator_threshold: json_u256(o, "validatorThreshold", self.validator_threshold)?,
            neuron_threshold: json_u256(o, "neuronThreshold", self.neuron_threshold)?,
        })
    }
}

fn json_invalid(key: &str, value: &Value) -> ContractError {
    ContractError::InvalidArgument(format!("invalid value for {}: {}", key, value))
}

fn json_u256(map: &Map<String, Value>, key: &str, current: U256) -> Result<U256, ContractError> {
    match map.get(key) {
        None => Ok(current),
        Some(Value::Number(n)) => n.as_u64().map(U256::from).ok_or_else(|| json_invalid(key, &map[key])),
        Some(Value::String(s)) => U256::from_dec_str(s.trim()).map_err(|_| json_invalid(key, &map[key])),
        Some(other) => Err(json_invalid(key, other)),
    }
}

fn json_u64(map: &Map<String, Value>, key: &str, current: u64) -> Result<u64, ContractError> {
    let value = json_u256(map, key, U256::from(current))?;
    if value > U256::from(u64::MAX) {
        return Err(ContractError::InvalidArgument(format!("{} out of range", key)));
    }
    Ok(value.as_u64())
}

fn json_u16(map: &Map<String, Value>, key: &str, current: u16) -> Result<u16, ContractError> {
    let value = json_u64(map, key, u64::from(current))?;
    u16::try_from(value).map_err(|_| ContractError::InvalidArgument(format!("{} out of range", key)))
}

fn json_bool(map: &Map<String, Value>, key: &str, current: bool) -> Result<bool, ContractError> {
    match map.get(key) {
        None => Ok(current),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(json_invalid(key, other)),
    }
}

/// `getSubnetDetails` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetDetails {
    pub info: SubnetInfo,
    pub params: SubnetHyperparams,
    pub current_price: U256,
    pub total_volume: U256,
    pub hetu_reserve: U256,
    pub alpha_reserve: U256,
}

/// Subnet registry contract
#[derive(Debug, Clone)]
pub struct SubnetManager {
    handle: ContractHandle,
}

impl ContractWrapper for SubnetManager {
    const KIND: ContractKind = ContractKind::SubnetManager;

    fn from_handle(handle: ContractHandle) -> Self {
        Self { handle }
    }

    fn handle(&self) -> &ContractHandle {
        &self.handle
    }
}

fn netuid_token(netuid: u16) -> Token {
    Token::Uint(U256::from(netuid))
}

impl SubnetManager {
    pub async fn next_netuid(&self) -> Result<u16, ContractError> {
        let tokens = self.handle.query("getNextNetuid", &[]).await?;
        Fields::new("getNextNetuid", tokens).u16()
    }

    pub async fn subnet_details(&self, netuid: u16) -> Result<SubnetDetails, ContractError> {
        let tokens = self
            .handle
            .query("getSubnetDetails", &[netuid_token(netuid)])
            .await?;
        let mut fields = Fields::new("getSubnetDetails", tokens);
        Ok(SubnetDetails {
            info: SubnetInfo::read(&mut fields.tuple()?)?,
            params: SubnetHyperparams::read(&mut fields.tuple()?)?,
            current_price: fields.uint()?,
            total_volume: fields.uint()?,
            hetu_reserve: fields.uint()?,
            alpha_reserve: fields.uint()?,
        })
    }

    pub async fn subnet_info(&self, netuid: u16) -> Result<SubnetInfo, ContractError> {
        let tokens = self
            .handle
            .query("getSubnetInfo", &[netuid_token(netuid)])
            .await?;
        SubnetInfo::read(&mut Fields::from_struct("getSubnetInfo", tokens))
    }

    pub async fn subnet_params(&self, netuid: u16) -> Result<SubnetHyperparams, ContractError> {
        self.read_hyperparams("getSubnetParams", netuid).await
    }

    pub async fn get_subnet_hyperparams(&self, netuid: u16) -> Result<SubnetHyperparams, ContractError> {
        self.read_hyperparams("getSubnetHyperparams", netuid).await
    }

    /// Public mapping getter `subnetHyperparams(netuid)`.
    pub async fn subnet_hyperparams(&self, netuid: u16) -> Result<SubnetHyperparams, ContractError> {
        self.read_hyperparams("subnetHyperparams", netuid).await
    }

    async fn read_hyperparams(&self, method: &str, netuid: u16) -> Result<SubnetHyperparams, ContractError> {
        let tokens = self.handle.query(method, &[netuid_token(netuid)]).await?;
        SubnetHyperparams::read(&mut Fields::from_struct(method, tokens))
    }

    pub async fn user_subnets(&self, user: Address) -> Result<Vec<u16>, ContractError> {
        let tokens = self
            .handle
            .query("getUserSubnets", &[Token::Address(user)])
            .await?;
        Fields::new("getUserSubnets", tokens).u16s()
    }

    pub async fn total_networks(&self) -> Result<u16, ContractError> {
        let tokens = self.handle.query("totalNetworks", &[]).await?;
        Fields::new("totalNetworks", tokens).u16()
    }

    /// Current cost in WHETU wei to lock for a new subnet.
    pub async fn network_lock_cost(&self) -> Result<U256, ContractError> {
        single_uint("getNetworkLockCost", self.handle.query("getNetworkLockCost", &[]).await?)
    }

    /// WHETU token used for locks.
    pub async fn hetu_token(&self) -> Result<Address, ContractError> {
        single_address("hetuToken", self.handle.query("hetuToken", &[]).await?)
    }

    pub async fn network_last_lock(&self) -> Result<U256, ContractError> {
        single_uint("networkLastLock", self.handle.query("networkLastLock", &[]).await?)
    }

    pub async fn network_last_lock_block(&self) -> Result<U256, ContractError> {
        single_uint(
            "networkLastLockBlock",
            self.handle.query("networkLastLockBlock", &[]).await?,
        )
    }

    pub async fn network_rate_limit(&self) -> Result<U256, ContractError> {
        single_uint("networkRateLimit", self.handle.query("networkRateLimit", &[]).await?)
    }

    pub async fn network_min_lock(&self) -> Result<U256, ContractError> {
        single_uint("networkMinLock", self.handle.query("networkMinLock", &[]).await?)
    }

    pub async fn lock_reduction_interval(&self) -> Result<U256, ContractError> {
        single_uint(
            "lockReductionInterval",
            self.handle.query("lockReductionInterval", &[]).await?,
        )
    }

    /// `index`-th subnet owned by `owner`.
    pub async fn owner_subnets(&self, owner: Address, index: U256) -> Result<u16, ContractError> {
        let tokens = self
            .handle
            .query("ownerSubnets", &[Token::Address(owner), Token::Uint(index)])
            .await?;
        Fields::new("ownerSubnets", tokens).u16()
    }

    pub async fn subnet_exists(&self, netuid: u16) -> Result<bool, ContractError> {
        single_bool(
            "subnetExists",
            self.handle.query("subnetExists", &[netuid_token(netuid)]).await?,
        )
    }

    /// Public mapping getter `subnets(netuid)`.
    pub async fn subnets(&self, netuid: u16) -> Result<SubnetInfo, ContractError> {
        let tokens = self.handle.query("subnets", &[netuid_token(netuid)]).await?;
        SubnetInfo::read(&mut Fields::from_struct("subnets", tokens))
    }

    pub fn register_network(
        &self,
        name: &str,
        description: &str,
        token_name: &str,
        token_symbol: &str,
    ) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "registerNetwork",
            &[
                Token::String(name.to_string()),
                Token::String(description.to_string()),
                Token::String(token_name.to_string()),
                Token::String(token_symbol.to_string()),
            ],
            GAS_REGISTER_NETWORK,
        )
    }

    pub fn update_subnet_info(
        &self,
        netuid: u16,
        name: &str,
        description: &str,
    ) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "updateSubnetInfo",
            &[
                netuid_token(netuid),
                Token::String(name.to_string()),
                Token::String(description.to_string()),
            ],
            GAS_UPDATE_SUBNET_INFO,
        )
    }

    pub fn activate_subnet(&self, netuid: u16) -> Result<ContractCall, ContractError> {
        self.handle
            .call("activateSubnet", &[netuid_token(netuid)], GAS_ACTIVATE_SUBNET)
    }

    pub fn update_network_params(
        &self,
        network_min_lock: U256,
        network_rate_limit: U256,
        lock_reduction_interval: U256,
    ) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "updateNetworkParams",
            &[
                Token::Uint(network_min_lock),
                Token::Uint(network_rate_limit),
                Token::Uint(lock_reduction_interval),
            ],
            GAS_UPDATE_NETWORK_PARAMS,
        )
    }

    pub fn update_subnet_hyperparams(
        &self,
        netuid: u16,
        params: &SubnetHyperparams,
    ) -> Result<ContractCall, ContractError> {
        self.handle.call(
            "updateSubnetHyperparams",
            &[netuid_token(netuid), params.to_token()],
            GAS_UPDATE_SUBNET_PARAMS,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn sample_params() -> SubnetHyperparams {
        SubnetHyperparams {
            rho: 10,
            kappa: 32767,
            immunity_period: 7200,
            tempo: 360,
            max_validators: 64,
            activity_cutoff: 5000,
            max_allowed_uids: 4096,
            max_allowed_validators: 64,
            min_allowed_weights: 1,
            max_weights_limit: 1000,
            base_burn_cost: U256::exp10(18),
            current_difficulty: 10_000_000,
            target_regs_per_interval: 2,
            max_regs_per_block: 1,
            weights_rate_limit: 100,
            registration_allowed: true,
            commit_reveal_enabled: false,
            commit_reveal_period: 1,
            serving_rate_limit: 50,
            validator_threshold: U256::exp10(18) * 100,
            neuron_threshold: U256::exp10(18) * 10,
        }
    }

    #[test]
    fn test_hyperparams_token_roundtrip() {
        let params = sample_params();
        let token = params.to_token();
        let decoded = SubnetHyperparams::read(&mut Fields::from_struct("t", vec![token])).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_overrides_merge() {
        let params = sample_params();
        let overrides = json!({"tempo": 100, "neuronThreshold": "5", "registrationAllowed": false});
        let merged = params
            .with_overrides(overrides.as_object().unwrap())
            .unwrap();
        assert_eq!(merged.tempo, 100);
        assert_eq!(merged.neuron_threshold, U256::from(5u64));
        assert!(!merged.registration_allowed);
        assert_eq!(merged.kappa, params.kappa);
    }

    #[test]
    fn test_overrides_reject_unknown_and_out_of_range() {
        let params = sample_params();
        let unknown = json!({"notAField": 1});
        assert!(params.with_overrides(unknown.as_object().unwrap()).is_err());
        let too_big = json!({"tempo": 70000});
        assert!(params.with_overrides(too_big.as_object().unwrap()).is_err());
        let wrong_type = json!({"registrationAllowed": "yes"});
        assert!(params.with_overrides(wrong_type.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_entries_cover_every_field() {
        assert_eq!(sample_params().entries().len(), 21);
    }
}
