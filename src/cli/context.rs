//! Per-invocation state handed to every command.

use crate::chain::{
    ConfirmPolicy, ContractCall, RpcClient, Transport, TxOutcome, TxPipeline, TxReceipt, TxSigner,
};
use crate::cli::utils::{password_or_prompt, print_info, print_success, spinner};
use crate::config::{Config, ContractKey};
use crate::contracts::ContractWrapper;
use crate::utils::address::{checksum, parse_address};
use crate::wallet::KeystoreStore;
use crate::Error;
use ethers_core::types::Address;
use std::sync::Arc;

/// Resolved configuration plus the transport used to reach the node.
#[derive(Clone)]
pub struct CommandContext {
    config: Config,
    transport: Option<Arc<dyn Transport>>,
}

impl CommandContext {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            transport: None,
        }
    }

    /// Route every RPC call through `transport` instead of HTTP.
    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport: Some(transport),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// RPC client for `rpc` (a per-command override) or the configured URL.
    ///
    /// Fails without touching the network when no URL is available.
    pub fn rpc_client(&self, rpc: Option<&str>) -> anyhow::Result<RpcClient> {
        if let Some(transport) = &self.transport {
            return Ok(RpcClient::new(Arc::clone(transport)));
        }
        let url = match rpc.map(str::trim).filter(|s| !s.is_empty()) {
            Some(url) => url,
            None => self.config.rpc_url()?,
        };
        tracing::debug!(url, "Using JSON-RPC endpoint");
        Ok(RpcClient::http(url))
    }

    pub fn keystore(&self) -> KeystoreStore {
        KeystoreStore::new(self.config.wallet_dir())
    }

    /// Address literal or keystore name to an address.
    pub fn resolve_account(&self, identifier: &str) -> anyhow::Result<Address> {
        Ok(self.keystore().resolve_address(identifier)?)
    }

    /// `explicit` when given, else the configured address for `key`.
    pub fn contract_address(&self, explicit: Option<&str>, key: ContractKey) -> anyhow::Result<Address> {
        let raw = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(value) => value,
            None => self.config.contract_address(key)?,
        };
        let address = parse_address(raw)?;
        print_info(&format!("Using contract address: {}", checksum(&address)));
        Ok(address)
    }

    /// Bind wrapper `W` at a resolved address.
    pub fn contract<W: ContractWrapper>(
        &self,
        client: &RpcClient,
        explicit: Option<&str>,
        key: ContractKey,
    ) -> anyhow::Result<W> {
        let address = self.contract_address(explicit, key)?;
        self.contract_at(client, address)
    }

    /// Bind wrapper `W` at `address`.
    pub fn contract_at<W: ContractWrapper>(&self, client: &RpcClient, address: Address) -> anyhow::Result<W> {
        Ok(W::load(address, client.clone(), &self.config.abi_dir())?)
    }

    /// Decrypt the keystore for `sender`, prompting for the password if absent.
    pub fn unlock_signer(&self, sender: &str, password: Option<String>) -> anyhow::Result<TxSigner> {
        let store = self.keystore();
        // Fail on a missing keystore before asking for a password.
        store.load(sender)?;
        let password = password_or_prompt(password, &format!("Password for {}", sender))?;
        let unlocked = store
            .unlock(sender, &password)
            .map_err(|e| anyhow::anyhow!("Failed to unlock {}: {}", sender, e))?;
        Ok(TxSigner::from_unlocked(&unlocked)?)
    }

    /// Signer from `--private-key` when set, else from the keystore of `sender`.
    pub fn signer(
        &self,
        sender: Option<&str>,
        private_key: Option<&str>,
        password: Option<String>,
    ) -> anyhow::Result<TxSigner> {
        match (private_key, sender) {
            (Some(key), _) => Ok(TxSigner::from_private_key_hex(key)?),
            (None, Some(sender)) => self.unlock_signer(sender, password),
            (None, None) => anyhow::bail!("Provide --sender or --private-key"),
        }
    }

    pub fn confirm_policy(&self) -> ConfirmPolicy {
        ConfirmPolicy {
            timeout: self.config.receipt_timeout(),
            poll_interval: self.config.receipt_poll_interval(),
        }
    }

    /// Sign, broadcast and wait for `call`, reporting each step.
    ///
    /// Returns the receipt of a successful transaction. Failed and still
    /// pending transactions are errors.
    pub async fn run_transaction(
        &self,
        client: &RpcClient,
        signer: &TxSigner,
        call: ContractCall,
    ) -> anyhow::Result<TxReceipt> {
        let pipeline = TxPipeline::new(client, signer);
        let hash = pipeline
            .submit(&call)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send {} transaction: {}", call.label, e))?;
        print_info(&format!("Broadcasted {} tx hash: {:?}", call.label, hash));

        let pb = spinner("Waiting for transaction receipt...");
        let outcome = pipeline.confirm(hash, self.confirm_policy()).await;
        pb.finish_and_clear();

        match outcome? {
            TxOutcome::Confirmed { receipt, .. } => {
                print_success(&format!(
                    "{} succeeded in block {}",
                    call.label,
                    block_label(&receipt)
                ));
                Ok(receipt)
            }
            TxOutcome::Failed { hash, receipt } => {
                println!("{}", receipt);
                Err(Error::TransactionFailed {
                    label: call.label,
                    hash: format!("{:?}", hash),
                    block: block_label(&receipt),
                }
                .into())
            }
            TxOutcome::Pending { hash, waited } => Err(Error::TransactionPending {
                label: call.label,
                hash: format!("{:?}", hash),
                waited_secs: waited.as_secs(),
            }
            .into()),
        }
    }
}

fn block_label(receipt: &TxReceipt) -> String {
    receipt
        .block_number()
        .map(|b| b.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
