//! Shared write path: build, sign, broadcast and confirm a transaction.
//!
//! ```text
//! ContractCall ─▶ prepare (nonce, gas price, chain id)
//!              ─▶ sign (local key)
//!              ─▶ broadcast (eth_sendRawTransaction)
//!              ─▶ confirm (poll receipt until timeout)
//! ```
//!
//! Nothing here retries. Node errors such as a reused nonce are returned
//! unchanged so the caller reports them.

use super::{Error, RpcClient, TxReceipt, TxSigner};
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, Bytes, TransactionRequest, H256, U256};
use std::time::Duration;
use tokio::time::Instant;

/// Unsigned call produced by a contract wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractCall {
    /// Human readable name used in status messages
    pub label: String,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub gas_limit: u64,
}

impl ContractCall {
    /// Plain native-currency transfer.
    pub fn transfer(to: Address, value: U256, gas_limit: u64) -> Self {
        Self {
            label: "Transfer".to_string(),
            to,
            data: Bytes::default(),
            value,
            gas_limit,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// How long to wait for a receipt and how often to ask for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::core::constants::DEFAULT_RECEIPT_TIMEOUT_SECS),
            poll_interval: Duration::from_millis(
                crate::core::constants::DEFAULT_RECEIPT_POLL_INTERVAL_MS,
            ),
        }
    }
}

/// Raw signed transaction ready for broadcast.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub raw: Bytes,
    pub hash: H256,
    pub nonce: U256,
}

/// Final state of a broadcast transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum TxOutcome {
    /// Included with status 1
    Confirmed { hash: H256, receipt: TxReceipt },
    /// Included with any other status
    Failed { hash: H256, receipt: TxReceipt },
    /// No receipt before the timeout elapsed
    Pending { hash: H256, waited: Duration },
}

/// Transaction pipeline bound to one client and one signer.
pub struct TxPipeline<'a> {
    client: &'a RpcClient,
    signer: &'a TxSigner,
}

impl<'a> TxPipeline<'a> {
    pub fn new(client: &'a RpcClient, signer: &'a TxSigner) -> Self {
        Self { client, signer }
    }

    pub fn sender(&self) -> Address {
        self.signer.address()
    }

    /// Fill nonce, gas price and chain id from the node.
    pub async fn prepare(&self, call: &ContractCall) -> Result<TypedTransaction, Error> {
        let from = self.signer.address();
        let nonce = self.client.get_transaction_count(from).await?;
        let gas_price = self.client.gas_price().await?;
        let chain_id = self.client.chain_id().await?;
        tracing::debug!(
            label = %call.label,
            %nonce,
            %gas_price,
            chain_id,
            gas = call.gas_limit,
            "Prepared transaction"
        );
        Ok(build_transaction(call, from, nonce, gas_price, chain_id))
    }

    pub fn sign(&self, tx: &TypedTransaction) -> Result<SignedTransaction, Error> {
        let (raw, hash) = self.signer.sign_transaction(tx)?;
        Ok(SignedTransaction {
            raw,
            hash: H256::from(hash),
            nonce: tx.nonce().copied().unwrap_or_default(),
        })
    }

    /// Submit a signed transaction and return the hash reported by the node.
    pub async fn broadcast(&self, signed: &SignedTransaction) -> Result<H256, Error> {
        let hash = self.client.send_raw_transaction(&signed.raw).await?;
        tracing::info!(hash = ?hash, nonce = %signed.nonce, "Broadcast transaction");
        Ok(hash)
    }

    /// Prepare, sign and broadcast.
    pub async fn submit(&self, call: &ContractCall) -> Result<H256, Error> {
        let tx = self.prepare(call).await?;
        let signed = self.sign(&tx)?;
        self.broadcast(&signed).await
    }

    /// Poll for a receipt until `policy.timeout` elapses.
    pub async fn confirm(&self, hash: H256, policy: ConfirmPolicy) -> Result<TxOutcome, Error> {
        wait_for_receipt(self.client, hash, policy).await
    }
}

/// Legacy transaction for `call` sent by `from`.
pub fn build_transaction(
    call: &ContractCall,
    from: Address,
    nonce: U256,
    gas_price: U256,
    chain_id: u64,
) -> TypedTransaction {
    TransactionRequest::new()
        .from(from)
        .to(call.to)
        .value(call.value)
        .data(call.data.clone())
        .gas(call.gas_limit)
        .gas_price(gas_price)
        .nonce(nonce)
        .chain_id(chain_id)
        .into()
}

/// Poll `eth_getTransactionReceipt` for `hash`.
pub async fn wait_for_receipt(
    client: &RpcClient,
    hash: H256,
    policy: ConfirmPolicy,
) -> Result<TxOutcome, Error> {
    let started = Instant::now();
    let deadline = started + policy.timeout;
    loop {
        if let Some(receipt) = client.get_transaction_receipt(hash).await? {
            return Ok(if receipt.is_success() {
                TxOutcome::Confirmed { hash, receipt }
            } else {
                TxOutcome::Failed { hash, receipt }
            });
        }
        if Instant::now() >= deadline {
            tracing::warn!(hash = ?hash, "Receipt wait timed out");
            return Ok(TxOutcome::Pending {
                hash,
                waited: started.elapsed(),
            });
        }
        tokio::time::sleep(policy.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_transaction_fields() {
        let call = ContractCall::transfer(Address::repeat_byte(0x22), U256::from(5u64), 21_000);
        let tx = build_transaction(
            &call,
            Address::repeat_byte(0x11),
            U256::from(3u64),
            U256::from(10u64),
            42,
        );
        assert_eq!(tx.nonce(), Some(&U256::from(3u64)));
        assert_eq!(tx.gas(), Some(&U256::from(21_000u64)));
        assert_eq!(tx.gas_price(), Some(U256::from(10u64)));
        assert_eq!(tx.chain_id().map(|c| c.as_u64()), Some(42));
        assert_eq!(tx.value(), Some(&U256::from(5u64)));
    }

    #[test]
    fn test_default_policy() {
        let policy = ConfirmPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(120));
        assert_eq!(policy.poll_interval, Duration::from_secs(1));
    }
}
