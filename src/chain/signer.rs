//! Local transaction signing.
//!
//! Signatures are deterministic (RFC 6979), so signing the same transaction
//! with the same key always produces the same raw bytes.

use super::Error;
use crate::wallet::UnlockedKey;
use ethers_core::k256::ecdsa::SigningKey;
use ethers_core::k256::FieldBytes;
use ethers_core::types::transaction::eip2718::TypedTransaction;
use ethers_core::types::{Address, Bytes, Signature, U256};
use ethers_core::utils::{keccak256, secret_key_to_address};

/// Signs legacy transactions with EIP-155 replay protection.
pub struct TxSigner {
    key: SigningKey,
    address: Address,
}

impl TxSigner {
    pub fn new(key: SigningKey) -> Self {
        let address = secret_key_to_address(&key);
        Self { key, address }
    }

    /// Build a signer from a decrypted keystore key.
    pub fn from_unlocked(unlocked: &UnlockedKey) -> Result<Self, Error> {
        let key = unlocked
            .signing_key()
            .map_err(|e| Error::Signing(e.to_string()))?;
        Ok(Self::new(key))
    }

    /// Build a signer from a raw hex private key.
    pub fn from_private_key_hex(private_key: &str) -> Result<Self, Error> {
        let unlocked =
            UnlockedKey::from_hex(private_key).map_err(|e| Error::Signing(e.to_string()))?;
        Self::from_unlocked(&unlocked)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign the transaction's sighash with an EIP-155 `v` for `chain_id`.
    pub fn sign_hash(&self, tx: &TypedTransaction, chain_id: u64) -> Result<Signature, Error> {
        let sighash = tx.sighash();
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(sighash.as_bytes())
            .map_err(|e| Error::Signing(e.to_string()))?;

        let r_bytes: FieldBytes = signature.r().into();
        let s_bytes: FieldBytes = signature.s().into();
        Ok(Signature {
            r: U256::from_big_endian(r_bytes.as_slice()),
            s: U256::from_big_endian(s_bytes.as_slice()),
            v: u64::from(recovery_id.to_byte()) + 35 + chain_id * 2,
        })
    }

    /// RLP-encoded signed transaction and its hash.
    pub fn sign_transaction(&self, tx: &TypedTransaction) -> Result<(Bytes, [u8; 32]), Error> {
        let chain_id = tx
            .chain_id()
            .ok_or_else(|| Error::Signing("transaction has no chain id".to_string()))?
            .as_u64();
        let signature = self.sign_hash(tx, chain_id)?;
        let raw = tx.rlp_signed(&signature);
        let hash = keccak256(&raw);
        Ok((raw, hash))
    }
}

impl std::fmt::Debug for TxSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
