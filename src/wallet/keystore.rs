//! Encrypted keystore files, one per account.
//!
//! Keystores use the Web3 Secret Storage (v3) JSON format and are stored as
//! `{wallet_dir}/{checksum_address}.json`:
//!
//! ```json
//! {
//!     "address": "bc45c2511ea43f998e659b4722d6795c482a7e07",
//!     "crypto": {
//!         "cipher": "aes-128-ctr",
//!         "ciphertext": "<hex>",
//!         "cipherparams": {"iv": "<hex>"},
//!         "kdf": "scrypt",
//!         "kdfparams": {"dklen": 32, "n": 8192, "p": 1, "r": 8, "salt": "<hex>"},
//!         "mac": "<hex>"
//!     },
//!     "id": "<uuid>",
//!     "version": 3
//! }
//! ```
//!
//! Decrypted key material is held in [`Zeroizing`] buffers and never written
//! back to disk.

use crate::utils::address::{checksum, looks_like_address, parse_address};
use ethers_core::k256::ecdsa::SigningKey;
use ethers_core::types::Address;
use ethers_core::utils::secret_key_to_address;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors that can occur during keystore operations.
#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("Keystore file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Invalid wallet name '{0}': must not be empty or contain path separators")]
    InvalidName(String),

    #[error("Failed to decrypt keystore {}: wrong password or corrupted keystore", .0.display())]
    Decryption(PathBuf),

    #[error("Keystore already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Keystore {} has no valid address field", .0.display())]
    MissingAddress(PathBuf),

    #[error("Keystore {} decrypted to {actual}, expected {expected}", .path.display())]
    AddressMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Keystore encryption failed: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of creating or importing a wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedWallet {
    pub address: Address,
    pub path: PathBuf,
}

/// A keystore file read from disk, still encrypted.
#[derive(Debug, Clone)]
pub struct KeystoreFile {
    pub path: PathBuf,
    pub json: serde_json::Value,
}

impl KeystoreFile {
    /// Address recorded in the keystore's `address` field.
    pub fn address(&self) -> Result<Address, KeystoreError> {
        let raw = self
            .json
            .get("address")
            .and_then(|v| v.as_str())
            .ok_or_else(|| KeystoreError::MissingAddress(self.path.clone()))?;
        let prefixed = if raw.starts_with("0x") || raw.starts_with("0X") {
            raw.to_string()
        } else {
            format!("0x{}", raw)
        };
        parse_address(&prefixed).map_err(|_| KeystoreError::MissingAddress(self.path.clone()))
    }
}

/// Decrypted private key.
pub struct UnlockedKey {
    address: Address,
    secret: Zeroizing<Vec<u8>>,
}

impl UnlockedKey {
    /// Build from raw secret bytes, deriving the address.
    pub fn from_secret(secret: Zeroizing<Vec<u8>>) -> Result<Self, KeystoreError> {
        let key = SigningKey::from_slice(&secret)
            .map_err(|e| KeystoreError::InvalidKey(e.to_string()))?;
        let address = secret_key_to_address(&key);
        Ok(Self { address, secret })
    }

    /// Parse a hex private key (with or without `0x`).
    pub fn from_hex(private_key: &str) -> Result<Self, KeystoreError> {
        let trimmed = private_key.trim();
        let hex_part = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if hex_part.len() != 64 {
            return Err(KeystoreError::InvalidKey(
                "expected 32 bytes of hex".to_string(),
            ));
        }
        let bytes = hex::decode(hex_part)
            .map_err(|e| KeystoreError::InvalidKey(e.to_string()))?;
        Self::from_secret(Zeroizing::new(bytes))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn secret(&self) -> &[u8] {
        &self.secret
    }

    pub fn signing_key(&self) -> Result<SigningKey, KeystoreError> {
        SigningKey::from_slice(&self.secret).map_err(|e| KeystoreError::InvalidKey(e.to_string()))
    }

    /// `0x`-prefixed hex of the private key.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(format!("0x{}", hex::encode(self.secret.as_slice())))
    }
}

impl fmt::Debug for UnlockedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnlockedKey")
            .field("address", &checksum(&self.address))
            .finish_non_exhaustive()
    }
}

/// Keystore directory.
#[derive(Debug, Clone)]
pub struct KeystoreStore {
    dir: PathBuf,
}

impl KeystoreStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a keystore with this identifier would live at.
    ///
    /// Identifiers are plain file stems; anything that could leave the wallet
    /// directory is rejected.
    pub fn path_for(&self, identifier: &str) -> Result<PathBuf, KeystoreError> {
        let escapes = identifier.is_empty()
            || identifier == "."
            || identifier == ".."
            || identifier.contains(['/', '\\'])
            || Path::new(identifier).is_absolute();
        if escapes {
            return Err(KeystoreError::InvalidName(identifier.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", identifier)))
    }

    /// Generate a new key and write it encrypted with `password`.
    pub fn create(&self, password: &str) -> Result<CreatedWallet, KeystoreError> {
        let mut rng = rand::thread_rng();
        let key = SigningKey::random(&mut rng);
        let secret = Zeroizing::new(key.to_bytes().to_vec());
        self.write_keystore(&UnlockedKey::from_secret(secret)?, password)
    }

    /// Encrypt an existing private key into a new keystore.
    pub fn import(&self, private_key: &str, password: &str) -> Result<CreatedWallet, KeystoreError> {
        let key = UnlockedKey::from_hex(private_key)?;
        self.write_keystore(&key, password)
    }

    fn write_keystore(&self, key: &UnlockedKey, password: &str) -> Result<CreatedWallet, KeystoreError> {
        fs::create_dir_all(&self.dir)?;
        let file_name = format!("{}.json", checksum(&key.address()));
        let path = self.dir.join(&file_name);
        if path.exists() {
            return Err(KeystoreError::AlreadyExists(path));
        }

        let mut rng = rand::thread_rng();
        eth_keystore::encrypt_key(&self.dir, &mut rng, key.secret(), password, Some(&file_name))
            .map_err(|e| KeystoreError::Encryption(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Wrote keystore");
        Ok(CreatedWallet {
            address: key.address(),
            path,
        })
    }

    /// Locate the keystore file for `identifier`.
    ///
    /// An exact stem match wins; otherwise stems are compared case-insensitively
    /// so lowercase addresses find checksum-named files.
    pub fn locate(&self, identifier: &str) -> Result<PathBuf, KeystoreError> {
        let exact = self.path_for(identifier)?;
        if exact.is_file() {
            return Ok(exact);
        }
        let wanted = identifier.to_lowercase();
        self.list()?
            .into_iter()
            .find(|stem| stem.to_lowercase() == wanted)
            .map(|stem| self.dir.join(format!("{}.json", stem)))
            .ok_or(KeystoreError::NotFound(exact))
    }

    /// Read a keystore without decrypting it.
    pub fn load(&self, identifier: &str) -> Result<KeystoreFile, KeystoreError> {
        let path = self.locate(identifier)?;
        let contents = fs::read_to_string(&path)?;
        let json = serde_json::from_str(&contents)?;
        Ok(KeystoreFile { path, json })
    }

    /// Decrypt the keystore for `identifier`.
    pub fn unlock(&self, identifier: &str, password: &str) -> Result<UnlockedKey, KeystoreError> {
        let file = self.load(identifier)?;
        let secret = eth_keystore::decrypt_key(&file.path, password).map_err(|e| {
            tracing::debug!(path = %file.path.display(), error = %e, "Keystore decryption failed");
            KeystoreError::Decryption(file.path.clone())
        })?;
        let unlocked = UnlockedKey::from_secret(Zeroizing::new(secret))
            .map_err(|_| KeystoreError::Decryption(file.path.clone()))?;

        if let Ok(recorded) = file.address() {
            if recorded != unlocked.address() {
                return Err(KeystoreError::AddressMismatch {
                    path: file.path,
                    expected: checksum(&recorded),
                    actual: checksum(&unlocked.address()),
                });
            }
        }
        Ok(unlocked)
    }

    /// Decrypt and return the private key as hex.
    pub fn export_private_key(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Zeroizing<String>, KeystoreError> {
        Ok(self.unlock(identifier, password)?.private_key_hex())
    }

    /// Stems of all `*.json` files, sorted. A missing directory has no wallets.
    pub fn list(&self) -> Result<Vec<String>, KeystoreError> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut stems = BTreeSet::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                stems.insert(stem.to_string());
            }
        }
        Ok(stems.into_iter().collect())
    }

    /// Resolve an address literal or wallet name to an address.
    ///
    /// Strings shaped like an address are parsed directly without touching the
    /// keystore directory.
    pub fn resolve_address(&self, identifier: &str) -> Result<Address, KeystoreError> {
        if looks_like_address(identifier) {
            return parse_address(identifier)
                .map_err(|_| KeystoreError::InvalidAddress(identifier.to_string()));
        }
        match self.load(identifier) {
            Ok(file) => file
                .address()
                .map_err(|_| KeystoreError::WalletNotFound(identifier.to_string())),
            Err(KeystoreError::NotFound(_)) => {
                Err(KeystoreError::WalletNotFound(identifier.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const TEST_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

    #[test]
    fn test_unlocked_key_from_hex() {
        let key = UnlockedKey::from_hex(TEST_KEY).unwrap();
        assert_eq!(checksum(&key.address()), TEST_ADDRESS);
        assert_eq!(key.private_key_hex().as_str(), TEST_KEY);
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(matches!(
            UnlockedKey::from_hex("0x1234"),
            Err(KeystoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let key = UnlockedKey::from_hex(TEST_KEY).unwrap();
        let debug = format!("{:?}", key);
        assert!(debug.contains(TEST_ADDRESS));
        assert!(!debug.contains(&TEST_KEY[2..]));
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = KeystoreStore::new(dir.path().join("missing"));
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_only_json_stems() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("0xabc.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let store = KeystoreStore::new(dir.path());
        assert_eq!(store.list().unwrap(), vec!["0xabc".to_string()]);
    }

    #[test]
    fn test_import_and_unlock() {
        let dir = TempDir::new().unwrap();
        let store = KeystoreStore::new(dir.path());

        let created = store.import(TEST_KEY, "pw").unwrap();
        assert_eq!(checksum(&created.address), TEST_ADDRESS);
        assert_eq!(created.path, dir.path().join(format!("{}.json", TEST_ADDRESS)));

        let unlocked = store.unlock(TEST_ADDRESS, "pw").unwrap();
        assert_eq!(unlocked.address(), created.address);

        assert!(matches!(
            store.import(TEST_KEY, "pw"),
            Err(KeystoreError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_lowercase_identifier_finds_checksum_file() {
        let dir = TempDir::new().unwrap();
        let store = KeystoreStore::new(dir.path());
        store.import(TEST_KEY, "pw").unwrap();

        let file = store.load(&TEST_ADDRESS.to_lowercase()).unwrap();
        assert_eq!(checksum(&file.address().unwrap()), TEST_ADDRESS);
    }

    #[test]
    fn test_resolve_address_literal_skips_keystore() {
        let dir = TempDir::new().unwrap();
        let store = KeystoreStore::new(dir.path().join("does-not-exist"));
        let resolved = store.resolve_address(TEST_ADDRESS).unwrap();
        assert_eq!(checksum(&resolved), TEST_ADDRESS);
    }

    #[test]
    fn test_resolve_unknown_name() {
        let dir = TempDir::new().unwrap();
        let store = KeystoreStore::new(dir.path());
        let err = store.resolve_address("alice").unwrap_err();
        assert_eq!(err.to_string(), "Wallet not found: alice");
    }

    #[test]
    fn test_names_cannot_leave_wallet_dir() {
        let dir = TempDir::new().unwrap();
        let outside = KeystoreStore::new(dir.path().join("outside"));
        outside.import(TEST_KEY, "pw").unwrap();
        let store = KeystoreStore::new(dir.path().join("wallets"));

        for name in [
            format!("../outside/{}", TEST_ADDRESS),
            "..".to_string(),
            "a\\b".to_string(),
            String::new(),
        ] {
            let err = store.load(&name).unwrap_err();
            assert!(matches!(err, KeystoreError::InvalidName(_)), "{}: {}", name, err);
        }
        assert!(matches!(
            store.resolve_address("../outside/x"),
            Err(KeystoreError::InvalidName(_))
        ));
    }
}
