//! Wallet management for Hetu accounts.
//!
//! Each account is a single encrypted keystore file named after its checksum
//! address inside the wallet directory (default `~/.hetucli/wallets`).
//!
//! ## Quick Start
//!
//! ```no_run
//! use hetu_cli::wallet::KeystoreStore;
//!
//! let store = KeystoreStore::new("/tmp/wallets");
//! let created = store.create("password").unwrap();
//! println!("Address: {:?}", created.address);
//!
//! let unlocked = store.unlock(&format!("{:?}", created.address), "password").unwrap();
//! assert_eq!(unlocked.address(), created.address);
//! ```
//!
//! ## Security Notes
//!
//! - Private keys are zeroed from memory on drop via the `zeroize` crate.
//! - Wrong passwords and corrupted files report [`KeystoreError::Decryption`],
//!   missing files report [`KeystoreError::NotFound`].

pub mod keystore;

pub use keystore::{CreatedWallet, KeystoreError, KeystoreFile, KeystoreStore, UnlockedKey};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::address::checksum;
    use tempfile::tempdir;

    #[test]
    fn test_full_wallet_workflow() {
        let dir = tempdir().unwrap();
        let store = KeystoreStore::new(dir.path().join("wallets"));

        let created = store.create("password").unwrap();
        let name = checksum(&created.address);
        assert!(created.path.ends_with(format!("{}.json", name)));
        assert_eq!(store.list().unwrap(), vec![name.clone()]);

        let unlocked = store.unlock(&name, "password").unwrap();
        assert_eq!(unlocked.address(), created.address);

        let exported = store.export_private_key(&name, "password").unwrap();
        let reimported = UnlockedKey::from_hex(&exported).unwrap();
        assert_eq!(reimported.address(), created.address);
    }

    #[test]
    fn test_wrong_password_is_decryption_error() {
        let dir = tempdir().unwrap();
        let store = KeystoreStore::new(dir.path());
        let created = store.create("right").unwrap();

        let err = store
            .unlock(&checksum(&created.address), "wrong")
            .unwrap_err();
        assert!(matches!(err, KeystoreError::Decryption(_)));
    }

    #[test]
    fn test_missing_keystore_is_not_found() {
        let dir = tempdir().unwrap();
        let store = KeystoreStore::new(dir.path());
        let err = store.unlock("0x0000000000000000000000000000000000000001", "pw").unwrap_err();
        assert!(matches!(err, KeystoreError::NotFound(_)));
    }

    #[test]
    fn test_corrupted_keystore_is_decryption_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), r#"{"version": 3}"#).unwrap();
        let store = KeystoreStore::new(dir.path());
        let err = store.unlock("broken", "pw").unwrap_err();
        assert!(matches!(err, KeystoreError::Decryption(_)));
    }
}
