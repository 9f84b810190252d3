//! Keystore directory behaviour.

mod common;

use common::{TEST_ADDRESS, TEST_KEY};
use hetu_cli::utils::address::checksum;
use hetu_cli::wallet::{KeystoreError, KeystoreStore};
use tempfile::TempDir;

#[test]
fn test_create_then_unlock() {
    let dir = TempDir::new().unwrap();
    let store = KeystoreStore::new(dir.path());

    let created = store.create("correct horse").unwrap();
    assert!(created.path.is_file());

    let name = checksum(&created.address);
    let unlocked = store.unlock(&name, "correct horse").unwrap();
    assert_eq!(unlocked.address(), created.address);
}

#[test]
fn test_wrong_password() {
    let dir = TempDir::new().unwrap();
    let store = KeystoreStore::new(dir.path());
    store.import(TEST_KEY, "right").unwrap();

    let err = store.unlock(TEST_ADDRESS, "wrong").unwrap_err();
    assert!(matches!(err, KeystoreError::Decryption(_)));
}

#[test]
fn test_import_export_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = KeystoreStore::new(dir.path());

    let created = store.import(TEST_KEY, "pw").unwrap();
    assert_eq!(checksum(&created.address), TEST_ADDRESS);

    let exported = store.export_private_key(TEST_ADDRESS, "pw").unwrap();
    assert_eq!(
        exported.trim_start_matches("0x"),
        TEST_KEY.trim_start_matches("0x")
    );

    // a second import of the same key is refused
    assert!(matches!(
        store.import(TEST_KEY, "pw"),
        Err(KeystoreError::AlreadyExists(_))
    ));
}

#[test]
fn test_lowercase_address_finds_checksum_file() {
    let dir = TempDir::new().unwrap();
    let store = KeystoreStore::new(dir.path());
    store.import(TEST_KEY, "pw").unwrap();

    let unlocked = store.unlock(&TEST_ADDRESS.to_lowercase(), "pw").unwrap();
    assert_eq!(checksum(&unlocked.address()), TEST_ADDRESS);
}

#[test]
fn test_list_only_json_files() {
    let dir = TempDir::new().unwrap();
    let store = KeystoreStore::new(dir.path());
    assert!(store.list().unwrap().is_empty());

    store.import(TEST_KEY, "pw").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    assert_eq!(store.list().unwrap(), vec![TEST_ADDRESS.to_string()]);
}

#[test]
fn test_missing_directory_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let store = KeystoreStore::new(dir.path().join("absent"));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_resolve_address() {
    let dir = TempDir::new().unwrap();
    let store = KeystoreStore::new(dir.path());
    store.import(TEST_KEY, "pw").unwrap();

    // literal addresses never touch the directory
    let literal = "0x9cCb4A38a208409422969737977696B8189eF96a";
    assert_eq!(checksum(&store.resolve_address(literal).unwrap()), literal);

    // a keystore name resolves through its recorded address
    assert_eq!(
        checksum(&store.resolve_address(TEST_ADDRESS).unwrap()),
        TEST_ADDRESS
    );

    assert!(matches!(
        store.resolve_address("bob"),
        Err(KeystoreError::WalletNotFound(_))
    ));
}
