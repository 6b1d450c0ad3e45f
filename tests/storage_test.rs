//! Integration tests for credential persistence
//!
//! Tests the opaque credential model and the atomic, non-clobbering writes
//! of the credential file.

use cdp_wallet_demo::storage::{
    credential_exists, load_credential, save_credential, CredentialFileError,
    CredentialFormatError, PersistenceError, WalletCredential,
};
use std::fs;
use tempfile::TempDir;

const EXPORTED: &str = r#"{"walletId":"5e1a","seed":"86fc9fba421dcc6ad42747f14132c3cd975bd9fb1454df84ce5ea554f2542fbe","networkId":"base-sepolia"}"#;

#[test]
fn test_credential_is_persisted_verbatim() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("wallet_data.json");

    // Unusual spacing and key order must survive untouched
    let exported = "{ \"seed\" : \"ab\",\n  \"walletId\": \"1\" }";
    let credential = WalletCredential::parse(exported).expect("Credential should parse");

    save_credential(&path, &credential).expect("Save should succeed");

    assert_eq!(fs::read_to_string(&path).expect("File should exist"), exported);
    let loaded = load_credential(&path).expect("Load should succeed");
    assert_eq!(loaded.as_str(), exported);
    assert_eq!(loaded, credential);
}

#[test]
fn test_save_creates_missing_parent_directories() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("nested").join("dir").join("wallet_data.json");
    let credential = WalletCredential::parse(EXPORTED).expect("Credential should parse");

    save_credential(&path, &credential).expect("Save should succeed");

    assert!(credential_exists(&path));
}

#[test]
fn test_save_never_overwrites_existing_credential() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("wallet_data.json");
    fs::write(&path, EXPORTED).expect("Failed to seed credential");

    let other = WalletCredential::parse(r#"{"walletId":"other"}"#).expect("Credential should parse");
    let result = save_credential(&path, &other);

    assert!(matches!(result, Err(PersistenceError::AlreadyExists(_))));
    assert_eq!(fs::read_to_string(&path).expect("File should exist"), EXPORTED);
}

#[test]
fn test_save_leaves_no_temp_files_behind() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("wallet_data.json");
    let credential = WalletCredential::parse(EXPORTED).expect("Credential should parse");

    save_credential(&path, &credential).expect("Save should succeed");
    // A rejected second write must clean up after itself too
    let _ = save_credential(&path, &credential);

    let names: Vec<String> = fs::read_dir(temp_dir.path())
        .expect("Failed to read dir")
        .map(|e| e.expect("Bad entry").file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["wallet_data.json".to_string()]);
}

#[cfg(unix)]
#[test]
fn test_credential_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("wallet_data.json");
    let credential = WalletCredential::parse(EXPORTED).expect("Credential should parse");

    save_credential(&path, &credential).expect("Save should succeed");

    let mode = fs::metadata(&path).expect("Metadata").permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("wallet_data.json");

    assert!(!credential_exists(&path));
    assert!(matches!(
        load_credential(&path),
        Err(CredentialFileError::NotFound(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_counts_as_existing() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("wallet_data.json");
    std::os::unix::fs::symlink(temp_dir.path().join("missing.json"), &path)
        .expect("Failed to create symlink");

    assert!(credential_exists(&path));
    assert!(matches!(
        load_credential(&path),
        Err(CredentialFileError::Unreadable { .. })
    ));

    let credential = WalletCredential::parse(EXPORTED).expect("Credential should parse");
    assert!(matches!(
        save_credential(&path, &credential),
        Err(PersistenceError::AlreadyExists(_))
    ));
}

#[test]
fn test_load_rejects_malformed_content() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("wallet_data.json");

    // Half of a valid export, as left by an interrupted non-atomic write
    fs::write(&path, &EXPORTED[..EXPORTED.len() / 2]).expect("Failed to write");
    match load_credential(&path) {
        Err(CredentialFileError::Malformed { source, .. }) => {
            assert!(matches!(source, CredentialFormatError::Malformed(_)));
        }
        other => panic!("Expected Malformed, got {:?}", other),
    }

    fs::write(&path, [0xff, 0xfe, 0x00]).expect("Failed to write");
    assert!(matches!(
        load_credential(&path),
        Err(CredentialFileError::Unreadable { .. })
    ));
}

#[test]
fn test_credential_parse_rules() {
    assert!(matches!(
        WalletCredential::parse(""),
        Err(CredentialFormatError::Empty)
    ));
    assert!(matches!(
        WalletCredential::parse("\"just a string\""),
        Err(CredentialFormatError::NotAnObject)
    ));
    assert!(matches!(
        WalletCredential::parse("{}"),
        Err(CredentialFormatError::NotAnObject)
    ));
    assert!(matches!(
        WalletCredential::parse("{\"a\":"),
        Err(CredentialFormatError::Malformed(_))
    ));

    // Contents are not inspected: any non-empty object is accepted
    assert!(WalletCredential::parse(r#"{"anything": [1, {"nested": true}]}"#).is_ok());
}

#[test]
fn test_credential_debug_does_not_leak_secret() {
    let credential = WalletCredential::parse(EXPORTED).expect("Credential should parse");
    let debug = format!("{:?}", credential);

    assert!(!debug.contains("86fc9fba"));
    assert!(debug.contains("WalletCredential"));
}
