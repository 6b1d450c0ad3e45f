//! Storage layer for wallet data
//!
//! Persists and restores the exported wallet credential.

pub mod file_system;
pub mod models;

pub use file_system::{
    credential_exists, load_credential, save_credential, CredentialFileError, PersistenceError,
};
pub use models::{CredentialFormatError, WalletCredential};
