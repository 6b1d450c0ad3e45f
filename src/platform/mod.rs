//! Wallet platform integration layer
//!
//! The hosted wallet service owns key derivation, signing, broadcast and
//! indexing. This module is the seam between the demo and that service:
//! [`LedgerPlatform`] and [`WalletHandle`] describe the capabilities the demo
//! consumes, and [`HttpPlatform`] implements them over the platform's REST API.

pub mod auth;
pub mod client;
pub mod message;

pub use auth::{ApiKey, ApiKeyError, RequestSigner};
pub use client::{HttpPlatform, HttpWallet};
pub use message::hash_message;

use crate::config::NetworkId;
use crate::storage::WalletCredential;
use crate::types::{
    Address, Balances, PayloadSignature, ReadContractRequest, SmartContract, TokenDeployRequest,
    TransactionRecord, Transfer, TransferRequest,
};

/// Errors reported by (or while talking to) the wallet platform
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Failed to decode platform response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid credential export: {0}")]
    InvalidExport(#[from] crate::storage::CredentialFormatError),

    #[error("Timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("Transfer {transfer_id} failed on-chain")]
    TransferFailed { transfer_id: String },

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("Platform rejected request: {0}")]
    Rejected(String),
}

/// Capabilities of the platform that are not scoped to a single wallet
pub trait LedgerPlatform {
    type Wallet: WalletHandle;

    /// Create a new custodial wallet on `network`
    fn provision_wallet(&self, network: NetworkId) -> Result<Self::Wallet, PlatformError>;

    /// Rebuild a wallet handle from a previously exported credential
    fn restore_wallet(&self, credential: &WalletCredential) -> Result<Self::Wallet, PlatformError>;

    /// List up to `limit` transactions touching `address`
    fn list_transactions(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>, PlatformError>;

    /// Call a view method on a deployed contract and return the decoded result
    fn read_contract(
        &self,
        request: &ReadContractRequest,
    ) -> Result<serde_json::Value, PlatformError>;
}

/// A wallet held by the platform
pub trait WalletHandle {
    fn wallet_id(&self) -> &str;

    fn network_id(&self) -> NetworkId;

    /// Export the credential needed to restore this wallet later
    fn export(&self) -> Result<WalletCredential, PlatformError>;

    fn default_address(&self) -> Result<Address, PlatformError>;

    fn create_address(&self) -> Result<Address, PlatformError>;

    fn list_balances(&self) -> Result<Balances, PlatformError>;

    /// Initiate a transfer from the default address
    fn create_transfer(&self, request: &TransferRequest) -> Result<Transfer, PlatformError>;

    /// Block until `transfer` reaches a terminal on-chain state
    fn wait_for_transfer(&self, transfer: &Transfer) -> Result<Transfer, PlatformError>;

    /// Sign a hex payload hash with the default address key
    fn sign_payload(&self, payload_hash: &str) -> Result<PayloadSignature, PlatformError>;

    /// Deploy an ERC-20 token owned by the default address
    fn deploy_token(&self, request: &TokenDeployRequest) -> Result<SmartContract, PlatformError>;
}
