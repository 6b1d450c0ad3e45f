//! API key loading and request signing
//!
//! The key file is JSON `{"name": "...", "privateKey": "<hex>"}` where the
//! private key is a secp256k1 secret. Every request carries the key name, a
//! timestamp, a random nonce and a compact ECDSA signature over
//! `sha256(timestamp || nonce || METHOD || path || body)`.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::RngCore;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, SignOnly};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::platform::PlatformError;

pub const HEADER_KEY_NAME: &str = "X-Api-Key-Name";
pub const HEADER_TIMESTAMP: &str = "X-Timestamp";
pub const HEADER_NONCE: &str = "X-Nonce";
pub const HEADER_SIGNATURE: &str = "X-Signature";

/// API key errors
#[derive(Debug, thiserror::Error)]
pub enum ApiKeyError {
    #[error("API key file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed API key file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("API key name is empty")]
    EmptyName,

    #[error("Invalid API private key: {0}")]
    InvalidPrivateKey(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiKeyFile {
    name: String,
    private_key: String,
}

/// Credentials used to authenticate against the platform
#[derive(Clone)]
pub struct ApiKey {
    name: String,
    private_key: SecretKey,
}

impl ApiKey {
    /// Build an API key from its name and hex-encoded secret (optional `0x`)
    pub fn new(name: impl Into<String>, private_key_hex: &str) -> Result<Self, ApiKeyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ApiKeyError::EmptyName);
        }

        let hex_str = private_key_hex.trim();
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes =
            hex::decode(hex_str).map_err(|e| ApiKeyError::InvalidPrivateKey(e.to_string()))?;
        let private_key = SecretKey::from_slice(&bytes)
            .map_err(|e| ApiKeyError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self { name, private_key })
    }

    /// Parse the JSON key file format
    pub fn from_json_str(json: &str) -> Result<Self, ApiKeyError> {
        let file: ApiKeyFile = serde_json::from_str(json)?;
        Self::new(file.name, &file.private_key)
    }

    /// Load the JSON key file at `path`
    pub fn from_json_file(path: &Path) -> Result<Self, ApiKeyError> {
        if !path.exists() {
            return Err(ApiKeyError::NotFound(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("name", &self.name)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Signs outgoing platform requests with an [`ApiKey`]
pub struct RequestSigner {
    key: ApiKey,
    secp: Secp256k1<SignOnly>,
}

impl RequestSigner {
    pub fn new(key: ApiKey) -> Self {
        Self {
            key,
            secp: Secp256k1::signing_only(),
        }
    }

    pub fn key_name(&self) -> &str {
        self.key.name()
    }

    /// Compressed public key of the signing key, hex-encoded
    pub fn public_key_hex(&self) -> String {
        let public_key = PublicKey::from_secret_key(&self.secp, &self.key.private_key);
        hex::encode(public_key.serialize())
    }

    /// Digest that gets signed for a request
    pub fn signing_digest(
        timestamp: i64,
        nonce: &str,
        method: &str,
        path: &str,
        body: &[u8],
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(timestamp.to_string().as_bytes());
        hasher.update(nonce.as_bytes());
        hasher.update(method.to_uppercase().as_bytes());
        hasher.update(path.as_bytes());
        hasher.update(body);
        hasher.finalize().into()
    }

    /// Compact ECDSA signature (hex) over the request digest
    pub fn sign(
        &self,
        timestamp: i64,
        nonce: &str,
        method: &str,
        path: &str,
        body: &[u8],
    ) -> Result<String, PlatformError> {
        let digest = Self::signing_digest(timestamp, nonce, method, path, body);
        let message =
            Message::from_digest_slice(&digest).map_err(|e| PlatformError::Signing(e.to_string()))?;
        let signature = self.secp.sign_ecdsa(&message, &self.key.private_key);
        Ok(hex::encode(signature.serialize_compact()))
    }

    /// Authentication headers for one request
    pub fn headers(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
    ) -> Result<Vec<(&'static str, String)>, PlatformError> {
        let timestamp = chrono::Utc::now().timestamp();
        let nonce = hex::encode(rand::thread_rng().next_u64().to_be_bytes());
        let signature = self.sign(timestamp, &nonce, method, path, body)?;

        Ok(vec![
            (HEADER_KEY_NAME, self.key.name.clone()),
            (HEADER_TIMESTAMP, timestamp.to_string()),
            (HEADER_NONCE, nonce),
            (HEADER_SIGNATURE, signature),
        ])
    }
}
