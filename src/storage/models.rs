//! Storage data models
//!
//! The exported wallet credential, kept as the exact text the platform produced.

use std::fmt;

/// Exported wallet credential
///
/// Wraps the platform's export verbatim. Its fields (seed material, wallet ID,
/// network) belong to the platform; this crate only checks that the text is a
/// non-empty JSON object and otherwise never looks inside.
///
/// # Security
///
/// The payload contains secret key material. `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct WalletCredential {
    data: String,
}

/// Reasons a credential payload is rejected
#[derive(Debug, thiserror::Error)]
pub enum CredentialFormatError {
    #[error("credential is empty")]
    Empty,

    #[error("credential is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("credential must be a non-empty JSON object")]
    NotAnObject,
}

impl WalletCredential {
    /// Accept a serialized credential after checking it is well-formed
    pub fn parse(data: impl Into<String>) -> Result<Self, CredentialFormatError> {
        let data = data.into();
        if data.trim().is_empty() {
            return Err(CredentialFormatError::Empty);
        }

        let value: serde_json::Value = serde_json::from_str(&data)?;
        match value.as_object() {
            Some(map) if !map.is_empty() => Ok(Self { data }),
            _ => Err(CredentialFormatError::NotAnObject),
        }
    }

    /// Build a credential from an already-decoded export
    pub fn from_value(value: &serde_json::Value) -> Result<Self, CredentialFormatError> {
        Self::parse(serde_json::to_string(value)?)
    }

    /// The credential exactly as it is persisted
    pub fn as_str(&self) -> &str {
        &self.data
    }
}

impl fmt::Debug for WalletCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletCredential")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}
