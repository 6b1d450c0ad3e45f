//! Shared types for cdp-wallet-demo
//!
//! Read-only projections returned by the wallet platform, and the request
//! payloads the demo sends to it. None of these are persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::NetworkId;

/// An on-chain address derived under a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Hex address (e.g. "0x1f9...")
    pub address_id: String,

    pub wallet_id: String,

    pub network_id: NetworkId,

    #[serde(default)]
    pub public_key: Option<String>,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_id)
    }
}

/// Wallet balances keyed by asset ID (e.g. "eth" -> "0.5")
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balances(pub BTreeMap<String, String>);

impl Balances {
    pub fn get(&self, asset_id: &str) -> Option<&str> {
        self.0.get(asset_id).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for Balances {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Balances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (asset, amount)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", asset, amount)?;
        }
        f.write_str("}")
    }
}

/// Convert an integer amount in atomic units into a decimal string
///
/// `"1500000000000000000"` with 18 decimals becomes `"1.5"`. Trailing zeros
/// are dropped. Inputs that are not plain digit strings are returned as-is.
pub fn format_atomic_amount(amount: &str, decimals: u32) -> String {
    let digits = amount.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return amount.to_string();
    }

    let digits = digits.trim_start_matches('0');
    let decimals = decimals as usize;

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// Parameters for an asset transfer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Decimal amount in whole units of the asset (e.g. "0.001")
    pub amount: String,

    pub asset_id: String,

    /// Destination address ID
    pub destination: String,
}

/// Transfer lifecycle as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Broadcast,
    Complete,
    Failed,
}

impl TransferStatus {
    /// Whether the transfer has reached a terminal on-chain state
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Complete | TransferStatus::Failed)
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "pending"),
            TransferStatus::Broadcast => write!(f, "broadcast"),
            TransferStatus::Complete => write!(f, "complete"),
            TransferStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A transfer initiated from a wallet address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub transfer_id: String,
    pub wallet_id: String,
    pub address_id: String,
    pub destination: String,
    pub amount: String,
    pub asset_id: String,
    pub status: TransferStatus,

    #[serde(default)]
    pub transaction_hash: Option<String>,

    #[serde(default)]
    pub transaction_link: Option<String>,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer{{id: {}, {} {} -> {}, status: {}",
            self.transfer_id, self.amount, self.asset_id, self.destination, self.status
        )?;
        if let Some(hash) = &self.transaction_hash {
            write!(f, ", tx: {}", hash)?;
        }
        f.write_str("}")
    }
}

/// A transaction touching an address, as indexed by the platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_hash: String,

    #[serde(default)]
    pub from_address_id: Option<String>,

    #[serde(default)]
    pub to_address_id: Option<String>,

    pub status: String,

    #[serde(default)]
    pub block_height: Option<u64>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transaction{{hash: {}, status: {}", self.transaction_hash, self.status)?;
        if let Some(from) = &self.from_address_id {
            write!(f, ", from: {}", from)?;
        }
        if let Some(to) = &self.to_address_id {
            write!(f, ", to: {}", to)?;
        }
        if let Some(height) = self.block_height {
            write!(f, ", block: {}", height)?;
        }
        f.write_str("}")
    }
}

/// Signature over an arbitrary payload hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSignature {
    pub payload_signature_id: String,
    pub unsigned_payload: String,

    #[serde(default)]
    pub signature: Option<String>,

    pub status: String,
}

impl fmt::Display for PayloadSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.signature {
            Some(sig) => f.write_str(sig),
            None => write!(f, "<{}>", self.status),
        }
    }
}

/// ERC-20 deployment options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDeployRequest {
    pub name: String,
    pub symbol: String,

    /// Total supply in whole tokens, as a decimal string
    pub total_supply: String,
}

/// A deployed smart contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartContract {
    pub smart_contract_id: String,
    pub network_id: NetworkId,
    pub contract_address: String,

    #[serde(default)]
    pub deployer_address: Option<String>,

    #[serde(default)]
    pub transaction_hash: Option<String>,
}

/// Read-only contract call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadContractRequest {
    pub network_id: NetworkId,
    pub contract_address: String,
    pub method: String,

    /// Named method arguments
    pub args: serde_json::Value,

    /// ABI fragment describing `method`
    pub abi: serde_json::Value,
}
