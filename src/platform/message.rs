//! Message hashing for payload signatures

use sha3::{Digest, Keccak256};

/// EIP-191 personal-sign hash of `message`, `0x`-prefixed hex
///
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
pub fn hash_message(message: &str) -> String {
    let bytes = message.as_bytes();
    let prefix = format!("\x19Ethereum Signed Message:\n{}", bytes.len());

    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(bytes);

    format!("0x{}", hex::encode(hasher.finalize()))
}
