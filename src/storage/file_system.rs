//! File system operations for credential persistence
//!
//! A single file holds the exported credential of exactly one wallet. Writes
//! go through a temp file in the same directory and are renamed into place,
//! so the path holds either a complete credential or nothing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::storage::models::{CredentialFormatError, WalletCredential};

/// Errors reading a persisted credential
#[derive(Debug, thiserror::Error)]
pub enum CredentialFileError {
    #[error("Credential file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed credential in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: CredentialFormatError,
    },
}

/// Errors writing a credential to disk
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Credential already exists at {0}; refusing to overwrite")]
    AlreadyExists(PathBuf),

    #[error("Failed to write credential to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Wallet export failed: {0}")]
    Export(String),
}

/// Check whether anything exists at the credential path
///
/// A directory, a dangling symlink or an entry that cannot be stat'ed still
/// counts: loading it then fails as corrupt instead of a new wallet being
/// provisioned over it.
pub fn credential_exists(path: &Path) -> bool {
    match fs::symlink_metadata(path) {
        Ok(_) => true,
        Err(e) => e.kind() != std::io::ErrorKind::NotFound,
    }
}

/// Load and validate the credential stored at `path`
///
/// # Errors
///
/// Returns error if:
/// - No file exists at `path`
/// - The file cannot be read (permissions, invalid UTF-8, ...)
/// - The content is empty, truncated or otherwise not a credential object
pub fn load_credential(path: &Path) -> Result<WalletCredential, CredentialFileError> {
    if !credential_exists(path) {
        return Err(CredentialFileError::NotFound(path.to_path_buf()));
    }

    // Past the existence check, any read failure (a dangling symlink included)
    // means the entry is unusable
    let data = fs::read_to_string(path).map_err(|source| CredentialFileError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    WalletCredential::parse(data).map_err(|source| CredentialFileError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

/// Persist a credential atomically
///
/// Writes to a temp file next to `path`, syncs it, then moves it into place
/// without clobbering: if something already exists at `path` the write is
/// rejected and the existing file is left untouched. On Unix the file is
/// created owner-only (0o600).
///
/// # Example
///
/// ```ignore
/// let credential = wallet.export()?;
/// save_credential(Path::new("wallet_data.json"), &credential)?;
/// ```
pub fn save_credential(path: &Path, credential: &WalletCredential) -> Result<(), PersistenceError> {
    if credential_exists(path) {
        return Err(PersistenceError::AlreadyExists(path.to_path_buf()));
    }

    let io_err = |source: std::io::Error| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
    tmp.write_all(credential.as_str().as_bytes())
        .map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;

    tmp.persist_noclobber(path).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            PersistenceError::AlreadyExists(path.to_path_buf())
        } else {
            io_err(e.error)
        }
    })?;

    log::debug!("Credential written to {}", path.display());
    Ok(())
}
