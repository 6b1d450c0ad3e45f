//! Wallet session manager
//!
//! Decides whether a run restores the persisted wallet or provisions a new
//! one, and persists the credential of a newly provisioned wallet. Every run
//! operates on exactly one wallet identity.

use std::path::PathBuf;

use crate::config::{GlobalConfig, NetworkId};
use crate::platform::{LedgerPlatform, PlatformError, WalletHandle};
use crate::storage::{
    credential_exists, load_credential, save_credential, CredentialFileError, PersistenceError,
};

/// Errors that abort wallet acquisition
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The credential file exists but cannot be used. Provisioning a new
    /// wallet here would silently replace the existing identity.
    #[error("Corrupt credential file: {0}")]
    CorruptCredential(#[source] CredentialFileError),

    #[error("Platform rejected the stored credential: {0}")]
    Restore(#[source] PlatformError),

    #[error("Failed to provision a wallet on {network}: {source}")]
    Provision {
        network: NetworkId,
        #[source]
        source: PlatformError,
    },
}

/// How the session's wallet was obtained
#[derive(Debug)]
pub enum SessionOrigin {
    /// Restored from the persisted credential
    Restored,

    /// Newly provisioned and persisted
    Provisioned,

    /// Newly provisioned, but the credential could not be written. The wallet
    /// is usable for this run only.
    ProvisionedUnpersisted(PersistenceError),
}

/// A wallet handle together with how it was acquired
#[derive(Debug)]
pub struct AcquiredWallet<W> {
    pub wallet: W,
    pub origin: SessionOrigin,
}

impl<W> AcquiredWallet<W> {
    /// Whether the wallet will be restorable on the next run
    pub fn is_persisted(&self) -> bool {
        !matches!(self.origin, SessionOrigin::ProvisionedUnpersisted(_))
    }

    /// The persistence failure, if any
    pub fn persistence_error(&self) -> Option<&PersistenceError> {
        match &self.origin {
            SessionOrigin::ProvisionedUnpersisted(err) => Some(err),
            _ => None,
        }
    }
}

/// Restores or provisions the single wallet a run operates on
pub struct WalletSessionManager<'a, P> {
    platform: &'a P,
    credential_path: PathBuf,
    network: NetworkId,
}

impl<'a, P: LedgerPlatform> WalletSessionManager<'a, P> {
    pub fn new(platform: &'a P, credential_path: impl Into<PathBuf>, network: NetworkId) -> Self {
        Self {
            platform,
            credential_path: credential_path.into(),
            network,
        }
    }

    /// Create a manager using the configured credential path and network
    pub fn from_config(platform: &'a P, config: &GlobalConfig) -> Self {
        Self::new(platform, &config.credential_path, config.network)
    }

    /// Restore the persisted wallet, or provision and persist a new one
    ///
    /// Exactly one of restore/provision happens per call. A persisted
    /// credential is never overwritten. If persisting a new wallet fails the
    /// wallet is still returned, tagged [`SessionOrigin::ProvisionedUnpersisted`].
    ///
    /// # Errors
    ///
    /// - [`SessionError::CorruptCredential`] if the file exists but is unreadable or malformed
    /// - [`SessionError::Restore`] if the platform rejects the credential
    /// - [`SessionError::Provision`] if the platform cannot create a wallet
    ///
    /// # Example
    ///
    /// ```ignore
    /// let manager = WalletSessionManager::from_config(&platform, &config);
    /// let acquired = manager.acquire_wallet()?;
    /// println!("Using wallet {}", acquired.wallet.wallet_id());
    /// ```
    pub fn acquire_wallet(&self) -> Result<AcquiredWallet<P::Wallet>, SessionError> {
        if credential_exists(&self.credential_path) {
            self.restore()
        } else {
            self.provision()
        }
    }

    fn restore(&self) -> Result<AcquiredWallet<P::Wallet>, SessionError> {
        let credential =
            load_credential(&self.credential_path).map_err(SessionError::CorruptCredential)?;

        let wallet = self
            .platform
            .restore_wallet(&credential)
            .map_err(SessionError::Restore)?;

        log::info!(
            "Wallet {} imported from {}",
            wallet.wallet_id(),
            self.credential_path.display()
        );

        Ok(AcquiredWallet {
            wallet,
            origin: SessionOrigin::Restored,
        })
    }

    fn provision(&self) -> Result<AcquiredWallet<P::Wallet>, SessionError> {
        let wallet = self
            .platform
            .provision_wallet(self.network)
            .map_err(|source| SessionError::Provision {
                network: self.network,
                source,
            })?;

        log::info!("Wallet {} created on {}", wallet.wallet_id(), self.network);

        let origin = match self.persist(&wallet) {
            Ok(()) => {
                log::info!("Wallet data saved to {}", self.credential_path.display());
                SessionOrigin::Provisioned
            }
            Err(err) => {
                log::warn!(
                    "Wallet {} was not persisted and will not survive a restart: {}",
                    wallet.wallet_id(),
                    err
                );
                SessionOrigin::ProvisionedUnpersisted(err)
            }
        };

        Ok(AcquiredWallet { wallet, origin })
    }

    fn persist(&self, wallet: &P::Wallet) -> Result<(), PersistenceError> {
        let credential = wallet
            .export()
            .map_err(|e| PersistenceError::Export(e.to_string()))?;
        save_credential(&self.credential_path, &credential)
    }
}
