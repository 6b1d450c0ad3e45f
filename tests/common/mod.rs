//! Common test utilities for cdp-wallet-demo integration tests
//!
//! This module provides:
//! - `RecordingPlatform`: an in-memory `LedgerPlatform` that records every call
//!   in order and can be told to fail on a specific call
//! - `TestEnv`: a scratch directory with a config pointing into it

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use cdp_wallet_demo::config::{GlobalConfig, NetworkId};
use cdp_wallet_demo::platform::{LedgerPlatform, PlatformError, WalletHandle};
use cdp_wallet_demo::storage::WalletCredential;
use cdp_wallet_demo::types::{
    Address, Balances, PayloadSignature, ReadContractRequest, SmartContract, TokenDeployRequest,
    TransactionRecord, Transfer, TransferRequest, TransferStatus,
};
use serde_json::json;
use tempfile::TempDir;

/// Platform capabilities as observed by the recording double
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Provision,
    Restore,
    Export,
    DefaultAddress,
    ListBalances,
    CreateAddress,
    CreateTransfer,
    WaitForTransfer,
    ListTransactions,
    SignPayload,
    DeployToken,
    ReadContract,
}

#[derive(Default)]
struct State {
    calls: RefCell<Vec<Call>>,
    fail_on: Cell<Option<Call>>,
    wallets_provisioned: Cell<u32>,
    addresses_created: Cell<u32>,
    signed_payloads: RefCell<Vec<String>>,
    transfer_requests: RefCell<Vec<TransferRequest>>,
    read_requests: RefCell<Vec<ReadContractRequest>>,
}

impl State {
    fn record(&self, call: Call) -> Result<(), PlatformError> {
        self.calls.borrow_mut().push(call);
        if self.fail_on.get() == Some(call) {
            return Err(PlatformError::Rejected(format!("injected failure on {:?}", call)));
        }
        Ok(())
    }
}

/// In-memory platform that records the order of every call
#[derive(Clone, Default)]
pub struct RecordingPlatform {
    state: Rc<State>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given call fail with `PlatformError::Rejected`
    pub fn fail_on(&self, call: Call) {
        self.state.fail_on.set(Some(call));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.calls.borrow().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.state.calls.borrow().iter().filter(|c| **c == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.calls.borrow_mut().clear();
    }

    pub fn wallets_provisioned(&self) -> u32 {
        self.state.wallets_provisioned.get()
    }

    pub fn signed_payloads(&self) -> Vec<String> {
        self.state.signed_payloads.borrow().clone()
    }

    pub fn transfer_requests(&self) -> Vec<TransferRequest> {
        self.state.transfer_requests.borrow().clone()
    }

    pub fn read_requests(&self) -> Vec<ReadContractRequest> {
        self.state.read_requests.borrow().clone()
    }
}

fn default_address_for(wallet_id: &str, network: NetworkId) -> Address {
    Address {
        address_id: format!("0xdefa{}", wallet_id.replace('-', "")),
        wallet_id: wallet_id.to_string(),
        network_id: network,
        public_key: None,
    }
}

impl LedgerPlatform for RecordingPlatform {
    type Wallet = RecordingWallet;

    fn provision_wallet(&self, network: NetworkId) -> Result<RecordingWallet, PlatformError> {
        self.state.record(Call::Provision)?;
        let n = self.state.wallets_provisioned.get() + 1;
        self.state.wallets_provisioned.set(n);

        Ok(RecordingWallet {
            state: Rc::clone(&self.state),
            wallet_id: format!("wallet-{}", n),
            network,
        })
    }

    fn restore_wallet(
        &self,
        credential: &WalletCredential,
    ) -> Result<RecordingWallet, PlatformError> {
        self.state.record(Call::Restore)?;

        // The double plays the platform, so it is allowed to read its own export.
        let value: serde_json::Value = serde_json::from_str(credential.as_str())?;
        let wallet_id = value["wallet_id"]
            .as_str()
            .ok_or_else(|| PlatformError::Rejected("credential has no wallet_id".to_string()))?;
        let network: NetworkId = serde_json::from_value(value["network_id"].clone())?;

        Ok(RecordingWallet {
            state: Rc::clone(&self.state),
            wallet_id: wallet_id.to_string(),
            network,
        })
    }

    fn list_transactions(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>, PlatformError> {
        self.state.record(Call::ListTransactions)?;
        let count = limit.min(2) as usize;
        Ok((0..count)
            .map(|i| TransactionRecord {
                transaction_hash: format!("0xtx{}", i),
                from_address_id: Some(address.address_id.clone()),
                to_address_id: None,
                status: "complete".to_string(),
                block_height: Some(100 + i as u64),
                created_at: None,
            })
            .collect())
    }

    fn read_contract(
        &self,
        request: &ReadContractRequest,
    ) -> Result<serde_json::Value, PlatformError> {
        self.state.record(Call::ReadContract)?;
        self.state.read_requests.borrow_mut().push(request.clone());
        Ok(json!("42"))
    }
}

/// Wallet handed out by [`RecordingPlatform`]
pub struct RecordingWallet {
    state: Rc<State>,
    wallet_id: String,
    network: NetworkId,
}

impl std::fmt::Debug for RecordingWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingWallet")
            .field("wallet_id", &self.wallet_id)
            .finish()
    }
}

impl WalletHandle for RecordingWallet {
    fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    fn network_id(&self) -> NetworkId {
        self.network
    }

    fn export(&self) -> Result<WalletCredential, PlatformError> {
        self.state.record(Call::Export)?;
        let value = json!({
            "wallet_id": self.wallet_id,
            "seed": format!("seed-for-{}", self.wallet_id),
            "network_id": self.network,
        });
        Ok(WalletCredential::from_value(&value)?)
    }

    fn default_address(&self) -> Result<Address, PlatformError> {
        self.state.record(Call::DefaultAddress)?;
        Ok(default_address_for(&self.wallet_id, self.network))
    }

    fn create_address(&self) -> Result<Address, PlatformError> {
        self.state.record(Call::CreateAddress)?;
        let n = self.state.addresses_created.get() + 1;
        self.state.addresses_created.set(n);
        Ok(Address {
            address_id: format!("0xnew{}", n),
            wallet_id: self.wallet_id.clone(),
            network_id: self.network,
            public_key: None,
        })
    }

    fn list_balances(&self) -> Result<Balances, PlatformError> {
        self.state.record(Call::ListBalances)?;
        Ok([("eth".to_string(), "0.5".to_string())].into_iter().collect())
    }

    fn create_transfer(&self, request: &TransferRequest) -> Result<Transfer, PlatformError> {
        self.state.record(Call::CreateTransfer)?;
        self.state.transfer_requests.borrow_mut().push(request.clone());
        Ok(Transfer {
            transfer_id: "transfer-1".to_string(),
            wallet_id: self.wallet_id.clone(),
            address_id: default_address_for(&self.wallet_id, self.network).address_id,
            destination: request.destination.clone(),
            amount: request.amount.clone(),
            asset_id: request.asset_id.clone(),
            status: TransferStatus::Pending,
            transaction_hash: None,
            transaction_link: None,
        })
    }

    fn wait_for_transfer(&self, transfer: &Transfer) -> Result<Transfer, PlatformError> {
        self.state.record(Call::WaitForTransfer)?;
        Ok(Transfer {
            status: TransferStatus::Complete,
            transaction_hash: Some("0xtransferhash".to_string()),
            ..transfer.clone()
        })
    }

    fn sign_payload(&self, payload_hash: &str) -> Result<PayloadSignature, PlatformError> {
        self.state.record(Call::SignPayload)?;
        self.state
            .signed_payloads
            .borrow_mut()
            .push(payload_hash.to_string());
        Ok(PayloadSignature {
            payload_signature_id: "sig-1".to_string(),
            unsigned_payload: payload_hash.to_string(),
            signature: Some("0xsignature".to_string()),
            status: "signed".to_string(),
        })
    }

    fn deploy_token(&self, request: &TokenDeployRequest) -> Result<SmartContract, PlatformError> {
        self.state.record(Call::DeployToken)?;
        Ok(SmartContract {
            smart_contract_id: format!("contract-{}", request.symbol),
            network_id: self.network,
            contract_address: "0xc0ffee".to_string(),
            deployer_address: Some(default_address_for(&self.wallet_id, self.network).address_id),
            transaction_hash: None,
        })
    }
}

/// Scratch directory plus a config that stores the credential inside it
pub struct TestEnv {
    _temp_dir: TempDir,
    pub root: PathBuf,
    pub config: GlobalConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();

        let mut config = GlobalConfig::for_network(NetworkId::BaseSepolia);
        config.credential_path = root.join("wallet_data.json").to_string_lossy().to_string();

        Self {
            _temp_dir: temp_dir,
            root,
            config,
        }
    }

    pub fn credential_path(&self) -> PathBuf {
        PathBuf::from(&self.config.credential_path)
    }
}
