//! Demonstration sequence
//!
//! Runs the fixed list of wallet operations against a [`LedgerPlatform`],
//! one blocking call at a time, printing each result. The first failing step
//! ends the run.

use std::fmt;

use serde_json::{json, Value};

use crate::config::GlobalConfig;
use crate::manager::{SessionError, SessionOrigin, WalletSessionManager};
use crate::platform::{hash_message, LedgerPlatform, PlatformError, WalletHandle};
use crate::types::{
    Address, Balances, PayloadSignature, ReadContractRequest, SmartContract, TokenDeployRequest,
    TransactionRecord, Transfer, TransferRequest,
};

pub const TRANSFER_AMOUNT: &str = "0.001";
pub const TRANSFER_ASSET: &str = "eth";
pub const TRANSACTION_LIMIT: u32 = 5;
pub const SIGNED_MESSAGE: &str = "Hello, Coinbase!";
pub const TOKEN_NAME: &str = "MyToken";
pub const TOKEN_SYMBOL: &str = "MTK";
pub const TOKEN_TOTAL_SUPPLY: &str = "1000000";
pub const READ_CONTRACT_ADDRESS: &str = "0xB8f25B54651E229160556ACDe0b49966a14F4858";
pub const READ_CONTRACT_METHOD: &str = "balanceOf";

/// ABI fragment for `balanceOf(address) -> uint256`
pub fn balance_of_abi() -> Value {
    json!([
        {
            "constant": true,
            "inputs": [{ "name": "account", "type": "address" }],
            "name": "balanceOf",
            "outputs": [{ "name": "", "type": "uint256" }],
            "type": "function",
        }
    ])
}

/// Steps of the demonstration, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    AcquireWallet,
    DefaultAddress,
    ListBalances,
    CreateAddress,
    CreateTransfer,
    WaitForTransfer,
    ListBalancesAfterTransfer,
    ListTransactions,
    SignMessage,
    DeployToken,
    ReadContract,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::AcquireWallet => "acquire wallet",
            Step::DefaultAddress => "get default address",
            Step::ListBalances => "list balances",
            Step::CreateAddress => "create address",
            Step::CreateTransfer => "create transfer",
            Step::WaitForTransfer => "wait for transfer",
            Step::ListBalancesAfterTransfer => "list balances after transfer",
            Step::ListTransactions => "list transactions",
            Step::SignMessage => "sign message",
            Step::DeployToken => "deploy token",
            Step::ReadContract => "read contract",
        };
        f.write_str(name)
    }
}

/// Errors that end a demonstration run
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("acquire wallet failed: {0}")]
    Session(#[from] SessionError),

    #[error("{step} failed: {source}")]
    Operation {
        step: Step,
        #[source]
        source: PlatformError,
    },
}

impl DemoError {
    /// The step that failed
    pub fn step(&self) -> Step {
        match self {
            DemoError::Session(_) => Step::AcquireWallet,
            DemoError::Operation { step, .. } => *step,
        }
    }
}

/// Everything a completed run observed
#[derive(Debug, Clone)]
pub struct DemoSummary {
    pub wallet_id: String,
    pub wallet_persisted: bool,
    pub default_address: Address,
    pub balances_before: Balances,
    pub new_address: Address,
    pub transfer: Transfer,
    pub balances_after: Balances,
    pub transactions: Vec<TransactionRecord>,
    pub signature: PayloadSignature,
    pub token: SmartContract,
    pub token_balance: Value,
}

fn at<T>(step: Step, result: Result<T, PlatformError>) -> Result<T, DemoError> {
    result.map_err(|source| DemoError::Operation { step, source })
}

/// Runs the demonstration sequence
pub struct DemoRunner<'a, P> {
    platform: &'a P,
    config: &'a GlobalConfig,
}

impl<'a, P: LedgerPlatform> DemoRunner<'a, P> {
    pub fn new(platform: &'a P, config: &'a GlobalConfig) -> Self {
        Self { platform, config }
    }

    /// Execute every step in order
    ///
    /// # Errors
    ///
    /// Returns the first failure, naming its step. Nothing after the failing
    /// step is called.
    pub fn run(&self) -> Result<DemoSummary, DemoError> {
        let manager = WalletSessionManager::from_config(self.platform, self.config);
        let acquired = manager.acquire_wallet()?;
        let wallet_persisted = acquired.is_persisted();
        match &acquired.origin {
            SessionOrigin::Restored => {
                println!("Wallet imported: {}", acquired.wallet.wallet_id());
            }
            SessionOrigin::Provisioned => {
                println!("Wallet created: {}", acquired.wallet.wallet_id());
                println!("Wallet data saved to {}", self.config.credential_path);
            }
            SessionOrigin::ProvisionedUnpersisted(err) => {
                println!("Wallet created: {}", acquired.wallet.wallet_id());
                eprintln!("⚠️  Wallet data was NOT saved: {}", err);
                eprintln!("   This wallet will not be available after the process exits.");
            }
        }
        let wallet = acquired.wallet;

        let default_address = at(Step::DefaultAddress, wallet.default_address())?;
        println!("Default address: {}", default_address);

        let balances_before = at(Step::ListBalances, wallet.list_balances())?;
        println!("Wallet balances: {}", balances_before);

        let new_address = at(Step::CreateAddress, wallet.create_address())?;
        println!("New address created: {}", new_address);

        let request = TransferRequest {
            amount: TRANSFER_AMOUNT.to_string(),
            asset_id: TRANSFER_ASSET.to_string(),
            destination: new_address.address_id.clone(),
        };
        let transfer = at(Step::CreateTransfer, wallet.create_transfer(&request))?;
        println!("Transfer initiated: {}", transfer);

        let transfer = at(Step::WaitForTransfer, wallet.wait_for_transfer(&transfer))?;
        println!("Transfer completed: {}", transfer);

        let balances_after = at(Step::ListBalancesAfterTransfer, wallet.list_balances())?;
        println!("Wallet balances: {}", balances_after);

        let transactions = at(
            Step::ListTransactions,
            self.platform.list_transactions(&default_address, TRANSACTION_LIMIT),
        )?;
        for tx in &transactions {
            println!("{}", tx);
        }

        let payload_hash = hash_message(SIGNED_MESSAGE);
        log::debug!("Signing payload hash {}", payload_hash);
        let signature = at(Step::SignMessage, wallet.sign_payload(&payload_hash))?;
        println!("Message signature: {}", signature);

        let token_request = TokenDeployRequest {
            name: TOKEN_NAME.to_string(),
            symbol: TOKEN_SYMBOL.to_string(),
            total_supply: TOKEN_TOTAL_SUPPLY.to_string(),
        };
        let token = at(Step::DeployToken, wallet.deploy_token(&token_request))?;
        println!("Token deployed at: {}", token.contract_address);

        let read_request = ReadContractRequest {
            network_id: self.config.network,
            contract_address: READ_CONTRACT_ADDRESS.to_string(),
            method: READ_CONTRACT_METHOD.to_string(),
            args: json!({ "account": default_address.address_id }),
            abi: balance_of_abi(),
        };
        let token_balance = at(Step::ReadContract, self.platform.read_contract(&read_request))?;
        println!("Token balance: {}", display_value(&token_balance));

        Ok(DemoSummary {
            wallet_id: wallet.wallet_id().to_string(),
            wallet_persisted,
            default_address,
            balances_before,
            new_address,
            transfer,
            balances_after,
            transactions,
            signature,
            token,
            token_balance,
        })
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
