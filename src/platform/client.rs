//! Blocking HTTP client for the wallet platform REST API

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::{NetworkId, PlatformConfig};
use crate::platform::auth::{ApiKey, RequestSigner};
use crate::platform::{LedgerPlatform, PlatformError, WalletHandle};
use crate::storage::WalletCredential;
use crate::types::{
    format_atomic_amount, Address, Balances, PayloadSignature, ReadContractRequest,
    SmartContract, TokenDeployRequest, TransactionRecord, Transfer, TransferRequest,
    TransferStatus,
};

#[derive(Debug, Deserialize)]
struct WalletModel {
    id: String,
    network_id: NetworkId,
    #[serde(default)]
    default_address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct BalanceModel {
    amount: String,
    asset: AssetModel,
}

#[derive(Debug, Deserialize)]
struct AssetModel {
    asset_id: String,
    #[serde(default)]
    decimals: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ReadContractResult {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct ApiErrorModel {
    code: String,
    message: String,
}

struct Inner {
    http: Client,
    base_url: String,
    signer: RequestSigner,
    poll_interval: Duration,
    transfer_timeout: Duration,
}

/// Wallet platform reached over HTTPS
///
/// Cheap to clone; wallet handles keep a clone so they can issue their own
/// requests.
#[derive(Clone)]
pub struct HttpPlatform {
    inner: Arc<Inner>,
}

impl HttpPlatform {
    /// Configure a platform client
    ///
    /// This is the one-time initialization every other call depends on. The
    /// API key has already been validated by [`ApiKey`]; this builds the HTTP
    /// client with the configured timeout.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let key = ApiKey::from_json_file(Path::new("cdp_api_key.json"))?;
    /// let platform = HttpPlatform::configure(&config.platform, key)?;
    /// ```
    pub fn configure(config: &PlatformConfig, api_key: ApiKey) -> Result<Self, PlatformError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(concat!("cdp-wallet-demo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        log::info!(
            "Platform configured: {} (key: {})",
            config.base_url,
            api_key.name()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                signer: RequestSigner::new(api_key),
                poll_interval: Duration::from_millis(config.poll_interval_ms),
                transfer_timeout: Duration::from_secs(config.transfer_timeout_secs),
            }),
        })
    }

    /// Issue a signed request and return the raw response body
    fn send_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<String, PlatformError> {
        let body = body.unwrap_or_default();
        let url = format!("{}{}", self.inner.base_url, path);

        log::debug!("{} {}", method, path);

        let mut request = self.inner.http.request(method.clone(), &url);
        for (name, value) in self.inner.signer.headers(method.as_str(), path, &body)? {
            request = request.header(name, value);
        }
        if !body.is_empty() {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ApiErrorModel>(&text) {
                Ok(err) => (err.code, err.message),
                Err(_) => ("unknown".to_string(), text),
            };
            log::debug!("{} {} -> {} {}", method, path, status.as_u16(), code);
            return Err(PlatformError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        Ok(text)
    }

    fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T, PlatformError> {
        let body = body.map(serde_json::to_vec).transpose()?;
        let text = self.send_raw(method, path, body)?;
        Ok(serde_json::from_str(&text)?)
    }

    fn wallet_from_model(&self, model: WalletModel) -> HttpWallet {
        HttpWallet {
            platform: self.clone(),
            wallet_id: model.id,
            network_id: model.network_id,
            default_address: model.default_address,
        }
    }
}

impl LedgerPlatform for HttpPlatform {
    type Wallet = HttpWallet;

    fn provision_wallet(&self, network: NetworkId) -> Result<HttpWallet, PlatformError> {
        let body = json!({ "wallet": { "network_id": network } });
        let model: WalletModel = self.send(Method::POST, "/v1/wallets", Some(&body))?;
        log::info!("Provisioned wallet {} on {}", model.id, model.network_id);
        Ok(self.wallet_from_model(model))
    }

    fn restore_wallet(&self, credential: &WalletCredential) -> Result<HttpWallet, PlatformError> {
        let text = self.send_raw(
            Method::POST,
            "/v1/wallets/import",
            Some(credential.as_str().as_bytes().to_vec()),
        )?;
        let model: WalletModel = serde_json::from_str(&text)?;
        log::info!("Restored wallet {} on {}", model.id, model.network_id);
        Ok(self.wallet_from_model(model))
    }

    fn list_transactions(
        &self,
        address: &Address,
        limit: u32,
    ) -> Result<Vec<TransactionRecord>, PlatformError> {
        let path = format!(
            "/v1/networks/{}/addresses/{}/transactions?limit={}",
            address.network_id, address.address_id, limit
        );
        let list: ListResponse<TransactionRecord> = self.send(Method::GET, &path, None)?;
        Ok(list.data)
    }

    fn read_contract(&self, request: &ReadContractRequest) -> Result<Value, PlatformError> {
        let path = format!(
            "/v1/networks/{}/smart_contracts/{}/read",
            request.network_id, request.contract_address
        );
        let body = json!({
            "method": request.method,
            "args": request.args.to_string(),
            "abi": request.abi.to_string(),
        });
        let result: ReadContractResult = self.send(Method::POST, &path, Some(&body))?;
        Ok(result.value)
    }
}

/// Wallet handle backed by [`HttpPlatform`]
#[derive(Clone)]
pub struct HttpWallet {
    platform: HttpPlatform,
    wallet_id: String,
    network_id: NetworkId,
    default_address: Option<Address>,
}

impl HttpWallet {
    fn address_path(&self, address_id: &str) -> String {
        format!("/v1/wallets/{}/addresses/{}", self.wallet_id, address_id)
    }
}

impl std::fmt::Debug for HttpWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWallet")
            .field("wallet_id", &self.wallet_id)
            .field("network_id", &self.network_id)
            .field("default_address", &self.default_address.as_ref().map(|a| &a.address_id))
            .finish()
    }
}

impl WalletHandle for HttpWallet {
    fn wallet_id(&self) -> &str {
        &self.wallet_id
    }

    fn network_id(&self) -> NetworkId {
        self.network_id
    }

    fn export(&self) -> Result<WalletCredential, PlatformError> {
        let path = format!("/v1/wallets/{}/export", self.wallet_id);
        let text = self.platform.send_raw(Method::GET, &path, None)?;
        Ok(WalletCredential::parse(text)?)
    }

    fn default_address(&self) -> Result<Address, PlatformError> {
        if let Some(address) = &self.default_address {
            return Ok(address.clone());
        }

        let path = format!("/v1/wallets/{}/addresses?limit=1", self.wallet_id);
        let list: ListResponse<Address> = self.platform.send(Method::GET, &path, None)?;
        list.data.into_iter().next().ok_or_else(|| {
            PlatformError::Rejected(format!("wallet {} has no addresses", self.wallet_id))
        })
    }

    fn create_address(&self) -> Result<Address, PlatformError> {
        let path = format!("/v1/wallets/{}/addresses", self.wallet_id);
        self.platform.send(Method::POST, &path, Some(&json!({})))
    }

    fn list_balances(&self) -> Result<Balances, PlatformError> {
        let path = format!("/v1/wallets/{}/balances", self.wallet_id);
        let list: ListResponse<BalanceModel> = self.platform.send(Method::GET, &path, None)?;

        Ok(list
            .data
            .into_iter()
            .map(|b| {
                let amount = match b.asset.decimals {
                    Some(decimals) => format_atomic_amount(&b.amount, decimals),
                    None => b.amount,
                };
                (b.asset.asset_id, amount)
            })
            .collect())
    }

    fn create_transfer(&self, request: &TransferRequest) -> Result<Transfer, PlatformError> {
        let from = self.default_address()?;
        let path = format!("{}/transfers", self.address_path(&from.address_id));
        let body = json!({
            "amount": request.amount,
            "asset_id": request.asset_id,
            "destination": request.destination,
            "network_id": self.network_id,
        });
        self.platform.send(Method::POST, &path, Some(&body))
    }

    fn wait_for_transfer(&self, transfer: &Transfer) -> Result<Transfer, PlatformError> {
        let path = format!(
            "{}/transfers/{}",
            self.address_path(&transfer.address_id),
            transfer.transfer_id
        );
        let timeout = self.platform.inner.transfer_timeout;
        let started = Instant::now();
        let mut current = transfer.clone();

        while !current.status.is_terminal() {
            if started.elapsed() >= timeout {
                return Err(PlatformError::Timeout {
                    what: format!("transfer {}", transfer.transfer_id),
                    seconds: timeout.as_secs(),
                });
            }
            thread::sleep(self.platform.inner.poll_interval);
            current = self.platform.send(Method::GET, &path, None)?;
            log::debug!("Transfer {} status: {}", current.transfer_id, current.status);
        }

        if current.status == TransferStatus::Failed {
            return Err(PlatformError::TransferFailed {
                transfer_id: current.transfer_id,
            });
        }

        Ok(current)
    }

    fn sign_payload(&self, payload_hash: &str) -> Result<PayloadSignature, PlatformError> {
        let from = self.default_address()?;
        let path = format!("{}/payload_signatures", self.address_path(&from.address_id));
        let body = json!({ "unsigned_payload": payload_hash.trim_start_matches("0x") });
        self.platform.send(Method::POST, &path, Some(&body))
    }

    fn deploy_token(&self, request: &TokenDeployRequest) -> Result<SmartContract, PlatformError> {
        let from = self.default_address()?;
        let path = format!("{}/smart_contracts", self.address_path(&from.address_id));
        let body = json!({
            "type": "erc20",
            "options": {
                "name": request.name,
                "symbol": request.symbol,
                "total_supply": request.total_supply,
            },
        });
        self.platform.send(Method::POST, &path, Some(&body))
    }
}
