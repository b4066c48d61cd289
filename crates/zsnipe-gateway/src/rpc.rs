//! Ledger access over Solana JSON-RPC.
//!
//! [`Ledger`] is the only seam between the gateway and the network. The
//! production implementation speaks JSON-RPC through `reqwest`; tests plug in
//! an in-memory ledger.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chain_sol::Pubkey;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Commitment;
use crate::error::GatewayError;

/// Raw account as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub data: Vec<u8>,
    pub owner: Pubkey,
    pub lamports: u64,
}

pub trait Ledger: Send + Sync + 'static {
    /// `None` when the account does not exist.
    fn get_account(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<AccountInfo>, GatewayError>> + Send;

    /// All accounts of `program_id` whose data starts with `discriminator`.
    fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: [u8; 8],
    ) -> impl Future<Output = Result<Vec<(Pubkey, AccountInfo)>, GatewayError>> + Send;

    fn get_latest_blockhash(&self) -> impl Future<Output = Result<[u8; 32], GatewayError>> + Send;

    /// Submit a signed wire transaction, returning its signature.
    fn send_transaction(
        &self,
        wire: &[u8],
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;
}

// ---------------------------------------------------------------------------
// JSON-RPC
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// Preflight simulation failed: the program rejected the transaction.
const SEND_TRANSACTION_PREFLIGHT_FAILURE: i64 = -32002;
const TRANSACTION_SIGNATURE_VERIFICATION_FAILURE: i64 = -32003;

impl RpcErrorObject {
    /// A rejection is deterministic and goes back to the caller with the
    /// program's own message. Anything else means the node is unusable.
    fn into_gateway_error(self, method: &str) -> GatewayError {
        match self.code {
            SEND_TRANSACTION_PREFLIGHT_FAILURE | TRANSACTION_SIGNATURE_VERIFICATION_FAILURE => {
                GatewayError::InvalidInput(format!("transaction rejected: {}", self.rejection_detail()))
            }
            code => GatewayError::UpstreamUnavailable(format!(
                "{method}: rpc error {code}: {}",
                self.message
            )),
        }
    }

    /// The program's error line from the simulation logs, falling back to
    /// the node's message.
    fn rejection_detail(&self) -> String {
        let logs = self
            .data
            .as_ref()
            .and_then(|data| data.get("logs"))
            .and_then(Value::as_array);
        let find = |needle: &str| {
            logs.and_then(|logs| {
                logs.iter()
                    .filter_map(Value::as_str)
                    .rev()
                    .find(|line| line.contains(needle))
            })
        };
        let program_error = find("Error Message:").or_else(|| find(" failed: "));
        match program_error {
            Some(line) => format!("{} ({})", self.message, line.trim()),
            None => self.message.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct UiAccount {
    /// `[payload, "base64"]`
    data: (String, String),
    owner: String,
    lamports: u64,
}

impl UiAccount {
    fn into_account(self) -> Result<AccountInfo, GatewayError> {
        if self.data.1 != "base64" {
            return Err(GatewayError::DecodeError(format!(
                "unexpected account encoding {}",
                self.data.1
            )));
        }
        let data = BASE64
            .decode(self.data.0.as_bytes())
            .map_err(|e| GatewayError::DecodeError(format!("account data: {e}")))?;
        let owner = self
            .owner
            .parse()
            .map_err(|e| GatewayError::DecodeError(format!("account owner: {e}")))?;
        Ok(AccountInfo {
            data,
            owner,
            lamports: self.lamports,
        })
    }
}

#[derive(Debug, Deserialize)]
struct KeyedUiAccount {
    pubkey: String,
    account: UiAccount,
}

#[derive(Debug, Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

pub struct JsonRpcLedger {
    client: reqwest::Client,
    url: String,
    commitment: Commitment,
    next_id: AtomicU64,
}

impl JsonRpcLedger {
    pub fn new(url: impl Into<String>, commitment: Commitment) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GatewayError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
            commitment,
            next_id: AtomicU64::new(1),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, GatewayError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params });

        tracing::debug!(method, id, "rpc call");
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::UpstreamUnavailable(format!("{method}: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "{method}: HTTP {status}"
            )));
        }

        let envelope: RpcEnvelope<T> = response
            .json()
            .await
            .map_err(|e| GatewayError::UpstreamUnavailable(format!("{method}: {}", e.without_url())))?;

        if let Some(err) = envelope.error {
            return Err(err.into_gateway_error(method));
        }
        envelope
            .result
            .ok_or_else(|| GatewayError::UpstreamUnavailable(format!("{method}: empty result")))
    }
}

impl Ledger for JsonRpcLedger {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<AccountInfo>, GatewayError> {
        let params = json!([
            address.to_string(),
            { "encoding": "base64", "commitment": self.commitment.as_str() }
        ]);
        let result: WithContext<Option<UiAccount>> = self.call("getAccountInfo", params).await?;
        result.value.map(UiAccount::into_account).transpose()
    }

    async fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        discriminator: [u8; 8],
    ) -> Result<Vec<(Pubkey, AccountInfo)>, GatewayError> {
        let params = json!([
            program_id.to_string(),
            {
                "encoding": "base64",
                "commitment": self.commitment.as_str(),
                "filters": [
                    { "memcmp": { "offset": 0, "bytes": bs58::encode(discriminator).into_string() } }
                ]
            }
        ]);
        let accounts: Vec<KeyedUiAccount> = self.call("getProgramAccounts", params).await?;
        accounts
            .into_iter()
            .map(|keyed| {
                let key = keyed
                    .pubkey
                    .parse()
                    .map_err(|e| GatewayError::DecodeError(format!("account key: {e}")))?;
                Ok((key, keyed.account.into_account()?))
            })
            .collect()
    }

    async fn get_latest_blockhash(&self) -> Result<[u8; 32], GatewayError> {
        let params = json!([{ "commitment": self.commitment.as_str() }]);
        let result: WithContext<BlockhashValue> = self.call("getLatestBlockhash", params).await?;
        let hash: Pubkey = result
            .value
            .blockhash
            .parse()
            .map_err(|e| GatewayError::DecodeError(format!("blockhash: {e}")))?;
        Ok(hash.to_bytes())
    }

    async fn send_transaction(&self, wire: &[u8]) -> Result<String, GatewayError> {
        let params = json!([
            BASE64.encode(wire),
            { "encoding": "base64", "preflightCommitment": self.commitment.as_str() }
        ]);
        self.call("sendTransaction", params).await
    }
}
