//! Gateway operations, independent of HTTP.
//!
//! [`Gateway`] owns the configuration, the instruction builder, the ledger
//! and the identity provider. Read operations live in [`read`], transaction
//! preparation in [`transactions`], dev-only batch operations in [`bulk`].

pub mod bulk;
pub mod read;
pub mod transactions;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chain_sol::{compile_transaction, serialize_unsigned, Pubkey};
use serde::Serialize;
use zsnipe_program::{decode_optional, BuiltInstruction, InstructionBuilder, ProgramAccount};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::identity::{Identity, IdentityProvider};
use crate::rpc::{AccountInfo, Ledger};

/// An unsigned transaction ready for a wallet to sign.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    /// Base64 wire transaction with zeroed signature slots.
    pub transaction: String,
    /// Accounts by role, base58.
    pub accounts: BTreeMap<String, String>,
    pub message: String,
}

pub struct Gateway<L> {
    config: Arc<GatewayConfig>,
    builder: InstructionBuilder,
    ledger: L,
    identities: Arc<dyn IdentityProvider>,
    started_at: Instant,
}

impl<L: Ledger> Gateway<L> {
    pub fn new(config: GatewayConfig, ledger: L, identities: Arc<dyn IdentityProvider>) -> Self {
        let builder = InstructionBuilder::new(config.program_id, config.mint);
        Self {
            config: Arc::new(config),
            builder,
            ledger,
            identities,
            started_at: Instant::now(),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn builder(&self) -> &InstructionBuilder {
        &self.builder
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn identities(&self) -> &dyn IdentityProvider {
        self.identities.as_ref()
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub(crate) fn now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }

    // -- Fetching ------------------------------------------------------------

    pub(crate) async fn fetch(&self, address: &Pubkey) -> Result<Option<AccountInfo>, GatewayError> {
        self.ledger.get_account(address).await
    }

    /// Fetch and decode a program account; absence is `AccountNotFound`.
    pub(crate) async fn fetch_decoded<T: ProgramAccount>(
        &self,
        address: &Pubkey,
    ) -> Result<T, GatewayError> {
        let account = self.fetch(address).await?;
        Ok(decode_optional::<T>(account.as_ref().map(|a| a.data.as_slice()), address)?)
    }

    pub(crate) async fn exists(&self, address: &Pubkey) -> Result<bool, GatewayError> {
        Ok(self.fetch(address).await?.is_some())
    }

    // -- Assembly ------------------------------------------------------------

    /// Compile `built` with `fee_payer` against a fresh blockhash and return
    /// the unsigned wire form.
    pub async fn unsigned(
        &self,
        fee_payer: &Pubkey,
        built: BuiltInstruction,
        message: impl Into<String>,
    ) -> Result<UnsignedTransaction, GatewayError> {
        let wire = self.unsigned_wire(fee_payer, &built).await?;
        Ok(UnsignedTransaction {
            transaction: BASE64.encode(wire),
            accounts: built
                .accounts
                .iter()
                .map(|(role, key)| (role.to_string(), key.to_string()))
                .collect(),
            message: message.into(),
        })
    }

    async fn unsigned_wire(
        &self,
        fee_payer: &Pubkey,
        built: &BuiltInstruction,
    ) -> Result<Vec<u8>, GatewayError> {
        let blockhash = self.ledger.get_latest_blockhash().await?;
        let tx = compile_transaction(std::slice::from_ref(&built.instruction), fee_payer, &blockhash)?;
        Ok(serialize_unsigned(&tx)?)
    }

    /// Sign with a local identity and submit. Holding the identity's lock
    /// keeps its blockhash fetch and submission in one critical section.
    pub(crate) async fn sign_and_submit(
        &self,
        identity: &Identity,
        built: &BuiltInstruction,
    ) -> Result<String, GatewayError> {
        let _guard = identity.lock().await;
        let unsigned = self.unsigned_wire(identity.public_key(), built).await?;
        let signed = identity.sign(&unsigned)?;
        let signature = self.ledger.send_transaction(&signed).await?;
        tracing::info!(wallet = identity.number(), %signature, "submitted transaction");
        Ok(signature)
    }
}
