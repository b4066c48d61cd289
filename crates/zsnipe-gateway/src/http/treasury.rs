//! Treasury and governance-config routes.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::dto::{parse_pubkey, AdminAmountRequest, AdminRequest};
use super::{data, transaction, ApiJson, AppState, TxResult};
use crate::error::ReadError;
use crate::rpc::Ledger;

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/treasury", get(treasury::<L>))
        .route("/treasury/transactions/init", post(init_treasury::<L>))
        .route("/treasury/transactions/fund", post(fund_treasury::<L>))
        .route("/governance-config", get(governance_config::<L>))
        .route(
            "/governance-config/transactions/init",
            post(init_governance_config::<L>),
        )
}

async fn treasury<L: Ledger>(State(gw): State<AppState<L>>) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.treasury().await?))
}

async fn init_treasury<L: Ledger>(State(gw): State<AppState<L>>, ApiJson(req): ApiJson<AdminRequest>) -> TxResult {
    let admin = req.admin()?;
    let built = gw.prepare_init_treasury(&admin).await?;
    let tx = gw
        .unsigned(&admin, built, "Treasury initialization transaction created")
        .await?;
    Ok(transaction(tx))
}

async fn fund_treasury<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<AdminAmountRequest>,
) -> TxResult {
    let admin = parse_pubkey("adminPublicKey", &req.admin_public_key)?;
    let amount = req.amount.base_units()?;
    let built = gw.prepare_fund_treasury(&admin, amount)?;
    let tx = gw
        .unsigned(&admin, built, "Treasury funding transaction created")
        .await?;
    Ok(transaction(tx))
}

async fn governance_config<L: Ledger>(
    State(gw): State<AppState<L>>,
) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.governance_config().await?))
}

async fn init_governance_config<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<AdminRequest>,
) -> TxResult {
    let authority = req.admin()?;
    let built = gw.prepare_init_governance_config(&authority)?;
    let tx = gw
        .unsigned(&authority, built, "Governance config initialization transaction created")
        .await?;
    Ok(transaction(tx))
}
