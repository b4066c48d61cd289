use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::dto::{parse_pubkey, PreviewQuery, UserRequest};
use super::{data, transaction, ApiJson, ApiPath, ApiQuery, AppState, TxResult};
use crate::error::{GatewayError, ReadError};
use crate::rpc::Ledger;
use crate::service::read::voting_power_preview;

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/governance/accounts/:user", get(account::<L>))
        .route("/governance/accounts/:user/eligibility", get(eligibility::<L>))
        .route("/governance/voting-power/preview", get(preview))
        .route("/governance/transactions/init", post(init::<L>))
        .route(
            "/governance/transactions/calculate-voting-power",
            post(calculate_voting_power::<L>),
        )
}

async fn account<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(user): ApiPath<String>,
) -> Result<Json<serde_json::Value>, ReadError> {
    let user = parse_pubkey("user", &user)?;
    Ok(data(gw.governance_account(&user).await?))
}

async fn eligibility<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(user): ApiPath<String>,
) -> Result<Json<serde_json::Value>, ReadError> {
    let user = parse_pubkey("user", &user)?;
    Ok(data(gw.voting_eligibility(&user).await?))
}

async fn preview(ApiQuery(query): ApiQuery<PreviewQuery>) -> Result<Json<serde_json::Value>, GatewayError> {
    let amount = zsnipe_program::parse_display_amount(&query.amount, zsnipe_program::TOKEN_DECIMALS)?;
    Ok(data(voting_power_preview(amount, query.lock_days)))
}

async fn init<L: Ledger>(State(gw): State<AppState<L>>, ApiJson(req): ApiJson<UserRequest>) -> TxResult {
    let user = req.user()?;
    let built = gw.prepare_init_governance(&user)?;
    let tx = gw
        .unsigned(&user, built, "Governance account initialization transaction created")
        .await?;
    Ok(transaction(tx))
}

async fn calculate_voting_power<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<UserRequest>,
) -> TxResult {
    let user = req.user()?;
    let built = gw.prepare_calculate_voting_power(&user)?;
    let tx = gw
        .unsigned(&user, built, "Voting power calculation transaction created")
        .await?;
    Ok(transaction(tx))
}
