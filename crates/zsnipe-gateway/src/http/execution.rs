use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use zsnipe_program::ProposalType;

use super::dto::{parse_proposal_kind, parse_pubkey, MaxIdQuery, ProposalActionRequest};
use super::{data, transaction, ApiJson, ApiPath, ApiQuery, AppState, TxResult};
use crate::error::ReadError;
use crate::rpc::Ledger;
use crate::service::read::DEFAULT_SCAN_ID;

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/execution/schedule", get(schedule::<L>))
        .route("/execution/:id/status", get(status::<L>))
        .route("/execution/:id/readiness", get(readiness::<L>))
        .route("/execution/:id/preview", get(preview::<L>))
        .route("/execution/transactions/execute", post(execute::<L>))
        .route("/execution/transactions/execute/:kind", post(execute_kind::<L>))
}

async fn schedule<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiQuery(query): ApiQuery<MaxIdQuery>,
) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.execution_schedule(query.max_id.unwrap_or(DEFAULT_SCAN_ID)).await?))
}

async fn status<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.execution_status(id).await?))
}

async fn readiness<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.readiness(id).await?))
}

async fn preview<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.execution_preview(id).await?))
}

async fn execute<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<ProposalActionRequest>,
) -> TxResult {
    execute_as(&gw, req, None).await
}

async fn execute_kind<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(kind): ApiPath<String>,
    ApiJson(req): ApiJson<ProposalActionRequest>,
) -> TxResult {
    let kind = parse_proposal_kind(&kind)?;
    execute_as(&gw, req, Some(kind)).await
}

async fn execute_as<L: Ledger>(
    gw: &AppState<L>,
    req: ProposalActionRequest,
    expected: Option<ProposalType>,
) -> TxResult {
    let executor = parse_pubkey("userPublicKey", &req.user_public_key)?;
    let built = gw.prepare_execute(&executor, req.proposal_id, expected).await?;
    let message = format!("Execute proposal {} transaction created", req.proposal_id);
    let tx = gw.unsigned(&executor, built, message).await?;
    Ok(transaction(tx))
}
