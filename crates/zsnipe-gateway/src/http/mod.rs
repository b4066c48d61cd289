//! HTTP surface.
//!
//! Routes live under `/api/zSnipe`, grouped by module. Handlers parse and
//! validate the request, call one [`Gateway`] operation and wrap the result:
//! `{success:true, data}` for reads, `{success:true, transaction, accounts,
//! message}` for builders. Errors render through [`GatewayError`].

mod dev;
mod docs;
mod dto;
mod execution;
mod execution_data;
mod governance;
mod proposals;
mod staking;
mod treasury;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;

use crate::error::GatewayError;
use crate::rpc::Ledger;
use crate::service::{Gateway, UnsignedTransaction};

pub use docs::openapi_document;

/// Prefix for every program route.
pub const API_PREFIX: &str = "/api/zSnipe";

pub(crate) type AppState<L> = Arc<Gateway<L>>;

/// JSON body whose rejection renders as a 400 `GatewayError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(GatewayError))]
pub(crate) struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(GatewayError))]
pub(crate) struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(GatewayError))]
pub(crate) struct ApiQuery<T>(pub T);

/// `{success:true, data}`
pub(crate) fn data<T: Serialize>(value: T) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "data": value }))
}

#[derive(Serialize)]
pub(crate) struct TransactionResponse {
    success: bool,
    #[serde(flatten)]
    transaction: UnsignedTransaction,
}

impl From<UnsignedTransaction> for TransactionResponse {
    fn from(transaction: UnsignedTransaction) -> Self {
        Self {
            success: true,
            transaction,
        }
    }
}

pub(crate) type TxResult = Result<Json<TransactionResponse>, GatewayError>;

pub(crate) fn transaction(tx: UnsignedTransaction) -> Json<TransactionResponse> {
    Json(tx.into())
}

/// Build the full router. Dev routes are mounted only when the gateway
/// holds local identities.
pub fn router<L: Ledger>(gateway: Arc<Gateway<L>>) -> Router {
    let mut api = Router::new()
        .merge(staking::routes::<L>())
        .merge(governance::routes::<L>())
        .merge(proposals::routes::<L>())
        .merge(execution::routes::<L>())
        .merge(treasury::routes::<L>())
        .merge(execution_data::routes::<L>());

    let identities = gateway.identities().count();
    if identities > 0 {
        tracing::warn!(identities, "dev routes enabled with local signing identities");
        api = api.merge(dev::routes::<L>());
    }

    Router::new()
        .merge(docs::routes::<L>())
        .nest(API_PREFIX, api)
        .fallback(not_found)
        .layer(middleware::from_fn(log_requests))
        .with_state(gateway)
}

async fn not_found(request: Request) -> Response {
    let body = json!({
        "success": false,
        "error": format!("route not found: {} {}", request.method(), request.uri().path()),
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, path, status, elapsed_ms, "request");
    } else {
        tracing::info!(%method, path, status, elapsed_ms, "request");
    }
    response
}
