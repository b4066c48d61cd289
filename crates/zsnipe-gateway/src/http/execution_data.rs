//! Stateless execution-data encode and decode.

use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::json;
use zsnipe_program::{ExecutionData, TOKEN_DECIMALS};

use super::dto::{DataEncoding, DecodeRequest, EncodeRequest};
use super::{data, ApiJson, AppState};
use crate::error::GatewayError;
use crate::rpc::Ledger;

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/execution-data/encode", post(encode))
        .route("/execution-data/decode", post(decode))
}

async fn encode(ApiJson(req): ApiJson<EncodeRequest>) -> Result<Json<serde_json::Value>, GatewayError> {
    let kind = req.proposal_type.resolve()?;
    let execution_data = req.fields.resolve(kind)?;
    let bytes = execution_data.encode()?;
    Ok(data(json!({
        "proposalType": kind,
        "executionData": execution_data,
        "base64": BASE64.encode(&bytes),
        "hex": hex::encode(&bytes),
        "length": bytes.len(),
    })))
}

async fn decode(ApiJson(req): ApiJson<DecodeRequest>) -> Result<Json<serde_json::Value>, GatewayError> {
    let kind = req.proposal_type.resolve()?;
    let bytes = match req.encoding {
        DataEncoding::Base64 => BASE64
            .decode(req.data.trim())
            .map_err(|e| GatewayError::InvalidInput(format!("data is not base64: {e}")))?,
        DataEncoding::Hex => hex::decode(req.data.trim().trim_start_matches("0x"))
            .map_err(|e| GatewayError::InvalidInput(format!("data is not hex: {e}")))?,
    };
    let execution_data = ExecutionData::decode(kind, &bytes)
        .map_err(|e| GatewayError::InvalidInput(e.to_string()))?;
    Ok(data(json!({
        "proposalType": kind,
        "summary": execution_data.summary(TOKEN_DECIMALS),
        "executionData": execution_data,
    })))
}
