use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use zsnipe_program::ProgramError;

/// Every failure a gateway operation can surface to a client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("invalid proposal type: {0}")]
    InvalidProposalType(i64),

    #[error("ledger unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) | GatewayError::AccountNotFound(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::DecodeError(_)
            | GatewayError::InvalidProposalType(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to return to a client. Upstream and internal details
    /// can carry node URLs, so they stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::UpstreamUnavailable(_) => "ledger RPC is unavailable".to_string(),
            GatewayError::Internal(_) => "internal error".to_string(),
            other => other.to_string(),
        }
    }

    /// Prefix the message with the operation that failed.
    pub fn context(self, op: &str) -> Self {
        match self {
            GatewayError::InvalidInput(m) => GatewayError::InvalidInput(format!("{op}: {m}")),
            GatewayError::AccountNotFound(m) => {
                GatewayError::AccountNotFound(format!("{op}: {m}"))
            }
            GatewayError::DecodeError(m) => GatewayError::DecodeError(format!("{op}: {m}")),
            GatewayError::UpstreamUnavailable(m) => {
                GatewayError::UpstreamUnavailable(format!("{op}: {m}"))
            }
            GatewayError::Internal(m) => GatewayError::Internal(format!("{op}: {m}")),
            other @ GatewayError::InvalidProposalType(_) => other,
        }
    }
}

impl From<ProgramError> for GatewayError {
    fn from(e: ProgramError) -> Self {
        match e {
            ProgramError::InvalidInput(m) => GatewayError::InvalidInput(m),
            ProgramError::AccountNotFound(m) => GatewayError::AccountNotFound(m),
            ProgramError::DecodeError(m) => GatewayError::DecodeError(m),
            ProgramError::InvalidProposalType(v) => GatewayError::InvalidProposalType(v),
            ProgramError::Internal(m) => GatewayError::Internal(m),
        }
    }
}

impl From<chain_sol::SolError> for GatewayError {
    fn from(e: chain_sol::SolError) -> Self {
        ProgramError::from(e).into()
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(e: JsonRejection) -> Self {
        GatewayError::InvalidInput(e.body_text())
    }
}

impl From<PathRejection> for GatewayError {
    fn from(e: PathRejection) -> Self {
        GatewayError::InvalidInput(e.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(e: QueryRejection) -> Self {
        GatewayError::InvalidInput(e.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = Json(json!({ "success": false, "error": self.public_message() }));
        (status, body).into_response()
    }
}

/// Error wrapper for read routes: a missing account is an ordinary answer,
/// not a client error.
#[derive(Debug)]
pub struct ReadError(pub GatewayError);

impl From<GatewayError> for ReadError {
    fn from(e: GatewayError) -> Self {
        ReadError(e)
    }
}

impl From<ProgramError> for ReadError {
    fn from(e: ProgramError) -> Self {
        ReadError(e.into())
    }
}

impl IntoResponse for ReadError {
    fn into_response(self) -> Response {
        match self.0 {
            GatewayError::AccountNotFound(m) => (
                StatusCode::OK,
                Json(json!({ "success": false, "error": format!("account not found: {m}") })),
            )
                .into_response(),
            other => other.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(GatewayError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::AccountNotFound("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            GatewayError::InvalidProposalType(3).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GatewayError::UpstreamUnavailable("x".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn read_routes_answer_missing_accounts_with_ok() {
        let response = ReadError(GatewayError::AccountNotFound("pool".into())).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let response = ReadError(GatewayError::DecodeError("bad".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_details_are_not_public() {
        let err = GatewayError::UpstreamUnavailable("POST https://rpc.example/?key=abc".into());
        assert!(!err.public_message().contains("rpc.example"));
    }

    #[test]
    fn context_prefixes_message() {
        let err = GatewayError::AccountNotFound("StakingPool".into()).context("stake");
        assert_eq!(err.to_string(), "account not found: stake: StakingPool");
    }

    #[test]
    fn program_errors_keep_their_kind() {
        let err: GatewayError = ProgramError::InvalidProposalType(7).into();
        assert!(matches!(err, GatewayError::InvalidProposalType(7)));
    }
}
