use chain_sol::SolError;
use thiserror::Error;

/// Errors raised while deriving, encoding or decoding program data.
#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("decode error: {0}")]
    DecodeError(String),

    #[error("invalid proposal type: {0}")]
    InvalidProposalType(i64),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SolError> for ProgramError {
    fn from(e: SolError) -> Self {
        match e {
            SolError::InvalidAddress(_)
            | SolError::InvalidSeeds(_)
            | SolError::InvalidPrivateKey(_) => ProgramError::InvalidInput(e.to_string()),
            SolError::SerializationError(_) => ProgramError::DecodeError(e.to_string()),
            SolError::TransactionBuildError(_) | SolError::SigningError(_) => {
                ProgramError::Internal(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_proposal_type() {
        let err = ProgramError::InvalidProposalType(3);
        assert_eq!(err.to_string(), "invalid proposal type: 3");
    }

    #[test]
    fn display_account_not_found() {
        let err = ProgramError::AccountNotFound("proposal 7".into());
        assert_eq!(err.to_string(), "account not found: proposal 7");
    }

    #[test]
    fn bad_address_maps_to_invalid_input() {
        let err: ProgramError = SolError::InvalidAddress("base58 decode failed".into()).into();
        assert!(matches!(err, ProgramError::InvalidInput(_)));
    }

    #[test]
    fn short_token_account_maps_to_decode_error() {
        let err: ProgramError = SolError::SerializationError("too short".into()).into();
        assert!(matches!(err, ProgramError::DecodeError(_)));
    }

    #[test]
    fn build_failure_maps_to_internal() {
        let err: ProgramError = SolError::TransactionBuildError("no instructions".into()).into();
        assert!(matches!(err, ProgramError::Internal(_)));
    }
}
