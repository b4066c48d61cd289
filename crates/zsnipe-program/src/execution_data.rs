//! Proposal execution data.
//!
//! The payload attached to a proposal describing what runs if it passes.
//! The proposal type selects the layout:
//!
//! ```text
//! Text              "<title>|<description>" as UTF-8, empty if no metadata
//! TreasuryTransfer  recipient (32) || amount u64 LE (8)        = 40 bytes
//! ParameterUpdate   parameter id u8 || new value u64 LE (8)    =  9 bytes
//! ```

use chain_sol::Pubkey;
use serde::{Deserialize, Serialize};

use crate::accounts::ProposalType;
use crate::error::ProgramError;

const TREASURY_TRANSFER_LEN: usize = 40;
const PARAMETER_UPDATE_LEN: usize = 9;

/// Longest accepted timelock: 30 days in seconds.
pub const MAX_TIMELOCK_SECONDS: u64 = 30 * 86_400;

/// A governance parameter a ParameterUpdate proposal can change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GovernanceParameter {
    /// Quorum percentage, 1..=100.
    Quorum,
    /// Passing threshold percentage, 51..=100.
    Threshold,
    /// Timelock in seconds, at most 30 days.
    Timelock,
}

impl GovernanceParameter {
    pub fn id(self) -> u8 {
        match self {
            GovernanceParameter::Quorum => 0,
            GovernanceParameter::Threshold => 1,
            GovernanceParameter::Timelock => 2,
        }
    }

    pub fn from_id(id: u8) -> Result<Self, ProgramError> {
        match id {
            0 => Ok(GovernanceParameter::Quorum),
            1 => Ok(GovernanceParameter::Threshold),
            2 => Ok(GovernanceParameter::Timelock),
            other => Err(ProgramError::InvalidInput(format!(
                "parameter id must be 0, 1 or 2, got {other}"
            ))),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GovernanceParameter::Quorum => "Quorum Percentage",
            GovernanceParameter::Threshold => "Passing Threshold",
            GovernanceParameter::Timelock => "Timelock Duration (seconds)",
        }
    }

    pub fn validate(self, value: u64) -> Result<(), ProgramError> {
        let ok = match self {
            GovernanceParameter::Quorum => (1..=100).contains(&value),
            GovernanceParameter::Threshold => (51..=100).contains(&value),
            GovernanceParameter::Timelock => value <= MAX_TIMELOCK_SECONDS,
        };
        if ok {
            return Ok(());
        }
        Err(ProgramError::InvalidInput(match self {
            GovernanceParameter::Quorum => {
                format!("quorum percentage must be between 1 and 100, got {value}")
            }
            GovernanceParameter::Threshold => {
                format!("passing threshold must be between 51 and 100, got {value}")
            }
            GovernanceParameter::Timelock => {
                format!("timelock must be at most {MAX_TIMELOCK_SECONDS} seconds, got {value}")
            }
        }))
    }
}

impl std::str::FromStr for GovernanceParameter {
    type Err = ProgramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quorum" => Ok(GovernanceParameter::Quorum),
            "threshold" => Ok(GovernanceParameter::Threshold),
            "timelock" => Ok(GovernanceParameter::Timelock),
            other => Err(ProgramError::InvalidInput(format!(
                "invalid parameter name {other:?}, must be quorum, threshold or timelock"
            ))),
        }
    }
}

/// Typed execution payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ExecutionData {
    Text {
        title: String,
        description: String,
    },
    TreasuryTransfer {
        recipient: Pubkey,
        /// Base units.
        amount: u64,
    },
    ParameterUpdate {
        parameter: GovernanceParameter,
        new_value: u64,
    },
}

impl ExecutionData {
    pub fn proposal_type(&self) -> ProposalType {
        match self {
            ExecutionData::Text { .. } => ProposalType::Text,
            ExecutionData::TreasuryTransfer { .. } => ProposalType::TreasuryTransfer,
            ExecutionData::ParameterUpdate { .. } => ProposalType::ParameterUpdate,
        }
    }

    /// Validate and encode to the on-chain layout.
    pub fn encode(&self) -> Result<Vec<u8>, ProgramError> {
        match self {
            ExecutionData::Text { title, description } => {
                if title.contains('|') {
                    return Err(ProgramError::InvalidInput(
                        "title must not contain '|'".into(),
                    ));
                }
                if title.is_empty() && description.is_empty() {
                    return Ok(Vec::new());
                }
                Ok(format!("{title}|{description}").into_bytes())
            }
            ExecutionData::TreasuryTransfer { recipient, amount } => {
                if *amount == 0 {
                    return Err(ProgramError::InvalidInput(
                        "treasury transfer amount must be > 0".into(),
                    ));
                }
                let mut out = Vec::with_capacity(TREASURY_TRANSFER_LEN);
                out.extend_from_slice(recipient.as_ref());
                out.extend_from_slice(&amount.to_le_bytes());
                Ok(out)
            }
            ExecutionData::ParameterUpdate {
                parameter,
                new_value,
            } => {
                parameter.validate(*new_value)?;
                let mut out = Vec::with_capacity(PARAMETER_UPDATE_LEN);
                out.push(parameter.id());
                out.extend_from_slice(&new_value.to_le_bytes());
                Ok(out)
            }
        }
    }

    /// Decode a payload stored with a proposal of type `kind`.
    pub fn decode(kind: ProposalType, data: &[u8]) -> Result<Self, ProgramError> {
        match kind {
            ProposalType::Text => {
                let text = std::str::from_utf8(data).map_err(|e| {
                    ProgramError::DecodeError(format!("text execution data is not UTF-8: {e}"))
                })?;
                let (title, description) = text.split_once('|').unwrap_or((text, ""));
                Ok(ExecutionData::Text {
                    title: title.to_string(),
                    description: description.to_string(),
                })
            }
            ProposalType::TreasuryTransfer => {
                if data.len() != TREASURY_TRANSFER_LEN {
                    return Err(ProgramError::DecodeError(format!(
                        "treasury transfer data is {} bytes, expected {TREASURY_TRANSFER_LEN}",
                        data.len()
                    )));
                }
                let recipient = Pubkey::from_slice(&data[..32])?;
                Ok(ExecutionData::TreasuryTransfer {
                    recipient,
                    amount: read_u64_le(&data[32..40]),
                })
            }
            ProposalType::ParameterUpdate => {
                if data.len() != PARAMETER_UPDATE_LEN {
                    return Err(ProgramError::DecodeError(format!(
                        "parameter update data is {} bytes, expected {PARAMETER_UPDATE_LEN}",
                        data.len()
                    )));
                }
                let parameter = GovernanceParameter::from_id(data[0])
                    .map_err(|e| ProgramError::DecodeError(e.to_string()))?;
                Ok(ExecutionData::ParameterUpdate {
                    parameter,
                    new_value: read_u64_le(&data[1..9]),
                })
            }
        }
    }

    /// One-line description for previews.
    pub fn summary(&self, decimals: u8) -> String {
        match self {
            ExecutionData::Text { title, .. } if title.is_empty() => {
                "Text proposal, no on-chain action".to_string()
            }
            ExecutionData::Text { title, .. } => {
                format!("Text proposal \"{title}\", no on-chain action")
            }
            ExecutionData::TreasuryTransfer { recipient, amount } => format!(
                "Transfer {} tokens from the treasury to {recipient}",
                crate::amount::format_base_units(*amount, decimals)
            ),
            ExecutionData::ParameterUpdate {
                parameter,
                new_value,
            } => format!("Set {} to {new_value}", parameter.label()),
        }
    }
}

fn read_u64_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- Round trips ---------------------------------------------------------

    #[test]
    fn text_round_trip() {
        let data = ExecutionData::Text {
            title: "Community call".into(),
            description: "Monthly sync | agenda TBD".into(),
        };
        let bytes = data.encode().unwrap();
        assert_eq!(bytes, b"Community call|Monthly sync | agenda TBD");
        assert_eq!(ExecutionData::decode(ProposalType::Text, &bytes).unwrap(), data);
    }

    #[test]
    fn empty_text_encodes_to_nothing() {
        let data = ExecutionData::Text {
            title: String::new(),
            description: String::new(),
        };
        assert!(data.encode().unwrap().is_empty());
        assert_eq!(ExecutionData::decode(ProposalType::Text, &[]).unwrap(), data);
    }

    #[test]
    fn treasury_transfer_round_trip() {
        let data = ExecutionData::TreasuryTransfer {
            recipient: Pubkey([0x42; 32]),
            amount: 2_500_000,
        };
        let bytes = data.encode().unwrap();
        assert_eq!(bytes.len(), 40);
        assert_eq!(&bytes[..32], &[0x42; 32]);
        assert_eq!(&bytes[32..], &2_500_000u64.to_le_bytes());
        assert_eq!(
            ExecutionData::decode(ProposalType::TreasuryTransfer, &bytes).unwrap(),
            data
        );
    }

    #[test]
    fn parameter_update_round_trip() {
        let data = ExecutionData::ParameterUpdate {
            parameter: GovernanceParameter::Timelock,
            new_value: 86_400,
        };
        let bytes = data.encode().unwrap();
        assert_eq!(bytes[0], 2);
        assert_eq!(bytes.len(), 9);
        assert_eq!(
            ExecutionData::decode(ProposalType::ParameterUpdate, &bytes).unwrap(),
            data
        );
    }

    // -- Validation ----------------------------------------------------------

    #[test]
    fn zero_transfer_is_rejected() {
        let data = ExecutionData::TreasuryTransfer {
            recipient: Pubkey([1; 32]),
            amount: 0,
        };
        assert!(matches!(data.encode(), Err(ProgramError::InvalidInput(_))));
    }

    #[test]
    fn parameter_ranges() {
        use GovernanceParameter::*;
        assert!(Quorum.validate(0).is_err());
        assert!(Quorum.validate(1).is_ok());
        assert!(Quorum.validate(100).is_ok());
        assert!(Quorum.validate(101).is_err());
        assert!(Threshold.validate(50).is_err());
        assert!(Threshold.validate(51).is_ok());
        assert!(Timelock.validate(0).is_ok());
        assert!(Timelock.validate(MAX_TIMELOCK_SECONDS).is_ok());
        assert!(Timelock.validate(MAX_TIMELOCK_SECONDS + 1).is_err());
    }

    #[test]
    fn parameter_names_parse() {
        assert_eq!("Quorum".parse::<GovernanceParameter>().unwrap(), GovernanceParameter::Quorum);
        assert_eq!("timelock".parse::<GovernanceParameter>().unwrap().id(), 2);
        assert!("fee".parse::<GovernanceParameter>().is_err());
    }

    #[test]
    fn pipe_in_title_is_rejected() {
        let data = ExecutionData::Text {
            title: "a|b".into(),
            description: String::new(),
        };
        assert!(data.encode().is_err());
    }

    // -- Decode failures -----------------------------------------------------

    #[test]
    fn wrong_lengths_are_decode_errors() {
        assert!(matches!(
            ExecutionData::decode(ProposalType::TreasuryTransfer, &[0u8; 39]),
            Err(ProgramError::DecodeError(_))
        ));
        assert!(matches!(
            ExecutionData::decode(ProposalType::ParameterUpdate, &[0u8; 10]),
            Err(ProgramError::DecodeError(_))
        ));
    }

    #[test]
    fn unknown_parameter_id_is_decode_error() {
        let mut bytes = vec![9u8];
        bytes.extend_from_slice(&5u64.to_le_bytes());
        assert!(matches!(
            ExecutionData::decode(ProposalType::ParameterUpdate, &bytes),
            Err(ProgramError::DecodeError(_))
        ));
    }

    #[test]
    fn invalid_utf8_text_is_decode_error() {
        assert!(matches!(
            ExecutionData::decode(ProposalType::Text, &[0xff, 0xfe]),
            Err(ProgramError::DecodeError(_))
        ));
    }

    // -- Presentation --------------------------------------------------------

    #[test]
    fn json_is_tagged() {
        let data = ExecutionData::ParameterUpdate {
            parameter: GovernanceParameter::Quorum,
            new_value: 25,
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["type"], "parameterUpdate");
        assert_eq!(json["parameter"], "quorum");
        assert_eq!(json["newValue"], 25);
    }

    #[test]
    fn summaries() {
        let transfer = ExecutionData::TreasuryTransfer {
            recipient: Pubkey([0; 32]),
            amount: 1_500_000,
        };
        assert_eq!(
            transfer.summary(6),
            "Transfer 1.5 tokens from the treasury to 11111111111111111111111111111111"
        );
        let update = ExecutionData::ParameterUpdate {
            parameter: GovernanceParameter::Threshold,
            new_value: 60,
        };
        assert_eq!(update.summary(6), "Set Passing Threshold to 60");
    }
}
