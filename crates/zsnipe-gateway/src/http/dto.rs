//! Request bodies and the parsing shared by handlers.

use chain_sol::Pubkey;
use serde::Deserialize;
use zsnipe_program::{
    parse_display_amount, ExecutionData, GovernanceParameter, ProposalType, VoteChoice,
    TOKEN_DECIMALS,
};

use crate::error::GatewayError;

pub(crate) fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, GatewayError> {
    value
        .trim()
        .parse()
        .map_err(|e| GatewayError::InvalidInput(format!("{field}: {e}")))
}

/// A token amount in display units, sent as a decimal string or a JSON
/// number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum DisplayAmount {
    Text(String),
    Number(serde_json::Number),
}

impl DisplayAmount {
    /// Base units. Zero, negative and over-precise amounts are rejected.
    pub fn base_units(&self) -> Result<u64, GatewayError> {
        let text = match self {
            DisplayAmount::Text(s) => s.clone(),
            DisplayAmount::Number(n) => n.to_string(),
        };
        Ok(parse_display_amount(&text, TOKEN_DECIMALS)?)
    }
}

/// Proposal type as its wire id or its name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProposalTypeInput {
    Id(i64),
    Name(String),
}

impl ProposalTypeInput {
    pub fn resolve(&self) -> Result<ProposalType, GatewayError> {
        match self {
            ProposalTypeInput::Id(id) => Ok(ProposalType::from_discriminant(*id)?),
            ProposalTypeInput::Name(name) => match name.trim().parse::<i64>() {
                Ok(id) => Ok(ProposalType::from_discriminant(id)?),
                Err(_) => parse_proposal_kind(name),
            },
        }
    }
}

/// `text`, `treasury` or `parameter`, plus the full camelCase names.
pub(crate) fn parse_proposal_kind(name: &str) -> Result<ProposalType, GatewayError> {
    match name.trim() {
        "text" | "Text" => Ok(ProposalType::Text),
        "treasury" | "treasuryTransfer" | "TreasuryTransfer" => Ok(ProposalType::TreasuryTransfer),
        "parameter" | "parameterUpdate" | "ParameterUpdate" => Ok(ProposalType::ParameterUpdate),
        other => Err(GatewayError::InvalidInput(format!(
            "unknown proposal type {other:?}, expected text, treasury or parameter"
        ))),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ParameterInput {
    Id(u8),
    Name(String),
}

impl ParameterInput {
    fn resolve(&self) -> Result<GovernanceParameter, GatewayError> {
        Ok(match self {
            ParameterInput::Id(id) => GovernanceParameter::from_id(*id)?,
            ParameterInput::Name(name) => name.parse()?,
        })
    }
}

/// Loose execution-data fields; which ones are required depends on the
/// proposal type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExecutionDataInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub recipient: Option<String>,
    pub amount: Option<DisplayAmount>,
    pub parameter: Option<ParameterInput>,
    pub new_value: Option<u64>,
}

impl ExecutionDataInput {
    pub fn resolve(&self, kind: ProposalType) -> Result<ExecutionData, GatewayError> {
        match kind {
            ProposalType::Text => Ok(ExecutionData::Text {
                title: self.title.clone(),
                description: self.description.clone(),
            }),
            ProposalType::TreasuryTransfer => {
                let recipient = self.recipient.as_deref().ok_or_else(|| {
                    GatewayError::InvalidInput("treasury transfer requires recipient".into())
                })?;
                let amount = self.amount.as_ref().ok_or_else(|| {
                    GatewayError::InvalidInput("treasury transfer requires amount".into())
                })?;
                Ok(ExecutionData::TreasuryTransfer {
                    recipient: parse_pubkey("recipient", recipient)?,
                    amount: amount.base_units()?,
                })
            }
            ProposalType::ParameterUpdate => {
                let parameter = self.parameter.as_ref().ok_or_else(|| {
                    GatewayError::InvalidInput("parameter update requires parameter".into())
                })?;
                let new_value = self.new_value.ok_or_else(|| {
                    GatewayError::InvalidInput("parameter update requires newValue".into())
                })?;
                Ok(ExecutionData::ParameterUpdate {
                    parameter: parameter.resolve()?,
                    new_value,
                })
            }
        }
    }
}

pub(crate) fn parse_choice(choice: &str) -> Result<VoteChoice, GatewayError> {
    Ok(choice.parse()?)
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserRequest {
    pub user_public_key: String,
}

impl UserRequest {
    pub fn user(&self) -> Result<Pubkey, GatewayError> {
        parse_pubkey("userPublicKey", &self.user_public_key)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminRequest {
    pub admin_public_key: String,
}

impl AdminRequest {
    pub fn admin(&self) -> Result<Pubkey, GatewayError> {
        parse_pubkey("adminPublicKey", &self.admin_public_key)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserAmountRequest {
    pub user_public_key: String,
    pub amount: DisplayAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AdminAmountRequest {
    pub admin_public_key: String,
    pub amount: DisplayAmount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateProposalRequest {
    pub user_public_key: String,
    pub proposal_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub proposal_type: ProposalTypeInput,
    pub voting_period: u8,
    pub execution_data: Option<ExecutionDataInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VoteRequest {
    pub user_public_key: String,
    pub proposal_id: u64,
    #[serde(alias = "voteChoice")]
    pub choice: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProposalActionRequest {
    pub user_public_key: String,
    pub proposal_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EncodeRequest {
    pub proposal_type: ProposalTypeInput,
    #[serde(flatten)]
    pub fields: ExecutionDataInput,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum DataEncoding {
    #[default]
    Base64,
    Hex,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DecodeRequest {
    pub proposal_type: ProposalTypeInput,
    pub data: String,
    #[serde(default)]
    pub encoding: DataEncoding,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MaxIdQuery {
    pub max_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PreviewQuery {
    pub amount: String,
    #[serde(default)]
    pub lock_days: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_amount_accepts_string_and_number() {
        let s: DisplayAmount = serde_json::from_value(json!("1.5")).unwrap();
        let n: DisplayAmount = serde_json::from_value(json!(250)).unwrap();
        assert_eq!(s.base_units().unwrap(), 1_500_000);
        assert_eq!(n.base_units().unwrap(), 250_000_000);
    }

    #[test]
    fn display_amount_rejects_zero_and_negative() {
        for raw in [json!("0"), json!(0), json!(-5), json!("-1")] {
            let amount: DisplayAmount = serde_json::from_value(raw).unwrap();
            assert!(matches!(amount.base_units(), Err(GatewayError::InvalidInput(_))));
        }
    }

    #[test]
    fn proposal_type_by_id_and_name() {
        let id: ProposalTypeInput = serde_json::from_value(json!(2)).unwrap();
        let name: ProposalTypeInput = serde_json::from_value(json!("treasury")).unwrap();
        assert_eq!(id.resolve().unwrap(), ProposalType::ParameterUpdate);
        assert_eq!(name.resolve().unwrap(), ProposalType::TreasuryTransfer);

        let bad: ProposalTypeInput = serde_json::from_value(json!(3)).unwrap();
        assert!(matches!(bad.resolve(), Err(GatewayError::InvalidProposalType(3))));
    }

    #[test]
    fn numeric_string_proposal_type_is_an_id() {
        let text: ProposalTypeInput = serde_json::from_value(json!(" 1 ")).unwrap();
        assert_eq!(text.resolve().unwrap(), ProposalType::TreasuryTransfer);

        let bad: ProposalTypeInput = serde_json::from_value(json!("3")).unwrap();
        assert!(matches!(bad.resolve(), Err(GatewayError::InvalidProposalType(3))));
    }

    #[test]
    fn parameter_update_fields() {
        let input: ExecutionDataInput =
            serde_json::from_value(json!({ "parameter": "quorum", "newValue": 25 })).unwrap();
        assert_eq!(
            input.resolve(ProposalType::ParameterUpdate).unwrap(),
            ExecutionData::ParameterUpdate {
                parameter: GovernanceParameter::Quorum,
                new_value: 25
            }
        );
        assert!(input.resolve(ProposalType::TreasuryTransfer).is_err());
    }

    #[test]
    fn encode_request_flattens_fields() {
        let req: EncodeRequest = serde_json::from_value(json!({
            "proposalType": "treasury",
            "recipient": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
            "amount": "12.5"
        }))
        .unwrap();
        let kind = req.proposal_type.resolve().unwrap();
        match req.fields.resolve(kind).unwrap() {
            ExecutionData::TreasuryTransfer { amount, .. } => assert_eq!(amount, 12_500_000),
            other => panic!("unexpected {other:?}"),
        }
    }
}
