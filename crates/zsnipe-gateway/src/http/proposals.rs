use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use zsnipe_program::{NewProposal, ProposalType};

use super::dto::{
    parse_choice, parse_pubkey, AdminRequest, CreateProposalRequest, MaxIdQuery,
    ProposalActionRequest, VoteRequest,
};
use super::{data, transaction, ApiJson, ApiPath, ApiQuery, AppState, TxResult};
use crate::error::{GatewayError, ReadError};
use crate::rpc::Ledger;
use crate::service::read::{proposal_requirements, DEFAULT_SCAN_ID};

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/proposals", get(list::<L>))
        .route("/proposals/all", get(list_all::<L>))
        .route("/proposals/requirements", get(requirements))
        .route("/proposals/:id", get(info::<L>))
        .route("/proposals/:id/finalization-status", get(finalization_status::<L>))
        .route("/proposals/:id/votes/:voter", get(vote_record::<L>))
        .route("/proposals/transactions/init-escrow", post(init_escrow::<L>))
        .route("/proposals/transactions/create", post(create::<L>))
        .route("/proposals/transactions/vote", post(vote::<L>))
        .route("/proposals/transactions/finalize", post(finalize::<L>))
}

async fn list<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiQuery(query): ApiQuery<MaxIdQuery>,
) -> Result<Json<serde_json::Value>, ReadError> {
    let proposals = gw.list_proposals(query.max_id.unwrap_or(DEFAULT_SCAN_ID)).await?;
    Ok(data(serde_json::json!({
        "count": proposals.len(),
        "proposals": proposals,
    })))
}

async fn list_all<L: Ledger>(
    State(gw): State<AppState<L>>,
) -> Result<Json<serde_json::Value>, ReadError> {
    let proposals = gw.all_proposals().await?;
    Ok(data(serde_json::json!({
        "count": proposals.len(),
        "proposals": proposals,
    })))
}

async fn requirements() -> Json<serde_json::Value> {
    data(proposal_requirements())
}

async fn info<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.proposal(id).await?))
}

async fn finalization_status<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.finalization_status(id).await?))
}

async fn vote_record<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath((id, voter)): ApiPath<(u64, String)>,
) -> Result<Json<serde_json::Value>, ReadError> {
    let voter = parse_pubkey("voter", &voter)?;
    Ok(data(gw.vote_record(id, &voter).await?))
}

async fn init_escrow<L: Ledger>(State(gw): State<AppState<L>>, ApiJson(req): ApiJson<AdminRequest>) -> TxResult {
    let admin = req.admin()?;
    let built = gw.prepare_init_proposal_escrow(&admin)?;
    let tx = gw
        .unsigned(&admin, built, "Proposal escrow initialization transaction created")
        .await?;
    Ok(transaction(tx))
}

fn new_proposal(req: CreateProposalRequest) -> Result<NewProposal, GatewayError> {
    let proposal_type = req.proposal_type.resolve()?;
    let execution_data = match (&req.execution_data, proposal_type) {
        (Some(input), _) => input.resolve(proposal_type)?.encode()?,
        (None, ProposalType::Text) => Vec::new(),
        (None, _) => {
            return Err(GatewayError::InvalidInput(format!(
                "{} proposals require executionData",
                proposal_type.as_str()
            )))
        }
    };
    Ok(NewProposal {
        proposal_id: req.proposal_id,
        title: req.title,
        description: req.description,
        proposal_type,
        execution_data,
        voting_period_days: req.voting_period,
    })
}

async fn create<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<CreateProposalRequest>,
) -> TxResult {
    let proposer = parse_pubkey("userPublicKey", &req.user_public_key)?;
    let proposal = new_proposal(req)?;
    let built = gw.prepare_create_proposal(&proposer, &proposal).await?;
    let message = format!(
        "Proposal {} creation transaction created",
        proposal.proposal_id
    );
    let tx = gw.unsigned(&proposer, built, message).await?;
    Ok(transaction(tx))
}

async fn vote<L: Ledger>(State(gw): State<AppState<L>>, ApiJson(req): ApiJson<VoteRequest>) -> TxResult {
    let voter = parse_pubkey("userPublicKey", &req.user_public_key)?;
    let choice = parse_choice(&req.choice)?;
    let built = gw.prepare_cast_vote(&voter, req.proposal_id, choice).await?;
    let message = format!("Vote on proposal {} transaction created", req.proposal_id);
    let tx = gw.unsigned(&voter, built, message).await?;
    Ok(transaction(tx))
}

async fn finalize<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiJson(req): ApiJson<ProposalActionRequest>,
) -> TxResult {
    let finalizer = parse_pubkey("userPublicKey", &req.user_public_key)?;
    let built = gw.prepare_finalize(&finalizer, req.proposal_id).await?;
    let message = format!("Finalize proposal {} transaction created", req.proposal_id);
    let tx = gw.unsigned(&finalizer, built, message).await?;
    Ok(transaction(tx))
}
