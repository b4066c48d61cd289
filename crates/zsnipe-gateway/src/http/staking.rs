use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::dto::{parse_pubkey, AdminRequest, UserAmountRequest};
use super::{data, transaction, ApiJson, ApiPath, AppState, TxResult};
use crate::error::ReadError;
use crate::rpc::Ledger;

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/staking/pool", get(pool::<L>))
        .route("/staking/users/:user", get(user_stake::<L>))
        .route("/staking/users/:user/token-balance", get(token_balance::<L>))
        .route("/staking/transactions/init-pool", post(init_pool::<L>))
        .route("/staking/transactions/stake", post(stake::<L>))
        .route("/staking/transactions/unstake", post(unstake::<L>))
}

async fn pool<L: Ledger>(State(gw): State<AppState<L>>) -> Result<Json<serde_json::Value>, ReadError> {
    Ok(data(gw.staking_pool().await?))
}

async fn user_stake<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(user): ApiPath<String>,
) -> Result<Json<serde_json::Value>, ReadError> {
    let user = parse_pubkey("user", &user)?;
    Ok(data(gw.user_stake(&user).await?))
}

async fn token_balance<L: Ledger>(
    State(gw): State<AppState<L>>,
    ApiPath(user): ApiPath<String>,
) -> Result<Json<serde_json::Value>, ReadError> {
    let user = parse_pubkey("user", &user)?;
    Ok(data(gw.token_balance(&user).await?))
}

async fn init_pool<L: Ledger>(State(gw): State<AppState<L>>, ApiJson(req): ApiJson<AdminRequest>) -> TxResult {
    let admin = req.admin()?;
    let built = gw.prepare_init_staking_pool(&admin)?;
    let tx = gw
        .unsigned(&admin, built, "Staking pool initialization transaction created")
        .await?;
    Ok(transaction(tx))
}

async fn stake<L: Ledger>(State(gw): State<AppState<L>>, ApiJson(req): ApiJson<UserAmountRequest>) -> TxResult {
    let user = parse_pubkey("userPublicKey", &req.user_public_key)?;
    let amount = req.amount.base_units()?;
    let built = gw.prepare_stake(&user, amount).await?;
    let tx = gw.unsigned(&user, built, "Stake transaction created").await?;
    Ok(transaction(tx))
}

async fn unstake<L: Ledger>(State(gw): State<AppState<L>>, ApiJson(req): ApiJson<UserAmountRequest>) -> TxResult {
    let user = parse_pubkey("userPublicKey", &req.user_public_key)?;
    let amount = req.amount.base_units()?;
    let built = gw.prepare_unstake(&user, amount).await?;
    let tx = gw.unsigned(&user, built, "Unstake transaction created").await?;
    Ok(transaction(tx))
}
