//! Service banner, health check and the OpenAPI document.
//!
//! The route table below drives both the banner and the document, so a
//! route missing here is missing from the docs.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use super::{AppState, API_PREFIX};
use crate::rpc::Ledger;

struct RouteDoc {
    method: &'static str,
    /// Path under the API prefix, OpenAPI template syntax.
    path: &'static str,
    tag: &'static str,
    summary: &'static str,
}

const fn route(method: &'static str, path: &'static str, tag: &'static str, summary: &'static str) -> RouteDoc {
    RouteDoc {
        method,
        path,
        tag,
        summary,
    }
}

const ROUTES: &[RouteDoc] = &[
    route("get", "/staking/pool", "staking", "Staking pool state"),
    route("get", "/staking/users/{user}", "staking", "A user's staking account"),
    route("get", "/staking/users/{user}/token-balance", "staking", "A user's token balance"),
    route("post", "/staking/transactions/init-pool", "staking", "Initialize the staking pool"),
    route("post", "/staking/transactions/stake", "staking", "Stake tokens"),
    route("post", "/staking/transactions/unstake", "staking", "Unstake tokens"),
    route("get", "/governance/accounts/{user}", "governance", "A user's governance account"),
    route("get", "/governance/accounts/{user}/eligibility", "governance", "Voting eligibility"),
    route("get", "/governance/voting-power/preview", "governance", "Voting power estimate"),
    route("post", "/governance/transactions/init", "governance", "Initialize a governance account"),
    route(
        "post",
        "/governance/transactions/calculate-voting-power",
        "governance",
        "Recalculate cached voting power",
    ),
    route("get", "/proposals", "proposals", "List proposals up to maxId"),
    route("get", "/proposals/all", "proposals", "Every proposal, in one account scan"),
    route("get", "/proposals/requirements", "proposals", "Proposal requirements"),
    route("get", "/proposals/{id}", "proposals", "A proposal"),
    route("get", "/proposals/{id}/finalization-status", "proposals", "Whether a proposal can be finalized"),
    route("get", "/proposals/{id}/votes/{voter}", "proposals", "A vote record"),
    route("post", "/proposals/transactions/init-escrow", "proposals", "Initialize the proposal escrow"),
    route("post", "/proposals/transactions/create", "proposals", "Create a proposal"),
    route("post", "/proposals/transactions/vote", "proposals", "Cast a vote"),
    route("post", "/proposals/transactions/finalize", "proposals", "Finalize a proposal"),
    route("get", "/execution/schedule", "execution", "Passed proposals awaiting execution"),
    route("get", "/execution/{id}/status", "execution", "Whether a proposal can execute"),
    route("get", "/execution/{id}/readiness", "execution", "Execution readiness report"),
    route("get", "/execution/{id}/preview", "execution", "Decoded execution payload"),
    route("post", "/execution/transactions/execute", "execution", "Execute a proposal"),
    route(
        "post",
        "/execution/transactions/execute/{kind}",
        "execution",
        "Execute a proposal of a given kind",
    ),
    route("get", "/treasury", "treasury", "Treasury state"),
    route("post", "/treasury/transactions/init", "treasury", "Initialize the treasury"),
    route("post", "/treasury/transactions/fund", "treasury", "Fund the treasury"),
    route("get", "/governance-config", "governance-config", "Governance configuration"),
    route(
        "post",
        "/governance-config/transactions/init",
        "governance-config",
        "Initialize governance configuration",
    ),
    route("post", "/execution-data/encode", "execution-data", "Encode execution data"),
    route("post", "/execution-data/decode", "execution-data", "Decode execution data"),
];

const DEV_ROUTES: &[RouteDoc] = &[
    route("get", "/dev/wallets", "dev", "Local signing identities"),
    route("post", "/dev/bulk/stake", "dev", "Stake from every local wallet"),
    route("post", "/dev/bulk/init-governance", "dev", "Initialize governance accounts"),
    route("post", "/dev/bulk/calculate-voting-power", "dev", "Recalculate voting power"),
    route("post", "/dev/bulk/vote", "dev", "Vote from every local wallet"),
    route("post", "/dev/bulk/execute", "dev", "Execute every ready proposal"),
];

pub(super) fn routes<L: Ledger>() -> Router<AppState<L>> {
    Router::new()
        .route("/", get(banner::<L>))
        .route("/api/health", get(health::<L>))
        .route("/api-docs.json", get(api_docs::<L>))
}

fn documented(dev: bool) -> impl Iterator<Item = &'static RouteDoc> {
    let dev_routes: &'static [RouteDoc] = if dev { DEV_ROUTES } else { &[] };
    ROUTES.iter().chain(dev_routes)
}

fn path_parameters(path: &str) -> Vec<Value> {
    path.split('/')
        .filter_map(|segment| segment.strip_prefix('{')?.strip_suffix('}'))
        .map(|name| {
            let schema = if name == "id" {
                json!({ "type": "integer", "minimum": 0 })
            } else {
                json!({ "type": "string" })
            };
            json!({ "name": name, "in": "path", "required": true, "schema": schema })
        })
        .collect()
}

/// OpenAPI 3.0 document for the mounted routes.
pub fn openapi_document(program_id: &str, dev: bool) -> Value {
    let mut paths: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
    for doc in documented(dev) {
        let mut operation = json!({
            "tags": [doc.tag],
            "summary": doc.summary,
            "responses": {
                "200": { "description": "Success, or `success: false` for a missing account on reads" },
                "400": { "description": "Invalid input" },
                "500": { "description": "Decode or internal error" },
                "503": { "description": "Ledger RPC unavailable" }
            }
        });
        let parameters = path_parameters(doc.path);
        if !parameters.is_empty() {
            operation["parameters"] = Value::Array(parameters);
        }
        if doc.method == "post" {
            operation["requestBody"] = json!({
                "required": true,
                "content": { "application/json": { "schema": { "type": "object" } } }
            });
        }
        paths
            .entry(format!("{API_PREFIX}{}", doc.path))
            .or_default()
            .insert(doc.method.to_string(), operation);
    }

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "zSnipe Governance Gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "description": format!("Unsigned transaction builder and reader for program {program_id}"),
        },
        "paths": paths,
    })
}

fn endpoint_groups(dev: bool) -> BTreeMap<&'static str, Vec<String>> {
    let mut groups: BTreeMap<&'static str, Vec<String>> = BTreeMap::new();
    for doc in documented(dev) {
        groups.entry(doc.tag).or_default().push(format!(
            "{} {API_PREFIX}{}",
            doc.method.to_ascii_uppercase(),
            doc.path
        ));
    }
    groups
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn banner<L: Ledger>(State(gw): State<AppState<L>>) -> Json<Value> {
    let dev = gw.identities().count() > 0;
    Json(json!({
        "name": "zSnipe Governance Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "documentation": "/api-docs.json",
        "programId": gw.config().program_id,
        "cluster": gw.config().cluster,
        "timestamp": timestamp(),
        "endpoints": endpoint_groups(dev),
    }))
}

async fn health<L: Ledger>(State(gw): State<AppState<L>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "uptime": gw.uptime().as_secs(),
        "programId": gw.config().program_id,
        "cluster": gw.config().cluster,
    }))
}

async fn api_docs<L: Ledger>(State(gw): State<AppState<L>>) -> Json<Value> {
    let dev = gw.identities().count() > 0;
    Json(openapi_document(&gw.config().program_id.to_string(), dev))
}
