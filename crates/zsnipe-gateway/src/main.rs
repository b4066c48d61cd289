use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use zsnipe_gateway::{
    router, Cli, Gateway, GatewayConfig, IdentityProvider, JsonRpcLedger, KeypairDirectory,
    NoIdentities,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("zsnipe_gateway=info")),
        )
        .init();

    let config = GatewayConfig::resolve(Cli::parse())?;
    tracing::info!(
        cluster = %config.cluster,
        program_id = %config.program_id,
        mint = %config.mint,
        commitment = config.commitment.as_str(),
        "starting gateway"
    );

    let identities: Arc<dyn IdentityProvider> = match &config.wallets_dir {
        Some(dir) => Arc::new(
            KeypairDirectory::load(dir, config.admin_keypair.as_deref())
                .with_context(|| format!("loading wallets from {}", dir.display()))?,
        ),
        None => Arc::new(NoIdentities),
    };

    let ledger = JsonRpcLedger::new(config.rpc_url.clone(), config.commitment)
        .context("building RPC client")?;
    let bind = config.bind;
    let gateway = Arc::new(Gateway::new(config, ledger, identities));

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(%bind, "listening");

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
