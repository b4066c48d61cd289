//! Gateway configuration.
//!
//! Values come from, in order of precedence: command-line flags, environment
//! variables, an optional TOML file, then built-in defaults. Everything is
//! resolved once at startup into an immutable [`GatewayConfig`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chain_sol::Pubkey;
use clap::{Parser, ValueEnum};
use serde::Deserialize;

pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
/// In-flight `getAccountInfo` calls when listing proposals id by id.
pub const DEFAULT_FETCH_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

/// HTTP gateway for the zSnipe staking and governance program.
#[derive(Debug, Default, Parser)]
#[command(name = "zsnipe-gateway", version, about)]
pub struct Cli {
    /// TOML file with default settings
    #[arg(long, env = "ZSNIPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Solana JSON-RPC endpoint
    #[arg(long, env = "ZSNIPE_RPC_URL")]
    pub rpc_url: Option<String>,

    /// Cluster label reported by the health route
    #[arg(long, env = "ZSNIPE_CLUSTER")]
    pub cluster: Option<String>,

    /// Deployed program id
    #[arg(long, env = "ZSNIPE_PROGRAM_ID")]
    pub program_id: Option<String>,

    /// Staking token mint (Token-2022)
    #[arg(long, env = "ZSNIPE_MINT_ADDRESS")]
    pub mint: Option<String>,

    /// Listen address
    #[arg(long, env = "ZSNIPE_BIND")]
    pub bind: Option<SocketAddr>,

    /// Commitment used for reads and preflight
    #[arg(long, env = "ZSNIPE_COMMITMENT", value_enum)]
    pub commitment: Option<Commitment>,

    /// Directory of ZSNIPE_wallet_<n>.json keypairs; enables /dev routes
    #[arg(long, env = "ZSNIPE_WALLETS_DIR")]
    pub wallets_dir: Option<PathBuf>,

    /// Admin keypair used by bulk execution
    #[arg(long, env = "ZSNIPE_ADMIN_KEYPAIR")]
    pub admin_keypair: Option<PathBuf>,

    /// Concurrent account fetches when a batch scan is unavailable
    #[arg(long, env = "ZSNIPE_FETCH_CONCURRENCY")]
    pub fetch_concurrency: Option<usize>,
}

/// The optional TOML file. Keys mirror the long flag names.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub rpc_url: Option<String>,
    pub cluster: Option<String>,
    pub program_id: Option<String>,
    pub mint: Option<String>,
    pub bind: Option<SocketAddr>,
    pub commitment: Option<Commitment>,
    pub wallets_dir: Option<PathBuf>,
    pub admin_keypair: Option<PathBuf>,
    pub fetch_concurrency: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub rpc_url: String,
    pub cluster: String,
    pub program_id: Pubkey,
    pub mint: Pubkey,
    pub bind: SocketAddr,
    pub commitment: Commitment,
    pub wallets_dir: Option<PathBuf>,
    pub admin_keypair: Option<PathBuf>,
    pub fetch_concurrency: usize,
}

impl GatewayConfig {
    /// Merge flags and env over the file over defaults.
    pub fn resolve(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(cli, file)
    }

    pub fn merge(cli: Cli, file: FileConfig) -> anyhow::Result<Self> {
        let rpc_url = cli
            .rpc_url
            .or(file.rpc_url)
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            bail!("rpc url must be http(s)");
        }

        let program_id = cli
            .program_id
            .or(file.program_id)
            .unwrap_or_else(|| zsnipe_program::DEFAULT_PROGRAM_ID.to_string());
        let program_id: Pubkey = program_id
            .parse()
            .with_context(|| format!("invalid program id {program_id}"))?;

        let Some(mint) = cli.mint.or(file.mint) else {
            bail!("mint address is required (--mint or ZSNIPE_MINT_ADDRESS)");
        };
        let mint: Pubkey = mint
            .parse()
            .with_context(|| format!("invalid mint address {mint}"))?;

        let bind = match cli.bind.or(file.bind) {
            Some(bind) => bind,
            None => DEFAULT_BIND.parse().context("default bind address")?,
        };

        let fetch_concurrency = cli
            .fetch_concurrency
            .or(file.fetch_concurrency)
            .unwrap_or(DEFAULT_FETCH_CONCURRENCY);
        if fetch_concurrency == 0 {
            bail!("fetch concurrency must be at least 1");
        }

        Ok(Self {
            cluster: cli
                .cluster
                .or(file.cluster)
                .unwrap_or_else(|| cluster_label(&rpc_url).to_string()),
            rpc_url,
            program_id,
            mint,
            bind,
            commitment: cli.commitment.or(file.commitment).unwrap_or_default(),
            wallets_dir: cli.wallets_dir.or(file.wallets_dir),
            admin_keypair: cli.admin_keypair.or(file.admin_keypair),
            fetch_concurrency,
        })
    }
}

fn cluster_label(rpc_url: &str) -> &'static str {
    if rpc_url.contains("devnet") {
        "devnet"
    } else if rpc_url.contains("testnet") {
        "testnet"
    } else if rpc_url.contains("localhost") || rpc_url.contains("127.0.0.1") {
        "localnet"
    } else if rpc_url.contains("mainnet") {
        "mainnet-beta"
    } else {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    #[test]
    fn defaults_fill_gaps() {
        let cli = Cli {
            mint: Some(MINT.into()),
            ..Cli::default()
        };
        let config = GatewayConfig::merge(cli, FileConfig::default()).unwrap();
        assert_eq!(config.rpc_url, DEFAULT_RPC_URL);
        assert_eq!(config.cluster, "devnet");
        assert_eq!(config.program_id.to_string(), zsnipe_program::DEFAULT_PROGRAM_ID);
        assert_eq!(config.bind.port(), 3000);
        assert_eq!(config.commitment, Commitment::Confirmed);
        assert!(config.wallets_dir.is_none());
        assert_eq!(config.fetch_concurrency, DEFAULT_FETCH_CONCURRENCY);
    }

    #[test]
    fn flags_override_file() {
        let file: FileConfig = toml::from_str(
            r#"
            rpc-url = "http://127.0.0.1:8899"
            mint = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
            commitment = "finalized"
            bind = "127.0.0.1:4000"
            "#,
        )
        .unwrap();
        let cli = Cli {
            bind: Some("127.0.0.1:5000".parse().unwrap()),
            ..Cli::default()
        };
        let config = GatewayConfig::merge(cli, file).unwrap();
        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.cluster, "localnet");
        assert_eq!(config.commitment, Commitment::Finalized);
        assert_eq!(config.bind.port(), 5000);
    }

    #[test]
    fn missing_mint_is_an_error() {
        let err = GatewayConfig::merge(Cli::default(), FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("mint"));
    }

    #[test]
    fn bad_program_id_is_an_error() {
        let cli = Cli {
            mint: Some(MINT.into()),
            program_id: Some("not-base58!".into()),
            ..Cli::default()
        };
        assert!(GatewayConfig::merge(cli, FileConfig::default()).is_err());
    }

    #[test]
    fn zero_fetch_concurrency_is_an_error() {
        let cli = Cli {
            mint: Some(MINT.into()),
            fetch_concurrency: Some(0),
            ..Cli::default()
        };
        let err = GatewayConfig::merge(cli, FileConfig::default()).unwrap_err();
        assert!(err.to_string().contains("concurrency"));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("rpc_endpoint = \"x\"").is_err());
    }
}
