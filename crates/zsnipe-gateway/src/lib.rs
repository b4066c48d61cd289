//! HTTP gateway for the zSnipe staking and governance program.
//!
//! The gateway reads and decodes program accounts and builds unsigned
//! transactions for a client wallet to sign. It never holds production keys:
//! local identities exist only for the dev bulk routes.

pub mod config;
pub mod error;
pub mod http;
pub mod identity;
pub mod rpc;
pub mod service;

pub use config::{Cli, Commitment, GatewayConfig};
pub use error::{GatewayError, ReadError};
pub use http::router;
pub use identity::{IdentityProvider, KeypairDirectory, NoIdentities};
pub use rpc::{AccountInfo, JsonRpcLedger, Ledger};
pub use service::{Gateway, UnsignedTransaction};
