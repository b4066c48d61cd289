//! Solana primitives for the zSnipe gateway.
//!
//! This crate handles Base58 addresses, program-derived address search,
//! SPL Token-2022 helpers and the legacy transaction wire format without
//! pulling in `solana-sdk` (which drags in 200+ transitive dependencies).
//!
//! Everything here is pure: no RPC, no clock. The gateway feeds in a recent
//! blockhash and gets back bytes ready for a wallet to sign.

pub mod address;
pub mod error;
pub mod pda;
pub mod spl_token;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, Pubkey};
pub use error::SolError;
pub use pda::{create_program_address, find_program_address, is_on_curve};
pub use spl_token::{
    build_spl_transfer, derive_associated_token_address, TokenAccount,
    ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_2022_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use transaction::{
    compile_transaction, decode_compact_u16, encode_compact_u16, serialize_message,
    serialize_unsigned, sign_raw_transaction, CompiledInstruction, SolAccountMeta,
    SolInstruction, SolTransaction, SYSTEM_PROGRAM_ID,
};
