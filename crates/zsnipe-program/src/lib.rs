//! Client-side interface to the zSnipe staking and governance program.
//!
//! Everything the gateway needs to talk to the deployed program without
//! touching the network:
//!
//! - [`pda`]: seed namespaces and canonical account addresses
//! - [`accounts`], [`governance_config`]: Anchor account layouts and decoding
//! - [`execution_data`]: the binary payload a proposal executes
//! - [`instructions`]: builders for every program instruction
//! - [`lifecycle`], [`voting_power`]: read-side previews derived from state
//!
//! Builders derive addresses themselves, so a caller only supplies wallet
//! keys, ids and amounts.

pub mod accounts;
pub mod amount;
pub mod discriminator;
pub mod error;
pub mod execution_data;
pub mod governance_config;
pub mod instructions;
pub mod lifecycle;
pub mod pda;
pub mod voting_power;

pub use accounts::{
    decode_optional, GovernanceAccount, ProgramAccount, ProposalAccount, ProposalStatus,
    ProposalType, StakingPool, Treasury, UserStakingAccount, VoteChoice, VoteRecord,
};
pub use amount::{format_base_units, parse_display_amount, to_display, TOKEN_DECIMALS};
pub use error::ProgramError;
pub use execution_data::{ExecutionData, GovernanceParameter};
pub use governance_config::GovernanceConfig;
pub use instructions::{BuiltInstruction, InstructionBuilder, NewProposal, TransferTarget};
pub use lifecycle::{ExecutionStatus, FinalizationStatus, VoteTally};
pub use pda::{DerivedAddress, ProgramAddresses};
pub use voting_power::VotingPowerPreview;

/// Program id of the deployed zSnipe program.
pub const DEFAULT_PROGRAM_ID: &str = "758R2jFfces6Ue5B9rLmRrh8NesiU9dCtDa4bUSBpCMt";
