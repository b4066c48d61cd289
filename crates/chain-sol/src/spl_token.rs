//! SPL Token and Token-2022 helpers.
//!
//! Implements the `Transfer` instruction, associated token account (ATA)
//! derivation and the base token-account layout without pulling in the
//! `spl-token` crates. The zSnipe mint lives under Token-2022, whose base
//! account layout and `Transfer` tag are identical to the classic program.

use crate::address::Pubkey;
use crate::error::SolError;
use crate::pda::find_program_address;
use crate::transaction::{SolAccountMeta, SolInstruction};

// ---------------------------------------------------------------------------
// Well-known program IDs
// ---------------------------------------------------------------------------

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: Pubkey = Pubkey([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb,
    0x79, 0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85,
    0x7e, 0xff, 0x00, 0xa9,
]);

/// SPL Token-2022 Program ID: `TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb`
pub const TOKEN_2022_PROGRAM_ID: Pubkey = Pubkey([
    0x06, 0xdd, 0xf6, 0xe1, 0xee, 0x75, 0x8f, 0xde, 0x18, 0x42, 0x5d, 0xbc, 0xe4, 0x6c,
    0xcd, 0xda, 0xb6, 0x1a, 0xfc, 0x4d, 0x83, 0xb9, 0x0d, 0x27, 0xfe, 0xbd, 0xf9, 0x28,
    0xd8, 0xa1, 0x8b, 0xfc,
]);

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey = Pubkey([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e,
    0x0d, 0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8,
    0xdb, 0xe9, 0xf8, 0x59,
]);

/// `Transfer` instruction tag, shared by both token programs.
const TRANSFER_TAG: u8 = 3;

/// Size of the base token-account layout (extensions follow in Token-2022).
pub const TOKEN_ACCOUNT_LEN: usize = 165;

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// Build a token `Transfer` instruction for `token_program`.
///
/// Data is the tag byte followed by the u64 LE amount, 9 bytes in total.
/// Source and destination are writable, the owner signs.
pub fn build_spl_transfer(
    token_program: &Pubkey,
    from_token_account: &Pubkey,
    to_token_account: &Pubkey,
    owner: &Pubkey,
    amount: u64,
) -> Result<SolInstruction, SolError> {
    if amount == 0 {
        return Err(SolError::TransactionBuildError(
            "token transfer amount must be > 0".into(),
        ));
    }

    let mut data = Vec::with_capacity(9);
    data.push(TRANSFER_TAG);
    data.extend_from_slice(&amount.to_le_bytes());

    Ok(SolInstruction {
        program_id: *token_program,
        accounts: vec![
            SolAccountMeta::writable(*from_token_account, false),
            SolAccountMeta::writable(*to_token_account, false),
            SolAccountMeta::readonly(*owner, true),
        ],
        data,
    })
}

// ---------------------------------------------------------------------------
// Associated Token Account derivation
// ---------------------------------------------------------------------------

/// Derive the associated token account for a wallet + mint pair.
///
/// Seeds are `[wallet, token_program, mint]` under the ATA program, so the
/// same wallet and mint give different ATAs under Token and Token-2022.
pub fn derive_associated_token_address(
    wallet: &Pubkey,
    mint: &Pubkey,
    token_program: &Pubkey,
) -> Result<Pubkey, SolError> {
    find_program_address(
        &[wallet.as_ref(), token_program.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .map(|(address, _bump)| address)
}

// ---------------------------------------------------------------------------
// Token account layout
// ---------------------------------------------------------------------------

/// The leading fields of a token account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccount {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

impl TokenAccount {
    /// Read mint `[0..32]`, owner `[32..64]` and amount `[64..72]`.
    pub fn unpack(data: &[u8]) -> Result<Self, SolError> {
        if data.len() < TOKEN_ACCOUNT_LEN {
            return Err(SolError::SerializationError(format!(
                "token account is {} bytes, expected at least {TOKEN_ACCOUNT_LEN}",
                data.len()
            )));
        }

        let mint = Pubkey::from_slice(&data[0..32])?;
        let owner = Pubkey::from_slice(&data[32..64])?;
        let mut amount = [0u8; 8];
        amount.copy_from_slice(&data[64..72]);

        Ok(Self {
            mint,
            owner,
            amount: u64::from_le_bytes(amount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pda::is_on_curve;

    // -- Constant verification ----------------------------------------------

    #[test]
    fn token_program_id_roundtrip() {
        assert_eq!(
            TOKEN_PROGRAM_ID.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
    }

    #[test]
    fn token_2022_program_id_roundtrip() {
        assert_eq!(
            TOKEN_2022_PROGRAM_ID.to_string(),
            "TokenzQdBNbLqP5VEhdkAS6EPFLC1PHnBqCXEpPxuEb"
        );
    }

    #[test]
    fn associated_token_program_id_roundtrip() {
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID.to_string(),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
    }

    // -- Transfer instruction -----------------------------------------------

    #[test]
    fn transfer_data_encoding() {
        let ix = build_spl_transfer(
            &TOKEN_2022_PROGRAM_ID,
            &Pubkey([1u8; 32]),
            &Pubkey([2u8; 32]),
            &Pubkey([3u8; 32]),
            500_000,
        )
        .unwrap();

        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], 3);
        assert_eq!(&ix.data[1..], &500_000u64.to_le_bytes());
        assert_eq!(ix.program_id, TOKEN_2022_PROGRAM_ID);
    }

    #[test]
    fn transfer_account_roles() {
        let ix = build_spl_transfer(
            &TOKEN_PROGRAM_ID,
            &Pubkey([1u8; 32]),
            &Pubkey([2u8; 32]),
            &Pubkey([3u8; 32]),
            100,
        )
        .unwrap();

        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn transfer_zero_amount_fails() {
        let result = build_spl_transfer(
            &TOKEN_2022_PROGRAM_ID,
            &Pubkey([1u8; 32]),
            &Pubkey([2u8; 32]),
            &Pubkey([3u8; 32]),
            0,
        );
        assert!(result.is_err());
    }

    // -- ATA derivation -----------------------------------------------------

    #[test]
    fn ata_known_vectors() {
        let usdc: Pubkey = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v".parse().unwrap();
        let wallet = Pubkey([0x42u8; 32]);

        let classic = derive_associated_token_address(&wallet, &usdc, &TOKEN_PROGRAM_ID).unwrap();
        assert_eq!(classic.to_string(), "4pw5VSwn2Sec4SjMhbUSBcVjS51rG34Ho1WuHQgxqVd2");

        let t22 = derive_associated_token_address(&wallet, &usdc, &TOKEN_2022_PROGRAM_ID).unwrap();
        assert_eq!(t22.to_string(), "22azTH3E48Dxqj4a4xwq4caszCFr8ihrwhGGadt1KSRH");
    }

    #[test]
    fn ata_is_not_on_curve() {
        let ata = derive_associated_token_address(
            &Pubkey([0xAA; 32]),
            &Pubkey([0xBB; 32]),
            &TOKEN_2022_PROGRAM_ID,
        )
        .unwrap();
        assert!(!is_on_curve(ata.as_array()));
    }

    #[test]
    fn ata_different_wallets_give_different_atas() {
        let mint = Pubkey([0xFF; 32]);
        let a = derive_associated_token_address(&Pubkey([1; 32]), &mint, &TOKEN_2022_PROGRAM_ID).unwrap();
        let b = derive_associated_token_address(&Pubkey([2; 32]), &mint, &TOKEN_2022_PROGRAM_ID).unwrap();
        assert_ne!(a, b);
    }

    // -- Token account layout -----------------------------------------------

    #[test]
    fn unpack_reads_base_fields() {
        let mut data = vec![0u8; TOKEN_ACCOUNT_LEN + 20];
        data[0..32].copy_from_slice(&[7u8; 32]);
        data[32..64].copy_from_slice(&[8u8; 32]);
        data[64..72].copy_from_slice(&1_234_567u64.to_le_bytes());

        let account = TokenAccount::unpack(&data).unwrap();
        assert_eq!(account.mint, Pubkey([7u8; 32]));
        assert_eq!(account.owner, Pubkey([8u8; 32]));
        assert_eq!(account.amount, 1_234_567);
    }

    #[test]
    fn unpack_short_buffer_fails() {
        assert!(TokenAccount::unpack(&[0u8; 72]).is_err());
    }
}
