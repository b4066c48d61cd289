//! Cross-crate tests: build a program instruction, compile it into a legacy
//! message, serialize it unsigned and sign it locally.
//!
//! These exercise the same path the gateway takes for every write route.

use chain_sol::{
    compile_transaction, decode_compact_u16, serialize_unsigned, sign_raw_transaction, Pubkey,
};
use ed25519_dalek::SigningKey;
use zsnipe_program::*;

const MINT: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

fn builder() -> InstructionBuilder {
    InstructionBuilder::new(
        DEFAULT_PROGRAM_ID.parse().unwrap(),
        MINT.parse().unwrap(),
    )
}

fn keypair(seed: u8) -> ([u8; 32], Pubkey) {
    let secret = [seed; 32];
    let public = SigningKey::from_bytes(&secret).verifying_key().to_bytes();
    (secret, Pubkey(public))
}

// ─── Unsigned wire format ──────────────────────────────────────────

#[test]
fn stake_transaction_has_fee_payer_first_and_zeroed_slot() {
    let (_, staker) = keypair(1);
    let built = builder().stake(&staker, 1_000_000_000).unwrap();
    let tx = compile_transaction(&[built.instruction], &staker, &[7u8; 32]).unwrap();

    assert_eq!(tx.account_keys[0], staker);
    assert_eq!(tx.num_required_signatures, 1);

    let wire = serialize_unsigned(&tx).unwrap();
    let (num_sigs, len) = decode_compact_u16(&wire).unwrap();
    assert_eq!(num_sigs, 1);
    assert!(wire[len..len + 64].iter().all(|b| *b == 0));
    // header follows the signature slot
    assert_eq!(wire[len + 64], 1);
}

#[test]
fn program_id_is_listed_once_even_as_absent_optional() {
    let (_, executor) = keypair(2);
    let b = builder();
    let proposal = ProposalAccount {
        proposal_id: 0,
        proposer: Pubkey([0x42; 32]),
        title: "Text".into(),
        description: String::new(),
        proposal_type: ProposalType::Text,
        execution_data: Vec::new(),
        status: ProposalStatus::Passed,
        voting_period_days: 3,
        created_at: 0,
        voting_ends_at: 0,
        finalized_at: 1,
        executed_at: 0,
        timelock_end: 0,
        yes_votes: 1,
        no_votes: 0,
        abstain_votes: 0,
        total_voters: 1,
        deposit_amount: 0,
        deposit_refunded: false,
        bump: 255,
    };
    let built = b.execute_proposal(&executor, &proposal, None).unwrap();
    let tx = compile_transaction(&[built.instruction], &executor, &[1u8; 32]).unwrap();

    let program_id = *b.addresses().program_id();
    let occurrences = tx.account_keys.iter().filter(|k| **k == program_id).count();
    assert_eq!(occurrences, 1);
}

// ─── Local signing ─────────────────────────────────────────────────

#[test]
fn signing_fills_the_only_slot() {
    let (secret, voter) = keypair(3);
    let built = builder().cast_vote(&voter, 1, VoteChoice::Yes).unwrap();
    let tx = compile_transaction(&[built.instruction], &voter, &[9u8; 32]).unwrap();
    let unsigned = serialize_unsigned(&tx).unwrap();

    let signed = sign_raw_transaction(&secret, &unsigned).unwrap();
    assert_eq!(signed.len(), unsigned.len());
    assert!(signed[1..65].iter().any(|b| *b != 0));
    assert_eq!(&signed[65..], &unsigned[65..]);
}

#[test]
fn fund_treasury_compiles_with_token_program() {
    let (_, admin) = keypair(4);
    let built = builder().fund_treasury(&admin, 5_000_000).unwrap();
    let tx = compile_transaction(&[built.instruction], &admin, &[2u8; 32]).unwrap();
    assert!(tx.account_keys.contains(&chain_sol::TOKEN_2022_PROGRAM_ID));
}

// ─── Determinism ───────────────────────────────────────────────────

#[test]
fn random_users_derive_stable_addresses() {
    use rand::RngCore;
    let addresses = *builder().addresses();
    let mut rng = rand::thread_rng();
    for _ in 0..16 {
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        let user = Pubkey(key);
        assert_eq!(addresses.user_stake(&user).unwrap(), addresses.user_stake(&user).unwrap());
        assert_ne!(
            addresses.user_stake(&user).unwrap().address,
            addresses.governance(&user).unwrap().address
        );
    }
}
