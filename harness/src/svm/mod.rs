//! Test network backed by LiteSVM.
//!
//! Loads the compiled `timelock_airdrop` program and drives it with real
//! `initialize`, `fund`, `claim` and `withdraw` transactions. Anchor 0.31 and
//! LiteSVM 0.8 build on different generations of the Solana crates, so keys
//! and instructions cross over as bytes.

mod airdrop;
mod network;

pub use airdrop::SvmAirdrop;
pub use network::{SvmNetwork, DEFAULT_PROGRAM_PATH};

use anchor_lang::prelude::Pubkey as AnchorPubkey;
use anchor_lang::solana_program::instruction::Instruction as AnchorInstruction;
use solana_instruction::{AccountMeta, Instruction};
use solana_pubkey::Pubkey;

/// Seed of the PDA that signs `emit_cpi!` self-invocations
const EVENT_AUTHORITY_SEED: &[u8] = b"__event_authority";

fn to_svm_pubkey(key: &AnchorPubkey) -> Pubkey {
    Pubkey::from(key.to_bytes())
}

fn to_anchor_pubkey(key: &Pubkey) -> AnchorPubkey {
    AnchorPubkey::from(key.to_bytes())
}

fn to_svm_instruction(instruction: AnchorInstruction) -> Instruction {
    let accounts = instruction
        .accounts
        .iter()
        .map(|meta| AccountMeta {
            pubkey: to_svm_pubkey(&meta.pubkey),
            is_signer: meta.is_signer,
            is_writable: meta.is_writable,
        })
        .collect();

    Instruction {
        program_id: to_svm_pubkey(&instruction.program_id),
        accounts,
        data: instruction.data,
    }
}

fn event_authority() -> AnchorPubkey {
    AnchorPubkey::find_program_address(&[EVENT_AUTHORITY_SEED], &timelock_airdrop::ID).0
}
