use anchor_lang::prelude::*;
use crate::constants::*;
use crate::event::*;
use crate::state::*;

/**
 * Account context for claiming an airdrop allocation
 *
 * The claim verifies a merkle proof for (claimant, amount) and locks the
 * amount in the claimant's record. Nothing is transferred until withdraw.
 *
 * Access Control: Any user with a valid merkle proof, once
 */
#[event_cpi]
#[derive(Accounts)]
pub struct Claim<'info> {
    /// The airdrop holding the merkle root
    /// - Will be modified to update total_locked
    #[account(mut)]
    pub airdrop: Account<'info, TimelockAirdrop>,

    /// Claim record for this claimant
    /// - Derived from: ["claim", airdrop_key, claimant_key]
    /// - init_if_needed so a repeat claim reaches AlreadyClaimed instead of an init failure
    #[account(
        init_if_needed,
        payer = claimant,
        space = ClaimRecord::LEN,
        seeds = [CLAIM_SEED.as_bytes(), airdrop.key().as_ref(), claimant.key().as_ref()],
        bump
    )]
    pub claim_record: Account<'info, ClaimRecord>,

    /// The claimant, pays for the record
    #[account(mut)]
    pub claimant: Signer<'info>,

    /// System program for account creation
    pub system_program: Program<'info, System>,
}

/**
 * Processes a claim with merkle proof verification
 *
 * @param ctx - The account context containing all required accounts
 * @param amount - Amount allocated to the claimant in the merkle tree
 * @param proof - Sibling hashes from the leaf up to the root
 *
 * Validation Process:
 * 1. Verify merkle proof for (claimant, amount)
 * 2. Reject a second claim from the same address
 * 3. Lock the amount with the current timestamp
 */
pub fn handle_claim(ctx: Context<Claim>, amount: u64, proof: Vec<[u8; 32]>) -> Result<()> {
    let current_time = Clock::get()?.unix_timestamp;
    let claimant = ctx.accounts.claimant.key();

    let airdrop = &mut ctx.accounts.airdrop;
    let claim_record = &mut ctx.accounts.claim_record;

    airdrop.lock_claim(claim_record, claimant, amount, &proof, current_time)?;
    claim_record.bump = ctx.bumps.claim_record;

    let unlock_at = claim_record.unlock_at(airdrop.release_delay)?;
    let airdrop_key = airdrop.key();

    emit_cpi!(ClaimLocked {
        airdrop: airdrop_key,
        claimant,
        locked_amount: amount,
        claimed_at: current_time,
        unlock_at,
    });

    Ok(())
}
