use anchor_lang::prelude::*;
use crate::constants::*;
use crate::error::*;
use crate::event::*;
use crate::state::*;

/**
 * Account context for withdrawing a claimant's locked amount
 *
 * Business Logic:
 * - Only after claimed_at + release_delay
 * - Transfers lamports straight out of the airdrop PDA, which stays rent-exempt
 * - Zeroes the claim record in place; the record is never closed
 *
 * Access Control: Claimant only (enforced by PDA seeds)
 */
#[event_cpi]
#[derive(Accounts)]
pub struct Withdraw<'info> {
    /// The airdrop paying out the withdrawal
    #[account(mut)]
    pub airdrop: Account<'info, TimelockAirdrop>,

    /// Claim record for this claimant
    /// - Derived from: ["claim", airdrop_key, claimant_key]
    #[account(
        mut,
        seeds = [CLAIM_SEED.as_bytes(), airdrop.key().as_ref(), claimant.key().as_ref()],
        bump = claim_record.bump
    )]
    pub claim_record: Account<'info, ClaimRecord>,

    /// The claimant receiving the lamports
    #[account(mut)]
    pub claimant: Signer<'info>,
}

/**
 * Releases the claimant's locked amount
 *
 * @param ctx - The account context containing all required accounts
 *
 * Validation Rules:
 * - Locked amount must be non-zero
 * - Release delay must have elapsed since the claim
 * - Airdrop balance above the rent-exempt minimum must cover the amount
 */
pub fn handle_withdraw(ctx: Context<Withdraw>) -> Result<()> {
    let current_time = Clock::get()?.unix_timestamp;

    // ===== EFFECTS PHASE =====

    let airdrop = &mut ctx.accounts.airdrop;
    let amount = airdrop.release_claim(&mut ctx.accounts.claim_record, current_time)?;

    // ===== INTERACTIONS PHASE (Lamport Transfer) =====

    let rent_floor = Rent::get()?.minimum_balance(TimelockAirdrop::LEN);
    let available = airdrop.get_lamports().saturating_sub(rent_floor);
    require!(available >= amount, TimelockAirdropError::InsufficientFunds);

    // The airdrop PDA is program-owned, so lamports move without a CPI
    airdrop.sub_lamports(amount)?;
    ctx.accounts.claimant.add_lamports(amount)?;

    let airdrop_key = airdrop.key();
    let total_released = airdrop.total_released;

    emit_cpi!(ClaimWithdrawn {
        airdrop: airdrop_key,
        claimant: ctx.accounts.claimant.key(),
        amount,
        total_released,
    });

    Ok(())
}
