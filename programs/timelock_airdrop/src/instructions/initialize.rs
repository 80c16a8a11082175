use crate::constants::*;
use crate::event::*;
use crate::state::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenInterface};

/**
 * Account context for deploying a new timelock airdrop
 *
 * Creates the airdrop PDA and stores the deployment descriptor. The descriptor
 * is immutable once written; there is no instruction that updates it.
 *
 * Access Control: Any signer; the signer becomes the authority and pays rent
 */
#[event_cpi]
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The airdrop account (PDA)
    /// - Derived from: ["airdrop", authority]
    #[account(
        init,
        payer = authority,
        space = TimelockAirdrop::LEN,
        seeds = [AIRDROP_SEED.as_bytes(), authority.key().as_ref()],
        bump
    )]
    pub airdrop: Account<'info, TimelockAirdrop>,

    /// Collateral token reference recorded in the descriptor
    /// - Supports both SPL Token and Token 2022 programs
    #[account(
        token::token_program = token_program,
    )]
    pub collateral_mint: InterfaceAccount<'info, Mint>,

    /// Deployer and rent payer
    #[account(mut)]
    pub authority: Signer<'info>,

    /// System program for account creation
    pub system_program: Program<'info, System>,

    /// Token program owning the collateral mint
    pub token_program: Interface<'info, TokenInterface>,
}

/**
 * Initializes the airdrop descriptor
 *
 * @param ctx - The account context containing all required accounts
 * @param merkle_root - Root over sha256(claimant || amount_le) leaves
 * @param release_delay - Seconds a claim stays locked
 */
pub fn handle_initialize(
    ctx: Context<Initialize>,
    merkle_root: [u8; 32],
    release_delay: i64,
) -> Result<()> {
    TimelockAirdrop::validate_params(&merkle_root, release_delay)?;

    let airdrop = &mut ctx.accounts.airdrop;
    airdrop.bump = ctx.bumps.airdrop;
    airdrop.authority = ctx.accounts.authority.key();
    airdrop.collateral_mint = ctx.accounts.collateral_mint.key();
    airdrop.merkle_root = merkle_root;
    airdrop.release_delay = release_delay;
    // Note: total_locked and total_released start at 0

    let airdrop_key = airdrop.key();
    emit_cpi!(AirdropInitialized {
        airdrop: airdrop_key,
        authority: ctx.accounts.authority.key(),
        collateral_mint: ctx.accounts.collateral_mint.key(),
        merkle_root,
        release_delay,
    });

    Ok(())
}
