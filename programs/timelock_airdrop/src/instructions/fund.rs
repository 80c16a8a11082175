use crate::error::*;
use crate::event::*;
use crate::state::*;
use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

/**
 * Account context for depositing native lamports into the airdrop
 *
 * Access Control: Any signer with enough lamports
 */
#[event_cpi]
#[derive(Accounts)]
pub struct Fund<'info> {
    /// The airdrop receiving the deposit
    #[account(mut)]
    pub airdrop: Account<'info, TimelockAirdrop>,

    /// Account paying the deposit
    #[account(mut)]
    pub funder: Signer<'info>,

    /// System program performing the transfer
    pub system_program: Program<'info, System>,
}

pub fn handle_fund(ctx: Context<Fund>, amount: u64) -> Result<()> {
    require!(amount > 0, TimelockAirdropError::InvalidAmount);

    // The system program rejects the transfer if the funder is short
    transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.funder.to_account_info(),
                to: ctx.accounts.airdrop.to_account_info(),
            },
        ),
        amount,
    )?;

    emit_cpi!(AirdropFunded {
        airdrop: ctx.accounts.airdrop.key(),
        funder: ctx.accounts.funder.key(),
        amount,
    });

    Ok(())
}
