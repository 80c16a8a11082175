use anchor_lang::prelude::*;

declare_id!("2UfLjDWDoqF9J28ar2B8tJNm2R1yDQqERNpyAEN3XM5d");

pub mod constants;
pub mod error;
pub mod event;
pub mod instructions;
pub mod state;
pub mod utils;


use instructions::*;

/**
 * Timelock Airdrop Program
 *
 * A merkle airdrop in which claims do not pay out immediately. A claim locks the
 * claimant's allocation, and the claimant withdraws it once the release delay has
 * elapsed since the claim.
 *
 * Architecture:
 * - Airdrop PDA: Stores the deployment descriptor and holds the native balance
 * - Claim Record PDAs: Track the locked amount and claim time per claimant
 *
 * Workflow:
 * 1. Authority initializes the airdrop with a merkle root, collateral mint and delay
 * 2. Anyone funds the airdrop with lamports
 * 3. Users claim with valid merkle proofs, locking their allocation
 * 4. After the release delay, users withdraw their locked allocation
 *
 * Per-claimant lifecycle: Unclaimed -> Locked -> Withdrawable -> Withdrawn
 */
#[program]
pub mod timelock_airdrop {
    use super::*;

    /**
     * Deploys a new timelock airdrop
     *
     * @param ctx - Account context containing airdrop, collateral mint and authority
     * @param merkle_root - 32-byte root over all eligible (claimant, amount) pairs
     * @param release_delay - Seconds between claim and permitted withdrawal
     *
     * Access Control: Any signer (becomes the authority)
     */
    pub fn initialize(ctx: Context<Initialize>, merkle_root: [u8; 32], release_delay: i64) -> Result<()> {
        handle_initialize(ctx, merkle_root, release_delay)
    }

    /**
     * Deposits native lamports into the airdrop
     *
     * @param ctx - Account context containing airdrop and funder
     * @param amount - Lamports to transfer
     */
    pub fn fund(ctx: Context<Fund>, amount: u64) -> Result<()> {
        handle_fund(ctx, amount)
    }

    /**
     * Claims an allocation with merkle proof verification
     *
     * Locks the amount for the claimant; nothing is transferred yet.
     *
     * @param ctx - Account context containing airdrop, claim record and claimant
     * @param amount - Amount allocated to the claimant
     * @param proof - Array of 32-byte hashes forming the merkle proof
     *
     * Access Control: Any user with valid merkle proof, once per address
     */
    pub fn claim(ctx: Context<Claim>, amount: u64, proof: Vec<[u8; 32]>) -> Result<()> {
        handle_claim(ctx, amount, proof)
    }

    /**
     * Withdraws the claimant's locked amount after the release delay
     *
     * @param ctx - Account context containing airdrop, claim record and claimant
     *
     * Access Control: Claimant only (enforced by PDA seeds)
     */
    pub fn withdraw(ctx: Context<Withdraw>) -> Result<()> {
        handle_withdraw(ctx)
    }
}
