use anchor_lang::prelude::*;
use crate::constants::*;
use crate::error::*;
use crate::state::ClaimRecord;
use crate::utils::{claim_leaf, verify};

/**
 * Main airdrop state account
 *
 * Holds the deployment descriptor (merkle root, collateral mint, release delay)
 * and running totals. The native balance of this account backs withdrawals.
 *
 * Derivation: ["airdrop", authority]
 *
 * Lifecycle:
 * 1. Created during initialize; descriptor fields never change afterwards
 * 2. Funded by plain lamport transfers
 * 3. total_locked grows on claims, total_released on withdrawals
 */
#[account]
#[derive(Default, Debug)]
pub struct TimelockAirdrop {
    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Account that deployed the airdrop
    pub authority: Pubkey,

    /// Collateral token reference supplied at deployment
    pub collateral_mint: Pubkey,

    /// Merkle root over (claimant, amount) leaves
    pub merkle_root: [u8; 32],

    /// Seconds a claim stays locked before it can be withdrawn
    pub release_delay: i64,

    /// Sum of all amounts ever locked by claims
    pub total_locked: u64,

    /// Sum of all amounts released by withdrawals
    pub total_released: u64,
}

impl TimelockAirdrop {
    /// Calculate the space required for this account
    /// - Includes 8-byte discriminator + struct size
    pub const LEN: usize = 8 + std::mem::size_of::<TimelockAirdrop>();

    /// Checks constructor arguments before any account is written.
    pub fn validate_params(merkle_root: &[u8; 32], release_delay: i64) -> AirdropResult<()> {
        if *merkle_root == [0; 32] {
            return Err(TimelockAirdropError::InvalidMerkleRoot);
        }
        if !(0..=MAX_RELEASE_DELAY).contains(&release_delay) {
            return Err(TimelockAirdropError::InvalidReleaseDelay);
        }
        Ok(())
    }

    /// Verifies `proof` for (claimant, amount) and locks the amount in `record`.
    ///
    /// Neither `self` nor `record` is modified when an error is returned.
    pub fn lock_claim(
        &mut self,
        record: &mut ClaimRecord,
        claimant: Pubkey,
        amount: u64,
        proof: &[[u8; 32]],
        now: i64,
    ) -> AirdropResult<()> {
        if !verify(proof, self.merkle_root, claim_leaf(&claimant, amount)) {
            return Err(TimelockAirdropError::InvalidProof);
        }

        let total_locked = self
            .total_locked
            .checked_add(amount)
            .ok_or(TimelockAirdropError::ArithmeticOverflow)?;

        record.lock(claimant, amount, now)?;
        self.total_locked = total_locked;
        Ok(())
    }

    /// Releases the record's locked amount once the delay has elapsed.
    ///
    /// Neither `self` nor `record` is modified when an error is returned.
    pub fn release_claim(&mut self, record: &mut ClaimRecord, now: i64) -> AirdropResult<u64> {
        let amount = record.releasable_amount(now, self.release_delay)?;
        let total_released = self
            .total_released
            .checked_add(amount)
            .ok_or(TimelockAirdropError::ArithmeticOverflow)?;

        record.release(now, self.release_delay)?;
        self.total_released = total_released;
        Ok(amount)
    }

    /// Amount locked by claims and not yet withdrawn
    pub fn outstanding(&self) -> u64 {
        self.total_locked.saturating_sub(self.total_released)
    }
}
