use anchor_lang::prelude::*;
use crate::error::*;

/**
 * Individual claim record account
 *
 * Tracks the amount locked for a single claimant and when it was claimed.
 *
 * Derivation: ["claim", airdrop_key, claimant_key]
 *
 * Lifecycle:
 * 1. Created on first claim (using init_if_needed)
 * 2. locked_amount zeroed in place on withdraw
 * 3. Never closed, so a withdrawn claimant cannot claim again
 */
#[account]
#[derive(Default, Debug)]
pub struct ClaimRecord {
    /// Claimant that owns this record
    /// - Pubkey::default() until the first successful claim
    pub claimant: Pubkey,

    /// Amount held by the airdrop on the claimant's behalf
    /// - Non-zero only between claim and withdraw
    pub locked_amount: u64,

    /// Unix timestamp of the successful claim
    pub claimed_at: i64,

    /// Bump seed for PDA derivation
    pub bump: u8,
}

/// Where a claimant sits in the claim/withdraw lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimPhase {
    Unclaimed,
    Locked,
    Withdrawable,
    Withdrawn,
}

impl ClaimRecord {
    /// Calculate the space required for this account
    /// - Includes 8-byte discriminator + struct size
    pub const LEN: usize = 8 + std::mem::size_of::<ClaimRecord>();

    pub fn is_claimed(&self) -> bool {
        self.claimant != Pubkey::default()
    }

    /// Timestamp from which the locked amount may be withdrawn
    pub fn unlock_at(&self, release_delay: i64) -> AirdropResult<i64> {
        self.claimed_at
            .checked_add(release_delay)
            .ok_or(TimelockAirdropError::ArithmeticOverflow)
    }

    pub fn phase(&self, now: i64, release_delay: i64) -> ClaimPhase {
        if !self.is_claimed() {
            return ClaimPhase::Unclaimed;
        }
        if self.locked_amount == 0 {
            return ClaimPhase::Withdrawn;
        }
        match self.unlock_at(release_delay) {
            Ok(unlock_at) if now >= unlock_at => ClaimPhase::Withdrawable,
            _ => ClaimPhase::Locked,
        }
    }

    /// Records a first claim. Leaves the record untouched on error.
    pub fn lock(&mut self, claimant: Pubkey, amount: u64, now: i64) -> AirdropResult<()> {
        if self.is_claimed() {
            return Err(TimelockAirdropError::AlreadyClaimed);
        }
        if amount == 0 {
            return Err(TimelockAirdropError::InvalidAmount);
        }

        self.claimant = claimant;
        self.locked_amount = amount;
        self.claimed_at = now;
        Ok(())
    }

    /// Amount that a withdraw at `now` would release, without mutating the record.
    pub fn releasable_amount(&self, now: i64, release_delay: i64) -> AirdropResult<u64> {
        if !self.is_claimed() || self.locked_amount == 0 {
            return Err(TimelockAirdropError::NothingToWithdraw);
        }
        if now < self.unlock_at(release_delay)? {
            return Err(TimelockAirdropError::ReleaseDelayNotElapsed);
        }
        Ok(self.locked_amount)
    }

    /// Zeroes the locked amount and returns what was released.
    pub fn release(&mut self, now: i64, release_delay: i64) -> AirdropResult<u64> {
        let amount = self.releasable_amount(now, release_delay)?;
        self.locked_amount = 0;
        Ok(amount)
    }
}
