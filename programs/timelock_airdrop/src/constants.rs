use anchor_lang::prelude::*;

/**
 * Program Constants
 *
 * Seeds for PDA derivation and the bounds applied to the release delay.
 */

#[constant]
/// Upper bound on the release delay accepted by `initialize` (365 days)
/// - Keeps `claimed_at + release_delay` far from i64 overflow
pub const MAX_RELEASE_DELAY: i64 = 365 * 24 * 60 * 60;

/// Seed for airdrop PDA derivation
/// - Used in: ["airdrop", authority]
pub const AIRDROP_SEED: &str = "airdrop";

/// Seed for claim record PDA derivation
/// - Used in: ["claim", airdrop, claimant]
/// - One record per claimant, never closed
pub const CLAIM_SEED: &str = "claim";
