use anchor_lang::prelude::*;

/// Event emitted when an airdrop is initialized
#[event]
pub struct AirdropInitialized {
    /// The airdrop account public key
    pub airdrop: Pubkey,
    /// Authority that deployed the airdrop
    pub authority: Pubkey,
    /// Collateral token reference
    pub collateral_mint: Pubkey,
    /// The merkle root hash
    pub merkle_root: [u8; 32],
    /// Seconds between claim and permitted withdrawal
    pub release_delay: i64,
}

/// Event emitted when lamports are deposited into the airdrop
#[event]
pub struct AirdropFunded {
    pub airdrop: Pubkey,
    pub funder: Pubkey,
    pub amount: u64,
}

/// Event emitted when a claim locks tokens for a claimant
#[event]
pub struct ClaimLocked {
    /// The airdrop account public key
    pub airdrop: Pubkey,
    /// Address of the claimant
    pub claimant: Pubkey,
    /// Amount locked by this claim
    pub locked_amount: u64,
    /// Timestamp of the claim
    pub claimed_at: i64,
    /// Earliest timestamp at which the claimant may withdraw
    pub unlock_at: i64,
}

/// Event emitted when a claimant withdraws their locked amount
#[event]
pub struct ClaimWithdrawn {
    /// The airdrop account public key
    pub airdrop: Pubkey,
    /// Address of the claimant
    pub claimant: Pubkey,
    /// Amount transferred to the claimant
    pub amount: u64,
    /// Total released from the airdrop by all claimants
    pub total_released: u64,
}
