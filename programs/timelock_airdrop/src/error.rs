use anchor_lang::prelude::*;

/// Result of the pure state transitions, shared by the program and off-chain simulators.
pub type AirdropResult<T> = std::result::Result<T, TimelockAirdropError>;

#[error_code]
pub enum TimelockAirdropError {
    // Deployment errors
    #[msg("Merkle root must not be empty")]
    InvalidMerkleRoot,
    #[msg("Release delay must be between zero and 365 days")]
    InvalidReleaseDelay,

    // Claim errors
    #[msg("Invalid amount")]
    InvalidAmount,
    #[msg("Invalid proof")]
    InvalidProof,
    #[msg("Address has already claimed")]
    AlreadyClaimed,

    // Withdraw errors
    #[msg("Nothing to withdraw")]
    NothingToWithdraw,
    #[msg("Release delay has not elapsed")]
    ReleaseDelayNotElapsed,
    #[msg("Insufficient airdrop balance for this withdrawal")]
    InsufficientFunds,

    // System level errors
    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
