//! Interfaces the harness drives: a deployed airdrop contract and the test
//! network's control plane.
//!
//! Every method is a round trip to the network and is awaited before the
//! harness moves on. Implementations report rejected calls as
//! [`crate::HarnessError::Reverted`] and lost calls as
//! [`crate::HarnessError::Transport`].

use std::fmt;

use anchor_lang::prelude::Pubkey;

use crate::error::HarnessResult;

/// Constructor arguments for a timelock airdrop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams {
    pub merkle_root: [u8; 32],
    pub collateral_mint: Pubkey,
    pub release_delay: i64,
}

/// Result of `claims(address)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimSnapshot {
    pub locked_amount: u64,
    pub claimed_at: i64,
}

/// Head of the chain as seen by contract calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockInfo {
    pub slot: u64,
    pub unix_timestamp: i64,
}

/// Receipt of a committed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_id: u64,
    pub slot: u64,
    pub unix_timestamp: i64,
    /// Lamports moved by the transaction, zero for pure state changes
    pub lamports: u64,
}

impl fmt::Display for TxReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tx #{} at slot {} (t={}), {} lamports",
            self.tx_id, self.slot, self.unix_timestamp, self.lamports
        )
    }
}

/// A deployed timelock airdrop.
#[allow(async_fn_in_trait)]
pub trait AirdropContract {
    fn address(&self) -> Pubkey;

    /// Deposits `lamports` from `funder` through the contract's fund entry point.
    async fn fund(&self, funder: &Pubkey, lamports: u64) -> HarnessResult<TxReceipt>;

    /// Locks `amount` for `caller` if `proof` verifies against the stored root.
    async fn claim(&self, caller: &Pubkey, proof: &[[u8; 32]], amount: u64) -> HarnessResult<TxReceipt>;

    /// Pays out the caller's locked amount once the release delay has elapsed.
    async fn withdraw(&self, caller: &Pubkey) -> HarnessResult<TxReceipt>;

    /// Pure read of the caller's claim record.
    async fn claims(&self, claimant: &Pubkey) -> HarnessResult<ClaimSnapshot>;
}

/// Control plane of a test network with a programmable clock.
#[allow(async_fn_in_trait)]
pub trait TestNetwork {
    type Contract: AirdropContract;

    async fn deploy(&self, deployer: &Pubkey, params: DeployParams) -> HarnessResult<Self::Contract>;

    /// Moves native value between accounts.
    async fn transfer(&self, from: &Pubkey, to: &Pubkey, lamports: u64) -> HarnessResult<TxReceipt>;

    async fn balance(&self, account: &Pubkey) -> HarnessResult<u64>;

    /// Moves the clock forward. Not observed by contracts until the next block.
    async fn advance_time(&self, seconds: i64) -> HarnessResult<()>;

    /// Produces one block, making any pending time advance visible.
    async fn mine_block(&self) -> HarnessResult<BlockInfo>;

    async fn head(&self) -> HarnessResult<BlockInfo>;
}
