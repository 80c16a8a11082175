//! Linear claim/withdraw driver.
//!
//! deploy → fund → claim → read → advance clock + mine → withdraw → read.
//! Every step except withdraw propagates its error; a rejected withdraw is a
//! recorded outcome, not a failed run.

use std::fmt;

use anchor_lang::prelude::Pubkey;
use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult, Revert, Step};
use crate::merkle::ClaimFixture;
use crate::network::{AirdropContract, BlockInfo, ClaimSnapshot, DeployParams, TestNetwork, TxReceipt};

/// What happened when the harness called `withdraw`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WithdrawOutcome {
    Completed(TxReceipt),
    Rejected(Revert),
}

impl WithdrawOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, WithdrawOutcome::Completed(_))
    }
}

impl fmt::Display for WithdrawOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WithdrawOutcome::Completed(receipt) => write!(f, "Withdraw successful: {receipt}"),
            WithdrawOutcome::Rejected(revert) => write!(f, "Withdraw failed: {revert}"),
        }
    }
}

/// Observations from one harness run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessReport {
    pub contract: Pubkey,
    pub before: ClaimSnapshot,
    pub head_after_advance: BlockInfo,
    pub withdraw: WithdrawOutcome,
    pub after: ClaimSnapshot,
    pub claimant_balance_before: u64,
    pub claimant_balance_after: u64,
}

impl HarnessReport {
    /// Lamports the claimant gained across the withdraw step
    pub fn claimant_gain(&self) -> i128 {
        i128::from(self.claimant_balance_after) - i128::from(self.claimant_balance_before)
    }
}

/// The before, withdraw and after lines of a run, one per line.
impl fmt::Display for HarnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Before withdraw: {}", self.before.locked_amount)?;
        writeln!(f, "{}", self.withdraw)?;
        write!(f, "After withdraw: {}", self.after.locked_amount)
    }
}

pub struct TimelockHarness<'a, N: TestNetwork> {
    network: &'a N,
    config: &'a HarnessConfig,
}

impl<'a, N: TestNetwork> TimelockHarness<'a, N> {
    pub fn new(network: &'a N, config: &'a HarnessConfig) -> Self {
        Self { network, config }
    }

    pub async fn deploy(&self, deployer: &Pubkey, params: DeployParams) -> HarnessResult<N::Contract> {
        self.network.deploy(deployer, params).await
    }

    pub async fn fund(
        &self,
        funder: &Pubkey,
        contract: &N::Contract,
        lamports: u64,
    ) -> HarnessResult<TxReceipt> {
        contract
            .fund(funder, lamports)
            .await
            .map_err(|error| error.at_step(Step::Fund))
    }

    /// Advances the clock by `seconds` and mines one block so the new time is observable.
    ///
    /// Both round trips complete before this returns.
    pub async fn advance_clock(&self, seconds: i64) -> HarnessResult<BlockInfo> {
        self.network.advance_time(seconds).await?;
        let head = self.network.mine_block().await?;
        info!(seconds, slot = head.slot, unix_timestamp = head.unix_timestamp, "advanced clock");
        Ok(head)
    }

    /// Calls `withdraw`, turning a revert into [`WithdrawOutcome::Rejected`].
    ///
    /// Transport failures still propagate.
    pub async fn try_withdraw(
        &self,
        contract: &N::Contract,
        caller: &Pubkey,
    ) -> HarnessResult<WithdrawOutcome> {
        match contract.withdraw(caller).await {
            Ok(receipt) => {
                info!(tx_id = receipt.tx_id, lamports = receipt.lamports, "withdraw completed");
                Ok(WithdrawOutcome::Completed(receipt))
            }
            Err(HarnessError::Reverted { source, .. }) => {
                warn!(%source, "withdraw rejected");
                Ok(WithdrawOutcome::Rejected(source))
            }
            Err(other) => Err(other),
        }
    }

    /// Runs the full lifecycle for `fixture.claimant`.
    ///
    /// `funder` deploys and funds the airdrop; the claimant needs an account on
    /// the network to pay for its claim.
    pub async fn run(
        &self,
        funder: &Pubkey,
        collateral_mint: Pubkey,
        fixture: &ClaimFixture,
    ) -> HarnessResult<HarnessReport> {
        if !self.config.advance_covers_delay() {
            warn!(
                time_advance = self.config.time_advance,
                release_delay = self.config.release_delay,
                "clock advance does not cover the release delay"
            );
        }

        // 1. Deploy
        let contract = self
            .deploy(
                funder,
                DeployParams {
                    merkle_root: fixture.merkle_root,
                    collateral_mint,
                    release_delay: self.config.release_delay,
                },
            )
            .await?;

        // 2. Fund
        self.fund(funder, &contract, self.config.fund_lamports).await?;

        // 3. Claim
        contract
            .claim(&fixture.claimant, &fixture.proof, fixture.amount)
            .await?;

        // 4. Read state
        let before = contract.claims(&fixture.claimant).await?;
        debug!(locked_amount = before.locked_amount, "read claim before withdraw");

        // 5. Advance clock and mine
        let head_after_advance = self.advance_clock(self.config.time_advance).await?;

        // 6. Withdraw
        let claimant_balance_before = self.network.balance(&fixture.claimant).await?;
        let withdraw = self.try_withdraw(&contract, &fixture.claimant).await?;
        let claimant_balance_after = self.network.balance(&fixture.claimant).await?;

        // 7. Read state
        let after = contract.claims(&fixture.claimant).await?;
        debug!(locked_amount = after.locked_amount, "read claim after withdraw");

        Ok(HarnessReport {
            contract: contract.address(),
            before,
            head_after_advance,
            withdraw,
            after,
            claimant_balance_before,
            claimant_balance_after,
        })
    }
}
