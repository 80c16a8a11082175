use std::collections::HashMap;

use anchor_lang::prelude::Pubkey;
use timelock_airdrop::constants::CLAIM_SEED;
use timelock_airdrop::error::TimelockAirdropError;
use timelock_airdrop::state::{ClaimPhase, ClaimRecord, TimelockAirdrop};
use tracing::debug;

use super::chain::{rent_exempt_minimum, Ledger, SimulatedChain};
use crate::error::{HarnessError, HarnessResult, Revert, Step};
use crate::network::{AirdropContract, ClaimSnapshot, TxReceipt};

/// Program-owned state of one deployed airdrop
#[derive(Debug)]
pub(super) struct AirdropAccount {
    pub(super) state: TimelockAirdrop,
    pub(super) claims: HashMap<Pubkey, ClaimRecord>,
}

impl AirdropAccount {
    pub(super) fn new(state: TimelockAirdrop) -> Self {
        Self {
            state,
            claims: HashMap::new(),
        }
    }
}

impl Ledger {
    fn airdrop_mut(&mut self, airdrop: &Pubkey) -> Result<&mut AirdropAccount, Revert> {
        self.airdrops
            .get_mut(airdrop)
            .ok_or(Revert::AccountNotFound(*airdrop))
    }

    fn airdrop(&self, airdrop: &Pubkey) -> Result<&AirdropAccount, Revert> {
        self.airdrops
            .get(airdrop)
            .ok_or(Revert::AccountNotFound(*airdrop))
    }

    // Each execute_* works on copies and commits only on success, so a
    // rejected call leaves the ledger as it was.

    fn execute_fund(
        &mut self,
        airdrop: &Pubkey,
        funder: &Pubkey,
        lamports: u64,
    ) -> Result<TxReceipt, Revert> {
        self.airdrop(airdrop)?;
        if lamports == 0 {
            return Err(TimelockAirdropError::InvalidAmount.into());
        }
        self.move_lamports(funder, airdrop, lamports)?;
        Ok(self.receipt(lamports))
    }

    fn execute_claim(
        &mut self,
        airdrop: &Pubkey,
        caller: &Pubkey,
        proof: &[[u8; 32]],
        amount: u64,
    ) -> Result<TxReceipt, Revert> {
        let now = self.clock.now();
        let balance = *self.balances.get(caller).ok_or(Revert::AccountNotFound(*caller))?;

        let account = self.airdrop_mut(airdrop)?;
        let mut state = account.state.clone();
        let existing = account.claims.get(caller).cloned();
        // The first claim creates the record account, paid for by the claimant.
        let rent = match existing {
            Some(_) => 0,
            None => rent_exempt_minimum(ClaimRecord::LEN),
        };
        if balance < rent {
            return Err(Revert::InsufficientFunds {
                balance,
                required: rent,
            });
        }
        let mut record = existing.unwrap_or_default();

        state.lock_claim(&mut record, *caller, amount, proof, now)?;
        let (record_address, bump) = Pubkey::find_program_address(
            &[CLAIM_SEED.as_bytes(), airdrop.as_ref(), caller.as_ref()],
            &timelock_airdrop::ID,
        );
        record.bump = bump;

        account.state = state;
        account.claims.insert(*caller, record);
        self.move_lamports(caller, &record_address, rent)?;
        Ok(self.receipt(rent))
    }

    fn execute_withdraw(&mut self, airdrop: &Pubkey, caller: &Pubkey) -> Result<TxReceipt, Revert> {
        let now = self.clock.now();
        let available = self
            .balances
            .get(airdrop)
            .copied()
            .unwrap_or(0)
            .saturating_sub(rent_exempt_minimum(TimelockAirdrop::LEN));

        let account = self.airdrop_mut(airdrop)?;
        let mut state = account.state.clone();
        let mut record = account.claims.get(caller).cloned().unwrap_or_default();

        let amount = state.release_claim(&mut record, now)?;
        if available < amount {
            return Err(TimelockAirdropError::InsufficientFunds.into());
        }

        account.state = state;
        account.claims.insert(*caller, record);
        self.move_lamports(airdrop, caller, amount)?;
        Ok(self.receipt(amount))
    }

    fn claim_snapshot(&self, airdrop: &Pubkey, claimant: &Pubkey) -> Result<ClaimSnapshot, Revert> {
        let snapshot = self
            .airdrop(airdrop)?
            .claims
            .get(claimant)
            .map(|record| ClaimSnapshot {
                locked_amount: record.locked_amount,
                claimed_at: record.claimed_at,
            })
            .unwrap_or_default();
        Ok(snapshot)
    }
}

/// Handle to an airdrop deployed on a [`SimulatedChain`]
#[derive(Debug, Clone)]
pub struct SimulatedAirdrop {
    chain: SimulatedChain,
    address: Pubkey,
}

impl SimulatedAirdrop {
    pub(super) fn new(chain: SimulatedChain, address: Pubkey) -> Self {
        Self { chain, address }
    }

    /// Copy of the on-chain airdrop account
    pub fn state(&self) -> HarnessResult<TimelockAirdrop> {
        self.chain
            .with_ledger(|ledger| ledger.airdrop(&self.address).map(|account| account.state.clone()))
            .map_err(|revert| HarnessError::reverted(Step::ReadState, revert))
    }

    /// Lifecycle phase of `claimant` at the current head timestamp
    pub fn phase(&self, claimant: &Pubkey) -> HarnessResult<ClaimPhase> {
        self.chain
            .with_ledger(|ledger| {
                let now = ledger.clock.now();
                let account = ledger.airdrop(&self.address)?;
                let phase = account
                    .claims
                    .get(claimant)
                    .map(|record| record.phase(now, account.state.release_delay))
                    .unwrap_or(ClaimPhase::Unclaimed);
                Ok::<_, Revert>(phase)
            })
            .map_err(|revert| HarnessError::reverted(Step::ReadState, revert))
    }
}

impl AirdropContract for SimulatedAirdrop {
    fn address(&self) -> Pubkey {
        self.address
    }

    async fn fund(&self, funder: &Pubkey, lamports: u64) -> HarnessResult<TxReceipt> {
        let receipt = self
            .chain
            .with_ledger(|ledger| ledger.execute_fund(&self.address, funder, lamports))
            .map_err(|revert| HarnessError::reverted(Step::Fund, revert))?;

        debug!(
            airdrop = %self.address,
            %funder,
            lamports,
            tx_id = receipt.tx_id,
            "fund committed"
        );
        Ok(receipt)
    }

    async fn claim(&self, caller: &Pubkey, proof: &[[u8; 32]], amount: u64) -> HarnessResult<TxReceipt> {
        let receipt = self
            .chain
            .with_ledger(|ledger| ledger.execute_claim(&self.address, caller, proof, amount))
            .map_err(|revert| HarnessError::reverted(Step::Claim, revert))?;

        debug!(
            airdrop = %self.address,
            claimant = %caller,
            amount,
            tx_id = receipt.tx_id,
            "claim committed"
        );
        Ok(receipt)
    }

    async fn withdraw(&self, caller: &Pubkey) -> HarnessResult<TxReceipt> {
        let receipt = self
            .chain
            .with_ledger(|ledger| ledger.execute_withdraw(&self.address, caller))
            .map_err(|revert| HarnessError::reverted(Step::Withdraw, revert))?;

        debug!(
            airdrop = %self.address,
            claimant = %caller,
            lamports = receipt.lamports,
            "withdraw committed"
        );
        Ok(receipt)
    }

    async fn claims(&self, claimant: &Pubkey) -> HarnessResult<ClaimSnapshot> {
        self.chain
            .with_ledger(|ledger| ledger.claim_snapshot(&self.address, claimant))
            .map_err(|revert| HarnessError::reverted(Step::ReadState, revert))
    }
}
