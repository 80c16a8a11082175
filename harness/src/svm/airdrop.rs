use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction as AnchorInstruction;
use anchor_lang::{InstructionData, ToAccountMetas};
use timelock_airdrop::constants::CLAIM_SEED;
use timelock_airdrop::state::{ClaimPhase, ClaimRecord, TimelockAirdrop};
use tracing::debug;

use super::event_authority;
use super::network::SvmNetwork;
use crate::error::{HarnessError, HarnessResult, Revert, Step};
use crate::network::{AirdropContract, ClaimSnapshot, TxReceipt};

fn program_instruction(accounts: impl ToAccountMetas, data: impl InstructionData) -> AnchorInstruction {
    AnchorInstruction {
        program_id: timelock_airdrop::ID,
        accounts: accounts.to_account_metas(None),
        data: data.data(),
    }
}

/// Handle to an airdrop deployed on an [`SvmNetwork`]
#[derive(Debug, Clone)]
pub struct SvmAirdrop {
    network: SvmNetwork,
    address: Pubkey,
}

impl SvmAirdrop {
    pub(super) fn new(network: SvmNetwork, address: Pubkey) -> Self {
        Self { network, address }
    }

    /// Address of the claim record PDA for `claimant`
    pub fn claim_record_address(&self, claimant: &Pubkey) -> Pubkey {
        Pubkey::find_program_address(
            &[CLAIM_SEED.as_bytes(), self.address.as_ref(), claimant.as_ref()],
            &timelock_airdrop::ID,
        )
        .0
    }

    /// Decoded airdrop account
    pub fn state(&self) -> HarnessResult<TimelockAirdrop> {
        self.network
            .with_state(|state| state.read_account::<TimelockAirdrop>(&self.address))?
            .ok_or_else(|| HarnessError::reverted(Step::ReadState, Revert::AccountNotFound(self.address)))
    }

    /// Lifecycle phase of `claimant` at the current head timestamp
    pub fn phase(&self, claimant: &Pubkey) -> HarnessResult<ClaimPhase> {
        let release_delay = self.state()?.release_delay;
        let record = self.claim_record_address(claimant);
        self.network.with_state(|state| {
            let phase = state
                .read_account::<ClaimRecord>(&record)?
                .map(|record| record.phase(state.now(), release_delay))
                .unwrap_or(ClaimPhase::Unclaimed);
            Ok::<_, HarnessError>(phase)
        })
    }
}

impl AirdropContract for SvmAirdrop {
    fn address(&self) -> Pubkey {
        self.address
    }

    async fn fund(&self, funder: &Pubkey, lamports: u64) -> HarnessResult<TxReceipt> {
        let instruction = program_instruction(
            timelock_airdrop::accounts::Fund {
                airdrop: self.address,
                funder: *funder,
                system_program: anchor_lang::system_program::ID,
                event_authority: event_authority(),
                program: timelock_airdrop::ID,
            },
            timelock_airdrop::instruction::Fund { amount: lamports },
        );

        let receipt = self
            .network
            .with_state(|state| match state.send(instruction, funder) {
                Ok(_) => Ok(state.receipt(lamports)),
                Err(revert) => Err(state.insufficient_funds(revert, funder, lamports)),
            })
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
        let instruction = program_instruction(
            timelock_airdrop::accounts::Claim {
                airdrop: self.address,
                claim_record: self.claim_record_address(caller),
                claimant: *caller,
                system_program: anchor_lang::system_program::ID,
                event_authority: event_authority(),
                program: timelock_airdrop::ID,
            },
            timelock_airdrop::instruction::Claim {
                amount,
                proof: proof.to_vec(),
            },
        );

        let receipt = self
            .network
            .with_state(|state| {
                let before = state.balance(caller);
                state.send(instruction, caller)?;
                // The claimant pays rent for a newly created record.
                let rent = before.saturating_sub(state.balance(caller));
                Ok::<_, Revert>(state.receipt(rent))
            })
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
        let instruction = program_instruction(
            timelock_airdrop::accounts::Withdraw {
                airdrop: self.address,
                claim_record: self.claim_record_address(caller),
                claimant: *caller,
                event_authority: event_authority(),
                program: timelock_airdrop::ID,
            },
            timelock_airdrop::instruction::Withdraw,
        );

        let receipt = self
            .network
            .with_state(|state| {
                let before = state.balance(caller);
                state.send(instruction, caller)?;
                let paid = state.balance(caller).saturating_sub(before);
                Ok::<_, Revert>(state.receipt(paid))
            })
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
        let record = self.claim_record_address(claimant);
        let snapshot = self
            .network
            .with_state(|state| state.read_account::<ClaimRecord>(&record))?
            .map(|record| ClaimSnapshot {
                locked_amount: record.locked_amount,
                claimed_at: record.claimed_at,
            })
            .unwrap_or_default();
        Ok(snapshot)
    }
}
