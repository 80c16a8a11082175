use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::{Pubkey, Rent};
use parking_lot::Mutex;
use timelock_airdrop::constants::AIRDROP_SEED;
use timelock_airdrop::state::TimelockAirdrop;
use tracing::{debug, info};

use super::airdrop::{AirdropAccount, SimulatedAirdrop};
use super::clock::SimClock;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult, Revert, Step};
use crate::network::{BlockInfo, DeployParams, TestNetwork, TxReceipt};

/// In-memory test network with its own clock.
///
/// Clones share the same ledger, so contract handles observe the clock and
/// balances of the chain that deployed them.
#[derive(Debug, Clone)]
pub struct SimulatedChain {
    ledger: Arc<Mutex<Ledger>>,
}

#[derive(Debug)]
pub(super) struct Ledger {
    pub(super) clock: SimClock,
    pub(super) balances: HashMap<Pubkey, u64>,
    pub(super) airdrops: HashMap<Pubkey, AirdropAccount>,
    pub(super) mints: HashSet<Pubkey>,
    next_tx_id: u64,
}

/// Lamports an account of `len` bytes must hold to stay rent-exempt
pub(super) fn rent_exempt_minimum(len: usize) -> u64 {
    Rent::default().minimum_balance(len)
}

impl Ledger {
    /// Receipt for a transaction committed in the head block
    pub(super) fn receipt(&mut self, lamports: u64) -> TxReceipt {
        let head = self.clock.head();
        self.next_tx_id += 1;
        TxReceipt {
            tx_id: self.next_tx_id,
            slot: head.slot,
            unix_timestamp: head.unix_timestamp,
            lamports,
        }
    }

    pub(super) fn move_lamports(&mut self, from: &Pubkey, to: &Pubkey, lamports: u64) -> Result<(), Revert> {
        let balance = *self.balances.get(from).ok_or(Revert::AccountNotFound(*from))?;
        if balance < lamports {
            return Err(Revert::InsufficientFunds {
                balance,
                required: lamports,
            });
        }

        self.balances.insert(*from, balance - lamports);
        let credited = self.balances.entry(*to).or_insert(0);
        *credited = credited.saturating_add(lamports);
        Ok(())
    }
}

impl SimulatedChain {
    pub fn new(config: &HarnessConfig) -> Self {
        Self::starting_at(config.genesis_timestamp)
    }

    pub fn starting_at(genesis_timestamp: i64) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Ledger {
                clock: SimClock::starting_at(genesis_timestamp),
                balances: HashMap::new(),
                airdrops: HashMap::new(),
                mints: HashSet::new(),
                next_tx_id: 0,
            })),
        }
    }

    /// Creates a pre-funded test account.
    pub fn create_account(&self, lamports: u64) -> Pubkey {
        let account = Pubkey::new_unique();
        self.ledger.lock().balances.insert(account, lamports);
        debug!(%account, lamports, "created test account");
        account
    }

    /// Registers a token mint that airdrops can name as their collateral.
    pub fn create_mint(&self) -> Pubkey {
        let mint = Pubkey::new_unique();
        self.ledger.lock().mints.insert(mint);
        debug!(%mint, "created collateral mint");
        mint
    }

    /// Snapshot of the chain clock
    pub fn clock(&self) -> SimClock {
        self.ledger.lock().clock.clone()
    }

    pub(super) fn with_ledger<T>(&self, f: impl FnOnce(&mut Ledger) -> T) -> T {
        f(&mut *self.ledger.lock())
    }
}

impl TestNetwork for SimulatedChain {
    type Contract = SimulatedAirdrop;

    async fn deploy(&self, deployer: &Pubkey, params: DeployParams) -> HarnessResult<SimulatedAirdrop> {
        let mut ledger = self.ledger.lock();

        let (address, bump) = Pubkey::find_program_address(
            &[AIRDROP_SEED.as_bytes(), deployer.as_ref()],
            &timelock_airdrop::ID,
        );
        if ledger.airdrops.contains_key(&address) {
            return Err(HarnessError::reverted(Step::Deploy, Revert::AccountInUse(address)));
        }
        if !ledger.mints.contains(&params.collateral_mint) {
            let code = ErrorCode::AccountNotInitialized.into();
            return Err(HarnessError::reverted(Step::Deploy, Revert::Custom { code }));
        }

        TimelockAirdrop::validate_params(&params.merkle_root, params.release_delay)
            .map_err(|error| HarnessError::reverted(Step::Deploy, error))?;

        let state = TimelockAirdrop {
            bump,
            authority: *deployer,
            collateral_mint: params.collateral_mint,
            merkle_root: params.merkle_root,
            release_delay: params.release_delay,
            ..Default::default()
        };
        let rent = rent_exempt_minimum(TimelockAirdrop::LEN);
        ledger
            .move_lamports(deployer, &address, rent)
            .map_err(|revert| HarnessError::reverted(Step::Deploy, revert))?;
        ledger.airdrops.insert(address, AirdropAccount::new(state));
        let receipt = ledger.receipt(rent);

        info!(
            %address,
            release_delay = params.release_delay,
            slot = receipt.slot,
            "deployed timelock airdrop"
        );
        Ok(SimulatedAirdrop::new(self.clone(), address))
    }

    async fn transfer(&self, from: &Pubkey, to: &Pubkey, lamports: u64) -> HarnessResult<TxReceipt> {
        let mut ledger = self.ledger.lock();
        ledger
            .move_lamports(from, to, lamports)
            .map_err(|revert| HarnessError::reverted(Step::Transfer, revert))?;
        let receipt = ledger.receipt(lamports);

        debug!(%from, %to, lamports, tx_id = receipt.tx_id, "transfer committed");
        Ok(receipt)
    }

    async fn balance(&self, account: &Pubkey) -> HarnessResult<u64> {
        Ok(self.ledger.lock().balances.get(account).copied().unwrap_or(0))
    }

    async fn advance_time(&self, seconds: i64) -> HarnessResult<()> {
        let pending = self
            .ledger
            .lock()
            .clock
            .increase_time(seconds)
            .map_err(|error| HarnessError::transport(Step::AdvanceTime, error.to_string()))?;

        debug!(seconds, pending, "advanced simulated time");
        Ok(())
    }

    async fn mine_block(&self) -> HarnessResult<BlockInfo> {
        let head = self
            .ledger
            .lock()
            .clock
            .mine()
            .map_err(|error| HarnessError::transport(Step::MineBlock, error.to_string()))?;

        debug!(slot = head.slot, unix_timestamp = head.unix_timestamp, "mined block");
        Ok(head)
    }

    async fn head(&self) -> HarnessResult<BlockInfo> {
        Ok(self.ledger.lock().clock.head())
    }
}
