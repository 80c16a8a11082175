use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anchor_lang::prelude::Pubkey;
use anchor_lang::solana_program::instruction::Instruction as AnchorInstruction;
use anchor_lang::solana_program::system_instruction;
use anchor_lang::{AccountDeserialize, InstructionData, ToAccountMetas};
use litesvm::types::TransactionMetadata;
use litesvm::LiteSVM;
use litesvm_token::CreateMint;
use parking_lot::Mutex;
use solana_clock::Clock;
use solana_instruction::error::InstructionError;
use solana_keypair::Keypair;
use solana_message::Message;
use solana_native_token::LAMPORTS_PER_SOL;
use solana_signer::Signer;
use solana_transaction::Transaction;
use solana_transaction_error::TransactionError;
use timelock_airdrop::constants::AIRDROP_SEED;
use tracing::{debug, info};

use super::airdrop::SvmAirdrop;
use super::{event_authority, to_anchor_pubkey, to_svm_instruction, to_svm_pubkey};
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult, Revert, Step};
use crate::network::{BlockInfo, DeployParams, TestNetwork, TxReceipt};
use crate::sim::{ClockError, SimClock};

/// Where `cargo build-sbf` leaves the program inside this workspace
pub const DEFAULT_PROGRAM_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../target/deploy/timelock_airdrop.so");

/// Pays every transaction fee so test accounts only see program effects
const FEE_PAYER_LAMPORTS: u64 = 1_000 * LAMPORTS_PER_SOL;

// System program error codes
const ACCOUNT_ALREADY_IN_USE: u32 = 0;
const RESULT_WITH_NEGATIVE_LAMPORTS: u32 = 1;

/// LiteSVM-backed test network running the compiled airdrop program.
///
/// Accounts made with [`SvmNetwork::create_account`] keep their keypair here,
/// so callers identify them by pubkey alone. Clones share one VM.
#[derive(Clone)]
pub struct SvmNetwork {
    state: Arc<Mutex<SvmState>>,
}

pub(super) struct SvmState {
    svm: LiteSVM,
    fee_payer: Keypair,
    signers: HashMap<Pubkey, Keypair>,
    clock: SimClock,
    next_tx_id: u64,
}

impl fmt::Debug for SvmNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SvmNetwork")
            .field("accounts", &state.signers.len())
            .field("head", &state.clock.head())
            .finish_non_exhaustive()
    }
}

impl SvmState {
    /// Signs `instruction` with the fee payer and `signer`, then executes it.
    pub(super) fn send(
        &mut self,
        instruction: AnchorInstruction,
        signer: &Pubkey,
    ) -> Result<TransactionMetadata, Revert> {
        let keypair = self
            .signers
            .get(signer)
            .ok_or(Revert::AccountNotFound(*signer))?;

        // A fresh blockhash keeps repeated calls from being dropped as duplicates.
        self.svm.expire_blockhash();
        let message = Message::new(&[to_svm_instruction(instruction)], Some(&self.fee_payer.pubkey()));
        let transaction = Transaction::new(&[&self.fee_payer, keypair], message, self.svm.latest_blockhash());

        self.svm.send_transaction(transaction).map_err(|failed| {
            debug!(error = %failed.err, logs = ?failed.meta.logs, "transaction failed");
            revert_from(&failed.err)
        })
    }

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

    pub(super) fn balance(&self, account: &Pubkey) -> u64 {
        self.svm.get_balance(&to_svm_pubkey(account)).unwrap_or(0)
    }

    pub(super) fn now(&self) -> i64 {
        self.clock.now()
    }

    /// Reads and decodes a program account, `None` if it does not exist.
    pub(super) fn read_account<T: AccountDeserialize>(&self, address: &Pubkey) -> HarnessResult<Option<T>> {
        let Some(account) = self.svm.get_account(&to_svm_pubkey(address)) else {
            return Ok(None);
        };
        T::try_deserialize(&mut account.data.as_slice())
            .map(Some)
            .map_err(|error| HarnessError::transport(Step::ReadState, error.to_string()))
    }

    /// Refines a failed system transfer into the balance shortfall it reports.
    pub(super) fn insufficient_funds(&self, revert: Revert, from: &Pubkey, required: u64) -> Revert {
        match revert {
            Revert::Custom {
                code: RESULT_WITH_NEGATIVE_LAMPORTS,
            } => Revert::InsufficientFunds {
                balance: self.balance(from),
                required,
            },
            other => other,
        }
    }

    /// Writes the head block into the VM's clock sysvar.
    fn sync_clock(&mut self) {
        let head = self.clock.head();
        self.svm.warp_to_slot(head.slot);
        let clock = self.svm.get_sysvar::<Clock>();
        self.svm.set_sysvar(&Clock {
            slot: head.slot,
            unix_timestamp: head.unix_timestamp,
            ..clock
        });
    }
}

/// Maps a transaction error onto the harness's revert taxonomy.
fn revert_from(error: &TransactionError) -> Revert {
    match error {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            Revert::from_custom_code(*code)
        }
        other => Revert::Rejected(other.to_string()),
    }
}

impl SvmNetwork {
    /// Loads the program from `config.program_path`, or [`DEFAULT_PROGRAM_PATH`].
    pub fn new(config: &HarnessConfig) -> HarnessResult<Self> {
        let path = config
            .program_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROGRAM_PATH));
        Self::from_file(config, &path)
    }

    pub fn from_file(config: &HarnessConfig, path: &Path) -> HarnessResult<Self> {
        let program = std::fs::read(path).map_err(|source| HarnessError::ProgramLoad {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = program.len(), "read program");
        Self::with_program(config, &program)
    }

    /// Starts a VM at `config.genesis_timestamp` with `program` deployed at the airdrop's id.
    pub fn with_program(config: &HarnessConfig, program: &[u8]) -> HarnessResult<Self> {
        let mut svm = LiteSVM::new();
        svm.add_program(to_svm_pubkey(&timelock_airdrop::ID), program)
            .map_err(|error| HarnessError::transport(Step::Setup, format!("{error:?}")))?;

        let fee_payer = Keypair::new();
        svm.airdrop(&fee_payer.pubkey(), FEE_PAYER_LAMPORTS)
            .map_err(|failed| HarnessError::transport(Step::Setup, failed.err.to_string()))?;

        let mut state = SvmState {
            svm,
            fee_payer,
            signers: HashMap::new(),
            clock: SimClock::starting_at(config.genesis_timestamp),
            next_tx_id: 0,
        };
        state.sync_clock();

        info!(program_id = %timelock_airdrop::ID, "loaded airdrop program into LiteSVM");
        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    /// Creates a funded system account whose keypair this network signs with.
    pub fn create_account(&self, lamports: u64) -> HarnessResult<Pubkey> {
        let keypair = Keypair::new();
        let account = to_anchor_pubkey(&keypair.pubkey());

        let mut state = self.state.lock();
        state
            .svm
            .airdrop(&keypair.pubkey(), lamports)
            .map_err(|failed| HarnessError::transport(Step::Setup, failed.err.to_string()))?;
        state.signers.insert(account, keypair);

        debug!(%account, lamports, "created test account");
        Ok(account)
    }

    /// Creates an SPL token mint to serve as an airdrop's collateral.
    pub fn create_mint(&self) -> HarnessResult<Pubkey> {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let mint = CreateMint::new(&mut state.svm, &state.fee_payer)
            .decimals(6)
            .send()
            .map_err(|failed| HarnessError::transport(Step::Setup, failed.err.to_string()))?;

        let mint = to_anchor_pubkey(&mint);
        debug!(%mint, "created collateral mint");
        Ok(mint)
    }

    /// Lamports an account of `len` bytes must hold to stay rent-exempt
    pub fn rent_exempt_minimum(&self, len: usize) -> u64 {
        self.state.lock().svm.minimum_balance_for_rent_exemption(len)
    }

    pub(super) fn with_state<T>(&self, f: impl FnOnce(&mut SvmState) -> T) -> T {
        f(&mut *self.state.lock())
    }
}

impl TestNetwork for SvmNetwork {
    type Contract = SvmAirdrop;

    async fn deploy(&self, deployer: &Pubkey, params: DeployParams) -> HarnessResult<SvmAirdrop> {
        let (address, _) = Pubkey::find_program_address(
            &[AIRDROP_SEED.as_bytes(), deployer.as_ref()],
            &timelock_airdrop::ID,
        );
        let accounts = timelock_airdrop::accounts::Initialize {
            airdrop: address,
            collateral_mint: params.collateral_mint,
            authority: *deployer,
            system_program: anchor_lang::system_program::ID,
            token_program: anchor_spl::token::ID,
            event_authority: event_authority(),
            program: timelock_airdrop::ID,
        };
        let data = timelock_airdrop::instruction::Initialize {
            merkle_root: params.merkle_root,
            release_delay: params.release_delay,
        };
        let instruction = AnchorInstruction {
            program_id: timelock_airdrop::ID,
            accounts: accounts.to_account_metas(None),
            data: data.data(),
        };

        let receipt = self.with_state(|state| {
            let before = state.balance(deployer);
            state.send(instruction, deployer).map_err(|revert| match revert {
                Revert::Custom {
                    code: ACCOUNT_ALREADY_IN_USE,
                } => Revert::AccountInUse(address),
                other => other,
            })?;
            let rent = before.saturating_sub(state.balance(deployer));
            Ok::<_, Revert>(state.receipt(rent))
        });
        let receipt = receipt.map_err(|revert| HarnessError::reverted(Step::Deploy, revert))?;

        info!(
            %address,
            release_delay = params.release_delay,
            slot = receipt.slot,
            "deployed timelock airdrop"
        );
        Ok(SvmAirdrop::new(self.clone(), address))
    }

    async fn transfer(&self, from: &Pubkey, to: &Pubkey, lamports: u64) -> HarnessResult<TxReceipt> {
        let instruction = system_instruction::transfer(from, to, lamports);
        let receipt = self
            .with_state(|state| match state.send(instruction, from) {
                Ok(_) => Ok(state.receipt(lamports)),
                Err(revert) => Err(state.insufficient_funds(revert, from, lamports)),
            })
            .map_err(|revert| HarnessError::reverted(Step::Transfer, revert))?;

        debug!(%from, %to, lamports, tx_id = receipt.tx_id, "transfer committed");
        Ok(receipt)
    }

    async fn balance(&self, account: &Pubkey) -> HarnessResult<u64> {
        Ok(self.with_state(|state| state.balance(account)))
    }

    async fn advance_time(&self, seconds: i64) -> HarnessResult<()> {
        let pending = self
            .with_state(|state| state.clock.increase_time(seconds))
            .map_err(|error| HarnessError::transport(Step::AdvanceTime, error.to_string()))?;

        debug!(seconds, pending, "advanced VM time");
        Ok(())
    }

    async fn mine_block(&self) -> HarnessResult<BlockInfo> {
        let head = self
            .with_state(|state| {
                let head = state.clock.mine()?;
                state.sync_clock();
                Ok::<_, ClockError>(head)
            })
            .map_err(|error| HarnessError::transport(Step::MineBlock, error.to_string()))?;

        debug!(slot = head.slot, unix_timestamp = head.unix_timestamp, "warped to next slot");
        Ok(head)
    }

    async fn head(&self) -> HarnessResult<BlockInfo> {
        Ok(self.with_state(|state| state.clock.head()))
    }
}
