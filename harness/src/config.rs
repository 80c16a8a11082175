use std::path::{Path, PathBuf};

use anchor_lang::solana_program::native_token::LAMPORTS_PER_SOL;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// Environment variable naming an optional TOML config file
pub const CONFIG_ENV: &str = "TIMELOCK_HARNESS_CONFIG";

/// Network the binary runs against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process ledger running the program's state transitions
    #[default]
    Simulated,
    /// LiteSVM executing the compiled program
    LiteSvm,
}

/// Fixture parameters for a harness run.
///
/// Every field has a default, so a config file only needs the values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Lamports sent to the airdrop before claiming
    pub fund_lamports: u64,
    /// Allocation of the claimant in the merkle tree
    pub claim_amount: u64,
    /// Release delay passed to the constructor, in seconds
    pub release_delay: i64,
    /// Seconds the clock is advanced before withdrawing
    pub time_advance: i64,
    /// Unix timestamp of the simulated genesis block
    pub genesis_timestamp: i64,
    /// Starting balance of each simulated test account
    pub account_lamports: u64,
    /// Filter used when RUST_LOG is not set
    pub log_filter: String,
    pub backend: Backend,
    /// Compiled program for the LiteSVM backend, defaults to the workspace's `target/deploy`
    pub program_path: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            fund_lamports: LAMPORTS_PER_SOL,
            claim_amount: 100,
            release_delay: 1,
            time_advance: 1,
            genesis_timestamp: 1_700_000_000,
            account_lamports: 100 * LAMPORTS_PER_SOL,
            log_filter: "info".to_string(),
            backend: Backend::Simulated,
            program_path: None,
        }
    }
}

impl HarnessConfig {
    pub fn load(path: &Path) -> HarnessResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| HarnessError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&raw).map_err(|source| HarnessError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded harness config");
        Ok(config)
    }

    /// Loads the file named by `TIMELOCK_HARNESS_CONFIG`, or the defaults when unset.
    pub fn from_env() -> HarnessResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(&PathBuf::from(path)),
            None => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    pub fn validate(&self) -> HarnessResult<()> {
        if self.claim_amount == 0 {
            return Err(HarnessError::InvalidConfig("claim_amount must be non-zero".into()));
        }
        if self.release_delay < 0 {
            return Err(HarnessError::InvalidConfig("release_delay must not be negative".into()));
        }
        if self.time_advance < 0 {
            return Err(HarnessError::InvalidConfig("time_advance must not be negative".into()));
        }
        if self.fund_lamports > self.account_lamports {
            return Err(HarnessError::InvalidConfig(format!(
                "fund_lamports {} exceeds account_lamports {}",
                self.fund_lamports, self.account_lamports
            )));
        }
        Ok(())
    }

    /// Whether advancing by `time_advance` reaches the unlock time of a fresh claim.
    pub fn advance_covers_delay(&self) -> bool {
        self.time_advance >= self.release_delay
    }
}
