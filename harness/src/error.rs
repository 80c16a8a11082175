use std::fmt;
use std::path::PathBuf;

use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::Pubkey;
use thiserror::Error;
use timelock_airdrop::error::TimelockAirdropError;

/// Harness step, used to label errors and log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Setup,
    Deploy,
    Fund,
    Claim,
    ReadState,
    AdvanceTime,
    MineBlock,
    Withdraw,
    Transfer,
    Balance,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Setup => "setup",
            Step::Deploy => "deploy",
            Step::Fund => "fund",
            Step::Claim => "claim",
            Step::ReadState => "read state",
            Step::AdvanceTime => "advance time",
            Step::MineBlock => "mine block",
            Step::Withdraw => "withdraw",
            Step::Transfer => "transfer",
            Step::Balance => "balance",
        };
        f.write_str(name)
    }
}

/// A call the network accepted and then rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Revert {
    #[error("program error {code} ({name}): {message}")]
    Program {
        code: u32,
        name: String,
        message: String,
    },
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: u64, required: u64 },
    #[error("account {0} already in use")]
    AccountInUse(Pubkey),
    #[error("account {0} not found")]
    AccountNotFound(Pubkey),
    /// Custom error code outside the airdrop's own range, e.g. a failed Anchor
    /// account constraint or a system program error
    #[error("custom program error {code}")]
    Custom { code: u32 },
    /// Runtime rejection that carries no error code
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

const PROGRAM_ERRORS: [TimelockAirdropError; 9] = [
    TimelockAirdropError::InvalidMerkleRoot,
    TimelockAirdropError::InvalidReleaseDelay,
    TimelockAirdropError::InvalidAmount,
    TimelockAirdropError::InvalidProof,
    TimelockAirdropError::AlreadyClaimed,
    TimelockAirdropError::NothingToWithdraw,
    TimelockAirdropError::ReleaseDelayNotElapsed,
    TimelockAirdropError::InsufficientFunds,
    TimelockAirdropError::ArithmeticOverflow,
];

impl Revert {
    /// True if this revert carries the given program error.
    pub fn is_program_error(&self, error: TimelockAirdropError) -> bool {
        matches!(self, Revert::Program { code, .. } if *code == u32::from(error))
    }

    /// True if this revert carries the given Anchor framework error.
    pub fn is_framework_error(&self, error: ErrorCode) -> bool {
        matches!(self, Revert::Custom { code } if *code == u32::from(error))
    }

    /// Decodes a custom instruction error code.
    pub fn from_custom_code(code: u32) -> Self {
        PROGRAM_ERRORS
            .iter()
            .copied()
            .find(|error| u32::from(*error) == code)
            .map(Revert::from)
            .unwrap_or(Revert::Custom { code })
    }
}

impl From<TimelockAirdropError> for Revert {
    fn from(error: TimelockAirdropError) -> Self {
        Revert::Program {
            code: error.into(),
            name: error.name(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("{step} reverted: {source}")]
    Reverted { step: Step, source: Revert },
    #[error("transport failure during {step}: {message}")]
    Transport { step: Step, message: String },
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("fixture error: {0}")]
    Fixture(String),
    #[error("failed to load program {path}: {source}")]
    ProgramLoad {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl HarnessError {
    pub fn reverted(step: Step, source: impl Into<Revert>) -> Self {
        HarnessError::Reverted {
            step,
            source: source.into(),
        }
    }

    pub fn transport(step: Step, message: impl Into<String>) -> Self {
        HarnessError::Transport {
            step,
            message: message.into(),
        }
    }

    /// Relabels the step of a rejected or lost call.
    pub fn at_step(self, step: Step) -> Self {
        match self {
            HarnessError::Reverted { source, .. } => HarnessError::Reverted { step, source },
            HarnessError::Transport { message, .. } => HarnessError::Transport { step, message },
            other => other,
        }
    }

    /// The revert carried by this error, if the call was rejected rather than lost.
    pub fn revert(&self) -> Option<&Revert> {
        match self {
            HarnessError::Reverted { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_codes_decode_to_program_errors() {
        for error in PROGRAM_ERRORS {
            let revert = Revert::from_custom_code(error.into());
            assert!(revert.is_program_error(error), "{revert}");
        }
        assert_eq!(
            Revert::from_custom_code(6006),
            Revert::from(TimelockAirdropError::ReleaseDelayNotElapsed)
        );
    }

    #[test]
    fn foreign_codes_stay_custom() {
        let revert = Revert::from_custom_code(ErrorCode::AccountNotInitialized.into());
        assert!(revert.is_framework_error(ErrorCode::AccountNotInitialized));
        assert!(!revert.is_program_error(TimelockAirdropError::InvalidProof));
        assert_eq!(Revert::from_custom_code(1), Revert::Custom { code: 1 });
    }
}
