//! Integration harness for the timelock airdrop.
//!
//! Drives a deployed airdrop through claim, clock advance and withdraw against
//! any [`TestNetwork`]. Two networks ship with the crate: [`svm::SvmNetwork`]
//! runs the compiled program in LiteSVM, and [`sim::SimulatedChain`] runs the
//! program's state transitions in memory with no build step.

pub mod config;
pub mod error;
pub mod harness;
pub mod merkle;
pub mod network;
pub mod sim;
pub mod svm;

pub use config::{Backend, HarnessConfig};
pub use error::{HarnessError, HarnessResult, Revert, Step};
pub use harness::{HarnessReport, TimelockHarness, WithdrawOutcome};
pub use merkle::{AirdropTree, ClaimFixture};
pub use network::{AirdropContract, BlockInfo, ClaimSnapshot, DeployParams, TestNetwork, TxReceipt};
