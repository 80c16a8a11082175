//! In-process test network.
//!
//! Runs the airdrop's own state transitions against an in-memory ledger and a
//! [`SimClock`] owned by each [`SimulatedChain`], so every test gets its own
//! clock and ledger.

mod airdrop;
mod chain;
mod clock;

pub use airdrop::SimulatedAirdrop;
pub use chain::SimulatedChain;
pub use clock::{ClockError, SimClock};
