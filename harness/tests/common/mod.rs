// Shared setup for harness integration tests
#![allow(dead_code)]

use anchor_lang::prelude::{Pubkey, Rent};
use timelock_harness::sim::{SimulatedAirdrop, SimulatedChain};
use timelock_harness::{
    AirdropContract, AirdropTree, ClaimFixture, DeployParams, HarnessConfig, TestNetwork,
};

pub struct Setup {
    pub config: HarnessConfig,
    pub chain: SimulatedChain,
    pub claimant: Pubkey,
    pub fixture: ClaimFixture,
    pub collateral_mint: Pubkey,
}

/// Chain with one funded claimant allocated `config.claim_amount`.
pub fn setup(config: HarnessConfig) -> Setup {
    let chain = SimulatedChain::new(&config);
    let claimant = chain.create_account(config.account_lamports);
    let tree = AirdropTree::new(&[(claimant, config.claim_amount)]).expect("tree");
    let fixture = tree.fixture_for(&claimant).expect("fixture");
    let collateral_mint = chain.create_mint();

    Setup {
        config,
        chain,
        claimant,
        fixture,
        collateral_mint,
    }
}

impl Setup {
    pub fn deploy_params(&self) -> DeployParams {
        DeployParams {
            merkle_root: self.fixture.merkle_root,
            collateral_mint: self.collateral_mint,
            release_delay: self.config.release_delay,
        }
    }

    /// Deploys and funds an airdrop from the claimant's account.
    pub async fn deploy_funded(&self) -> SimulatedAirdrop {
        let contract = self
            .chain
            .deploy(&self.claimant, self.deploy_params())
            .await
            .expect("deploy");
        contract
            .fund(&self.claimant, self.config.fund_lamports)
            .await
            .expect("fund");
        contract
    }
}

/// Rent-exempt minimum the chain charges for an account of `len` bytes
pub fn rent(len: usize) -> u64 {
    Rent::default().minimum_balance(len)
}
