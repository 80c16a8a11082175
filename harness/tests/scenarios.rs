mod common;

use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::Pubkey;
use common::{rent, setup};
use timelock_airdrop::error::TimelockAirdropError;
use timelock_airdrop::state::{ClaimPhase, ClaimRecord, TimelockAirdrop};
use timelock_harness::sim::SimulatedChain;
use timelock_harness::{
    AirdropContract, AirdropTree, ClaimSnapshot, DeployParams, HarnessConfig, HarnessError, Revert,
    Step, TestNetwork, TimelockHarness, WithdrawOutcome,
};

#[tokio::test]
async fn scenario_a_withdraw_after_delay() {
    let s = setup(HarnessConfig::default());
    let harness = TimelockHarness::new(&s.chain, &s.config);

    let report = harness
        .run(&s.claimant, s.collateral_mint, &s.fixture)
        .await
        .expect("run");

    assert_eq!(report.before.locked_amount, 100);
    assert_eq!(report.before.claimed_at, s.config.genesis_timestamp);
    assert_eq!(report.head_after_advance.unix_timestamp, s.config.genesis_timestamp + 1);
    match &report.withdraw {
        WithdrawOutcome::Completed(receipt) => assert_eq!(receipt.lamports, 100),
        other => panic!("expected completed withdraw, got {other:?}"),
    }
    assert_eq!(report.after, ClaimSnapshot { locked_amount: 0, claimed_at: s.config.genesis_timestamp });
    assert_eq!(report.claimant_gain(), 100);
    assert_eq!(
        s.chain.balance(&report.contract).await.unwrap(),
        rent(TimelockAirdrop::LEN) + s.config.fund_lamports - 100
    );
}

#[tokio::test]
async fn scenario_b_withdraw_without_advance_is_rejected() {
    let s = setup(HarnessConfig {
        time_advance: 0,
        ..Default::default()
    });
    let harness = TimelockHarness::new(&s.chain, &s.config);

    let report = harness
        .run(&s.claimant, s.collateral_mint, &s.fixture)
        .await
        .expect("a rejected withdraw does not fail the run");

    match &report.withdraw {
        WithdrawOutcome::Rejected(revert) => {
            assert!(revert.is_program_error(TimelockAirdropError::ReleaseDelayNotElapsed), "{revert}")
        }
        other => panic!("expected rejected withdraw, got {other:?}"),
    }
    assert_eq!(report.before.locked_amount, 100);
    assert_eq!(report.after.locked_amount, 100);
    assert_eq!(report.claimant_gain(), 0);
}

#[tokio::test]
async fn scenario_c_invalid_proof_creates_no_record() {
    let s = setup(HarnessConfig::default());
    let contract = s.deploy_funded().await;

    let err = contract
        .claim(&s.claimant, &s.fixture.proof, s.fixture.amount + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Reverted { step: Step::Claim, .. }));
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::InvalidProof));

    assert_eq!(contract.claims(&s.claimant).await.unwrap(), ClaimSnapshot::default());
    assert_eq!(contract.phase(&s.claimant).unwrap(), ClaimPhase::Unclaimed);
    assert_eq!(contract.state().unwrap().total_locked, 0);
}

#[tokio::test]
async fn claim_fails_through_run_when_proof_is_wrong() {
    let s = setup(HarnessConfig::default());
    let mut fixture = s.fixture.clone();
    fixture.proof.push([9u8; 32]);

    let err = TimelockHarness::new(&s.chain, &s.config)
        .run(&s.claimant, s.collateral_mint, &fixture)
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::Reverted { step: Step::Claim, .. }));
}

#[tokio::test]
async fn double_claim_is_rejected() {
    let s = setup(HarnessConfig::default());
    let contract = s.deploy_funded().await;

    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();
    let err = contract
        .claim(&s.claimant, &s.fixture.proof, s.fixture.amount)
        .await
        .unwrap_err();
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::AlreadyClaimed));
    assert_eq!(contract.state().unwrap().total_locked, 100);
}

#[tokio::test]
async fn claim_after_withdraw_is_still_rejected() {
    let s = setup(HarnessConfig::default());
    let harness = TimelockHarness::new(&s.chain, &s.config);
    let contract = s.deploy_funded().await;

    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();
    harness.advance_clock(1).await.unwrap();
    contract.withdraw(&s.claimant).await.unwrap();
    assert_eq!(contract.phase(&s.claimant).unwrap(), ClaimPhase::Withdrawn);

    let err = contract
        .claim(&s.claimant, &s.fixture.proof, s.fixture.amount)
        .await
        .unwrap_err();
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::AlreadyClaimed));
}

#[tokio::test]
async fn second_withdraw_fails_and_moves_nothing() {
    let s = setup(HarnessConfig::default());
    let harness = TimelockHarness::new(&s.chain, &s.config);
    let contract = s.deploy_funded().await;

    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();
    harness.advance_clock(5).await.unwrap();

    let first = harness.try_withdraw(&contract, &s.claimant).await.unwrap();
    assert!(first.is_completed());
    let balance = s.chain.balance(&s.claimant).await.unwrap();

    let second = harness.try_withdraw(&contract, &s.claimant).await.unwrap();
    match second {
        WithdrawOutcome::Rejected(revert) => {
            assert!(revert.is_program_error(TimelockAirdropError::NothingToWithdraw))
        }
        other => panic!("expected rejected withdraw, got {other:?}"),
    }
    assert_eq!(s.chain.balance(&s.claimant).await.unwrap(), balance);
    assert_eq!(contract.state().unwrap().total_released, 100);
}

#[tokio::test]
async fn time_advance_is_invisible_until_a_block_is_mined() {
    let s = setup(HarnessConfig::default());
    let contract = s.deploy_funded().await;
    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();

    s.chain.advance_time(10).await.unwrap();
    assert_eq!(contract.phase(&s.claimant).unwrap(), ClaimPhase::Locked);
    let err = contract.withdraw(&s.claimant).await.unwrap_err();
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::ReleaseDelayNotElapsed));

    let head = s.chain.mine_block().await.unwrap();
    assert_eq!(head.unix_timestamp, s.config.genesis_timestamp + 10);
    assert_eq!(contract.phase(&s.claimant).unwrap(), ClaimPhase::Withdrawable);
    assert_eq!(contract.withdraw(&s.claimant).await.unwrap().lamports, 100);
}

#[tokio::test]
async fn underfunded_airdrop_rejects_withdraw() {
    let s = setup(HarnessConfig::default());
    let harness = TimelockHarness::new(&s.chain, &s.config);
    let contract = s.chain.deploy(&s.claimant, s.deploy_params()).await.unwrap();
    harness.fund(&s.claimant, &contract, 40).await.unwrap();

    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();
    harness.advance_clock(1).await.unwrap();

    match harness.try_withdraw(&contract, &s.claimant).await.unwrap() {
        WithdrawOutcome::Rejected(revert) => {
            assert!(revert.is_program_error(TimelockAirdropError::InsufficientFunds))
        }
        other => panic!("expected rejected withdraw, got {other:?}"),
    }
    assert_eq!(contract.claims(&s.claimant).await.unwrap().locked_amount, 100);
    assert_eq!(s.chain.balance(&contract.address()).await.unwrap(), rent(TimelockAirdrop::LEN) + 40);
}

#[tokio::test]
async fn fund_fails_when_sender_is_short() {
    let config = HarnessConfig::default();
    let chain = SimulatedChain::new(&config);
    let deployer = chain.create_account(config.account_lamports);
    let poor = chain.create_account(10);
    let tree = AirdropTree::new(&[(poor, 100)]).unwrap();
    let harness = TimelockHarness::new(&chain, &config);

    let contract = harness
        .deploy(
            &deployer,
            DeployParams {
                merkle_root: tree.root(),
                collateral_mint: chain.create_mint(),
                release_delay: 1,
            },
        )
        .await
        .unwrap();

    let err = harness.fund(&poor, &contract, 11).await.unwrap_err();
    match err {
        HarnessError::Reverted { step, source } => {
            assert_eq!(step, Step::Fund);
            assert_eq!(source, Revert::InsufficientFunds { balance: 10, required: 11 });
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(chain.balance(&poor).await.unwrap(), 10);
}

#[tokio::test]
async fn fund_rejects_zero_amount() {
    let s = setup(HarnessConfig::default());
    let contract = s.chain.deploy(&s.claimant, s.deploy_params()).await.unwrap();
    let balance = s.chain.balance(&contract.address()).await.unwrap();

    let err = contract.fund(&s.claimant, 0).await.unwrap_err();
    assert!(matches!(err, HarnessError::Reverted { step: Step::Fund, .. }));
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::InvalidAmount));
    assert_eq!(s.chain.balance(&contract.address()).await.unwrap(), balance);
}

#[tokio::test]
async fn deploy_requires_a_mint_account() {
    let s = setup(HarnessConfig::default());
    let mut params = s.deploy_params();
    params.collateral_mint = Pubkey::new_unique();

    let err = s.chain.deploy(&s.claimant, params).await.unwrap_err();
    assert!(matches!(err, HarnessError::Reverted { step: Step::Deploy, .. }));
    assert!(err.revert().unwrap().is_framework_error(ErrorCode::AccountNotInitialized));

    // Nothing was created, so a deploy with a real mint still goes through.
    s.chain.deploy(&s.claimant, s.deploy_params()).await.unwrap();
}

#[tokio::test]
async fn deploy_and_first_claim_pay_rent() {
    let s = setup(HarnessConfig::default());
    let start = s.chain.balance(&s.claimant).await.unwrap();

    let contract = s.chain.deploy(&s.claimant, s.deploy_params()).await.unwrap();
    assert_eq!(s.chain.balance(&contract.address()).await.unwrap(), rent(TimelockAirdrop::LEN));
    let deployed = s.chain.balance(&s.claimant).await.unwrap();
    assert_eq!(deployed, start - rent(TimelockAirdrop::LEN));

    let receipt = contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();
    assert_eq!(receipt.lamports, rent(ClaimRecord::LEN));
    assert_eq!(s.chain.balance(&s.claimant).await.unwrap(), deployed - rent(ClaimRecord::LEN));

    // A rejected second claim charges nothing.
    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap_err();
    assert_eq!(s.chain.balance(&s.claimant).await.unwrap(), deployed - rent(ClaimRecord::LEN));
}

#[tokio::test]
async fn withdraw_keeps_airdrop_rent_exempt() {
    let s = setup(HarnessConfig::default());
    let harness = TimelockHarness::new(&s.chain, &s.config);
    let contract = s.chain.deploy(&s.claimant, s.deploy_params()).await.unwrap();
    harness.fund(&s.claimant, &contract, s.fixture.amount - 1).await.unwrap();
    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();
    harness.advance_clock(1).await.unwrap();

    // One lamport short once the rent floor is set aside.
    let err = contract.withdraw(&s.claimant).await.unwrap_err();
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::InsufficientFunds));

    harness.fund(&s.claimant, &contract, 1).await.unwrap();
    assert_eq!(contract.withdraw(&s.claimant).await.unwrap().lamports, s.fixture.amount);
    assert_eq!(s.chain.balance(&contract.address()).await.unwrap(), rent(TimelockAirdrop::LEN));
}

#[tokio::test]
async fn deploy_rejects_malformed_params() {
    let s = setup(HarnessConfig::default());

    let mut params = s.deploy_params();
    params.merkle_root = [0; 32];
    let err = s.chain.deploy(&s.claimant, params).await.unwrap_err();
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::InvalidMerkleRoot));

    let mut params = s.deploy_params();
    params.release_delay = -1;
    let err = s.chain.deploy(&s.claimant, params).await.unwrap_err();
    assert!(err.revert().unwrap().is_program_error(TimelockAirdropError::InvalidReleaseDelay));

    s.chain.deploy(&s.claimant, s.deploy_params()).await.unwrap();
    let err = s.chain.deploy(&s.claimant, s.deploy_params()).await.unwrap_err();
    assert!(matches!(err.revert(), Some(Revert::AccountInUse(_))));
}

#[tokio::test]
async fn reads_are_idempotent() {
    let s = setup(HarnessConfig::default());
    let contract = s.deploy_funded().await;
    contract.claim(&s.claimant, &s.fixture.proof, s.fixture.amount).await.unwrap();

    let first = contract.claims(&s.claimant).await.unwrap();
    let head = s.chain.head().await.unwrap();
    for _ in 0..5 {
        assert_eq!(contract.claims(&s.claimant).await.unwrap(), first);
    }
    assert_eq!(s.chain.head().await.unwrap(), head);
}

#[tokio::test]
async fn negative_advance_is_a_transport_error() {
    let s = setup(HarnessConfig::default());
    let harness = TimelockHarness::new(&s.chain, &s.config);

    let err = harness.advance_clock(-1).await.unwrap_err();
    assert!(matches!(err, HarnessError::Transport { step: Step::AdvanceTime, .. }));
    assert_eq!(s.chain.head().await.unwrap().slot, 0);
}

#[tokio::test]
async fn chains_keep_separate_clocks() {
    let a = SimulatedChain::starting_at(1_000);
    let b = SimulatedChain::starting_at(1_000);

    a.advance_time(50).await.unwrap();
    a.mine_block().await.unwrap();

    assert_eq!(a.head().await.unwrap().unix_timestamp, 1_050);
    assert_eq!(b.head().await.unwrap().unix_timestamp, 1_000);
}
