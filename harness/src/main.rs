use anchor_lang::prelude::Pubkey;
use timelock_harness::sim::SimulatedChain;
use timelock_harness::svm::SvmNetwork;
use timelock_harness::{
    AirdropTree, Backend, HarnessConfig, HarnessReport, TestNetwork, TimelockHarness,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn run_on<N: TestNetwork>(
    network: &N,
    config: &HarnessConfig,
    claimant: Pubkey,
    collateral_mint: Pubkey,
) -> anyhow::Result<HarnessReport> {
    let tree = AirdropTree::new(&[(claimant, config.claim_amount)])?;
    let fixture = tree.fixture_for(&claimant)?;

    let report = TimelockHarness::new(network, config)
        .run(&claimant, collateral_mint, &fixture)
        .await?;
    Ok(report)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = HarnessConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    let report = match config.backend {
        Backend::Simulated => {
            let chain = SimulatedChain::new(&config);
            let claimant = chain.create_account(config.account_lamports);
            let mint = chain.create_mint();
            run_on(&chain, &config, claimant, mint).await?
        }
        Backend::LiteSvm => {
            let network = SvmNetwork::new(&config)?;
            let claimant = network.create_account(config.account_lamports)?;
            let mint = network.create_mint()?;
            run_on(&network, &config, claimant, mint).await?
        }
    };

    // The result lines are the harness's output, so they bypass the log filter.
    println!("{report}");

    info!(
        contract = %report.contract,
        withdrawn = report.withdraw.is_completed(),
        claimant_gain = report.claimant_gain(),
        "harness run complete"
    );
    Ok(())
}
