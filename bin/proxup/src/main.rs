//! proxup is a CLI tool that upgrades proxy-based contracts as part of a
//! smart-contract build workflow.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Commands};
use proxup_upgrade::{HttpChain, ProxupConfig, UpgradeOutcome, UpgradeRequest, run_upgrade};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    let config = ProxupConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Upgrade { contract, args } => {
            let chain = HttpChain::new(&config.chain).context("Failed to create chain client")?;
            let request = UpgradeRequest { contract, args };

            // Failures propagate: a failed deployment or upgrade call exits
            // non-zero instead of being logged and discarded.
            let outcome = run_upgrade(&config, &chain, &request).await?;

            match outcome {
                UpgradeOutcome::NotUpgradeable => {
                    tracing::info!("Nothing to do: contract is not registered as upgradeable");
                }
                UpgradeOutcome::UpToDate { implementation } => {
                    tracing::info!(implementation = %implementation, "Nothing to do: implementation is up to date");
                }
                UpgradeOutcome::Upgraded {
                    kind,
                    implementation,
                    tx_hash,
                } => {
                    tracing::info!(
                        kind = %kind,
                        implementation = %implementation,
                        tx_hash = %tx_hash,
                        "✓ Upgrade complete!"
                    );
                }
            }
        }
    }

    Ok(())
}
