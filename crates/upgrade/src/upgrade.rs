//! The upgrade pipeline: classify, compile, deploy, apply.

use alloy_core::primitives::Address;
use anyhow::{Context, Result};

use crate::{
    Classification, ContractArtifact, ContractHandle, DeploymentRegistry, ProxupConfig, ProxyKind,
    chain::Chain,
    compiler, encode,
};

/// One upgrade invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradeRequest {
    /// The contract name. Must match a compiled artifact.
    pub contract: String,
    /// Optional comma-separated constructor argument literals.
    pub args: Option<String>,
}

/// Outcome of an upgrade invocation.
///
/// "Not upgradeable" and "already up to date" are normal no-op outcomes;
/// failures surface as errors so the caller can report a non-zero status
/// instead of silently succeeding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// The contract is in neither upgradeable list.
    NotUpgradeable,
    /// The implementation bytecode is unchanged since the last deployment;
    /// no transaction was sent.
    UpToDate { implementation: Address },
    /// A new implementation was deployed and the proxy/beacon upgraded.
    Upgraded {
        kind: ProxyKind,
        implementation: Address,
        tx_hash: String,
    },
}

/// Run the upgrade pipeline for one contract.
///
/// The steps are strictly sequential: classification, compilation, the
/// idempotent implementation deployment, and (only when a new implementation
/// was produced) the on-chain upgrade call. An upgrade transaction is sent
/// iff the contract is upgradeable and the implementation actually changed.
pub async fn run_upgrade<C: Chain>(
    config: &ProxupConfig,
    chain: &C,
    request: &UpgradeRequest,
) -> Result<UpgradeOutcome> {
    let contract = request.contract.as_str();

    let kind = match config.upgradeable.classify(contract) {
        Classification::NotUpgradeable => {
            tracing::info!(contract, "Contract is not upgradeable");
            return Ok(UpgradeOutcome::NotUpgradeable);
        }
        Classification::Upgradeable(kind) => kind,
    };

    compiler::compile(&config.compiler).await?;

    let deployer = config
        .accounts
        .resolve("deployer")
        .context("Failed to resolve deployer account")?;

    let args = encode::parse_args(request.args.as_deref());
    let encoded_args = encode::encode_constructor_args(&args)
        .context("Failed to encode constructor arguments")?;

    let artifact = ContractArtifact::load(&config.project.artifacts, contract)?;
    let registry = DeploymentRegistry::new(&config.project.deployments, &config.project.network);

    let implementation = registry
        .deploy(
            chain,
            &format!("{}_Implementation", contract),
            &artifact,
            deployer,
            &encoded_args,
        )
        .await?;

    if !implementation.newly_deployed {
        tracing::info!(
            contract,
            "Upgrade not needed: {} has not changed since last deploy",
            contract
        );
        return Ok(UpgradeOutcome::UpToDate {
            implementation: implementation.address,
        });
    }

    let receipt = match kind {
        ProxyKind::Beacon => {
            tracing::info!(contract, "Upgrading {} beacon implementation...", contract);

            let beacon = registry.get(&format!("{}Beacon", contract))?;
            let handle =
                ContractHandle::new(format!("{}Beacon", contract), beacon.address, beacon.abi);
            handle.ensure_upgradeable()?;
            handle
                .upgrade_to(chain, deployer, implementation.address)
                .await?
        }
        ProxyKind::Uups => {
            tracing::info!(contract, "Upgrading {} implementation...", contract);

            let proxy = registry.get(&format!("{}_Proxy", contract))?;
            // Reattach the proxy address under the target contract's
            // interface, which carries the upgrade entry point.
            let handle = ContractHandle::new(contract, proxy.address, artifact.abi.clone());
            handle.ensure_upgradeable()?;
            handle
                .upgrade_to(chain, deployer, implementation.address)
                .await?
        }
    };

    tracing::info!(contract, tx_hash = %receipt.transaction_hash, "Done");
    Ok(UpgradeOutcome::Upgraded {
        kind,
        implementation: implementation.address,
        tx_hash: receipt.transaction_hash,
    })
}
