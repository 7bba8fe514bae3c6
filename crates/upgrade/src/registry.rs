//! On-disk deployment registry.
//!
//! Each named deployment is a JSON record under
//! `<deployments>/<network>/<name>.json` carrying the address, the hash of
//! the creation code that produced it, and the ABI. Requesting a deployment
//! whose creation code hash matches the existing record is a no-op.

use std::path::{Path, PathBuf};

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    artifact::ContractArtifact,
    chain::{Chain, TxRequest},
};

/// A persisted deployment record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Address of the deployed contract.
    pub address: Address,
    /// Hash of the transaction that deployed it.
    pub transaction_hash: Option<String>,
    /// SHA-256 over creation bytecode + encoded constructor args.
    pub bytecode_hash: String,
    /// Unix timestamp of the deployment.
    pub deployed_at: i64,
    /// The contract's ABI at deployment time.
    pub abi: serde_json::Value,
}

impl DeploymentRecord {
    /// Save this record as formatted JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize deployment record")?;
        std::fs::write(path, json).with_context(|| {
            format!("Failed to write deployment record to {}", path.display())
        })?;
        Ok(())
    }

    /// Load a record from a file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read deployment record from {}", path.display())
        })?;
        serde_json::from_str(&content).context("Failed to parse deployment record JSON")
    }
}

/// Result of a deployment request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub address: Address,
    /// `false` when the creation code was unchanged and the existing
    /// deployment was reused.
    pub newly_deployed: bool,
}

/// The per-network deployment registry.
pub struct DeploymentRegistry {
    network_dir: PathBuf,
}

impl DeploymentRegistry {
    pub fn new(deployments_dir: &Path, network: &str) -> Self {
        Self {
            network_dir: deployments_dir.join(network),
        }
    }

    fn record_path(&self, name: &str) -> PathBuf {
        self.network_dir.join(format!("{}.json", name))
    }

    /// Compute the creation-code hash for an artifact and encoded args.
    ///
    /// The hash is deterministic: the same bytecode and args always produce
    /// the same hash.
    pub fn creation_code_hash(artifact: &ContractArtifact, encoded_args: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&artifact.bytecode);
        hasher.update(encoded_args);
        hex::encode(hasher.finalize())
    }

    /// Look up a previously deployed named contract.
    pub fn get(&self, name: &str) -> Result<DeploymentRecord> {
        let path = self.record_path(name);
        if !path.exists() {
            anyhow::bail!(
                "No deployment named '{}' found at {}",
                name,
                path.display()
            );
        }
        DeploymentRecord::load_from_file(&path)
    }

    /// Deploy `artifact` under `name`, unless the creation code is unchanged.
    ///
    /// Sends a contract-creation transaction from `from` with the artifact's
    /// bytecode followed by the encoded constructor args, waits for the
    /// receipt and persists the record. If an existing record's hash matches
    /// the requested creation code, nothing is sent and the recorded address
    /// is returned with `newly_deployed = false`.
    pub async fn deploy<C: Chain>(
        &self,
        chain: &C,
        name: &str,
        artifact: &ContractArtifact,
        from: Address,
        encoded_args: &[u8],
    ) -> Result<DeploymentResult> {
        let hash = Self::creation_code_hash(artifact, encoded_args);

        let path = self.record_path(name);
        if path.exists() {
            let existing = DeploymentRecord::load_from_file(&path)?;
            if existing.bytecode_hash == hash {
                tracing::debug!(name, address = %existing.address, "Reusing existing deployment");
                return Ok(DeploymentResult {
                    address: existing.address,
                    newly_deployed: false,
                });
            }
        }

        let mut init_code = Vec::with_capacity(artifact.bytecode.len() + encoded_args.len());
        init_code.extend_from_slice(&artifact.bytecode);
        init_code.extend_from_slice(encoded_args);

        let tx = TxRequest {
            from,
            to: None,
            data: init_code.into(),
        };

        tracing::info!(name, "Deploying...");
        let tx_hash = chain
            .send_transaction(&tx)
            .await
            .with_context(|| format!("Failed to send deployment transaction for '{}'", name))?;
        let receipt = chain
            .wait_for_receipt(&tx_hash)
            .await
            .with_context(|| format!("Deployment of '{}' did not succeed", name))?;

        let address = receipt
            .contract_address
            .with_context(|| format!("Deployment receipt for '{}' has no contract address", name))?;

        std::fs::create_dir_all(&self.network_dir).with_context(|| {
            format!(
                "Failed to create deployments directory {}",
                self.network_dir.display()
            )
        })?;

        let record = DeploymentRecord {
            address,
            transaction_hash: Some(receipt.transaction_hash.clone()),
            bytecode_hash: hash,
            deployed_at: chrono::Utc::now().timestamp(),
            abi: artifact.abi.clone(),
        };
        record.save_to_file(&self.record_path(name))?;

        tracing::info!(name, address = %address, "Deployed");
        Ok(DeploymentResult {
            address,
            newly_deployed: true,
        })
    }
}
