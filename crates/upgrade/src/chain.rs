//! Chain client: transaction submission and receipt waiting over JSON-RPC.
//!
//! Signing is delegated to the node (`eth_sendTransaction`), matching dev
//! nodes with unlocked accounts. The [`Chain`] trait is the seam between the
//! upgrade pipeline and the network; tests substitute a recording double.

use std::time::{Duration, Instant};

use alloy_core::primitives::{Address, Bytes};
use anyhow::{Context, Result};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{ChainConfig, abi_has_upgrade_to, encode};

/// Timeout for a single RPC request.
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between receipt polling attempts.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// A transaction hash as returned by the node.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From, derive_more::Deref)]
pub struct TxHash(pub String);

/// An outbound transaction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Address,
    /// `None` for contract-creation transactions.
    pub to: Option<Address>,
    pub data: Bytes,
}

impl TxRequest {
    /// Build the `eth_sendTransaction` parameter object.
    ///
    /// The `to` field is omitted entirely for creation transactions; some
    /// nodes reject an explicit null.
    pub fn to_json(&self) -> Value {
        let mut tx = serde_json::json!({
            "from": self.from.to_string(),
            "data": self.data.to_string(),
        });
        if let Some(to) = self.to {
            tx["to"] = Value::String(to.to_string());
        }
        tx
    }
}

/// A mined transaction receipt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: String,
    /// Present only for contract-creation transactions.
    #[serde(default)]
    pub contract_address: Option<Address>,
    /// Hex-encoded status flag; `0x1` on success.
    pub status: String,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status == "0x1"
    }
}

/// The transaction surface the upgrade pipeline needs from a chain.
pub trait Chain {
    /// Submit a transaction and return its hash.
    fn send_transaction(&self, tx: &TxRequest) -> impl Future<Output = Result<TxHash>>;

    /// Wait until a transaction is mined and return its receipt.
    ///
    /// A reverted transaction is an error.
    fn wait_for_receipt(&self, tx_hash: &TxHash) -> impl Future<Output = Result<TxReceipt>>;
}

/// JSON-RPC implementation of [`Chain`].
pub struct HttpChain {
    client: reqwest::Client,
    url: String,
    receipt_timeout_secs: u64,
}

impl HttpChain {
    pub fn new(config: &ChainConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(RPC_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.rpc_url.to_string(),
            receipt_timeout_secs: config.receipt_timeout_secs,
        })
    }

    /// Issue one JSON-RPC call against the configured endpoint and
    /// deserialize its `result` field.
    ///
    /// An `error` object in the response body surfaces as an error carrying
    /// the node's message.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Vec<Value>) -> Result<T> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": 1
            }))
            .send()
            .await
            .with_context(|| format!("Failed to send {} request", method))?;

        let body: Value = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = body.get("error") {
            anyhow::bail!(
                "RPC error: {}",
                error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .unwrap_or("unknown")
            );
        }

        let result = body
            .get("result")
            .with_context(|| format!("No result in {} response", method))?
            .clone();

        serde_json::from_value(result)
            .with_context(|| format!("Failed to deserialize {} result", method))
    }
}

impl Chain for HttpChain {
    async fn send_transaction(&self, tx: &TxRequest) -> Result<TxHash> {
        let hash: String = self
            .call("eth_sendTransaction", vec![tx.to_json()])
            .await
            .context("Failed to send transaction")?;

        tracing::debug!(tx_hash = %hash, "Transaction sent");
        Ok(TxHash(hash))
    }

    async fn wait_for_receipt(&self, tx_hash: &TxHash) -> Result<TxReceipt> {
        let start = Instant::now();
        let max_duration = Duration::from_secs(self.receipt_timeout_secs);

        loop {
            if start.elapsed() > max_duration {
                anyhow::bail!(
                    "Timeout waiting for receipt of transaction {} after {}s",
                    tx_hash,
                    self.receipt_timeout_secs
                );
            }

            let receipt: Option<TxReceipt> = self
                .call(
                    "eth_getTransactionReceipt",
                    vec![serde_json::json!(tx_hash.0)],
                )
                .await
                .context("Failed to fetch transaction receipt")?;

            if let Some(receipt) = receipt {
                if !receipt.succeeded() {
                    anyhow::bail!("Transaction {} reverted", tx_hash);
                }
                return Ok(receipt);
            }

            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

/// A deployed contract instance: a name, an address and an ABI.
///
/// For UUPS proxies the handle is built from the proxy's address but the
/// target contract's ABI, reinterpreting the proxy under the interface that
/// actually carries the upgrade entry point.
pub struct ContractHandle {
    pub name: String,
    pub address: Address,
    abi: Value,
}

impl ContractHandle {
    pub fn new(name: impl Into<String>, address: Address, abi: Value) -> Self {
        Self {
            name: name.into(),
            address,
            abi,
        }
    }

    /// Verify the instance's ABI exposes `upgradeTo(address)`.
    pub fn ensure_upgradeable(&self) -> Result<()> {
        if !abi_has_upgrade_to(&self.abi) {
            anyhow::bail!(
                "Contract '{}' does not expose upgradeTo(address) in its ABI",
                self.name
            );
        }
        Ok(())
    }

    /// Send `upgradeTo(implementation)` to this instance and wait for the
    /// receipt.
    pub async fn upgrade_to<C: Chain>(
        &self,
        chain: &C,
        from: Address,
        implementation: Address,
    ) -> Result<TxReceipt> {
        let tx = TxRequest {
            from,
            to: Some(self.address),
            data: encode::upgrade_to_call(implementation),
        };

        let tx_hash = chain
            .send_transaction(&tx)
            .await
            .with_context(|| format!("Failed to send upgrade transaction to '{}'", self.name))?;

        chain
            .wait_for_receipt(&tx_hash)
            .await
            .with_context(|| format!("Upgrade transaction to '{}' did not succeed", self.name))
    }
}
