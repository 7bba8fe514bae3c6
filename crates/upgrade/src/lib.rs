//! proxup-upgrade - Contract upgrade library for proxy-based deployments.
//!
//! This crate provides the pieces behind the `proxup upgrade` command:
//! configuration and classification of upgradeable contracts, artifact
//! loading, an idempotent deployment registry, a JSON-RPC chain client and
//! the upgrade pipeline tying them together.

mod accounts;
mod artifact;
mod chain;
mod compiler;
mod config;
mod encode;
mod registry;
mod upgrade;

pub use accounts::{AccountsConfig, NamedAccount};
pub use artifact::{ContractArtifact, abi_has_upgrade_to};
pub use chain::{Chain, ContractHandle, HttpChain, TxHash, TxReceipt, TxRequest};
pub use compiler::{CompilerConfig, compile};
pub use config::{
    ChainConfig, Classification, PROXCONF_FILENAME, ProjectConfig, ProxupConfig, ProxyKind,
    UpgradeableLists,
};
pub use registry::{DeploymentRecord, DeploymentRegistry, DeploymentResult};
pub use upgrade::{UpgradeOutcome, UpgradeRequest, run_upgrade};
