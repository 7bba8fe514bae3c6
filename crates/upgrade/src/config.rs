//! Project configuration and upgradeability classification.
//!
//! Configuration is built once at startup by layering three sources with
//! override semantics: built-in defaults, the `Proxup.toml` project file,
//! and `PROXUP_*` environment variables. The resulting [`ProxupConfig`] is
//! read-only for the rest of the process and passed by reference into the
//! upgrade pipeline.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{AccountsConfig, CompilerConfig};

/// The default name for the proxup configuration file.
pub const PROXCONF_FILENAME: &str = "Proxup.toml";

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "PROXUP_";

/// The two lists of upgradeable contract names.
///
/// A contract is expected to appear in at most one list; nothing enforces
/// disjointness, and the beacon list wins when a name is in both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeableLists {
    /// Contracts upgraded through a shared beacon contract.
    pub beacon: Vec<String>,
    /// Contracts carrying their own upgrade logic (UUPS).
    pub uups: Vec<String>,
}

/// The proxy pattern a contract is registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ProxyKind {
    Beacon,
    Uups,
}

/// Result of classifying a contract name against the configured lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Upgradeable(ProxyKind),
    NotUpgradeable,
}

impl UpgradeableLists {
    /// Classify a contract name.
    ///
    /// Beacon membership is checked first, so a contract listed in both
    /// lists is deterministically treated as a beacon proxy.
    pub fn classify(&self, contract: &str) -> Classification {
        if self.beacon.iter().any(|c| c == contract) {
            Classification::Upgradeable(ProxyKind::Beacon)
        } else if self.uups.iter().any(|c| c == contract) {
            Classification::Upgradeable(ProxyKind::Uups)
        } else {
            Classification::NotUpgradeable
        }
    }
}

/// Project filesystem layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory holding compiled contract artifacts (`<Contract>.json`).
    pub artifacts: PathBuf,
    /// Directory holding per-network deployment records.
    pub deployments: PathBuf,
    /// Network name, used as the subdirectory under `deployments`.
    pub network: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            artifacts: PathBuf::from("out"),
            deployments: PathBuf::from("deployments"),
            network: "localhost".to_string(),
        }
    }
}

/// Chain endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// The JSON-RPC endpoint URL.
    pub rpc_url: Url,
    /// Maximum time to wait for a transaction receipt, in seconds.
    pub receipt_timeout_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: Url::parse("http://127.0.0.1:8545").expect("default RPC URL is valid"),
            receipt_timeout_secs: 120,
        }
    }
}

/// Top-level configuration for the upgrade command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxupConfig {
    /// The beacon/uups contract name lists.
    pub upgradeable: UpgradeableLists,
    /// Project filesystem layout.
    pub project: ProjectConfig,
    /// Compiler invocation.
    pub compiler: CompilerConfig,
    /// Chain endpoint.
    pub chain: ChainConfig,
    /// Named accounts.
    pub accounts: AccountsConfig,
}

impl ProxupConfig {
    /// Load the configuration, merging defaults, the TOML project file and
    /// `PROXUP_*` environment variables (later sources override earlier ones).
    ///
    /// A missing configuration file is not an error; defaults and the
    /// environment still apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let toml_path = path.unwrap_or(Path::new(PROXCONF_FILENAME));

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(toml_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load configuration from {}", toml_path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lists() -> UpgradeableLists {
        UpgradeableLists {
            beacon: vec!["Vault".to_string(), "Token".to_string()],
            uups: vec!["Registry".to_string()],
        }
    }

    #[test]
    fn test_classify_beacon() {
        assert_eq!(
            lists().classify("Vault"),
            Classification::Upgradeable(ProxyKind::Beacon)
        );
    }

    #[test]
    fn test_classify_uups() {
        assert_eq!(
            lists().classify("Registry"),
            Classification::Upgradeable(ProxyKind::Uups)
        );
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(lists().classify("Unknown"), Classification::NotUpgradeable);
        assert_eq!(
            UpgradeableLists::default().classify("Vault"),
            Classification::NotUpgradeable
        );
    }

    #[test]
    fn test_classify_beacon_precedence() {
        // A contract misconfigured in both lists resolves to beacon handling.
        let lists = UpgradeableLists {
            beacon: vec!["Both".to_string()],
            uups: vec!["Both".to_string()],
        };
        assert_eq!(
            lists.classify("Both"),
            Classification::Upgradeable(ProxyKind::Beacon)
        );
    }

    #[test]
    fn test_load_defaults_without_file() {
        figment::Jail::expect_with(|_jail| {
            let config = ProxupConfig::load(None).expect("defaults should load");
            assert_eq!(config, ProxupConfig::default());
            assert!(config.upgradeable.beacon.is_empty());
            assert_eq!(config.project.network, "localhost");
            Ok(())
        });
    }

    #[test]
    fn test_load_merges_file_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                PROXCONF_FILENAME,
                r#"
                [upgradeable]
                beacon = ["Vault"]
                uups = ["Registry"]

                [project]
                network = "sepolia"
                "#,
            )?;

            let config = ProxupConfig::load(None).expect("config should load");
            assert_eq!(config.upgradeable.beacon, vec!["Vault".to_string()]);
            assert_eq!(config.upgradeable.uups, vec!["Registry".to_string()]);
            assert_eq!(config.project.network, "sepolia");
            // Untouched sections keep their defaults.
            assert_eq!(config.compiler, CompilerConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_load_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                PROXCONF_FILENAME,
                r#"
                [project]
                network = "sepolia"
                "#,
            )?;
            jail.set_env("PROXUP_PROJECT__NETWORK", "mainnet");

            let config = ProxupConfig::load(None).expect("config should load");
            assert_eq!(config.project.network, "mainnet");
            Ok(())
        });
    }
}
