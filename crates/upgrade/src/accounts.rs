//! Named-account resolution.
//!
//! Roles like `deployer` are aliases resolved at runtime to a concrete chain
//! address, either a literal address or an index into a configured mnemonic.

use std::collections::BTreeMap;

use alloy_core::primitives::Address;
use alloy_signer_local::{MnemonicBuilder, coins_bip39::English};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One named account: a literal address or a derivation index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NamedAccount {
    Address(String),
    MnemonicIndex(u32),
}

/// The `[accounts]` configuration section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Mnemonic phrase used to derive accounts referenced by index.
    pub mnemonic: Option<String>,
    /// Role name to account mapping.
    #[serde(flatten)]
    pub named: BTreeMap<String, NamedAccount>,
}

impl AccountsConfig {
    /// Resolve a role name to an address.
    pub fn resolve(&self, name: &str) -> Result<Address> {
        let account = self
            .named
            .get(name)
            .with_context(|| format!("No account named '{}' in [accounts]", name))?;

        match account {
            NamedAccount::Address(address) => address
                .parse()
                .with_context(|| format!("Invalid address for account '{}': {}", name, address)),
            NamedAccount::MnemonicIndex(index) => {
                let phrase = self.mnemonic.as_deref().with_context(|| {
                    format!(
                        "Account '{}' is a mnemonic index but [accounts].mnemonic is not set",
                        name
                    )
                })?;

                let signer = MnemonicBuilder::<English>::default()
                    .phrase(phrase)
                    .index(*index)
                    .context("Invalid account derivation index")?
                    .build()
                    .context("Failed to derive account from mnemonic")?;

                // The signer stack carries its own primitives types; go
                // through the canonical string form.
                signer
                    .address()
                    .to_string()
                    .parse()
                    .context("Failed to parse derived account address")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str =
        "test test test test test test test test test test test junk";

    fn accounts(named: &[(&str, NamedAccount)]) -> AccountsConfig {
        AccountsConfig {
            mnemonic: Some(TEST_MNEMONIC.to_string()),
            named: named
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn test_resolve_literal_address() {
        let config = accounts(&[(
            "deployer",
            NamedAccount::Address("0x70997970C51812dc3A010C7d01b50e0d17dc79C8".to_string()),
        )]);

        let address = config.resolve("deployer").unwrap();
        assert_eq!(
            address.to_string(),
            "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
        );
    }

    #[test]
    fn test_resolve_mnemonic_index() {
        let config = accounts(&[("deployer", NamedAccount::MnemonicIndex(0))]);

        // First account of the standard dev mnemonic.
        let address = config.resolve("deployer").unwrap();
        assert_eq!(
            address.to_string(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
    }

    #[test]
    fn test_resolve_unknown_account() {
        let config = accounts(&[]);
        assert!(config.resolve("deployer").is_err());
    }

    #[test]
    fn test_resolve_index_without_mnemonic() {
        let mut config = accounts(&[("deployer", NamedAccount::MnemonicIndex(0))]);
        config.mnemonic = None;
        assert!(config.resolve("deployer").is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let parsed: AccountsConfig = toml::from_str(
            r#"
            mnemonic = "test test test test test test test test test test test junk"
            deployer = 0
            admin = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8"
            "#,
        )
        .unwrap();

        assert_eq!(
            parsed.named.get("deployer"),
            Some(&NamedAccount::MnemonicIndex(0))
        );
        assert!(matches!(
            parsed.named.get("admin"),
            Some(NamedAccount::Address(_))
        ));
    }
}
