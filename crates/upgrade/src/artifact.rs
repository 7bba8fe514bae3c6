//! Compiled contract artifact loading.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// A compiled contract artifact: the ABI and the creation bytecode.
///
/// Artifacts are JSON files named `<Contract>.json` under the project's
/// artifacts directory. The `bytecode` field is accepted either as a plain
/// hex string or in the `{ "object": "0x..." }` form emitted by some
/// compilers.
#[derive(Debug, Clone, Deserialize)]
pub struct ContractArtifact {
    pub abi: Value,
    #[serde(deserialize_with = "deserialize_bytecode")]
    pub bytecode: Vec<u8>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BytecodeField {
    Plain(String),
    Wrapped { object: String },
}

fn deserialize_bytecode<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let field = BytecodeField::deserialize(deserializer)?;
    let raw = match &field {
        BytecodeField::Plain(s) => s,
        BytecodeField::Wrapped { object } => object,
    };
    hex::decode(raw.trim_start_matches("0x")).map_err(serde::de::Error::custom)
}

impl ContractArtifact {
    /// Load the artifact for `contract` from the artifacts directory.
    pub fn load(artifacts_dir: &Path, contract: &str) -> Result<Self> {
        let path = artifacts_dir.join(format!("{}.json", contract));
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!(
                "Failed to read artifact for '{}' at {}. Did the compile step run?",
                contract,
                path.display()
            )
        })?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact JSON at {}", path.display()))
    }
}

/// Check an ABI value for an `upgradeTo(address)` entry.
pub fn abi_has_upgrade_to(abi: &Value) -> bool {
    let Some(entries) = abi.as_array() else {
        return false;
    };

    entries.iter().any(|entry| {
        entry["type"] == "function"
            && entry["name"] == "upgradeTo"
            && entry["inputs"]
                .as_array()
                .is_some_and(|inputs| inputs.len() == 1 && inputs[0]["type"] == "address")
    })
}
