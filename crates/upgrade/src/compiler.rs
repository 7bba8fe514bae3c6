//! Compile step: delegate to the project's contract compiler.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The `[compiler]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// The compiler command to run.
    pub command: String,
    /// Arguments passed to the command.
    pub args: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: "forge".to_string(),
            args: vec!["build".to_string()],
        }
    }
}

/// Compile all contract sources.
///
/// Runs the configured command with inherited stdio so compiler diagnostics
/// reach the user directly. A non-zero exit status is fatal.
pub async fn compile(config: &CompilerConfig) -> Result<()> {
    tracing::info!(command = %config.command, args = ?config.args, "Compiling contracts...");

    let status = tokio::process::Command::new(&config.command)
        .args(&config.args)
        .status()
        .await
        .with_context(|| format!("Failed to run compiler command '{}'", config.command))?;

    if !status.success() {
        anyhow::bail!("Compilation failed: '{}' exited with {}", config.command, status);
    }

    Ok(())
}
