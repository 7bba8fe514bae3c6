use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "proxup")]
#[command(
    author,
    version,
    about = "Upgrade proxy-based contracts from your build workflow"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "PROXUP_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Path to the Proxup.toml configuration file.
    ///
    /// If not provided, Proxup.toml in the current directory is used when it
    /// exists; defaults and PROXUP_* environment variables apply either way.
    #[arg(long, alias = "conf", env = "PROXUP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upgrades an upgradeable contract
    Upgrade {
        /// The contract name
        contract: String,

        /// The inputs for the constructor if needed (comma-separated)
        #[arg(long)]
        args: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_command_parses() {
        let cli = Cli::try_parse_from(["proxup", "upgrade", "Vault", "--args", "1,2,3"]).unwrap();
        let Commands::Upgrade { contract, args } = cli.command;
        assert_eq!(contract, "Vault");
        assert_eq!(args.as_deref(), Some("1,2,3"));
    }

    #[test]
    fn test_contract_name_is_required() {
        assert!(Cli::try_parse_from(["proxup", "upgrade"]).is_err());
    }
}
