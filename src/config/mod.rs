#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_CONFIG_PATH: &str = "acsf-migrate.toml";

/// Arguments of the stage-to-lower-tier command.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "acsf-migrate")]
#[command(about = "Stage every Site Factory site to a lower tier and remap its domains")]
pub struct CliConfig {
    /// Target tier: dev or test
    pub tier: String,

    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
