use crate::config::toml_config::DEFAULT_CONFIG_PATH;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "caffy-beans")]
#[command(about = "Coffee bean catalog HTTP service")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override the listen address from config
    #[arg(long)]
    pub address: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
