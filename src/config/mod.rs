#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use toml_config::{AuthMode, Backend, LogFormat, ServiceConfig, DEFAULT_CONFIG_PATH};
