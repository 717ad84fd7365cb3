#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

pub const DEFAULT_CONCURRENCY: usize = 20;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_OUTPUT_PATH: &str = ".";
pub const MAX_CONCURRENCY: usize = 1000;
pub const MAX_TIMEOUT_MS: u64 = 600_000;
