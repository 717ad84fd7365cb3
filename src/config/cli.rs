use crate::config::{
    DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_PATH, DEFAULT_TIMEOUT_MS, MAX_CONCURRENCY, MAX_TIMEOUT_MS,
};
use crate::core::lister::DEFAULT_REGISTRY_URL;
use crate::core::{Compression, ConfigProvider, PersistMode};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_name, validate_path, validate_range, validate_url, Validate,
};
use clap::Parser;
use std::time::Duration;

#[derive(Debug, Clone, Parser)]
#[command(name = "domain-sweep")]
#[command(about = "Probe every domain of a registry over HTTP and save what the pages say")]
pub struct CliConfig {
    #[arg(short, long, help = "Read settings from a TOML file instead of flags")]
    pub config: Option<String>,

    #[arg(long, default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    pub output_path: String,

    #[arg(long, help = "Output file name (default depends on compression)")]
    pub file_name: Option<String>,

    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS, help = "Per-domain deadline in milliseconds")]
    pub timeout_ms: u64,

    #[arg(long, value_enum, default_value_t = PersistMode::Eager)]
    pub persist: PersistMode,

    #[arg(long, value_enum, default_value_t = Compression::None)]
    pub compression: Compression,

    #[arg(long, help = "Load the existing output file and skip domains already in it")]
    pub resume: bool,

    #[arg(long)]
    pub user_agent: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Log process CPU and memory usage per phase")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn registry_url(&self) -> &str {
        &self.registry_url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn file_name(&self) -> String {
        self.file_name
            .clone()
            .unwrap_or_else(|| self.compression.default_file_name().to_string())
    }

    fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    fn persist_mode(&self) -> PersistMode {
        self.persist
    }

    fn compression(&self) -> Compression {
        self.compression
    }

    fn resume(&self) -> bool {
        self.resume
    }

    fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("registry_url", &self.registry_url)?;
        validate_path("output_path", &self.output_path)?;
        validate_file_name("file_name", &ConfigProvider::file_name(self))?;
        validate_range("concurrency", self.concurrency, 1, MAX_CONCURRENCY)?;
        validate_range("timeout_ms", self.timeout_ms, 1, MAX_TIMEOUT_MS)?;
        Ok(())
    }
}
