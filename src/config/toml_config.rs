use crate::config::{
    DEFAULT_CONCURRENCY, DEFAULT_OUTPUT_PATH, DEFAULT_TIMEOUT_MS, MAX_CONCURRENCY, MAX_TIMEOUT_MS,
};
use crate::core::lister::DEFAULT_REGISTRY_URL;
use crate::core::{Compression, ConfigProvider, PersistMode};
use crate::utils::error::{Result, SweepError};
use crate::utils::validation::{
    validate_file_name, validate_path, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub registry: RegistryConfig,
    pub probe: ProbeConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub concurrency: Option<usize>,
    pub timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub file_name: Option<String>,
    pub persist: Option<PersistMode>,
    pub compression: Option<Compression>,
    pub resume: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SweepError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SweepError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    fn timeout_ms(&self) -> u64 {
        self.probe.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS)
    }
}

impl ConfigProvider for TomlConfig {
    fn registry_url(&self) -> &str {
        self.registry.url.as_deref().unwrap_or(DEFAULT_REGISTRY_URL)
    }

    fn output_path(&self) -> &str {
        self.output.path.as_deref().unwrap_or(DEFAULT_OUTPUT_PATH)
    }

    fn file_name(&self) -> String {
        self.output
            .file_name
            .clone()
            .unwrap_or_else(|| self.compression().default_file_name().to_string())
    }

    fn concurrency(&self) -> usize {
        self.probe.concurrency.unwrap_or(DEFAULT_CONCURRENCY)
    }

    fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms())
    }

    fn persist_mode(&self) -> PersistMode {
        self.output.persist.unwrap_or_default()
    }

    fn compression(&self) -> Compression {
        self.output.compression.unwrap_or_default()
    }

    fn resume(&self) -> bool {
        self.output.resume.unwrap_or(false)
    }

    fn user_agent(&self) -> Option<&str> {
        self.probe.user_agent.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_url("registry.url", self.registry_url())?;
        validate_path("output.path", self.output_path())?;
        validate_file_name("output.file_name", &self.file_name())?;
        validate_range("probe.concurrency", self.concurrency(), 1, MAX_CONCURRENCY)?;
        validate_range("probe.timeout_ms", self.timeout_ms(), 1, MAX_TIMEOUT_MS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[registry]
url = "https://registry.example/v2.json"

[probe]
concurrency = 8
timeout_ms = 1500
user_agent = "sweeper/1.0"

[output]
path = "./results"
persist = "batch"
compression = "zip"
resume = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.registry_url(), "https://registry.example/v2.json");
        assert_eq!(config.concurrency(), 8);
        assert_eq!(config.probe_timeout(), Duration::from_millis(1500));
        assert_eq!(config.user_agent(), Some("sweeper/1.0"));
        assert_eq!(config.persist_mode(), PersistMode::Batch);
        assert_eq!(config.compression(), Compression::Zip);
        assert_eq!(config.file_name(), "domains.zip");
        assert!(config.resume());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.registry_url(), DEFAULT_REGISTRY_URL);
        assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(config.persist_mode(), PersistMode::Eager);
        assert_eq!(config.file_name(), "domains.json");
        assert!(!config.monitoring_enabled());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SWEEP_TEST_OUTPUT_DIR", "/tmp/sweep-out");

        let toml_content = r#"
[output]
path = "${SWEEP_TEST_OUTPUT_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "/tmp/sweep-out");

        std::env::remove_var("SWEEP_TEST_OUTPUT_DIR");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        std::env::remove_var("SWEEP_TEST_UNSET_DIR");

        let toml_content = r#"
[output]
path = "${SWEEP_TEST_UNSET_DIR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.output_path(), "${SWEEP_TEST_UNSET_DIR}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[registry]
url = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_compression_rejected() {
        let toml_content = r#"
[output]
compression = "brotli"
"#;
        assert!(TomlConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[probe]
concurrency = 3

[monitoring]
enabled = true
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.concurrency(), 3);
        assert!(config.monitoring_enabled());
    }
}
