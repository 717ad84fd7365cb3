use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bare hostname, the unit of work.
pub type Domain = String;

/// One entry of the registry listing. Only `domain` is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub domain: String,
}

/// Metadata extracted from a delivered HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageData {
    pub status: u16,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Result of probing one domain.
///
/// Built only through [`ProbeOutcome::success`] or [`ProbeOutcome::failure`],
/// so exactly one of `data` and `error` is set. There are no mutators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    domain: Domain,
    time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<PageData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ProbeOutcome {
    pub fn success(domain: impl Into<Domain>, data: PageData) -> Self {
        Self {
            domain: domain.into(),
            time: Utc::now(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(domain: impl Into<Domain>, error: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            time: Utc::now(),
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    pub fn data(&self) -> Option<&PageData> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some()
    }

    pub fn status(&self) -> Option<u16> {
        self.data.as_ref().map(|d| d.status)
    }

    pub fn title(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.title.as_deref())
    }
}

/// When the result store is flushed to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// After every recorded outcome.
    #[default]
    Eager,
    /// Once, after the pool has drained the queue.
    Batch,
}

/// Encoding applied to the JSON snapshot before it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zip,
}

impl Compression {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Compression::None => "domains.json",
            Compression::Gzip => "domains.json.gz",
            Compression::Zip => "domains.zip",
        }
    }
}

impl fmt::Display for PersistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistMode::Eager => write!(f, "eager"),
            PersistMode::Batch => write!(f, "batch"),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zip => write!(f, "zip"),
        }
    }
}
