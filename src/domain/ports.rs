use crate::core::store::ResultStore;
use crate::domain::model::{Compression, Domain, PersistMode, ProbeOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Where `path` ends up, for reporting.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn registry_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn file_name(&self) -> String;
    fn concurrency(&self) -> usize;
    fn probe_timeout(&self) -> Duration;
    fn persist_mode(&self) -> PersistMode;
    fn compression(&self) -> Compression;
    fn resume(&self) -> bool;
    fn user_agent(&self) -> Option<&str>;
}

/// Produces the full work list once, up front.
#[async_trait]
pub trait DomainSource: Send + Sync {
    async fn list(&self) -> Result<Vec<Domain>>;
}

/// Probes a single domain. Infallible: failures are carried in the outcome.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, domain: &str, timeout: Duration) -> ProbeOutcome;
}

/// Receives a persistence request after each recorded outcome.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn request_persist(&self, store: &ResultStore) -> Result<()>;
}
