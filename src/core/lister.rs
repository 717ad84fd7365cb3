use crate::domain::model::{Domain, RegistryEntry};
use crate::domain::ports::DomainSource;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_REGISTRY_URL: &str = "https://raw.is-a.dev/v2.json";

/// Fetches the domain list from the registry in a single request.
pub struct RegistryLister {
    client: Client,
    url: String,
}

impl RegistryLister {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

/// Drops entries reserved by the registry (any name with an underscore).
pub fn filter_probeable(entries: Vec<RegistryEntry>) -> Vec<Domain> {
    entries
        .into_iter()
        .map(|entry| entry.domain)
        .filter(|domain| !domain.contains('_'))
        .collect()
}

#[async_trait]
impl DomainSource for RegistryLister {
    async fn list(&self) -> Result<Vec<Domain>> {
        tracing::debug!("Fetching domain list from: {}", self.url);
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        let entries: Vec<RegistryEntry> = serde_json::from_slice(&bytes)?;
        let total = entries.len();
        let domains = filter_probeable(entries);

        tracing::debug!(
            "Registry returned {} entries, {} probeable",
            total,
            domains.len()
        );
        Ok(domains)
    }
}
