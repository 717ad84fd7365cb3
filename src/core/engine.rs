use crate::adapters::storage::LocalStorage;
use crate::core::lister::RegistryLister;
use crate::core::persist::Persister;
use crate::core::pool::WorkerPool;
use crate::core::prober::HttpProber;
use crate::core::queue::WorkQueue;
use crate::core::store::ResultStore;
use crate::domain::model::PersistMode;
use crate::domain::ports::{ConfigProvider, DomainSource, Prober, SnapshotSink, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub listed: usize,
    pub skipped: usize,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// List, probe, persist.
pub struct SweepEngine<L, P, S>
where
    L: DomainSource,
    P: Prober + 'static,
    S: Storage + 'static,
{
    lister: L,
    prober: Arc<P>,
    persister: Arc<Persister<S>>,
    pool: WorkerPool,
    mode: PersistMode,
    resume: bool,
    monitor: SystemMonitor,
}

impl<L, P, S> SweepEngine<L, P, S>
where
    L: DomainSource,
    P: Prober + 'static,
    S: Storage + 'static,
{
    pub fn new(lister: L, prober: P, persister: Persister<S>, pool: WorkerPool) -> Self {
        Self {
            lister,
            prober: Arc::new(prober),
            persister: Arc::new(persister),
            pool,
            mode: PersistMode::default(),
            resume: false,
            monitor: SystemMonitor::default(),
        }
    }

    pub fn with_mode(mut self, mode: PersistMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    /// Registry failures abort the run before anything is written. Probe
    /// failures end up in the store. Only the final persist can fail after
    /// the pool has started.
    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("Starting domain sweep...");

        // 取得網域清單
        let domains = self.lister.list().await?;
        let listed = domains.len();
        tracing::info!("Registry listed {} probeable domains", listed);
        self.monitor.log_stats("List");

        let store = if self.resume {
            self.persister.load().await
        } else {
            ResultStore::new()
        };

        let (pending, skipped): (Vec<_>, Vec<_>) =
            domains.into_iter().partition(|d| !store.contains(d));
        if !skipped.is_empty() {
            tracing::info!("Skipping {} domains already in the results file", skipped.len());
        }

        // 探測
        tracing::info!(
            "Probing {} domains with {} workers ({} persistence)",
            pending.len(),
            self.pool.concurrency(),
            self.mode
        );
        let sink: Option<Arc<dyn SnapshotSink>> = match self.mode {
            PersistMode::Eager => Some(self.persister.clone()),
            PersistMode::Batch => None,
        };
        let report = self
            .pool
            .run(
                Arc::new(WorkQueue::new(pending)),
                self.prober.clone(),
                store.clone(),
                sink,
            )
            .await;
        if report.persist_failures > 0 {
            tracing::warn!(
                "{} intermediate writes failed; relying on the final write",
                report.persist_failures
            );
        }
        self.monitor.log_stats("Probe");

        // 儲存
        let written = self.persister.persist(&store).await?;
        let output_path = self.persister.location();
        tracing::info!("Saved {} outcomes to {}", written, output_path);
        self.monitor.log_final_stats();

        let (succeeded, failed) = store.tally();
        Ok(RunSummary {
            output_path,
            listed,
            skipped: skipped.len(),
            processed: report.processed,
            succeeded,
            failed,
            elapsed: started.elapsed(),
        })
    }
}

impl SweepEngine<RegistryLister, HttpProber, LocalStorage> {
    /// Wires the HTTP lister and prober with local file output.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut client = Client::builder();
        if let Some(agent) = config.user_agent() {
            client = client.user_agent(agent.to_string());
        }
        let lister = RegistryLister::new(client.build()?, config.registry_url());
        let prober = HttpProber::new(config.user_agent())?;
        let persister = Persister::new(
            LocalStorage::new(config.output_path()),
            config.file_name(),
            config.compression(),
        );
        let pool = WorkerPool::new(config.concurrency(), config.probe_timeout())?;

        Ok(Self::new(lister, prober, persister, pool)
            .with_mode(config.persist_mode())
            .with_resume(config.resume()))
    }
}
