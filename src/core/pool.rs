use crate::core::queue::WorkQueue;
use crate::core::store::ResultStore;
use crate::domain::ports::{Prober, SnapshotSink};
use crate::utils::error::{Result, SweepError};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// Fixed-size set of workers draining a [`WorkQueue`].
#[derive(Debug, Clone)]
pub struct WorkerPool {
    concurrency: usize,
    timeout: Duration,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub processed: usize,
    pub persist_failures: usize,
}

impl WorkerPool {
    pub fn new(concurrency: usize, timeout: Duration) -> Result<Self> {
        if concurrency == 0 {
            return Err(SweepError::InvalidConfigValueError {
                field: "concurrency".to_string(),
                value: concurrency.to_string(),
                reason: "At least one worker is required".to_string(),
            });
        }
        Ok(Self {
            concurrency,
            timeout,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Spawns `concurrency` workers and waits for all of them.
    ///
    /// A worker stops once the queue is empty. With a `sink`, every recorded
    /// outcome is followed by a persistence request whose failure is logged
    /// and otherwise ignored.
    pub async fn run<P>(
        &self,
        queue: Arc<WorkQueue>,
        prober: Arc<P>,
        store: ResultStore,
        sink: Option<Arc<dyn SnapshotSink>>,
    ) -> PoolReport
    where
        P: Prober + ?Sized + 'static,
    {
        let mut workers = JoinSet::new();

        for id in 0..self.concurrency {
            let queue = queue.clone();
            let prober = prober.clone();
            let store = store.clone();
            let sink = sink.clone();
            let timeout = self.timeout;

            workers.spawn(async move {
                let mut report = PoolReport::default();

                while let Some((domain, remaining)) = queue.pop() {
                    let outcome = prober.probe(&domain, timeout).await;

                    match outcome.error() {
                        None => tracing::info!(
                            domain = %domain,
                            remaining,
                            status = outcome.status().unwrap_or_default(),
                            title = outcome.title().unwrap_or_default(),
                            "probed"
                        ),
                        Some(error) => tracing::info!(
                            domain = %domain,
                            remaining,
                            error,
                            "probe failed"
                        ),
                    }

                    store.record(outcome);
                    report.processed += 1;

                    if let Some(sink) = &sink {
                        if let Err(e) = sink.request_persist(&store).await {
                            tracing::warn!("Worker {} could not persist results: {}", id, e);
                            report.persist_failures += 1;
                        }
                    }
                }

                tracing::debug!("Worker {} finished after {} domains", id, report.processed);
                report
            });
        }

        let mut total = PoolReport::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(report) => {
                    total.processed += report.processed;
                    total.persist_failures += report.persist_failures;
                }
                Err(e) => tracing::error!("Worker task failed: {}", e),
            }
        }
        total
    }
}
