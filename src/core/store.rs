use crate::domain::model::{Domain, ProbeOutcome};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

/// Point-in-time copy of the store, ordered by domain for stable output.
pub type Snapshot = BTreeMap<Domain, ProbeOutcome>;

/// Latest outcome per domain, shared by all workers.
///
/// Cloning is cheap and every clone sees the same map. A single lock covers
/// the whole map so [`ResultStore::snapshot`] is never a torn view.
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    outcomes: Arc<RwLock<HashMap<Domain, ProbeOutcome>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            outcomes: Arc::new(RwLock::new(snapshot.into_iter().collect())),
        }
    }

    /// Inserts or overwrites the entry for the outcome's domain.
    pub fn record(&self, outcome: ProbeOutcome) {
        let mut outcomes = self
            .outcomes
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        outcomes.insert(outcome.domain().to_string(), outcome);
    }

    pub fn snapshot(&self) -> Snapshot {
        let outcomes = self.outcomes.read().unwrap_or_else(PoisonError::into_inner);
        outcomes
            .iter()
            .map(|(domain, outcome)| (domain.clone(), outcome.clone()))
            .collect()
    }

    pub fn get(&self, domain: &str) -> Option<ProbeOutcome> {
        let outcomes = self.outcomes.read().unwrap_or_else(PoisonError::into_inner);
        outcomes.get(domain).cloned()
    }

    pub fn contains(&self, domain: &str) -> bool {
        let outcomes = self.outcomes.read().unwrap_or_else(PoisonError::into_inner);
        outcomes.contains_key(domain)
    }

    pub fn len(&self) -> usize {
        self.outcomes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `(succeeded, failed)`.
    pub fn tally(&self) -> (usize, usize) {
        let outcomes = self.outcomes.read().unwrap_or_else(PoisonError::into_inner);
        let succeeded = outcomes.values().filter(|o| o.is_success()).count();
        (succeeded, outcomes.len() - succeeded)
    }
}
