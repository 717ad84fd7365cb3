use crate::domain::model::Domain;
use std::sync::{Mutex, PoisonError};

/// Shared work list drained by the worker pool.
///
/// The lock is held only for the pop itself, never across an await, so a
/// domain is handed to exactly one worker.
#[derive(Debug, Default)]
pub struct WorkQueue {
    items: Mutex<Vec<Domain>>,
}

impl WorkQueue {
    pub fn new(items: Vec<Domain>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    /// Removes one domain, returning it along with how many remain.
    pub fn pop(&self) -> Option<(Domain, usize)> {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let domain = items.pop()?;
        Some((domain, items.len()))
    }

    pub fn len(&self) -> usize {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
