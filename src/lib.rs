pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::storage::LocalStorage;
pub use crate::core::{
    engine::{RunSummary, SweepEngine},
    lister::RegistryLister,
    persist::Persister,
    pool::WorkerPool,
    prober::HttpProber,
    queue::WorkQueue,
    store::ResultStore,
};
pub use utils::error::{Result, SweepError};
