pub mod engine;
pub mod lister;
pub mod persist;
pub mod pool;
pub mod prober;
pub mod queue;
pub mod store;

pub use crate::domain::model::{Compression, Domain, PageData, PersistMode, ProbeOutcome};
pub use crate::domain::ports::{ConfigProvider, DomainSource, Prober, SnapshotSink, Storage};
pub use crate::utils::error::Result;
