use crate::core::store::{ResultStore, Snapshot};
use crate::domain::model::Compression;
use crate::domain::ports::{SnapshotSink, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::io::{Cursor, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Entry name inside the zip archive.
pub const ZIP_ENTRY_NAME: &str = "results.json";

pub fn encode_snapshot(snapshot: &Snapshot, compression: Compression) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(snapshot)?;

    let bytes = match compression {
        Compression::None => json,
        Compression::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(&json)?;
            encoder.finish()?
        }
        Compression::Zip => {
            let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
            zip.start_file(ZIP_ENTRY_NAME, SimpleFileOptions::default())?;
            zip.write_all(&json)?;
            zip.finish()?.into_inner()
        }
    };
    Ok(bytes)
}

pub fn decode_snapshot(bytes: &[u8], compression: Compression) -> Result<Snapshot> {
    let json = match compression {
        Compression::None => bytes.to_vec(),
        Compression::Gzip => {
            let mut json = Vec::new();
            GzDecoder::new(bytes).read_to_end(&mut json)?;
            json
        }
        Compression::Zip => {
            let mut archive = ZipArchive::new(Cursor::new(bytes))?;
            let mut entry = archive.by_name(ZIP_ENTRY_NAME)?;
            let mut json = Vec::new();
            entry.read_to_end(&mut json)?;
            json
        }
    };
    Ok(serde_json::from_slice(&json)?)
}

/// Writes store snapshots to a single file through [`Storage`].
///
/// Writes are serialized by `write_lock`, and the snapshot is taken after
/// the lock is acquired, so each file on disk is at least as complete as
/// the one before it.
pub struct Persister<S: Storage> {
    storage: S,
    file_name: String,
    compression: Compression,
    write_lock: Mutex<()>,
    queued: AtomicBool,
}

impl<S: Storage> Persister<S> {
    pub fn new(storage: S, file_name: impl Into<String>, compression: Compression) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
            compression,
            write_lock: Mutex::new(()),
            queued: AtomicBool::new(false),
        }
    }

    pub fn location(&self) -> String {
        self.storage.location(&self.file_name)
    }

    /// Serializes the current contents of `store` and writes them out.
    pub async fn persist(&self, store: &ResultStore) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        self.write_locked(store).await
    }

    async fn write_locked(&self, store: &ResultStore) -> Result<usize> {
        let snapshot = store.snapshot();
        let bytes = encode_snapshot(&snapshot, self.compression)?;
        self.storage.write_file(&self.file_name, &bytes).await?;
        tracing::debug!(
            "Persisted {} outcomes ({} bytes) to {}",
            snapshot.len(),
            bytes.len(),
            self.file_name
        );
        Ok(snapshot.len())
    }

    /// Like [`Persister::persist`], but returns immediately when another
    /// request is already waiting for the lock. That waiter snapshots after
    /// it gets the lock, so it covers this caller's record too.
    pub async fn persist_coalesced(&self, store: &ResultStore) -> Result<bool> {
        if self.queued.swap(true, Ordering::SeqCst) {
            return Ok(false);
        }
        let queued = QueuedFlag(&self.queued);
        let _guard = self.write_lock.lock().await;
        drop(queued);
        self.write_locked(store).await?;
        Ok(true)
    }

    /// Reads the previous snapshot. A missing or undecodable file yields an
    /// empty store.
    pub async fn load(&self) -> ResultStore {
        let _guard = self.write_lock.lock().await;

        let bytes = match self.storage.read_file(&self.file_name).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::info!("No previous results loaded from {}: {}", self.file_name, e);
                return ResultStore::new();
            }
        };

        match decode_snapshot(&bytes, self.compression) {
            Ok(snapshot) => {
                tracing::info!(
                    "Loaded {} previous outcomes from {}",
                    snapshot.len(),
                    self.file_name
                );
                ResultStore::from_snapshot(snapshot)
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable results file {}: {}",
                    self.file_name,
                    e
                );
                ResultStore::new()
            }
        }
    }
}

/// Clears the queued flag once the waiter holds the lock, or if it is dropped
/// before getting there.
struct QueuedFlag<'a>(&'a AtomicBool);

impl Drop for QueuedFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: Storage> SnapshotSink for Persister<S> {
    async fn request_persist(&self, store: &ResultStore) -> Result<()> {
        self.persist_coalesced(store).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PageData, ProbeOutcome};
    use crate::utils::error::SweepError;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        writes: Arc<AtomicUsize>,
        write_delay: Option<Duration>,
    }

    impl MockStorage {
        fn slow(delay: Duration) -> Self {
            Self {
                write_delay: Some(delay),
                ..Self::default()
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }

        async fn put_file(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                SweepError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            if let Some(delay) = self.write_delay {
                tokio::time::sleep(delay).await;
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn location(&self, path: &str) -> String {
            format!("memory://{}", path)
        }
    }

    fn sample_store() -> ResultStore {
        let store = ResultStore::new();
        store.record(ProbeOutcome::success(
            "a.example",
            PageData {
                status: 200,
                url: "http://a.example/".to_string(),
                title: Some("T".to_string()),
                body: Some("hello".to_string()),
            },
        ));
        store.record(ProbeOutcome::failure("c.example", "connection refused"));
        store
    }

    #[test]
    fn test_round_trip_in_every_format() {
        let snapshot = sample_store().snapshot();
        for compression in [Compression::None, Compression::Gzip, Compression::Zip] {
            let bytes = encode_snapshot(&snapshot, compression).unwrap();
            let decoded = decode_snapshot(&bytes, compression).unwrap();
            assert_eq!(decoded, snapshot, "format {}", compression);
        }
    }

    #[test]
    fn test_plain_output_is_domain_keyed_json() {
        let bytes = encode_snapshot(&sample_store().snapshot(), Compression::None).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["a.example"]["data"]["status"], 200);
        assert_eq!(json["c.example"]["error"], "connection refused");
    }

    #[test]
    fn test_gzip_output_is_compressed() {
        let bytes = encode_snapshot(&sample_store().snapshot(), Compression::Gzip).unwrap();
        assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
        assert!(decode_snapshot(&bytes, Compression::None).is_err());
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let storage = MockStorage::default();
        let persister = Persister::new(storage.clone(), "domains.json.gz", Compression::Gzip);
        let store = sample_store();

        let written = persister.persist(&store).await.unwrap();
        assert_eq!(written, 2);
        assert!(storage.get_file("domains.json.gz").await.is_some());

        let loaded = persister.load().await;
        assert_eq!(loaded.snapshot(), store.snapshot());
    }

    #[tokio::test]
    async fn test_loaded_outcomes_keep_timestamps() {
        let storage = MockStorage::default();
        let persister = Persister::new(storage, "domains.json", Compression::None);
        let store = sample_store();
        persister.persist(&store).await.unwrap();

        let loaded = persister.load().await;
        for (domain, outcome) in store.snapshot() {
            assert_eq!(loaded.get(&domain).unwrap().time(), outcome.time());
        }
    }

    #[tokio::test]
    async fn test_abandoned_waiter_does_not_block_later_writes() {
        let storage = MockStorage::default();
        let persister = Persister::new(storage.clone(), "domains.json", Compression::None);
        let store = sample_store();

        {
            let _held = persister.write_lock.lock().await;
            let waiting = persister.persist_coalesced(&store);
            // gives up while still queued behind the lock
            let abandoned = tokio::time::timeout(Duration::from_millis(20), waiting).await;
            assert!(abandoned.is_err());
        }

        assert!(persister.persist_coalesced(&store).await.unwrap());
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
        assert!(storage.get_file("domains.json").await.is_some());
    }

    #[tokio::test]
    async fn test_load_missing_file_starts_empty() {
        let persister = Persister::new(MockStorage::default(), "domains.json", Compression::None);
        assert!(persister.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_load_corrupt_file_starts_empty() {
        let storage = MockStorage::default();
        storage.put_file("domains.zip", b"definitely not a zip").await;
        let persister = Persister::new(storage, "domains.zip", Compression::Zip);
        assert!(persister.load().await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_coalesced_requests_skip_queued_duplicates() {
        let storage = MockStorage::slow(Duration::from_millis(100));
        let persister = Arc::new(Persister::new(
            storage.clone(),
            "domains.json",
            Compression::None,
        ));
        let store = ResultStore::new();

        let mut handles = Vec::new();
        for i in 0..10 {
            let persister = persister.clone();
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.record(ProbeOutcome::failure(format!("site{}.example", i), "x"));
                persister.persist_coalesced(&store).await.unwrap()
            }));
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let mut performed = 0;
        for handle in handles {
            if handle.await.unwrap() {
                performed += 1;
            }
        }

        assert!(performed < 10);
        assert_eq!(storage.writes.load(Ordering::SeqCst), performed);

        // the last write must include every record
        let bytes = storage.get_file("domains.json").await.unwrap();
        let snapshot = decode_snapshot(&bytes, Compression::None).unwrap();
        assert_eq!(snapshot.len(), 10);
    }
}
