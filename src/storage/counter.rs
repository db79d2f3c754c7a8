use super::engine::Counter;
use super::persistence::write_atomic;
use crate::core::{RecordError, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Process-local counters. Lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryCounter {
    values: Mutex<HashMap<String, u64>>,
}

impl InMemoryCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a counter to a known value, e.g. when restoring from elsewhere.
    pub fn seed(&self, name: &str, value: u64) -> Result<()> {
        self.values.lock()?.insert(name.to_string(), value);
        Ok(())
    }
}

#[async_trait]
impl Counter for InMemoryCounter {
    async fn next(&self, name: &str) -> Result<u64> {
        let mut values = self.values.lock()?;
        let slot = values.entry(name.to_string()).or_insert(0);
        *slot = slot.checked_add(1).ok_or_else(|| RecordError::AllocationUnavailable {
            counter: name.to_string(),
            reason: "counter exhausted".into(),
        })?;
        Ok(*slot)
    }

    async fn current(&self, name: &str) -> Result<u64> {
        Ok(self.values.lock()?.get(name).copied().unwrap_or(0))
    }
}

/// Counters persisted as one JSON object in a file.
///
/// Each increment rewrites the file before the new value is handed out, so a
/// value is never issued twice across restarts. A failed write leaves both
/// the file and the in-memory value untouched.
pub struct FileCounter {
    path: PathBuf,
    values: tokio::sync::Mutex<BTreeMap<String, u64>>,
}

impl FileCounter {
    /// Open the counter file, starting empty when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let data = std::fs::read(&path)?;
            serde_json::from_slice(&data)?
        } else {
            BTreeMap::new()
        };
        tracing::debug!(path = %path.display(), counters = values.len(), "counter file opened");

        Ok(Self {
            path,
            values: tokio::sync::Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Counter for FileCounter {
    async fn next(&self, name: &str) -> Result<u64> {
        let mut values = self.values.lock().await;
        let current = values.get(name).copied().unwrap_or(0);
        let next = current.checked_add(1).ok_or_else(|| RecordError::AllocationUnavailable {
            counter: name.to_string(),
            reason: "counter exhausted".into(),
        })?;

        let mut staged = values.clone();
        staged.insert(name.to_string(), next);
        let bytes = serde_json::to_vec_pretty(&staged)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
            .await
            .map_err(|e| RecordError::LockError(e.to_string()))??;

        *values = staged;
        Ok(next)
    }

    async fn current(&self, name: &str) -> Result<u64> {
        Ok(self.values.lock().await.get(name).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_in_memory_counter_starts_at_one() {
        let counter = InMemoryCounter::new();
        assert_eq!(counter.current("clinic").await.unwrap(), 0);
        assert_eq!(counter.next("clinic").await.unwrap(), 1);
        assert_eq!(counter.next("clinic").await.unwrap(), 2);
        assert_eq!(counter.next("doctor").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_seeded_counter_continues() {
        let counter = InMemoryCounter::new();
        counter.seed("clinic", 6).unwrap();
        assert_eq!(counter.next("clinic").await.unwrap(), 7);
        assert_eq!(counter.current("clinic").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_exhausted_counter_is_unavailable() {
        let counter = InMemoryCounter::new();
        counter.seed("clinic", u64::MAX).unwrap();
        let err = counter.next("clinic").await.unwrap_err();
        assert!(matches!(err, RecordError::AllocationUnavailable { .. }));
        assert_eq!(counter.current("clinic").await.unwrap(), u64::MAX);
    }

    #[tokio::test]
    async fn test_file_counter_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("counters.json");

        let counter = FileCounter::open(&path).unwrap();
        counter.next("clinic").await.unwrap();
        counter.next("clinic").await.unwrap();
        drop(counter);

        let reopened = FileCounter::open(&path).unwrap();
        assert_eq!(reopened.current("clinic").await.unwrap(), 2);
        assert_eq!(reopened.next("clinic").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_file_counter_concurrent_increments_are_distinct() {
        let temp_dir = TempDir::new().unwrap();
        let counter = Arc::new(FileCounter::open(temp_dir.path().join("counters.json")).unwrap());

        let mut handles = Vec::new();
        for _ in 0..20 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move { counter.next("doctor").await.unwrap() }));
        }

        let mut seen = Vec::new();
        for handle in handles {
            seen.push(handle.await.unwrap());
        }
        seen.sort_unstable();
        assert_eq!(seen, (1..=20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_value() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = temp_dir.path().join("counters.json");
        std::fs::create_dir(&path).unwrap();

        let counter = FileCounter {
            path: path.clone(),
            values: tokio::sync::Mutex::new(BTreeMap::new()),
        };
        assert!(counter.next("clinic").await.is_err());
        assert_eq!(counter.current("clinic").await.unwrap(), 0);
    }
}
