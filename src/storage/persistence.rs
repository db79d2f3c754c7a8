//! Snapshot files for stores and counters.
//!
//! Every write goes to a temporary file in the target directory, is synced,
//! and then renamed over the target, so readers only ever see a complete
//! previous or complete new file.

use crate::core::{Entity, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub version: u32,
    pub kind: String,
    pub entities: Vec<Entity>,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub created_at: u64,
    pub entity_count: usize,
}

impl StoreSnapshot {
    pub fn new(kind: impl Into<String>, entities: Vec<Entity>) -> Self {
        let entity_count = entities.len();
        Self {
            version: SNAPSHOT_VERSION,
            kind: kind.into(),
            entities,
            metadata: SnapshotMetadata {
                created_at: unix_millis(),
                entity_count,
            },
        }
    }
}

pub struct SnapshotManager {
    snapshot_path: PathBuf,
}

impl SnapshotManager {
    pub fn new<P: AsRef<Path>>(snapshot_path: P) -> Self {
        Self {
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    pub fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        let serialized = rmp_serde::to_vec(snapshot)?;
        write_atomic(&self.snapshot_path, &serialized)
    }

    pub fn load(&self) -> Result<Option<StoreSnapshot>> {
        if !self.exists() {
            return Ok(None);
        }
        let data = fs::read(&self.snapshot_path)?;
        let snapshot: StoreSnapshot = rmp_serde::from_slice(&data)?;
        Ok(Some(snapshot))
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path.exists()
    }

    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }
}

/// Replace `path` with `bytes` in one rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
