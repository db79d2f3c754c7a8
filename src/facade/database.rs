use super::collection::Collection;
use crate::allocator::IdentityAllocator;
use crate::config::DbConfig;
use crate::core::{RecordError, Result};
use crate::storage::{Catalog, Counter, FileCounter, InMemoryCounter, InMemoryStore, Store};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// One store per kind plus the counter they share.
pub struct RecordDb {
    config: DbConfig,
    catalog: Catalog,
    counter: Arc<dyn Counter>,
    stores: HashMap<String, Arc<InMemoryStore>>,
    collections: HashMap<String, Collection>,
}

impl RecordDb {
    /// Open with the built-in clinic kinds.
    pub async fn open(config: DbConfig) -> Result<Self> {
        Self::with_catalog(config, Catalog::builtin()).await
    }

    /// Open with an explicit catalog.
    ///
    /// With a data directory, counters live in `counters.json` and each
    /// kind's store is reloaded from `<kind>.snapshot` when present.
    pub async fn with_catalog(config: DbConfig, catalog: Catalog) -> Result<Self> {
        let counter: Arc<dyn Counter> = match config.counter_path() {
            Some(path) => Arc::new(FileCounter::open(path)?),
            None => Arc::new(InMemoryCounter::new()),
        };
        let allocator = IdentityAllocator::new(counter.clone());

        let mut stores = HashMap::new();
        let mut collections = HashMap::new();
        for kind in catalog.list_kinds() {
            let store = match snapshot_path(&config, kind) {
                Some(path) => InMemoryStore::load_snapshot(kind, path).await?,
                None => InMemoryStore::new(kind),
            };
            let store = Arc::new(store);
            let collection = Collection::new(
                catalog.get(kind)?.clone(),
                store.clone() as Arc<dyn Store>,
                allocator.clone(),
            );
            stores.insert(kind.to_string(), store);
            collections.insert(kind.to_string(), collection);
        }

        tracing::info!(
            kinds = collections.len(),
            durable = config.data_dir.is_some(),
            "record database opened"
        );

        Ok(Self {
            config,
            catalog,
            counter,
            stores,
            collections,
        })
    }

    pub fn collection(&self, kind: &str) -> Result<&Collection> {
        self.collections
            .get(kind)
            .ok_or_else(|| RecordError::not_found("kind", kind))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn counter(&self) -> &Arc<dyn Counter> {
        &self.counter
    }

    /// Write every store to its snapshot file. A no-op without a data
    /// directory.
    pub async fn flush(&self) -> Result<()> {
        for (kind, store) in &self.stores {
            if let Some(path) = snapshot_path(&self.config, kind) {
                store.save_snapshot(path).await?;
            }
        }
        Ok(())
    }
}

fn snapshot_path(config: &DbConfig, kind: &str) -> Option<PathBuf> {
    config
        .data_dir
        .as_ref()
        .map(|dir| dir.join(format!("{kind}.snapshot")))
}
