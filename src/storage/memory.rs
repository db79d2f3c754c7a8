use super::engine::Store;
use super::persistence::{SnapshotManager, StoreSnapshot};
use crate::core::{Entity, EntityKey, RecordError, Result, Value};
use async_trait::async_trait;
use std::path::Path;
use tokio::sync::RwLock;

/// Store state. All maps are persistent (`im`), so cloning the whole state
/// for a snapshot is O(1) and never blocks writers for long.
#[derive(Clone, Default)]
struct StoreState {
    /// Entities in insertion order, keyed by insertion sequence.
    entities: im::OrdMap<u64, Entity>,
    /// Internal key -> insertion sequence
    keys: im::HashMap<EntityKey, u64>,
    /// Unique index on the business identifier
    business_ids: im::HashMap<String, EntityKey>,
    next_seq: u64,
}

impl StoreState {
    /// Insert a keyless entity or replace a held one. A key this state does
    /// not hold (for example one deleted since it was read) is `NotFound`.
    fn upsert(&mut self, kind: &str, entity: Entity) -> Result<Entity> {
        if let Some(key) = entity.key()
            && !self.keys.contains_key(key)
        {
            return Err(RecordError::not_found(kind, key.as_str()));
        }
        self.place(kind, entity)
    }

    /// Snapshot reload: keyed entities are inserted under their own key.
    fn restore(&mut self, kind: &str, entity: Entity) -> Result<Entity> {
        self.place(kind, entity)
    }

    fn place(&mut self, kind: &str, mut entity: Entity) -> Result<Entity> {
        let key = match entity.key() {
            Some(key) => key.clone(),
            None => {
                let key = EntityKey::generate();
                entity.set_key(key.clone());
                key
            }
        };

        let business_id = entity
            .has_business_id()
            .then(|| entity.business_id().map(str::to_string))
            .flatten();

        if let Some(id) = &business_id
            && let Some(owner) = self.business_ids.get(id)
            && owner != &key
        {
            return Err(RecordError::conflict(kind, id.clone()));
        }

        let seq = match self.keys.get(&key) {
            Some(seq) => {
                let seq = *seq;
                if let Some(previous) = self.entities.get(&seq)
                    && let Some(old_id) = previous.business_id()
                    && business_id.as_deref() != Some(old_id)
                {
                    self.business_ids.remove(old_id);
                }
                seq
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.keys.insert(key.clone(), seq);
                seq
            }
        };

        if let Some(id) = business_id {
            self.business_ids.insert(id, key);
        }
        self.entities.insert(seq, entity.clone());
        Ok(entity)
    }

    fn remove(&mut self, key: &EntityKey) -> Option<Entity> {
        let seq = self.keys.remove(key)?;
        let entity = self.entities.remove(&seq)?;
        if let Some(id) = entity.business_id() {
            self.business_ids.remove(id);
        }
        Some(entity)
    }
}

/// In-memory [`Store`] for one entity kind.
pub struct InMemoryStore {
    kind: String,
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            state: RwLock::new(StoreState::default()),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Write the full contents to `path` (MessagePack, atomic replace).
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let entities = self.find_all().await?;
        let snapshot = StoreSnapshot::new(self.kind.clone(), entities);
        SnapshotManager::new(path).save(&snapshot)?;
        tracing::info!(kind = %self.kind, count = snapshot.metadata.entity_count, "store snapshot written");
        Ok(())
    }

    /// Rebuild a store from a snapshot file. A missing file yields an empty
    /// store.
    pub async fn load_snapshot(kind: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::new(kind);
        let Some(snapshot) = SnapshotManager::new(path).load()? else {
            return Ok(store);
        };

        if snapshot.kind != store.kind {
            return Err(RecordError::ValidationFailure(format!(
                "snapshot holds kind '{}', expected '{}'",
                snapshot.kind, store.kind
            )));
        }

        {
            let mut state = store.state.write().await;
            for entity in snapshot.entities {
                state.restore(&store.kind, entity)?;
            }
        }
        tracing::info!(kind = %store.kind, count = snapshot.metadata.entity_count, "store snapshot loaded");
        Ok(store)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Entity>> {
        let entities = self.state.read().await.entities.clone();
        Ok(entities.values().cloned().collect())
    }

    async fn find_by_id(&self, key: &EntityKey) -> Result<Option<Entity>> {
        let state = self.state.read().await;
        Ok(state
            .keys
            .get(key)
            .and_then(|seq| state.entities.get(seq))
            .cloned())
    }

    async fn save(&self, entity: Entity) -> Result<Entity> {
        let mut state = self.state.write().await;
        let saved = state.upsert(&self.kind, entity)?;
        tracing::debug!(kind = %self.kind, key = ?saved.key(), business_id = ?saved.business_id(), "entity saved");
        Ok(saved)
    }

    async fn exists_by_id(&self, key: &EntityKey) -> Result<bool> {
        Ok(self.state.read().await.keys.contains_key(key))
    }

    async fn delete_by_id(&self, key: &EntityKey) -> Result<()> {
        let removed = self.state.write().await.remove(key);
        if removed.is_some() {
            tracing::debug!(kind = %self.kind, %key, "entity deleted");
        }
        Ok(())
    }

    async fn exists_by_business_id(&self, business_id: &str) -> Result<bool> {
        Ok(self.state.read().await.business_ids.contains_key(business_id))
    }

    async fn exists_by_field(&self, name: &str, value: &Value) -> Result<bool> {
        let entities = self.state.read().await.entities.clone();
        Ok(entities.values().any(|e| e.get(name) == Some(value)))
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.state.read().await.entities.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn clinic(id: &str, name: &str) -> Entity {
        Entity::default().with_business_id(id).with_field("clinicName", name)
    }

    #[tokio::test]
    async fn test_save_assigns_key_and_keeps_order() {
        let store = InMemoryStore::new("clinic");
        let a = store.save(clinic("CLINIC001", "A")).await.unwrap();
        let b = store.save(clinic("CLINIC002", "B")).await.unwrap();
        assert!(a.key().is_some());
        assert_ne!(a.key(), b.key());

        let names: Vec<_> = store
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|e| e.get("clinicName").cloned())
            .collect();
        assert_eq!(names, vec![Some(Value::from("A")), Some(Value::from("B"))]);
    }

    #[tokio::test]
    async fn test_duplicate_business_id_conflicts() {
        let store = InMemoryStore::new("patient");
        store.save(clinic("PAT-AAAAAA", "first")).await.unwrap();
        let err = store.save(clinic("PAT-AAAAAA", "second")).await.unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_replace_keeps_position_and_index() {
        let store = InMemoryStore::new("clinic");
        let a = store.save(clinic("CLINIC001", "A")).await.unwrap();
        store.save(clinic("CLINIC002", "B")).await.unwrap();

        let renamed = a.clone().with_field("clinicName", "A2");
        store.save(renamed).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all[0].get("clinicName"), Some(&Value::from("A2")));
        assert_eq!(all.len(), 2);

        // The same entity may be saved again with its own business id
        store.save(all[0].clone()).await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_frees_business_id() {
        let store = InMemoryStore::new("clinic");
        let a = store.save(clinic("CLINIC001", "A")).await.unwrap();
        let key = a.key().unwrap().clone();

        store.delete_by_id(&key).await.unwrap();
        assert!(!store.exists_by_id(&key).await.unwrap());
        store.delete_by_id(&key).await.unwrap();

        store.save(clinic("CLINIC001", "again")).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_with_deleted_key_is_not_found() {
        let store = InMemoryStore::new("clinic");
        let a = store.save(clinic("CLINIC001", "A")).await.unwrap();
        let key = a.key().unwrap().clone();
        store.delete_by_id(&key).await.unwrap();

        let err = store.save(a.with_field("clinicName", "A2")).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(!store.exists_by_business_id("CLINIC001").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_by_business_id() {
        let store = InMemoryStore::new("patient");
        store.save(clinic("PAT-ABC123", "Asha")).await.unwrap();
        store.save(clinic("  ", "blank")).await.unwrap();

        assert!(store.exists_by_business_id("PAT-ABC123").await.unwrap());
        assert!(!store.exists_by_business_id("pat-abc123").await.unwrap());
        assert!(!store.exists_by_business_id("  ").await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_is_a_copy() {
        let store = InMemoryStore::new("clinic");
        store.save(clinic("CLINIC001", "A")).await.unwrap();
        let snapshot = store.find_all().await.unwrap();
        store.save(clinic("CLINIC002", "B")).await.unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_exists_by_field() {
        let store = InMemoryStore::new("clinic");
        store
            .save(clinic("CLINIC001", "A").with_field("registrationNumber", "REG-9"))
            .await
            .unwrap();
        assert!(store.exists_by_field("registrationNumber", &Value::from("REG-9")).await.unwrap());
        assert!(!store.exists_by_field("registrationNumber", &Value::from("REG-1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip_rebuilds_index() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clinic.snapshot");

        let store = InMemoryStore::new("clinic");
        store.save(clinic("CLINIC001", "A")).await.unwrap();
        store.save_snapshot(&path).await.unwrap();

        let restored = InMemoryStore::load_snapshot("clinic", &path).await.unwrap();
        assert_eq!(restored.count().await.unwrap(), 1);
        let err = restored.save(clinic("CLINIC001", "dup")).await.unwrap_err();
        assert!(err.is_conflict());

        let wrong = InMemoryStore::load_snapshot("doctor", &path).await;
        assert!(matches!(wrong, Err(RecordError::ValidationFailure(_))));
    }
}
