use crate::allocator::{IdentityAllocator, IdentityStrategy};
use crate::config::KindConfig;
use crate::core::{Entity, EntityKey, RecordError, Result, Value};
use crate::executor::CollectionQueryExecutor;
use crate::filter::FilterCriteria;
use crate::storage::{KindSchema, Store};
use chrono::{SecondsFormat, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const CREATED_AT: &str = "audit.createdAt";
const UPDATED_AT: &str = "audit.updatedAt";
const CREATED_BY: &str = "audit.createdBy";
const SYSTEM_USER: &str = "SYSTEM_ADMIN";

/// CRUD, identifier allocation and criteria queries for one entity kind.
#[derive(Clone)]
pub struct Collection {
    config: Arc<KindConfig>,
    store: Arc<dyn Store>,
    allocator: IdentityAllocator,
    executor: CollectionQueryExecutor,
}

impl Collection {
    pub fn new(config: KindConfig, store: Arc<dyn Store>, allocator: IdentityAllocator) -> Self {
        let schema = Arc::new(config.schema.clone());
        Self {
            executor: CollectionQueryExecutor::new(schema, store.clone()),
            config: Arc::new(config),
            store,
            allocator,
        }
    }

    pub fn kind(&self) -> &str {
        self.config.kind()
    }

    pub fn config(&self) -> &KindConfig {
        &self.config
    }

    pub fn schema(&self) -> &KindSchema {
        &self.config.schema
    }

    /// Parse a JSON document of this kind, lifting out the business id field.
    pub fn document(&self, json: serde_json::Value) -> Result<Entity> {
        Entity::from_json(json, self.schema().business_id_name())
    }

    pub fn to_document(&self, entity: &Entity) -> serde_json::Value {
        entity.to_json(self.schema().business_id_name())
    }

    /// Insert a new entity.
    ///
    /// Required fields are checked before any identifier is allocated, so a
    /// rejected entity never consumes a sequence value. A store `Conflict`
    /// is returned as is; nothing is retried or regenerated.
    pub async fn create(&self, mut entity: Entity) -> Result<Entity> {
        entity.clear_key();
        self.validate(&entity)?;

        for (path, value) in &self.config.defaults {
            if entity.get(path).is_none() {
                entity.set_path(path, value.clone());
            }
        }
        if self.config.audit {
            entity.set_path(CREATED_AT, Value::Text(timestamp()));
            if entity.get(CREATED_BY).is_none_or(Value::is_blank) {
                entity.set_path(CREATED_BY, Value::from(SYSTEM_USER));
            }
        }

        self.assign_business_id(&mut entity).await?;

        match self.store.save(entity).await {
            Ok(saved) => {
                tracing::info!(kind = self.kind(), key = ?saved.key(), business_id = ?saved.business_id(), "entity created");
                Ok(saved)
            }
            Err(e) => {
                if e.is_conflict() {
                    tracing::warn!(kind = self.kind(), error = %e, "create rejected by uniqueness constraint");
                }
                Err(e)
            }
        }
    }

    pub async fn get(&self, key: &EntityKey) -> Result<Entity> {
        self.store
            .find_by_id(key)
            .await?
            .ok_or_else(|| RecordError::not_found(self.kind(), key.as_str()))
    }

    /// Replace every field of an existing entity.
    ///
    /// The internal key is kept. A business id, once assigned, cannot change;
    /// an entity that has none yet takes the supplied one, subject to the
    /// store's uniqueness check. A concurrent delete makes this `NotFound`.
    pub async fn update(&self, key: &EntityKey, changes: Entity) -> Result<Entity> {
        let mut current = self.get(key).await?;

        if changes.has_business_id()
            && let Some(requested) = changes.business_id()
        {
            if !current.has_business_id() {
                current.set_business_id(requested.to_string());
            } else if current.business_id() != Some(requested) {
                return Err(RecordError::ValidationFailure(format!(
                    "{} {} already has business id '{}', cannot change it to '{}'",
                    self.kind(),
                    key,
                    current.business_id().unwrap_or_default(),
                    requested
                )));
            }
        }

        let created_at = current.get(CREATED_AT).cloned();
        let created_by = current.get(CREATED_BY).cloned();
        current.replace_fields(changes.fields().clone());
        self.validate(&current)?;

        if self.config.audit {
            if let Some(created_at) = created_at {
                current.set_path(CREATED_AT, created_at);
            }
            if let Some(created_by) = created_by {
                current.set_path(CREATED_BY, created_by);
            }
            current.set_path(UPDATED_AT, Value::Text(timestamp()));
        }

        let saved = self.store.save(current).await.inspect_err(|e| {
            if e.is_conflict() {
                tracing::warn!(kind = self.kind(), %key, error = %e, "update rejected by uniqueness constraint");
            }
        })?;
        tracing::info!(kind = self.kind(), %key, "entity updated");
        Ok(saved)
    }

    pub async fn delete(&self, key: &EntityKey) -> Result<()> {
        if !self.store.exists_by_id(key).await? {
            return Err(RecordError::not_found(self.kind(), key.as_str()));
        }
        self.store.delete_by_id(key).await?;
        tracing::info!(kind = self.kind(), %key, "entity deleted");
        Ok(())
    }

    pub async fn count(&self) -> Result<usize> {
        self.store.count().await
    }

    pub async fn exists(&self, key: &EntityKey) -> Result<bool> {
        self.store.exists_by_id(key).await
    }

    /// Field lookup. The business id field is answered from the store's
    /// unique index, since the id is not kept among the other fields.
    pub async fn exists_by_field(&self, name: &str, value: impl Into<Value>) -> Result<bool> {
        let value = value.into();
        if Some(name) == self.schema().business_id_name() {
            return match value {
                Value::Text(id) => self.store.exists_by_business_id(&id).await,
                _ => Ok(false),
            };
        }
        self.store.exists_by_field(name, &value).await
    }

    pub async fn query(
        &self,
        criteria: &FilterCriteria,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<Entity>> {
        self.executor.query(criteria, sort_field, sort_order).await
    }

    pub async fn query_params(
        &self,
        params: &HashMap<String, String>,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<Entity>> {
        self.executor.query_params(params, sort_field, sort_order).await
    }

    fn validate(&self, entity: &Entity) -> Result<()> {
        let id_field = self.schema().business_id_name();
        let missing: Vec<&str> = self
            .config
            .required
            .iter()
            .map(String::as_str)
            .filter(|path| {
                if Some(*path) == id_field {
                    !entity.has_business_id()
                } else {
                    entity.get(path).is_none_or(Value::is_blank)
                }
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RecordError::ValidationFailure(format!(
                "{} is missing required field(s): {}",
                self.kind(),
                missing.join(", ")
            )))
        }
    }

    async fn assign_business_id(&self, entity: &mut Entity) -> Result<()> {
        let strategy = &self.config.strategy;
        if matches!(strategy, IdentityStrategy::Manual)
            || (strategy.keeps_supplied_id() && entity.has_business_id())
        {
            return Ok(());
        }

        if let Some(id) = self.allocator.allocate(strategy).await? {
            if let Some(supplied) = entity.business_id().filter(|_| entity.has_business_id()) {
                tracing::debug!(kind = self.kind(), supplied, allocated = %id, "supplied business id replaced");
            }
            entity.set_business_id(id);
        }
        Ok(())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
