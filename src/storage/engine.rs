use crate::core::{Entity, EntityKey, Result, Value};
use async_trait::async_trait;

/// Persistence collaborator for one entity kind.
///
/// Implementations own the internal key: `save` mints one for an entity that
/// has none. They must enforce uniqueness of the business identifier and
/// report a violation as `RecordError::Conflict`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Full snapshot in store order. The returned entities are copies;
    /// later writes do not show through.
    async fn find_all(&self) -> Result<Vec<Entity>>;

    async fn find_by_id(&self, key: &EntityKey) -> Result<Option<Entity>>;

    /// Insert a keyless entity or replace the one holding the same key.
    /// Returns the entity as stored, key included. A key the store does not
    /// hold is `RecordError::NotFound`, so a stale write cannot bring back a
    /// deleted entity.
    async fn save(&self, entity: Entity) -> Result<Entity>;

    async fn exists_by_id(&self, key: &EntityKey) -> Result<bool>;

    /// Removing an absent key is not an error.
    async fn delete_by_id(&self, key: &EntityKey) -> Result<()>;

    /// Lookup on the unique business-identifier index.
    async fn exists_by_business_id(&self, business_id: &str) -> Result<bool>;

    /// True iff some entity holds `value` at the dotted path `name`.
    async fn exists_by_field(&self, name: &str, value: &Value) -> Result<bool>;

    async fn count(&self) -> Result<usize>;
}

/// Durable named monotonic counters.
#[async_trait]
pub trait Counter: Send + Sync {
    /// Increment `name` and return the new value, as one indivisible step.
    /// A counter that was never used starts from 0, so the first call yields 1.
    async fn next(&self, name: &str) -> Result<u64>;

    /// Current value without incrementing; 0 for an unused counter.
    async fn current(&self, name: &str) -> Result<u64>;
}
