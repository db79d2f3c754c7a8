// ============================================================================
// src/executor/query.rs - Filter + sort over a store snapshot
// ============================================================================

use super::sort::{SortExecutor, SortKey, SortOrder};
use crate::core::{Entity, Result};
use crate::filter::{FilterCriteria, Predicate, PredicateComposer};
use crate::storage::{KindSchema, Store};
use std::collections::HashMap;
use std::sync::Arc;

/// Runs criteria queries against one kind's store.
///
/// Read-only and lock-free from the caller's side: each call takes its own
/// snapshot with `find_all`, so concurrent queries never see each other or
/// partial writes.
#[derive(Clone)]
pub struct CollectionQueryExecutor {
    schema: Arc<KindSchema>,
    store: Arc<dyn Store>,
}

impl CollectionQueryExecutor {
    pub fn new(schema: Arc<KindSchema>, store: Arc<dyn Store>) -> Self {
        Self { schema, store }
    }

    pub fn schema(&self) -> &KindSchema {
        &self.schema
    }

    /// Filter, then optionally sort.
    ///
    /// An unrecognized `sort_field` leaves the filtered order as is. A
    /// `"desc"` `sort_order` reverses the final sequence.
    pub async fn query(
        &self,
        criteria: &FilterCriteria,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<Entity>> {
        let predicate = PredicateComposer::new(&self.schema).build(criteria)?;
        let snapshot = self.store.find_all().await?;
        let scanned = snapshot.len();

        let survivors = Self::execute_filter(snapshot, &predicate);
        tracing::debug!(
            kind = self.schema.kind(),
            scanned,
            clauses = predicate.clauses().len(),
            matched = survivors.len(),
            "collection filtered"
        );

        let sorted = match sort_field {
            Some(field) => self.execute_sort(survivors, field),
            None => survivors,
        };

        Ok(SortExecutor::apply_order(sorted, SortOrder::parse(sort_order)))
    }

    /// Same as [`query`](Self::query), with criteria taken from raw request
    /// parameters.
    pub async fn query_params(
        &self,
        params: &HashMap<String, String>,
        sort_field: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Vec<Entity>> {
        let criteria = FilterCriteria::from_params(&self.schema, params)?;
        self.query(&criteria, sort_field, sort_order).await
    }

    /// Stable filter: survivors keep their snapshot order.
    fn execute_filter(snapshot: Vec<Entity>, predicate: &Predicate) -> Vec<Entity> {
        if predicate.is_identity() {
            return snapshot;
        }
        snapshot.into_iter().filter(|e| predicate.evaluate(e)).collect()
    }

    fn execute_sort(&self, entities: Vec<Entity>, field: &str) -> Vec<Entity> {
        match self.schema.find_sort(field) {
            Some(binding) => {
                tracing::debug!(kind = self.schema.kind(), field, "sorting results");
                SortExecutor::sort(entities, &SortKey::new(binding.clone()))
            }
            None => {
                tracing::debug!(kind = self.schema.kind(), field, "unrecognized sort field ignored");
                entities
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;
    use crate::storage::InMemoryStore;

    fn schema() -> Arc<KindSchema> {
        Arc::new(
            KindSchema::new("clinic")
                .exact("clinicType", "clinicType")
                .substring("clinicName", "clinicName")
                .sort_text("clinicName", "clinicName"),
        )
    }

    async fn seeded() -> CollectionQueryExecutor {
        let store = Arc::new(InMemoryStore::new("clinic"));
        for (name, kind) in [("Lotus", "Dental"), ("Apollo", "General"), ("Smile", "Dental")] {
            store
                .save(
                    Entity::default()
                        .with_field("clinicName", name)
                        .with_field("clinicType", kind),
                )
                .await
                .unwrap();
        }
        CollectionQueryExecutor::new(schema(), store)
    }

    fn names(entities: &[Entity]) -> Vec<&str> {
        entities
            .iter()
            .filter_map(|e| e.get("clinicName").and_then(Value::as_str))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_criteria_returns_store_order() {
        let executor = seeded().await;
        let all = executor.query(&FilterCriteria::new(), None, None).await.unwrap();
        assert_eq!(names(&all), vec!["Lotus", "Apollo", "Smile"]);
    }

    #[tokio::test]
    async fn test_filter_then_sort() {
        let executor = seeded().await;
        let criteria = FilterCriteria::new().text("clinicType", "dental");
        let rows = executor.query(&criteria, Some("clinicName"), None).await.unwrap();
        assert_eq!(names(&rows), vec!["Lotus", "Smile"]);

        let rows = executor.query(&criteria, Some("clinicName"), Some("desc")).await.unwrap();
        assert_eq!(names(&rows), vec!["Smile", "Lotus"]);
    }

    #[tokio::test]
    async fn test_unknown_sort_field_is_noop() {
        let executor = seeded().await;
        let rows = executor.query(&FilterCriteria::new(), Some("rating"), None).await.unwrap();
        assert_eq!(names(&rows), vec!["Lotus", "Apollo", "Smile"]);
    }

    #[tokio::test]
    async fn test_desc_without_sort_field_reverses_store_order() {
        let executor = seeded().await;
        let rows = executor.query(&FilterCriteria::new(), None, Some("desc")).await.unwrap();
        assert_eq!(names(&rows), vec!["Smile", "Apollo", "Lotus"]);
    }

    #[tokio::test]
    async fn test_query_params() {
        let executor = seeded().await;
        let params = HashMap::from([
            ("clinicName".to_string(), "o".to_string()),
            ("page".to_string(), "2".to_string()),
        ]);
        let rows = executor.query_params(&params, Some("clinicName"), None).await.unwrap();
        assert_eq!(names(&rows), vec!["Apollo", "Lotus"]);
    }
}
