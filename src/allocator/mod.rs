//! Business identifier allocation.
//!
//! Two strategies exist and a kind uses exactly one of them:
//!
//! - **Sequential** increments a durable named counter and formats
//!   `prefix + zero-padded value`. Ids are unique and monotonic for the
//!   lifetime of the counter; a value whose entity is never stored is
//!   simply skipped.
//! - **Random** draws an uppercase alphanumeric token. The allocator never
//!   checks for collisions; the store's uniqueness constraint is the only
//!   guard, and its `Conflict` reaches the caller unchanged.

pub mod random;
pub mod sequential;

pub use random::{TOKEN_ALPHABET, random_token};
pub use sequential::format_sequential;

use crate::core::Result;
use crate::storage::Counter;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How a kind obtains its business identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStrategy {
    Sequential {
        counter: String,
        prefix: String,
        width: usize,
    },
    Random {
        prefix: String,
        token_length: usize,
    },
    /// Ids come from the caller.
    Manual,
}

impl IdentityStrategy {
    pub fn sequential(counter: &str, prefix: &str, width: usize) -> Self {
        Self::Sequential {
            counter: counter.to_string(),
            prefix: prefix.to_string(),
            width,
        }
    }

    pub fn random(prefix: &str, token_length: usize) -> Self {
        Self::Random {
            prefix: prefix.to_string(),
            token_length,
        }
    }

    /// Whether an id the caller already supplied survives allocation.
    pub fn keeps_supplied_id(&self) -> bool {
        !matches!(self, Self::Sequential { .. })
    }
}

/// Mints business identifiers against a shared [`Counter`].
#[derive(Clone)]
pub struct IdentityAllocator {
    counter: Arc<dyn Counter>,
}

impl IdentityAllocator {
    pub fn new(counter: Arc<dyn Counter>) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &Arc<dyn Counter> {
        &self.counter
    }

    /// `prefix` + the next value of `counter_name`, zero-padded to `width`.
    pub async fn allocate_sequential(&self, counter_name: &str, prefix: &str, width: usize) -> Result<String> {
        let id = sequential::next_sequential(self.counter.as_ref(), counter_name, prefix, width).await?;
        tracing::info!(counter = counter_name, id = %id, "sequential id allocated");
        Ok(id)
    }

    /// `prefix` + a fresh random token from the thread-local generator.
    pub fn allocate_random(&self, prefix: &str, token_length: usize) -> String {
        self.allocate_random_with(&mut rand::thread_rng(), prefix, token_length)
    }

    /// Same as [`allocate_random`](Self::allocate_random) with a caller-chosen
    /// generator.
    pub fn allocate_random_with<R: Rng>(&self, rng: &mut R, prefix: &str, token_length: usize) -> String {
        let id = format!("{prefix}{}", random_token(rng, token_length));
        tracing::info!(id = %id, "random id allocated");
        id
    }

    /// Allocate according to `strategy`. `Manual` allocates nothing.
    pub async fn allocate(&self, strategy: &IdentityStrategy) -> Result<Option<String>> {
        match strategy {
            IdentityStrategy::Sequential { counter, prefix, width } => {
                self.allocate_sequential(counter, prefix, *width).await.map(Some)
            }
            IdentityStrategy::Random { prefix, token_length } => {
                Ok(Some(self.allocate_random(prefix, *token_length)))
            }
            IdentityStrategy::Manual => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordError;
    use crate::storage::InMemoryCounter;
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl Counter for Unreachable {
        async fn next(&self, _name: &str) -> Result<u64> {
            Err(RecordError::Io(std::io::Error::other("connection refused")))
        }

        async fn current(&self, _name: &str) -> Result<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_sequential_from_seeded_counter() {
        let counter = Arc::new(InMemoryCounter::new());
        counter.seed("clinic_sequence", 6).unwrap();
        let allocator = IdentityAllocator::new(counter.clone());

        let id = allocator.allocate_sequential("clinic_sequence", "CLINIC", 3).await.unwrap();
        assert_eq!(id, "CLINIC007");
        assert_eq!(counter.current("clinic_sequence").await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_unreachable_counter_is_allocation_unavailable() {
        let allocator = IdentityAllocator::new(Arc::new(Unreachable));
        let err = allocator
            .allocate(&IdentityStrategy::sequential("clinic_sequence", "CLINIC", 3))
            .await
            .unwrap_err();
        match err {
            RecordError::AllocationUnavailable { counter, reason } => {
                assert_eq!(counter, "clinic_sequence");
                assert!(reason.contains("connection refused"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_random_shape_and_manual() {
        let allocator = IdentityAllocator::new(Arc::new(InMemoryCounter::new()));
        let id = allocator
            .allocate(&IdentityStrategy::random("PAT-", 6))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(id.len(), 10);
        assert!(id.starts_with("PAT-"));
        assert!(id[4..].bytes().all(|b| TOKEN_ALPHABET.contains(&b)));

        assert_eq!(allocator.allocate(&IdentityStrategy::Manual).await.unwrap(), None);
    }

    #[test]
    fn test_strategy_serde_shape() {
        let json = serde_json::to_value(IdentityStrategy::random("PAT-", 6)).unwrap();
        assert_eq!(json, serde_json::json!({ "random": { "prefix": "PAT-", "token_length": 6 } }));
        let manual: IdentityStrategy = serde_json::from_value(serde_json::json!("manual")).unwrap();
        assert_eq!(manual, IdentityStrategy::Manual);
    }
}
