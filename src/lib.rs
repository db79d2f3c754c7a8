// ============================================================================
// clinicstore - record core for clinic resources
// ============================================================================

//! Criteria queries and business identifier allocation for clinic records.
//!
//! Each entity kind is described declaratively by a [`KindConfig`]: which
//! criteria it accepts and which matcher each one uses, which fields it can be
//! sorted by, and how its human-readable identifiers are minted. A
//! [`RecordDb`] turns a [`Catalog`] of kinds into ready-to-use
//! [`Collection`]s.
//!
//! ```no_run
//! use clinicstore::{DbConfig, FilterCriteria, RecordDb};
//! use serde_json::json;
//!
//! # async fn run() -> clinicstore::Result<()> {
//! let db = RecordDb::open(DbConfig::new().data_dir("./data")).await?;
//! let clinics = db.collection("clinic")?;
//!
//! let created = clinics
//!     .create(clinics.document(json!({ "clinicName": "Sunrise", "clinicType": "Dental" }))?)
//!     .await?;
//! assert_eq!(created.business_id(), Some("CLINIC001"));
//!
//! let dental = clinics
//!     .query(&FilterCriteria::new().text("clinicType", "dental"), Some("clinicName"), None)
//!     .await?;
//! # let _ = dental;
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod config;
pub mod core;
pub mod evaluator;
pub mod executor;
pub mod facade;
pub mod filter;
pub mod kinds;
pub mod storage;

pub use allocator::{IdentityAllocator, IdentityStrategy};
pub use config::{DbConfig, KindConfig};
pub use core::{Entity, EntityKey, FieldSource, Fields, RecordError, Result, Value};
pub use evaluator::MatcherKind;
pub use executor::{CollectionQueryExecutor, SortOrder};
pub use facade::{Collection, RecordDb};
pub use filter::{Criterion, FilterCriteria, Predicate, PredicateComposer};
pub use storage::{
    Catalog, Counter, FileCounter, InMemoryCounter, InMemoryStore, KindSchema, SortKind, Store,
};
