pub mod catalog;
pub mod counter;
pub mod engine;
pub mod memory;
pub mod persistence;
pub mod schema;

pub use catalog::Catalog;
pub use counter::{FileCounter, InMemoryCounter};
pub use engine::{Counter, Store};
pub use memory::InMemoryStore;
pub use persistence::{SnapshotManager, StoreSnapshot};
pub use schema::{FieldBinding, KindSchema, SortBinding, SortKind};
