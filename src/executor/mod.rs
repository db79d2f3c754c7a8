pub mod query;
pub mod sort;

pub use query::CollectionQueryExecutor;
pub use sort::{NullOrdering, SortExecutor, SortKey, SortOrder};
