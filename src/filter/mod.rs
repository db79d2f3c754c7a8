//! Predicate composition from sparse filter criteria.

pub mod composer;
pub mod criteria;
pub mod predicate;

pub use composer::PredicateComposer;
pub use criteria::{Criterion, FilterCriteria};
pub use predicate::{Clause, Predicate};
