// ============================================================================
// src/executor/sort.rs - Result ordering
// ============================================================================
//
// - Single-field, type-aware ascending comparator (text folds case)
// - Stable sort: entities with equal keys keep their snapshot order
// - Missing values sort after present ones
// - Descending output is the ascending output reversed as a whole, so tie
//   groups come out in reverse block order
//
// ============================================================================

use crate::core::{Entity, Value};
use crate::evaluator::plugins::comparison::fold;
use crate::storage::{SortBinding, SortKind};
use chrono::NaiveDate;
use std::cmp::Ordering;

// ============================================================================
// SORT ORDER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    /// Reverse the final sequence.
    Descending,
}

impl SortOrder {
    /// `"desc"` in any case means descending; anything else, including no
    /// value at all, is ascending.
    pub fn parse(order: Option<&str>) -> Self {
        match order {
            Some(o) if o.trim().eq_ignore_ascii_case("desc") => Self::Descending,
            _ => Self::Ascending,
        }
    }

    pub fn is_descending(self) -> bool {
        self == Self::Descending
    }
}

/// Where entities without a sort value go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    NullsFirst,
    NullsLast,
}

// ============================================================================
// SORT KEY
// ============================================================================

/// Extracted, comparable sort value of one entity.
#[derive(Debug, Clone, PartialEq)]
enum SortValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SortKey {
    pub binding: SortBinding,
    pub null_ordering: NullOrdering,
}

impl SortKey {
    pub fn new(binding: SortBinding) -> Self {
        Self {
            binding,
            null_ordering: NullOrdering::NullsLast,
        }
    }

    pub fn with_null_ordering(binding: SortBinding, null_ordering: NullOrdering) -> Self {
        Self { binding, null_ordering }
    }

    fn extract(&self, entity: &Entity) -> Option<SortValue> {
        let source = &self.binding.source;
        match self.binding.kind {
            SortKind::Text => source.text(entity).map(|s| SortValue::Text(fold(s))),
            SortKind::Numeric => source.value(entity).and_then(Value::as_f64).map(SortValue::Number),
            SortKind::Date => source.value(entity).and_then(Value::as_date).map(SortValue::Date),
            SortKind::Boolean => source.value(entity).and_then(Value::as_bool).map(SortValue::Bool),
        }
    }

    fn compare(&self, a: &Option<SortValue>, b: &Option<SortValue>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => match self.null_ordering {
                NullOrdering::NullsFirst => Ordering::Less,
                NullOrdering::NullsLast => Ordering::Greater,
            },
            (Some(_), None) => match self.null_ordering {
                NullOrdering::NullsFirst => Ordering::Greater,
                NullOrdering::NullsLast => Ordering::Less,
            },
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

// ============================================================================
// SORT EXECUTOR
// ============================================================================

pub struct SortExecutor;

impl SortExecutor {
    /// Stable ascending sort by `key`. Each entity's value is extracted once.
    pub fn sort(entities: Vec<Entity>, key: &SortKey) -> Vec<Entity> {
        if entities.len() < 2 {
            return entities;
        }

        let mut decorated: Vec<(Option<SortValue>, Entity)> = entities
            .into_iter()
            .map(|e| (key.extract(&e), e))
            .collect();
        decorated.sort_by(|(a, _), (b, _)| key.compare(a, b));
        decorated.into_iter().map(|(_, e)| e).collect()
    }

    /// Apply the requested order to an already sorted (or unsorted) sequence.
    pub fn apply_order(mut entities: Vec<Entity>, order: SortOrder) -> Vec<Entity> {
        if order.is_descending() {
            entities.reverse();
        }
        entities
    }
}
