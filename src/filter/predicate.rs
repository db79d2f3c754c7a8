use crate::core::{Entity, FieldSource, Value};
use crate::evaluator::{
    bool_equals, exact_ignore_case, list_contains_ignore_case, range_inclusive,
    substring_ignore_case,
};

/// A single bound matcher: one field, one operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Exact {
        source: FieldSource,
        needle: String,
    },
    Substring {
        source: FieldSource,
        needle: String,
    },
    ListContains {
        source: FieldSource,
        needle: String,
        exact: bool,
    },
    Range {
        source: FieldSource,
        min: Option<Value>,
        max: Option<Value>,
    },
    BoolEq {
        source: FieldSource,
        expected: bool,
    },
}

impl Clause {
    pub fn matches(&self, entity: &Entity) -> bool {
        match self {
            Self::Exact { source, needle } => {
                exact_ignore_case(source.text(entity), Some(needle.as_str()))
            }
            Self::Substring { source, needle } => {
                substring_ignore_case(source.text(entity), needle)
            }
            Self::ListContains { source, needle, exact } => {
                list_contains_ignore_case(source.values(entity), needle, *exact)
            }
            Self::Range { source, min, max } => {
                range_inclusive(source.value(entity), min.as_ref(), max.as_ref())
            }
            Self::BoolEq { source, expected } => {
                bool_equals(source.value(entity).and_then(Value::as_bool), *expected)
            }
        }
    }
}

/// Flat conjunction of clauses. No clauses means every entity passes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// The identity filter.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn evaluate(&self, entity: &Entity) -> bool {
        self.clauses.iter().all(|clause| clause.matches(entity))
    }

    pub fn is_identity(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clinic() -> Entity {
        Entity::default()
            .with_business_id("CLINIC001")
            .with_field("clinicType", "Dental")
            .with_field("services", vec!["Root Canal", "Whitening"])
            .with_field("appointmentRequired", true)
            .with_field("rooms", 4)
    }

    #[test]
    fn test_identity_predicate_accepts_everything() {
        let p = Predicate::always();
        assert!(p.is_identity());
        assert!(p.evaluate(&clinic()));
        assert!(p.evaluate(&Entity::default()));
    }

    #[test]
    fn test_conjunction_requires_every_clause() {
        let p = Predicate::always()
            .and(Clause::Exact {
                source: FieldSource::path("clinicType"),
                needle: "dental".into(),
            })
            .and(Clause::ListContains {
                source: FieldSource::path("services"),
                needle: "canal".into(),
                exact: false,
            });
        assert!(p.evaluate(&clinic()));

        let p = p.and(Clause::BoolEq {
            source: FieldSource::path("appointmentRequired"),
            expected: false,
        });
        assert!(!p.evaluate(&clinic()));
    }

    #[test]
    fn test_business_id_clause() {
        let clause = Clause::Exact {
            source: FieldSource::BusinessId,
            needle: "clinic001".into(),
        };
        assert!(clause.matches(&clinic()));
        assert!(!clause.matches(&Entity::default()));
    }

    #[test]
    fn test_range_clause_on_missing_field() {
        let clause = Clause::Range {
            source: FieldSource::path("beds"),
            min: Some(Value::Integer(1)),
            max: None,
        };
        assert!(!clause.matches(&clinic()));
    }
}
