use super::criteria::{Criterion, parse_bound, parse_flag};
use super::predicate::{Clause, Predicate};
use super::FilterCriteria;
use crate::core::{RecordError, Result};
use crate::evaluator::MatcherKind;
use crate::storage::{FieldBinding, KindSchema};

/// Turns sparse criteria into one conjunctive predicate, using the matcher
/// each criterion name is bound to in the kind schema.
pub struct PredicateComposer<'a> {
    schema: &'a KindSchema,
}

impl<'a> PredicateComposer<'a> {
    pub fn new(schema: &'a KindSchema) -> Self {
        Self { schema }
    }

    /// Build the composite predicate.
    ///
    /// Criteria with no binding in the schema are skipped. A criterion whose
    /// value cannot be used by its bound matcher is a type mismatch.
    pub fn build(&self, criteria: &FilterCriteria) -> Result<Predicate> {
        let mut predicate = Predicate::always();

        for (name, criterion) in criteria.iter() {
            if criterion.is_empty() {
                continue;
            }
            let Some(binding) = self.schema.find_filter(name) else {
                tracing::warn!(criterion = name, kind = self.schema.kind(), "no matcher registered, criterion ignored");
                continue;
            };
            predicate = predicate.and(bind(binding, criterion)?);
        }

        Ok(predicate)
    }
}

fn bind(binding: &FieldBinding, criterion: &Criterion) -> Result<Clause> {
    let source = binding.source.clone();

    let clause = match (binding.matcher, criterion) {
        (MatcherKind::Exact, c) => Clause::Exact {
            source,
            needle: text_operand(binding, c)?,
        },
        (MatcherKind::Substring, c) => Clause::Substring {
            source,
            needle: text_operand(binding, c)?,
        },
        (MatcherKind::ListContains { exact }, c) => Clause::ListContains {
            source,
            needle: text_operand(binding, c)?,
            exact,
        },
        (MatcherKind::Range, Criterion::Range { min, max }) => Clause::Range {
            source,
            min: min.clone().filter(|v| !v.is_null()),
            max: max.clone().filter(|v| !v.is_null()),
        },
        (MatcherKind::Range, Criterion::Text(raw)) => {
            let v = parse_bound(&binding.name, raw)?;
            Clause::Range {
                source,
                min: Some(v.clone()),
                max: Some(v),
            }
        }
        (MatcherKind::BoolEq, Criterion::Flag(expected)) => Clause::BoolEq {
            source,
            expected: *expected,
        },
        (MatcherKind::BoolEq, Criterion::Text(raw)) => Clause::BoolEq {
            source,
            expected: parse_flag(&binding.name, raw)?,
        },
        (matcher, c) => return Err(mismatch(binding, matcher, c)),
    };

    Ok(clause)
}

fn text_operand(binding: &FieldBinding, criterion: &Criterion) -> Result<String> {
    match criterion {
        Criterion::Text(text) => Ok(text.clone()),
        Criterion::Flag(flag) => Ok(flag.to_string()),
        c => Err(mismatch(binding, binding.matcher, c)),
    }
}

fn mismatch(binding: &FieldBinding, matcher: MatcherKind, criterion: &Criterion) -> RecordError {
    RecordError::TypeMismatch(format!(
        "criterion '{}' is bound to {} and cannot take {:?}",
        binding.name,
        matcher.name(),
        criterion
    ))
}
