use crate::core::value::parse_date;
use crate::core::{RecordError, Result, Value};
use crate::evaluator::MatcherKind;
use crate::storage::KindSchema;
use std::collections::BTreeMap;

/// One criterion value. What it means is decided by the matcher bound to
/// its field name.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Text(String),
    Range {
        min: Option<Value>,
        max: Option<Value>,
    },
    Flag(bool),
}

impl Criterion {
    /// Empty criteria are never applied. Whitespace-only text counts as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Range { min, max } => {
                min.as_ref().is_none_or(Value::is_null) && max.as_ref().is_none_or(Value::is_null)
            }
            Self::Flag(_) => false,
        }
    }
}

/// Sparse filter criteria for a single query.
///
/// Absent and empty criteria are dropped on insertion, so a criterion can
/// never exclude a record by being missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    criteria: BTreeMap<String, Criterion>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, name: &str, value: impl Into<String>) -> Self {
        self.with(name, Some(Criterion::Text(value.into())))
    }

    pub fn flag(self, name: &str, value: bool) -> Self {
        self.with(name, Some(Criterion::Flag(value)))
    }

    pub fn between(self, name: &str, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        self.with(
            name,
            Some(Criterion::Range {
                min: Some(min.into()),
                max: Some(max.into()),
            }),
        )
    }

    /// Set the lower bound of a range criterion, keeping any upper bound.
    pub fn min(mut self, name: &str, min: impl Into<Value>) -> Self {
        self.merge_bound(name, Some(min.into()), None);
        self
    }

    /// Set the upper bound of a range criterion, keeping any lower bound.
    pub fn max(mut self, name: &str, max: impl Into<Value>) -> Self {
        self.merge_bound(name, None, Some(max.into()));
        self
    }

    /// Insert an optional criterion; `None` and empty values are skipped.
    pub fn with(mut self, name: &str, criterion: Option<Criterion>) -> Self {
        self.insert(name, criterion);
        self
    }

    pub fn insert(&mut self, name: &str, criterion: Option<Criterion>) {
        match criterion {
            Some(c) if !c.is_empty() => {
                self.criteria.insert(name.to_string(), c);
            }
            _ => {
                self.criteria.remove(name);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Criterion> {
        self.criteria.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.criteria.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    fn merge_bound(&mut self, name: &str, min: Option<Value>, max: Option<Value>) {
        let (old_min, old_max) = match self.criteria.remove(name) {
            Some(Criterion::Range { min, max }) => (min, max),
            _ => (None, None),
        };
        self.insert(
            name,
            Some(Criterion::Range {
                min: min.or(old_min),
                max: max.or(old_max),
            }),
        );
    }

    /// Build criteria from raw request parameters.
    ///
    /// A parameter named after a filter binding becomes a text or flag
    /// criterion (a range binding gets an exact `[v, v]` range). Parameters
    /// `minX` / `maxX` set the bounds of the range binding `x`. Blank values
    /// and unknown names are ignored.
    pub fn from_params<I, K, V>(schema: &KindSchema, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut criteria = Self::new();

        for (name, raw) in params {
            let (name, raw) = (name.as_ref(), raw.as_ref());
            if raw.trim().is_empty() {
                continue;
            }

            if let Some(binding) = schema.find_filter(name) {
                let criterion = match binding.matcher {
                    MatcherKind::BoolEq => Criterion::Flag(parse_flag(name, raw)?),
                    MatcherKind::Range => {
                        let v = parse_bound(name, raw)?;
                        Criterion::Range {
                            min: Some(v.clone()),
                            max: Some(v),
                        }
                    }
                    _ => Criterion::Text(raw.to_string()),
                };
                criteria.insert(name, Some(criterion));
                continue;
            }

            match range_param(schema, name) {
                Some((field, true)) => criteria.merge_bound(&field, Some(parse_bound(name, raw)?), None),
                Some((field, false)) => criteria.merge_bound(&field, None, Some(parse_bound(name, raw)?)),
                None => tracing::debug!(param = name, kind = schema.kind(), "ignoring unknown filter parameter"),
            }
        }

        Ok(criteria)
    }
}

/// `minFee` -> ("fee", true), `maxExperience` -> ("experience", false), when
/// the derived name is a range binding.
fn range_param(schema: &KindSchema, name: &str) -> Option<(String, bool)> {
    let (rest, is_min) = if let Some(rest) = name.strip_prefix("min") {
        (rest, true)
    } else if let Some(rest) = name.strip_prefix("max") {
        (rest, false)
    } else {
        return None;
    };

    let mut chars = rest.chars();
    let first = chars.next()?;
    let field: String = first.to_lowercase().chain(chars).collect();

    let binding = schema.find_filter(&field)?;
    (binding.matcher == MatcherKind::Range).then_some((field, is_min))
}

pub(crate) fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(RecordError::ValidationFailure(format!(
            "parameter '{}' expects true or false, got '{}'",
            name, raw
        ))),
    }
}

/// Numbers first, then ISO dates.
pub(crate) fn parse_bound(name: &str, raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Value::Integer(i));
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Ok(Value::Float(f));
    }
    parse_date(raw).map(Value::Date).map_err(|_| {
        RecordError::ValidationFailure(format!(
            "parameter '{}' expects a number or YYYY-MM-DD date, got '{}'",
            name, raw
        ))
    })
}
