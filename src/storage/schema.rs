use crate::core::FieldSource;
use crate::evaluator::MatcherKind;
use serde::{Deserialize, Serialize};

/// Declarative filter and sort table for one entity kind.
///
/// Every criterion a caller may use is bound here to a field accessor and a
/// matcher; every recognized sort field is bound to an accessor and a
/// comparator type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindSchema {
    kind: String,
    #[serde(default)]
    business_id_field: Option<String>,
    #[serde(default)]
    filters: Vec<FieldBinding>,
    #[serde(default)]
    sorts: Vec<SortBinding>,
}

/// Binds a criterion name to a field and the matcher applied to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldBinding {
    pub name: String,
    pub source: FieldSource,
    pub matcher: MatcherKind,
}

/// Binds a sort field name to a field and a comparator type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortBinding {
    pub name: String,
    pub source: FieldSource,
    pub kind: SortKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKind {
    /// Case-insensitive lexical order.
    Text,
    Numeric,
    Date,
    Boolean,
}

impl KindSchema {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            business_id_field: None,
            filters: Vec::new(),
            sorts: Vec::new(),
        }
    }

    /// Name under which the business identifier appears in documents.
    pub fn business_id_field(mut self, name: &str) -> Self {
        self.business_id_field = Some(name.to_string());
        self
    }

    pub fn filter(mut self, name: &str, source: FieldSource, matcher: MatcherKind) -> Self {
        self.filters.retain(|b| b.name != name);
        self.filters.push(FieldBinding {
            name: name.to_string(),
            source,
            matcher,
        });
        self
    }

    pub fn sort(mut self, name: &str, source: FieldSource, kind: SortKind) -> Self {
        self.sorts.retain(|b| b.name != name);
        self.sorts.push(SortBinding {
            name: name.to_string(),
            source,
            kind,
        });
        self
    }

    /// Exact match on the business identifier.
    pub fn exact_id(self, name: &str) -> Self {
        self.filter(name, FieldSource::BusinessId, MatcherKind::Exact)
    }

    pub fn exact(self, name: &str, path: &str) -> Self {
        self.filter(name, FieldSource::path(path), MatcherKind::Exact)
    }

    pub fn substring(self, name: &str, path: &str) -> Self {
        self.filter(name, FieldSource::path(path), MatcherKind::Substring)
    }

    pub fn range(self, name: &str, path: &str) -> Self {
        self.filter(name, FieldSource::path(path), MatcherKind::Range)
    }

    pub fn list_contains(self, name: &str, path: &str) -> Self {
        self.filter(name, FieldSource::path(path), MatcherKind::ListContains { exact: false })
    }

    pub fn list_contains_exact(self, name: &str, path: &str) -> Self {
        self.filter(name, FieldSource::path(path), MatcherKind::ListContains { exact: true })
    }

    pub fn flag(self, name: &str, path: &str) -> Self {
        self.filter(name, FieldSource::path(path), MatcherKind::BoolEq)
    }

    pub fn sort_text(self, name: &str, path: &str) -> Self {
        self.sort(name, FieldSource::path(path), SortKind::Text)
    }

    pub fn sort_numeric(self, name: &str, path: &str) -> Self {
        self.sort(name, FieldSource::path(path), SortKind::Numeric)
    }

    pub fn sort_date(self, name: &str, path: &str) -> Self {
        self.sort(name, FieldSource::path(path), SortKind::Date)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn business_id_name(&self) -> Option<&str> {
        self.business_id_field.as_deref()
    }

    pub fn filters(&self) -> &[FieldBinding] {
        &self.filters
    }

    pub fn sorts(&self) -> &[SortBinding] {
        &self.sorts
    }

    pub fn find_filter(&self, name: &str) -> Option<&FieldBinding> {
        self.filters.iter().find(|b| b.name == name)
    }

    pub fn find_sort(&self, name: &str) -> Option<&SortBinding> {
        self.sorts.iter().find(|b| b.name == name)
    }
}
