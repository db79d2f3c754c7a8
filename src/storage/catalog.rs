use crate::config::KindConfig;
use crate::core::{RecordError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Kind configurations by name.
///
/// Immutable once built: registering a kind returns a new catalog and leaves
/// the old one as it was, so a catalog can be cloned and shared freely.
#[derive(Clone, Default)]
pub struct Catalog {
    kinds: Arc<HashMap<String, KindConfig>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The seven clinic resource kinds.
    pub fn builtin() -> Self {
        crate::kinds::all()
            .into_iter()
            .fold(Self::new(), |catalog, config| catalog.with_kind_replaced(config))
    }

    /// Register a kind. Fails if the name is taken.
    pub fn with_kind(self, config: KindConfig) -> Result<Self> {
        if self.kinds.contains_key(config.kind()) {
            return Err(RecordError::ValidationFailure(format!(
                "kind '{}' is already registered",
                config.kind()
            )));
        }
        Ok(self.with_kind_replaced(config))
    }

    /// Register a kind, replacing any previous definition.
    pub fn with_kind_replaced(self, config: KindConfig) -> Self {
        let mut kinds = (*self.kinds).clone();
        kinds.insert(config.kind().to_string(), config);
        Self {
            kinds: Arc::new(kinds),
        }
    }

    /// Merge kinds from a JSON array of kind configurations. Kinds already
    /// present are overridden.
    pub fn from_json(self, json: &str) -> Result<Self> {
        let configs: Vec<KindConfig> = serde_json::from_str(json)?;
        Ok(configs
            .into_iter()
            .fold(self, |catalog, config| catalog.with_kind_replaced(config)))
    }

    pub fn get(&self, kind: &str) -> Result<&KindConfig> {
        self.kinds
            .get(kind)
            .ok_or_else(|| RecordError::not_found("kind", kind))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    pub fn list_kinds(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.kinds.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
