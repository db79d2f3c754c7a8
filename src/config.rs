use crate::allocator::IdentityStrategy;
use crate::core::Value;
use crate::storage::KindSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything the record core needs to know about one entity kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KindConfig {
    /// Criterion and sort bindings.
    #[serde(flatten)]
    pub schema: KindSchema,

    #[serde(default = "default_strategy")]
    pub strategy: IdentityStrategy,

    /// Dotted paths that must be present and non-blank on create.
    #[serde(default)]
    pub required: Vec<String>,

    /// Values applied on create to absent paths.
    #[serde(default, serialize_with = "plain_json", deserialize_with = "json_values")]
    pub defaults: BTreeMap<String, Value>,

    /// Stamp `audit.createdAt` / `audit.updatedAt`.
    #[serde(default)]
    pub audit: bool,
}

fn default_strategy() -> IdentityStrategy {
    IdentityStrategy::Manual
}

fn plain_json<S>(values: &BTreeMap<String, Value>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(values.iter().map(|(k, v)| (k, v.to_json())))
}

fn json_values<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(k, v)| (k, Value::from_json(v)))
        .collect())
}

impl KindConfig {
    pub fn new(schema: KindSchema) -> Self {
        Self {
            schema,
            strategy: IdentityStrategy::Manual,
            required: Vec::new(),
            defaults: BTreeMap::new(),
            audit: false,
        }
    }

    pub fn kind(&self) -> &str {
        self.schema.kind()
    }

    pub fn strategy(mut self, strategy: IdentityStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn require(mut self, path: &str) -> Self {
        if !self.required.iter().any(|p| p == path) {
            self.required.push(path.to_string());
        }
        self
    }

    pub fn default_value(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.defaults.insert(path.to_string(), value.into());
        self
    }

    pub fn audited(mut self) -> Self {
        self.audit = true;
        self
    }
}

/// Database-level configuration.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// Directory for durable state. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Location of the counter file, when durable.
    pub fn counter_path(&self) -> Option<PathBuf> {
        self.data_dir.as_ref().map(|dir| dir.join("counters.json"))
    }
}
