use super::{Fields, RecordError, Result, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage-internal key. Minted by the store, never by callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey(String);

impl EntityKey {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored record: internal key, optional business identifier and fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Entity {
    key: Option<EntityKey>,
    business_id: Option<String>,
    fields: Fields,
}

impl Entity {
    pub fn new(fields: Fields) -> Self {
        Self {
            key: None,
            business_id: None,
            fields,
        }
    }

    /// Build an entity from a JSON object.
    ///
    /// `business_id_field`, when given, is lifted out of the object into the
    /// business identifier slot.
    pub fn from_json(json: serde_json::Value, business_id_field: Option<&str>) -> Result<Self> {
        let Value::Record(mut fields) = Value::from_json(json) else {
            return Err(RecordError::ValidationFailure(
                "entity document must be a JSON object".into(),
            ));
        };

        let business_id = match business_id_field {
            Some(name) => match fields.remove(name) {
                Some(Value::Text(id)) => Some(id),
                Some(Value::Null) | None => None,
                Some(other) => {
                    return Err(RecordError::TypeMismatch(format!(
                        "business id '{}' must be TEXT, got {}",
                        name,
                        other.type_name()
                    )));
                }
            },
            None => None,
        };

        Ok(Self {
            key: None,
            business_id,
            fields,
        })
    }

    pub fn to_json(&self, business_id_field: Option<&str>) -> serde_json::Value {
        let mut json = Value::Record(self.fields.clone()).to_json();
        if let (Some(name), Some(id), Some(map)) =
            (business_id_field, &self.business_id, json.as_object_mut())
        {
            map.insert(name.to_string(), serde_json::Value::String(id.clone()));
        }
        json
    }

    pub fn with_business_id(mut self, id: impl Into<String>) -> Self {
        self.business_id = Some(id.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> Option<&EntityKey> {
        self.key.as_ref()
    }

    pub(crate) fn set_key(&mut self, key: EntityKey) {
        self.key = Some(key);
    }

    pub(crate) fn clear_key(&mut self) {
        self.key = None;
    }

    pub fn business_id(&self) -> Option<&str> {
        self.business_id.as_deref()
    }

    /// Missing or blank business ids both count as unassigned.
    pub fn has_business_id(&self) -> bool {
        self.business_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }

    pub(crate) fn set_business_id(&mut self, id: String) {
        self.business_id = Some(id);
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub(crate) fn replace_fields(&mut self, fields: Fields) {
        self.fields = fields;
    }

    /// Resolve a dotted path through nested records.
    ///
    /// `Null` is reported as absent. Lists are not traversed; use
    /// [`Entity::collect`] for paths that fan out over list elements.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.fields.get(first)?;
        for segment in segments {
            current = current.as_record()?.get(segment)?;
        }
        (!current.is_null()).then_some(current)
    }

    /// Collect every value reachable by a dotted path.
    ///
    /// A list met along the way is flattened: the remaining path is applied
    /// to each element, and a list at the end of the path contributes its
    /// elements. Returns `None` when nothing non-null is reachable.
    pub fn collect(&self, path: &str) -> Option<Vec<&Value>> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut out = Vec::new();
        let (first, rest) = segments.split_first()?;
        collect_into(self.fields.get(*first)?, rest, &mut out);
        (!out.is_empty()).then_some(out)
    }

    /// Set a dotted path, creating intermediate records as needed.
    pub(crate) fn set_path(&mut self, path: &str, value: Value) {
        set_path_in(&mut self.fields, path, value);
    }
}

/// Where a declared field reads its value from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// The business identifier slot.
    BusinessId,
    /// A dotted field path.
    Path(String),
}

impl FieldSource {
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub fn text<'a>(&self, entity: &'a Entity) -> Option<&'a str> {
        match self {
            Self::BusinessId => entity.business_id(),
            Self::Path(path) => entity.get(path).and_then(Value::as_str),
        }
    }

    /// Scalar value at the source. The business id is not a field value.
    pub fn value<'a>(&self, entity: &'a Entity) -> Option<&'a Value> {
        match self {
            Self::BusinessId => None,
            Self::Path(path) => entity.get(path),
        }
    }

    pub fn values<'a>(&self, entity: &'a Entity) -> Option<Vec<&'a Value>> {
        match self {
            Self::BusinessId => None,
            Self::Path(path) => entity.collect(path),
        }
    }
}

fn collect_into<'a>(value: &'a Value, rest: &[&str], out: &mut Vec<&'a Value>) {
    match (value, rest.split_first()) {
        (Value::Null, _) => {}
        (Value::List(items), _) => {
            for item in items {
                collect_into(item, rest, out);
            }
        }
        (_, None) => out.push(value),
        (Value::Record(fields), Some((head, tail))) => {
            if let Some(next) = fields.get(*head) {
                collect_into(next, tail, out);
            }
        }
        _ => {}
    }
}

fn set_path_in(fields: &mut Fields, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            fields.insert(path.to_string(), value);
        }
        Some((head, tail)) => {
            let slot = fields
                .entry(head.to_string())
                .or_insert_with(|| Value::Record(Fields::new()));
            if !matches!(slot, Value::Record(_)) {
                *slot = Value::Record(Fields::new());
            }
            if let Value::Record(inner) = slot {
                set_path_in(inner, tail, value);
            }
        }
    }
}
