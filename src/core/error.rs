use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{kind} '{key}' not found")]
    NotFound { kind: String, key: String },

    #[error("Conflict: {kind} with business id '{business_id}' already exists")]
    Conflict { kind: String, business_id: String },

    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    #[error("Identifier allocation unavailable for counter '{counter}': {reason}")]
    AllocationUnavailable { counter: String, reason: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

impl RecordError {
    pub fn not_found(kind: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.into(),
            key: key.into(),
        }
    }

    pub fn conflict(kind: impl Into<String>, business_id: impl Into<String>) -> Self {
        Self::Conflict {
            kind: kind.into(),
            business_id: business_id.into(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;

impl<T> From<std::sync::PoisonError<T>> for RecordError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for RecordError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for RecordError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
