pub mod error;
pub mod types;
pub mod value;

pub use error::{RecordError, Result};
pub use types::{Entity, EntityKey, FieldSource};
pub use value::{Fields, Value};
