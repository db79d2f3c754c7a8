pub mod collection;
pub mod database;

pub use collection::Collection;
pub use database::RecordDb;
