pub mod cache;
pub mod loader;
pub mod record;

pub use cache::load_cached;
pub use loader::{load_dataset, LoadError, DEFAULT_DATA_PATH};
pub use record::{Dataset, FieldValue, Record};
