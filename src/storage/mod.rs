use crate::error::{BoardError, Result};
use async_trait::async_trait;

pub mod memory_store;
pub mod repository;
pub mod schema;

#[cfg(feature = "file-storage")]
pub mod file_store;

#[cfg(feature = "sqlite-storage")]
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use repository::{BoardRepository, LoadOrigin, LoadOutcome, LoadWarning};

#[cfg(feature = "file-storage")]
pub use file_store::FileStore;

#[cfg(feature = "sqlite-storage")]
pub use sqlite_store::SqliteStore;

/// String-keyed store holding serialized board payloads.
///
/// Writes overwrite the previous value for the key (last write wins).
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites the value under `key`
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`; removing an absent key is not an error
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Keys double as file names in some backends, so keep them to a safe
/// alphabet: ASCII letters, digits, '.', '_' and '-'.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));

    if valid {
        Ok(())
    } else {
        Err(BoardError::InvalidStorageKey(key.to_string()))
    }
}
