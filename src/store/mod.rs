//! Store Module
//!
//! Key-value store abstraction used by every data endpoint, with a Redis
//! backend for production and an in-memory backend for development and tests.

mod entry;
mod memory;
mod redis_store;


use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};

// Re-export public types
pub use entry::{current_timestamp_ms, StoreEntry, StoredValue};
pub use memory::MemoryStore;
pub use redis_store::{normalize_redis_url, RedisStore};

// == Public Constants ==
/// Maximum allowed key length in bytes (memory backend)
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes (memory backend)
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB

// == Store Trait ==
/// Operations the gateway needs from a key-value store.
///
/// Every method is a single round trip. Implementations are responsible for
/// per-command atomicity; callers never run multi-key transactions.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the string stored at `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` at `key`, replacing any previous value and expiry.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()>;

    /// Deletes `key`, returning the number of keys removed.
    async fn del(&self, key: &str) -> StoreResult<u64>;

    /// Returns whether `key` is present.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Merges `fields` into the JSON object stored at `key` without touching
    /// its expiry. Returns `false` when the key is absent.
    async fn hset(&self, key: &str, fields: &[(&str, Value)]) -> StoreResult<bool>;

    /// Pushes `value` onto the head of the list at `key`, returning the new length.
    async fn lpush(&self, key: &str, value: &str) -> StoreResult<u64>;

    /// Cheap liveness probe.
    async fn ping(&self) -> StoreResult<()>;

    /// Dependency name reported by the health endpoint.
    fn name(&self) -> &'static str;
}

/// Merges `fields` into the JSON object encoded in `raw` and returns the new
/// encoding. Fails with `WrongType` when `raw` is not a JSON object.
pub(crate) fn merge_json_fields(
    key: &str,
    raw: &str,
    fields: &[(&str, Value)],
) -> StoreResult<String> {
    let mut document: Value =
        serde_json::from_str(raw).map_err(|_| StoreError::WrongType(key.to_string()))?;
    let object = document
        .as_object_mut()
        .ok_or_else(|| StoreError::WrongType(key.to_string()))?;

    for (field, value) in fields {
        object.insert((*field).to_string(), value.clone());
    }
    Ok(document.to_string())
}
