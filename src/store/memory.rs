//! Memory Store Module
//!
//! In-process backend combining HashMap storage with per-key TTL expiration.
//! Expired keys are dropped lazily on access and by the background sweeper.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::store::{
    current_timestamp_ms, merge_json_fields, Store, StoreEntry, StoredValue, MAX_KEY_LENGTH,
    MAX_VALUE_SIZE,
};

// == Keyspace ==
#[derive(Debug, Default)]
struct Keyspace {
    entries: HashMap<String, StoreEntry>,
}

impl Keyspace {
    /// Returns the live entry at `key`, dropping it first if it has expired.
    fn live(&mut self, key: &str) -> Option<&mut StoreEntry> {
        if self.entries.get(key).is_some_and(StoreEntry::is_expired) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }
}

// == Memory Store ==
/// Thread-safe in-memory key-value store.
///
/// Cloning is cheap and every clone shares the same keyspace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Keyspace>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut keyspace = self.inner.write().await;
        let now = current_timestamp_ms();
        let before = keyspace.entries.len();
        keyspace.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - keyspace.entries.len()
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns the list stored at `key`, head first.
    pub async fn list(&self, key: &str) -> StoreResult<Vec<String>> {
        let mut keyspace = self.inner.write().await;
        match keyspace.live(key).map(|entry| &entry.value) {
            None => Ok(Vec::new()),
            Some(StoredValue::List(items)) => Ok(items.iter().cloned().collect()),
            Some(StoredValue::String(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Remaining TTL of `key` in milliseconds, `None` if absent or persistent.
    pub(crate) async fn ttl_ms(&self, key: &str) -> Option<u64> {
        let mut keyspace = self.inner.write().await;
        keyspace.live(key).and_then(|entry| entry.ttl_remaining_ms())
    }
}

fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        return Err(StoreError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(StoreError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut keyspace = self.inner.write().await;
        match keyspace.live(key).map(|entry| &entry.value) {
            None => Ok(None),
            Some(StoredValue::String(value)) => Ok(Some(value.clone())),
            Some(StoredValue::List(_)) => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        validate_key(key)?;
        if value.len() > MAX_VALUE_SIZE {
            return Err(StoreError::ValueTooLarge(value.len()));
        }

        let entry = StoreEntry::new(StoredValue::String(value), Some(ttl));
        self.inner.write().await.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        let mut keyspace = self.inner.write().await;
        let removed = keyspace.live(key).is_some();
        keyspace.entries.remove(key);
        Ok(u64::from(removed))
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.inner.write().await.live(key).is_some())
    }

    async fn hset(&self, key: &str, fields: &[(&str, Value)]) -> StoreResult<bool> {
        let mut keyspace = self.inner.write().await;
        let Some(entry) = keyspace.live(key) else {
            return Ok(false);
        };

        let StoredValue::String(raw) = &mut entry.value else {
            return Err(StoreError::WrongType(key.to_string()));
        };
        let merged = merge_json_fields(key, raw, fields)?;

        // Expiry is left as is
        *raw = merged;
        Ok(true)
    }

    async fn lpush(&self, key: &str, value: &str) -> StoreResult<u64> {
        validate_key(key)?;
        let mut keyspace = self.inner.write().await;

        if keyspace.live(key).is_none() {
            keyspace.entries.insert(
                key.to_string(),
                StoreEntry::new(StoredValue::List(VecDeque::new()), None),
            );
        }

        match keyspace.entries.get_mut(key).map(|entry| &mut entry.value) {
            Some(StoredValue::List(items)) => {
                items.push_front(value.to_string());
                Ok(items.len() as u64)
            }
            _ => Err(StoreError::WrongType(key.to_string())),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
