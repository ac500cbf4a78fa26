//! Redis Store Module
//!
//! Redis backend built on the multiplexed `ConnectionManager`. The connection
//! is opened lazily so the gateway can start while Redis is down, and every
//! call is bounded by the configured timeout.

use std::future::Future;
use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client, IntoConnectionInfo, RedisResult, Script};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::store::{merge_json_fields, Store};

/// Replaces KEYS[1] with ARGV[2] only while it still holds ARGV[1], keeping
/// its TTL. Returns 1 on success, 0 when the key is gone and -1 when another
/// writer got there first.
const COMPARE_AND_SET_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if not current then
  return 0
end
if current ~= ARGV[1] then
  return -1
end
redis.call('SET', KEYS[1], ARGV[2], 'KEEPTTL')
return 1
"#;

/// Read-merge-swap rounds before a contended record update gives up.
const MERGE_ATTEMPTS: usize = 5;

/// Redis rejects expiries that would overflow its signed millisecond clock.
const MAX_EXPIRE_MS: u64 = i64::MAX as u64 / 2;

/// Turns a bare `host:port` address into a Redis URL.
///
/// Values that already carry a scheme are returned unchanged.
pub fn normalize_redis_url(address: &str) -> String {
    let address = address.trim();
    if address.contains("://") || address.starts_with("unix:") {
        address.to_string()
    } else {
        format!("redis://{}/0", address)
    }
}

// == Redis Store ==
/// Key-value store backed by a Redis server.
pub struct RedisStore {
    client: Client,
    connection: Mutex<Option<ConnectionManager>>,
    compare_and_set: Script,
    timeout: Duration,
}

impl RedisStore {
    // == Constructor ==
    /// Builds a store for `address` without connecting.
    ///
    /// # Arguments
    /// * `address` - `host:port`, `redis://` or `rediss://` URL
    /// * `password` - Password applied when non-empty
    /// * `timeout` - Upper bound on each store call
    pub fn new(address: &str, password: &str, timeout: Duration) -> StoreResult<Self> {
        let mut info = normalize_redis_url(address)
            .as_str()
            .into_connection_info()
            .map_err(|e| StoreError::Config(e.to_string()))?;
        if !password.is_empty() {
            info.redis.password = Some(password.to_string());
        }

        let client = Client::open(info)?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
            compare_and_set: Script::new(COMPARE_AND_SET_SCRIPT),
            timeout,
        })
    }

    /// Returns the shared connection, establishing it on first use or after a
    /// failed attempt.
    async fn connection(&self) -> StoreResult<ConnectionManager> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }

        debug!("Opening redis connection");
        let conn = ConnectionManager::new(self.client.clone()).await?;
        info!("Redis connection established");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    /// Bounds `call` by the configured timeout.
    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout))?
    }

    /// Runs `op` on a connection under the configured timeout.
    async fn run<T, F, Fut>(&self, op: F) -> StoreResult<T>
    where
        F: FnOnce(ConnectionManager) -> Fut + Send,
        Fut: Future<Output = RedisResult<T>> + Send,
    {
        self.bounded(async {
            let conn = self.connection().await?;
            op(conn).await.map_err(StoreError::from)
        })
        .await
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.run(|mut conn| async move { conn.get(key).await }).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> StoreResult<()> {
        let ttl_ms = u64::try_from(ttl.as_millis())
            .unwrap_or(u64::MAX)
            .clamp(1, MAX_EXPIRE_MS);
        self.run(|mut conn| async move {
            ::redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("PX")
                .arg(ttl_ms)
                .query_async(&mut conn)
                .await
        })
        .await
    }

    async fn del(&self, key: &str) -> StoreResult<u64> {
        self.run(|mut conn| async move { conn.del(key).await }).await
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        self.run(|mut conn| async move { conn.exists(key).await }).await
    }

    async fn hset(&self, key: &str, fields: &[(&str, Value)]) -> StoreResult<bool> {
        self.bounded(async {
            let mut conn = self.connection().await?;

            for _ in 0..MERGE_ATTEMPTS {
                let current: Option<String> = conn.get(key).await?;
                let Some(current) = current else {
                    return Ok(false);
                };
                let merged = merge_json_fields(key, &current, fields)?;

                let swapped: i64 = self
                    .compare_and_set
                    .key(key)
                    .arg(&current)
                    .arg(&merged)
                    .invoke_async(&mut conn)
                    .await?;
                match swapped {
                    1 => return Ok(true),
                    0 => return Ok(false),
                    _ => debug!(key, "record changed during merge, retrying"),
                }
            }

            Err(StoreError::Contended(key.to_string()))
        })
        .await
    }

    async fn lpush(&self, key: &str, value: &str) -> StoreResult<u64> {
        self.run(|mut conn| async move { conn.lpush(key, value).await })
            .await
    }

    async fn ping(&self) -> StoreResult<()> {
        let _: String = self
            .run(|mut conn| async move { ::redis::cmd("PING").query_async(&mut conn).await })
            .await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
