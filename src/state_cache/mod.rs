//! SharedStateStore - Cross-Process Key-Value Cache
//!
//! ## Responsibilities
//!
//! - Ephemeral key-value cache written and read by independent processes
//!   (axis position, motion flags, capture worker pid)
//! - Closed tagged value type with total encode/decode (see [`types`])
//!
//! There is no locking, no transactions and no compare-and-swap:
//! concurrent writers race under last-writer-wins, acceptable at this
//! write frequency. Not suitable for values needing ordering guarantees.

mod types;

pub use types::CacheValue;

use crate::Result;
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key-value cache boundary. Implemented by the Redis backend in
/// production and the in-memory backend in tests.
pub trait StateStore {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<CacheValue>>>;
    fn set(&self, key: &str, value: CacheValue) -> impl std::future::Future<Output = Result<()>>;
}

impl<S: StateStore> StateStore for std::sync::Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: CacheValue) -> Result<()> {
        (**self).set(key, value).await
    }
}

/// Redis-backed store
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisStore {
    /// Connect to the cache
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!(url = %url, "Shared cache connected");
        Ok(Self { conn })
    }
}

impl StateStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(key).await?;
        Ok(raw.map(|s| CacheValue::decode(&s)))
    }

    async fn set(&self, key: &str, value: CacheValue) -> Result<()> {
        let mut conn = self.conn.clone();
        let () = conn.set(key, value.encode()).await?;
        Ok(())
    }
}

/// In-memory store for tests. Holds the encoded text form, mirroring the
/// external cache.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        Ok(self
            .map
            .read()
            .await
            .get(key)
            .map(|s| CacheValue::decode(s)))
    }

    async fn set(&self, key: &str, value: CacheValue) -> Result<()> {
        self.map
            .write()
            .await
            .insert(key.to_string(), value.encode());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_round_trips_typed_values() {
        let store = MemoryStore::new();
        store.set("armed", CacheValue::Bool(true)).await.unwrap();
        store.set("pulse_count", CacheValue::Int(42)).await.unwrap();
        store
            .set("temperature", CacheValue::Float(3.14))
            .await
            .unwrap();
        store
            .set("mode", CacheValue::Str("hello".to_string()))
            .await
            .unwrap();

        assert_eq!(
            store.get("armed").await.unwrap(),
            Some(CacheValue::Bool(true))
        );
        assert_eq!(
            store.get("pulse_count").await.unwrap(),
            Some(CacheValue::Int(42))
        );
        assert_eq!(
            store.get("temperature").await.unwrap(),
            Some(CacheValue::Float(3.14))
        );
        assert_eq!(
            store.get("mode").await.unwrap(),
            Some(CacheValue::Str("hello".to_string()))
        );
    }

    #[tokio::test]
    async fn test_missing_key_reads_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("absent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = MemoryStore::new();
        store.set("pan_angle", CacheValue::Int(10)).await.unwrap();
        store.set("pan_angle", CacheValue::Int(-30)).await.unwrap();
        assert_eq!(
            store.get("pan_angle").await.unwrap(),
            Some(CacheValue::Int(-30))
        );
    }
}
