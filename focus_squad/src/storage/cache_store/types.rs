use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Instant;

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

pub(crate) struct InMemoryCacheStore {
    pub(super) entry: HashMap<String, (CacheData, Option<Instant>)>,
    pub(super) counters: HashMap<String, (i64, Instant)>,
}

pub(crate) struct RedisCacheStore {
    pub(super) client: redis::Client,
}

/// Namespaced key shared by both backends, `cache:<prefix>:<key>`.
pub(super) fn cache_key(prefix: &str, key: &str) -> String {
    format!("cache:{prefix}:{key}")
}

/// Value of a windowed counter after an increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterState {
    pub count: i64,
    /// Seconds until the counter resets.
    pub ttl_secs: u64,
}

#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Put a value into the store.
    async fn put(&mut self, prefix: &str, key: &str, value: CacheData) -> Result<(), StorageError>;

    /// Put a value into the store with a TTL in seconds.
    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError>;

    /// Get a value from the store.
    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError>;

    /// Remove a value from the store.
    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError>;

    /// Atomically increment a counter, starting a `ttl` second window on the first increment.
    async fn incr_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        ttl: usize,
    ) -> Result<CounterState, StorageError>;
}
