use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, CounterState, InMemoryCacheStore, cache_key};

impl InMemoryCacheStore {
    pub(crate) fn new() -> Self {
        tracing::debug!("Cache entries and counters kept in process memory");
        Self {
            entry: HashMap::new(),
            counters: HashMap::new(),
        }
    }

    fn purge_expired(&mut self, now: Instant) {
        self.entry
            .retain(|_, (_, expires_at)| expires_at.is_none_or(|at| at > now));
        self.counters.retain(|_, (_, resets_at)| *resets_at > now);
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn put(&mut self, prefix: &str, key: &str, value: CacheData) -> Result<(), StorageError> {
        self.entry.insert(cache_key(prefix, key), (value, None));
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let now = Instant::now();
        self.purge_expired(now);
        let deadline = now + Duration::from_secs(ttl as u64);
        self.entry.insert(cache_key(prefix, key), (value, Some(deadline)));
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let now = Instant::now();
        Ok(self
            .entry
            .get(&cache_key(prefix, key))
            .filter(|(_, expires_at)| expires_at.is_none_or(|at| at > now))
            .map(|(value, _)| value.clone()))
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        self.entry.remove(&cache_key(prefix, key));
        Ok(())
    }

    async fn incr_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        ttl: usize,
    ) -> Result<CounterState, StorageError> {
        let now = Instant::now();
        self.purge_expired(now);
        let (count, resets_at) = self
            .counters
            .entry(cache_key(prefix, key))
            .or_insert_with(|| (0, now + Duration::from_secs(ttl as u64)));
        *count += 1;

        Ok(CounterState {
            count: *count,
            ttl_secs: resets_at.saturating_duration_since(now).as_secs(),
        })
    }
}
