use async_trait::async_trait;
use redis::{self, AsyncCommands};

use crate::storage::errors::StorageError;
use crate::storage::types::CacheData;

use super::types::{CacheStore, CounterState, RedisCacheStore, cache_key};

impl RedisCacheStore {
    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StorageError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn init(&self) -> Result<(), StorageError> {
        self.connection().await.map(|_| ())
    }

    async fn put(&mut self, prefix: &str, key: &str, value: CacheData) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&value)?;
        let _: () = self.connection().await?.set(cache_key(prefix, key), encoded).await?;
        Ok(())
    }

    async fn put_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        value: CacheData,
        ttl: usize,
    ) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(&value)?;
        let _: () = self
            .connection()
            .await?
            .set_ex(cache_key(prefix, key), encoded, ttl as u64)
            .await?;
        Ok(())
    }

    async fn get(&self, prefix: &str, key: &str) -> Result<Option<CacheData>, StorageError> {
        let raw: Option<String> = self.connection().await?.get(cache_key(prefix, key)).await?;
        raw.map(|encoded| serde_json::from_str(&encoded))
            .transpose()
            .map_err(StorageError::from)
    }

    async fn remove(&mut self, prefix: &str, key: &str) -> Result<(), StorageError> {
        let _: () = self.connection().await?.del(cache_key(prefix, key)).await?;
        Ok(())
    }

    async fn incr_with_ttl(
        &mut self,
        prefix: &str,
        key: &str,
        ttl: usize,
    ) -> Result<CounterState, StorageError> {
        let mut conn = self.connection().await?;
        let key = cache_key(prefix, key);
        // MULTI: create the counter with its expiry only if absent, then bump it.
        let (count, remaining): (i64, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(&key)
            .arg(0)
            .arg("NX")
            .arg("EX")
            .arg(ttl.max(1))
            .ignore()
            .incr(&key, 1)
            .ttl(&key)
            .query_async(&mut conn)
            .await?;

        Ok(CounterState {
            count,
            ttl_secs: remaining.max(0) as u64,
        })
    }
}
