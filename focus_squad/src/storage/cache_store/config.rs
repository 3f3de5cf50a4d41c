//! Cache selection: sessions and rate-limit counters share this store.

use std::{env, sync::LazyLock};
use tokio::sync::Mutex;

use super::types::{CacheStore, InMemoryCacheStore, RedisCacheStore};

fn cache_setting(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("{name} must be set to select the cache store"))
}

fn open_redis(url: &str) -> RedisCacheStore {
    let client = match redis::Client::open(url) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Redis url rejected");
            panic!("Redis url rejected: {e}");
        }
    };
    let store = RedisCacheStore { client };

    // The lazy static is first touched from async code, so ping on the current runtime.
    let ping = tokio::task::block_in_place(|| {
        tokio::runtime::Handle::current().block_on(store.init())
    });
    if let Err(e) = ping {
        tracing::error!(error = %e, "Redis unreachable");
        panic!("Redis unreachable: {e}");
    }
    store
}

pub(crate) static GENERIC_CACHE_STORE: LazyLock<Mutex<Box<dyn CacheStore>>> = LazyLock::new(|| {
    let kind = cache_setting("GENERIC_CACHE_STORE_TYPE");

    let store: Box<dyn CacheStore> = match kind.as_str() {
        "memory" => Box::new(InMemoryCacheStore::new()),
        "redis" => Box::new(open_redis(&cache_setting("GENERIC_CACHE_STORE_URL"))),
        other => panic!("Cache store type '{other}' is not one of: memory, redis"),
    };

    tracing::info!(kind = %kind, "Cache store ready");
    Mutex::new(store)
});
