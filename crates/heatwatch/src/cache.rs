//! Short-lived cache for serialized API responses.
//!
//! Entries are JSON strings keyed by endpoint and query. A failing backend
//! behaves like an empty cache: requests still go to storage.

use async_trait::async_trait;
use log::{debug, warn};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Serialize};
use std::{collections::HashMap, future::Future, time::Duration};
use tokio::{sync::RwLock, time::Instant};

#[async_trait]
pub trait Cache: Sync + Send {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: String, ttl: Duration);
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Process-local cache. Expired entries are dropped on read and swept on every write.
#[derive(Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Some(entry.value.clone())
                }
                Some(_) => {}
                None => return None,
            }
        }

        remove_if_expired(&mut *self.entries.write().await, key, Instant::now());
        None
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key.to_owned(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }
}

/// Drop `key` only if it is still expired; a writer may have refreshed it
/// between the read and write locks.
fn remove_if_expired(entries: &mut HashMap<String, CacheEntry>, key: &str, now: Instant) {
    if entries
        .get(key)
        .is_some_and(|entry| entry.expires_at <= now)
    {
        entries.remove(key);
    }
}

/// Redis `SET EX` seconds for `ttl`, or `None` when caching is disabled.
/// Sub-second TTLs round up to one second.
fn expiry_secs(ttl: Duration) -> Option<u64> {
    if ttl.is_zero() {
        None
    } else {
        Some(ttl.as_secs().max(1))
    }
}

fn prefixed_key(prefix: &str, key: &str) -> String {
    format!("{}:{}", prefix, key)
}

pub struct RedisCache {
    conn: MultiplexedConnection,
    prefix: String,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self {
            conn,
            prefix: heatwatch_core::APP_NAME.to_owned(),
        })
    }

    fn key(&self, key: &str) -> String {
        prefixed_key(&self.prefix, key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(self.key(key)).await {
            Ok(value) => value,
            Err(e) => {
                warn!("redis get {} failed: {}", key, e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) {
        let Some(seconds) = expiry_secs(ttl) else {
            return;
        };
        let mut conn = self.conn.clone();
        if let Err(e) = conn
            .set_ex::<_, _, ()>(self.key(key), value, seconds)
            .await
        {
            warn!("redis set {} failed: {}", key, e);
        }
    }
}

/// Serve `key` from the cache, or run `load` and cache its result for `ttl`.
///
/// Errors from `load` are returned as-is and never cached.
pub async fn get_or_load<T, E, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    load: F,
) -> Result<T, E>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    if let Some(raw) = cache.get(key).await {
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("cache hit: {}", key);
                return Ok(value);
            }
            Err(e) => warn!("discarding unreadable cache entry {}: {}", key, e),
        }
    }

    let value = load().await?;
    match serde_json::to_string(&value) {
        Ok(raw) => cache.set(key, raw, ttl).await,
        Err(e) => warn!("not caching {}: {}", key, e),
    }
    Ok(value)
}
