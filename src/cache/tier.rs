use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::cache::keys;

/// Durable home for serialized cache entries, surviving process restarts.
///
/// Every operation is best-effort: failures are logged and reads degrade to
/// a miss.
#[derive(Clone)]
pub enum PersistentTier {
    Memory(Arc<Mutex<HashMap<String, String>>>),
    File(PathBuf),
    Redis(RedisCache),
}

impl PersistentTier {
    pub fn memory() -> Self {
        PersistentTier::Memory(Arc::new(Mutex::new(HashMap::new())))
    }

    pub fn file(dir: impl Into<PathBuf>) -> Self {
        PersistentTier::File(dir.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            PersistentTier::Memory(_) => "memory",
            PersistentTier::File(_) => "file",
            PersistentTier::Redis(_) => "redis",
        }
    }

    /// Memory and file tiers are always reachable; redis answers a PING.
    pub async fn is_connected(&self) -> bool {
        match self {
            PersistentTier::Memory(_) | PersistentTier::File(_) => true,
            PersistentTier::Redis(redis) => redis.is_connected().await,
        }
    }

    pub async fn read(&self, key: &str) -> Option<String> {
        match self {
            PersistentTier::Memory(map) => map.lock().get(key).cloned(),
            PersistentTier::File(dir) => {
                let path = dir.join(keys::file_name(key));
                match tokio::fs::read_to_string(&path).await {
                    Ok(contents) => Some(contents),
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                    Err(err) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %err,
                            "cache file read failed"
                        );
                        None
                    }
                }
            }
            PersistentTier::Redis(cache) => cache.get_raw(&keys::redis_key(key)).await,
        }
    }

    /// `ttl` lets backends with native expiry drop the entry on their own.
    pub async fn write(&self, key: &str, value: String, ttl: Duration) {
        match self {
            PersistentTier::Memory(map) => {
                map.lock().insert(key.to_string(), value);
            }
            PersistentTier::File(dir) => {
                if let Err(err) = write_atomically(dir, key, value).await {
                    tracing::warn!(
                        dir = %dir.display(),
                        key,
                        error = %err,
                        "cache file write failed"
                    );
                }
            }
            PersistentTier::Redis(cache) => cache.set_raw(&keys::redis_key(key), value, ttl).await,
        }
    }

    pub async fn remove(&self, key: &str) {
        match self {
            PersistentTier::Memory(map) => {
                map.lock().remove(key);
            }
            PersistentTier::File(dir) => {
                let path = dir.join(keys::file_name(key));
                if let Err(err) = tokio::fs::remove_file(&path).await {
                    if err.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            path = %path.display(),
                            error = %err,
                            "cache file remove failed"
                        );
                    }
                }
            }
            PersistentTier::Redis(cache) => cache.delete(&keys::redis_key(key)).await,
        }
    }
}

async fn write_atomically(dir: &Path, key: &str, value: String) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    let target = dir.join(keys::file_name(key));
    let staging = dir.join(format!(".{}.tmp", keys::file_name(key)));
    tokio::fs::write(&staging, value).await?;
    tokio::fs::rename(&staging, &target).await
}

#[derive(Clone)]
pub struct RedisCache {
    connection: MultiplexedConnection,
}

impl RedisCache {
    pub fn new(connection: MultiplexedConnection) -> Self {
        Self { connection }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let connection = client.get_multiplexed_tokio_connection().await?;
        Ok(Self::new(connection))
    }

    async fn get_raw(&self, key: &str) -> Option<String> {
        let mut conn = self.connection.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "redis get failed");
                None
            }
        }
    }

    async fn set_raw(&self, key: &str, value: String, ttl: Duration) {
        let mut conn = self.connection.clone();
        let result: Result<(), _> = if ttl.is_zero() {
            conn.set(key, value).await
        } else {
            let ttl_secs = ttl.as_secs().max(1);
            conn.set_ex(key, value, ttl_secs).await
        };
        if let Err(err) = result {
            tracing::warn!(key, error = %err, "redis set failed");
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.connection.clone();
        if let Err(err) = conn.del::<_, u64>(key).await {
            tracing::warn!(key, error = %err, "redis delete failed");
        }
    }

    pub async fn is_connected(&self) -> bool {
        let mut conn = self.connection.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}
