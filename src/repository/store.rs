//! Key-value slots holding the persisted JSON records

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use tokio::sync::RwLock;

use crate::{
    config::{StorageBackend, StorageConfig},
    error::{AppError, AppResult},
};

/// Durable slot of string values addressed by key
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Overwrite the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Check that the backend is reachable
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Build the store selected in configuration
pub async fn open(config: &StorageConfig) -> AppResult<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::File => Arc::new(FileStore::open(&config.data_dir).await?),
        StorageBackend::Redis => {
            Arc::new(RedisStore::new(&config.redis_url, &config.key_prefix).await?)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::default()),
    };
    Ok(store)
}

/// In-process store, contents are lost on restart
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the data directory
    pub async fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!("File store at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        // Write then rename so a crash never leaves a half-written record
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let meta = tokio::fs::metadata(&self.dir).await?;
        if meta.is_dir() {
            Ok(())
        } else {
            Err(AppError::Storage(format!(
                "{} is not a directory",
                self.dir.display()
            )))
        }
    }
}

/// Redis-backed store, keys are namespaced as `<prefix>:<key>`
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    prefix: String,
}

impl RedisStore {
    /// Create a new Redis store and test the connection
    pub async fn new(url: &str, prefix: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Storage(format!("Failed to create Redis client: {}", e)))?;

        let store = Self {
            client,
            prefix: prefix.to_string(),
        };
        store.ping().await?;
        tracing::info!("Connected to Redis");

        Ok(store)
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(self.key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(self.key(key), value).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Storage(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }
}
