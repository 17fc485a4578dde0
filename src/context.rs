//! Storage Context
//!
//! Owns the persistent and session mediums and hands out caches bound to them.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::cache::{CollectionCache, CollectionCacheConfig, RawStorage, ScalarCache};
use crate::clock::{system_clock, Clock};
use crate::config::Config;
use crate::error::Result;
use crate::storage::{FileStorage, MemoryStorage, StorageMedium};

// == Storage Context ==
/// Shared handles to both mediums plus the defaults applied to new caches.
///
/// Each cache handed out must own its key; two caches on the same key of the
/// same medium overwrite each other.
#[derive(Clone)]
pub struct StorageContext {
    persistent: Arc<dyn StorageMedium>,
    session: Arc<dyn StorageMedium>,
    clock: Arc<dyn Clock>,
    default_timeout: Duration,
}

impl StorageContext {
    /// Opens the persistent directory from `config` and starts an empty session.
    pub fn from_config(config: &Config) -> Result<Self> {
        let persistent = FileStorage::open(&config.storage_dir)?;
        info!(
            "Storage context ready: dir={}, default_timeout={}ms",
            config.storage_dir.display(),
            config.default_timeout_ms
        );
        Ok(Self::new(Arc::new(persistent), Arc::new(MemoryStorage::new()))
            .with_default_timeout(Duration::from_millis(config.default_timeout_ms)))
    }

    /// Builds a context over caller-supplied mediums.
    pub fn new(persistent: Arc<dyn StorageMedium>, session: Arc<dyn StorageMedium>) -> Self {
        Self {
            persistent,
            session,
            clock: system_clock(),
            default_timeout: Duration::from_millis(Config::default().default_timeout_ms),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn persistent_medium(&self) -> Arc<dyn StorageMedium> {
        self.persistent.clone()
    }

    pub fn session_medium(&self) -> Arc<dyn StorageMedium> {
        self.session.clone()
    }

    // == Factories ==
    /// Scalar cache on the persistent medium using the default timeout.
    pub fn cache<V>(&self, key: impl Into<String>) -> ScalarCache<V>
    where
        V: Serialize + DeserializeOwned + Clone,
    {
        ScalarCache::new(self.persistent.clone(), key, self.default_timeout)
            .with_clock(self.clock.clone())
    }

    /// Collection cache on the persistent medium using the default timeout.
    pub fn collection<V, S, F>(&self, key: impl Into<String>, selector: F) -> CollectionCache<V, S, F>
    where
        V: Serialize + DeserializeOwned + Clone,
        S: PartialEq,
        F: Fn(&V) -> S,
    {
        let config = CollectionCacheConfig::new(key, self.default_timeout, selector);
        CollectionCache::new(self.persistent.clone(), config).with_clock(self.clock.clone())
    }

    /// Unexpiring wrapper on the persistent medium.
    pub fn persistent<V>(&self, key: impl Into<String>) -> RawStorage<V>
    where
        V: Serialize + DeserializeOwned + Clone,
    {
        RawStorage::new(self.persistent.clone(), key)
    }

    /// Unexpiring wrapper on the session medium.
    pub fn session<V>(&self, key: impl Into<String>) -> RawStorage<V>
    where
        V: Serialize + DeserializeOwned + Clone,
    {
        RawStorage::new(self.session.clone(), key)
    }
}
