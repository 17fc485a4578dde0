//! Raw Storage Module
//!
//! Typed passthrough over a medium: no envelope, no expiry.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{Result, ShelfError};
use crate::storage::StorageMedium;

// == Raw Storage ==
/// Stores a bare serialized value under one key.
///
/// The same type serves both the persistent and the session medium; which one
/// backs an instance is decided by the medium it is built with.
pub struct RawStorage<V> {
    key: String,
    default_value: Option<V>,
    medium: Arc<dyn StorageMedium>,
    _marker: PhantomData<fn() -> V>,
}

impl<V> RawStorage<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    pub fn new(medium: Arc<dyn StorageMedium>, key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_value: None,
            medium,
            _marker: PhantomData,
        }
    }

    pub fn with_default(mut self, value: V) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Name of the backing medium.
    pub fn medium_name(&self) -> &'static str {
        self.medium.name()
    }

    /// Returns the stored value, or the default on absence or malformed data.
    pub fn get_value(&self) -> Option<V> {
        match self.read() {
            Ok(Some(value)) => Some(value),
            Ok(None) => self.default_value.clone(),
            Err(e) => {
                warn!("Storage key {} unreadable on {}: {}", self.key, self.medium.name(), e);
                self.default_value.clone()
            }
        }
    }

    pub fn set_value(&self, value: V) {
        let written = serde_json::to_string(&value)
            .map_err(ShelfError::from)
            .and_then(|raw| self.medium.set(&self.key, &raw));
        if let Err(e) = written {
            warn!("Storage key {} not written on {}: {}", self.key, self.medium.name(), e);
        }
    }

    /// Deletes the key, returning what `get_value` would have returned.
    pub fn remove_value(&self) -> Option<V> {
        let saved = self.get_value();
        if let Err(e) = self.medium.remove(&self.key) {
            warn!("Storage key {} not removed on {}: {}", self.key, self.medium.name(), e);
        }
        saved
    }

    fn read(&self) -> Result<Option<V>> {
        match self.medium.get(&self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}
