//! Scalar Cache Module
//!
//! One enveloped value per key with a single expiry window.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::envelope::{timeout_ms, Envelope};
use crate::clock::{system_clock, Clock};
use crate::error::{Result, ShelfError};
use crate::storage::StorageMedium;

// == Scalar Cache ==
/// Typed, expiring cache for a single value stored under one key.
///
/// Reads validate freshness lazily: an expired or malformed entry is deleted
/// from the medium and reported as the default value. No operation returns an
/// error; medium failures degrade to cache-miss behavior.
pub struct ScalarCache<V> {
    key: String,
    timeout_ms: i64,
    default_value: Option<V>,
    medium: Arc<dyn StorageMedium>,
    clock: Arc<dyn Clock>,
}

impl<V> ScalarCache<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    // == Constructor ==
    /// Creates a cache owning `key` on `medium`.
    ///
    /// # Arguments
    /// * `medium` - Storage the envelope is written to
    /// * `key` - Storage key owned exclusively by this cache
    /// * `timeout` - Time-to-live of a written value
    pub fn new(medium: Arc<dyn StorageMedium>, key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            key: key.into(),
            timeout_ms: timeout_ms(timeout),
            default_value: None,
            medium,
            clock: system_clock(),
        }
    }

    /// Sets the value returned on absence, expiry or malformed data.
    pub fn with_default(mut self, value: V) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout_ms(timeout);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    // == Get ==
    /// Returns the stored value if present and fresh, otherwise the default.
    pub fn get_value(&self) -> Option<V> {
        match self.read() {
            Ok(Some(envelope)) => {
                if envelope.is_valid(self.timeout_ms, self.clock.now_ms()) {
                    return Some(envelope.into_value());
                }
                debug!(
                    "Cache key {} saved at {:?} was valid until {}, purging",
                    self.key,
                    envelope.saved_at(),
                    envelope.expires_at_ms(self.timeout_ms)
                );
                self.discard();
            }
            Ok(None) => {}
            Err(ShelfError::Serialization(e)) => {
                warn!("Cache key {} holds malformed data, purging: {}", self.key, e);
                self.discard();
            }
            Err(e) => warn!("Cache key {} unreadable on {}: {}", self.key, self.medium.name(), e),
        }
        self.default_value.clone()
    }

    // == Set ==
    /// Overwrites the key with `value` stamped at the current time.
    pub fn set_value(&self, value: V) {
        if let Err(e) = self.write(&Envelope::new(value, self.clock.now_ms())) {
            warn!("Cache key {} not written: {}", self.key, e);
        }
    }

    // == Remove ==
    /// Deletes the key, returning what `get_value` would have returned.
    pub fn remove_value(&self) -> Option<V> {
        let saved = self.get_value();
        self.discard();
        saved
    }

    fn read(&self) -> Result<Option<Envelope<V>>> {
        match self.medium.get(&self.key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn write(&self, envelope: &Envelope<V>) -> Result<()> {
        let raw = serde_json::to_string(envelope)?;
        self.medium.set(&self.key, &raw)
    }

    fn discard(&self) {
        if let Err(e) = self.medium.remove(&self.key) {
            warn!("Cache key {} not removed: {}", self.key, e);
        }
    }
}
