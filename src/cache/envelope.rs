//! Envelope Module
//!
//! Wrapper record stored around every cached value, carrying the moment it was saved.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// == Envelope ==
/// A stored value plus the Unix millisecond timestamp it was saved at.
///
/// Serialized as `{"value": ..., "saveMoment": ...}`. Envelopes are never
/// mutated; every write builds a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<V> {
    /// The cached value
    pub value: V,
    /// Save timestamp (Unix milliseconds)
    pub save_moment: i64,
}

impl<V> Envelope<V> {
    // == Constructor ==
    /// Wraps `value` with the given save timestamp.
    pub fn new(value: V, save_moment: i64) -> Self {
        Self { value, save_moment }
    }

    /// Milliseconds elapsed between saving and `now_ms`.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.save_moment)
    }

    // == Is Valid ==
    /// Checks whether the envelope is still fresh.
    ///
    /// Boundary condition: an envelope whose age equals `timeout_ms` exactly is
    /// still valid; it expires one millisecond later. A save moment in the
    /// future (clock moved backwards) counts as valid.
    pub fn is_valid(&self, timeout_ms: i64, now_ms: i64) -> bool {
        self.age_ms(now_ms) <= timeout_ms
    }

    /// Last millisecond at which the envelope is still valid.
    pub fn expires_at_ms(&self, timeout_ms: i64) -> i64 {
        self.save_moment.saturating_add(timeout_ms)
    }

    /// Save moment as a UTC datetime, `None` when out of chrono's range.
    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.save_moment).single()
    }

    pub fn into_value(self) -> V {
        self.value
    }
}

/// Converts a TTL duration to milliseconds, saturating at `i64::MAX`.
pub(crate) fn timeout_ms(timeout: std::time::Duration) -> i64 {
    i64::try_from(timeout.as_millis()).unwrap_or(i64::MAX)
}
