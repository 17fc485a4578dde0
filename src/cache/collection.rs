//! Collection Cache Module
//!
//! Ordered list of enveloped values stored under one key. Every element carries
//! its own save moment and expires independently; a caller-supplied selector
//! gives each element an identity used for upserts and lookups.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::envelope::{timeout_ms, Envelope};
use crate::clock::{system_clock, Clock};
use crate::error::Result;
use crate::storage::StorageMedium;

// == Collection Cache Config ==
/// Construction parameters of a [`CollectionCache`].
#[derive(Debug, Clone)]
pub struct CollectionCacheConfig<F> {
    /// Storage key owned exclusively by the cache
    pub key: String,
    /// Time-to-live of each element, measured from its own save moment
    pub timeout: Duration,
    /// Extracts the identity of an element
    pub selector: F,
}

impl<F> CollectionCacheConfig<F> {
    pub fn new(key: impl Into<String>, timeout: Duration, selector: F) -> Self {
        Self {
            key: key.into(),
            timeout,
            selector,
        }
    }
}

// == Collection Cache ==
/// Typed, expiring cache for a list of values with selector-based identity.
///
/// Invariant: after `add_value` returns, at most one stored element has any
/// given selector value.
///
/// The whole list is deserialized and re-serialized on every operation; there
/// is no in-memory mirror, so each write is durable as soon as the medium
/// accepts it.
pub struct CollectionCache<V, S, F> {
    key: String,
    timeout_ms: i64,
    selector: F,
    medium: Arc<dyn StorageMedium>,
    clock: Arc<dyn Clock>,
    _marker: PhantomData<fn() -> (V, S)>,
}

impl<V, S, F> CollectionCache<V, S, F>
where
    V: Serialize + DeserializeOwned + Clone,
    S: PartialEq,
    F: Fn(&V) -> S,
{
    // == Constructor ==
    pub fn new(medium: Arc<dyn StorageMedium>, config: CollectionCacheConfig<F>) -> Self {
        Self {
            key: config.key,
            timeout_ms: timeout_ms(config.timeout),
            selector: config.selector,
            medium,
            clock: system_clock(),
            _marker: PhantomData,
        }
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
    /// Returns the unexpired values in stored order.
    ///
    /// Read-only: expired elements stay in the medium until a mutating
    /// operation or [`purge_expired`](Self::purge_expired) touches them.
    pub fn get_value(&self) -> Vec<V> {
        let now = self.clock.now_ms();
        match self.read_raw() {
            Ok(elements) => elements
                .into_iter()
                .filter(|element| element.is_valid(self.timeout_ms, now))
                .map(Envelope::into_value)
                .collect(),
            Err(e) => {
                warn!("Collection {} unreadable: {}", self.key, e);
                Vec::new()
            }
        }
    }

    // == Set ==
    /// Replaces the whole collection, stamping every element with the current time.
    pub fn set_value(&self, values: Vec<V>) {
        let now = self.clock.now_ms();
        let elements: Vec<Envelope<V>> = values
            .into_iter()
            .map(|value| Envelope::new(value, now))
            .collect();
        self.write_or_warn(&elements);
    }

    // == Remove ==
    /// Deletes the key, returning the values that were still valid.
    pub fn remove_value(&self) -> Vec<V> {
        let saved = self.get_value();
        if let Err(e) = self.medium.remove(&self.key) {
            warn!("Collection {} not removed: {}", self.key, e);
        }
        saved
    }

    // == Get By Id ==
    /// Returns the first valid element whose selector equals `id`.
    ///
    /// When nothing valid matches, expired elements carrying `id` are purged.
    pub fn get_value_by_id(&self, id: &S) -> Option<V> {
        let found = self.find_valid(id);
        if found.is_none() {
            self.purge_id(id);
        }
        found
    }

    // == Add ==
    /// Upserts `value`: drops every stored element (fresh or expired) sharing
    /// its selector, then appends it with a fresh save moment.
    ///
    /// Unrelated expired elements are left untouched. Malformed stored data
    /// makes this a no-op.
    pub fn add_value(&self, value: V) {
        let mut elements = match self.read_raw() {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Collection {} malformed, add skipped: {}", self.key, e);
                return;
            }
        };

        let id = (self.selector)(&value);
        elements.retain(|element| (self.selector)(&element.value) != id);
        elements.push(Envelope::new(value, self.clock.now_ms()));

        self.write_or_warn(&elements);
    }

    // == Remove By Id ==
    /// Removes every stored element whose selector equals `id`, regardless of
    /// validity, and returns the valid one found beforehand.
    pub fn remove_value_by_id(&self, id: &S) -> Option<V> {
        let saved = self.find_valid(id);
        self.purge_id(id);
        saved
    }

    // == Purge Expired ==
    /// Rewrites the stored list without its expired elements.
    ///
    /// Returns the number of elements removed.
    pub fn purge_expired(&self) -> usize {
        let mut elements = match self.read_raw() {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Collection {} malformed, purge skipped: {}", self.key, e);
                return 0;
            }
        };

        let now = self.clock.now_ms();
        let before = elements.len();
        elements.retain(|element| element.is_valid(self.timeout_ms, now));
        let removed = before - elements.len();

        if removed > 0 {
            self.write_or_warn(&elements);
            debug!("Collection {}: purged {} expired elements", self.key, removed);
        }
        removed
    }

    fn find_valid(&self, id: &S) -> Option<V> {
        self.get_value()
            .into_iter()
            .find(|value| (self.selector)(value) == *id)
    }

    /// Drops raw elements matching `id`; writes only when something matched.
    fn purge_id(&self, id: &S) {
        let mut elements = match self.read_raw() {
            Ok(elements) => elements,
            Err(e) => {
                warn!("Collection {} malformed, removal skipped: {}", self.key, e);
                return;
            }
        };

        let before = elements.len();
        elements.retain(|element| (self.selector)(&element.value) != *id);
        if elements.len() != before {
            debug!(
                "Collection {}: removed {} elements by id",
                self.key,
                before - elements.len()
            );
            self.write_or_warn(&elements);
        }
    }

    fn read_raw(&self) -> Result<Vec<Envelope<V>>> {
        match self.medium.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn write_raw(&self, elements: &[Envelope<V>]) -> Result<()> {
        let raw = serde_json::to_string(elements)?;
        self.medium.set(&self.key, &raw)
    }

    fn write_or_warn(&self, elements: &[Envelope<V>]) {
        if let Err(e) = self.write_raw(elements) {
            warn!("Collection {} not written: {}", self.key, e);
        }
    }
}
