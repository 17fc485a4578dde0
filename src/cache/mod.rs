//! Cache Module
//!
//! Typed caches layered on a storage medium: enveloped scalar and collection
//! caches with TTL expiry, and a raw passthrough wrapper.

mod collection;
mod envelope;
mod raw;
mod scalar;


// Re-export public types
pub use collection::{CollectionCache, CollectionCacheConfig};
pub use envelope::Envelope;
pub use raw::RawStorage;
pub use scalar::ScalarCache;
