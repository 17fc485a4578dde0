//! TTL Shelf - typed, expiring key-value caching
//!
//! Layers scalar and collection caches with per-value expiry on top of a
//! string-keyed storage medium, persistent (directory) or session-scoped
//! (in-memory). Cache operations never fail: malformed or unreadable data
//! degrades to a cache miss.

pub mod cache;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod storage;

pub use cache::{CollectionCache, CollectionCacheConfig, Envelope, RawStorage, ScalarCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use context::StorageContext;
pub use error::{Result, ShelfError};
pub use storage::{FileStorage, MemoryStorage, StorageMedium};
