//! Storage Medium Module
//!
//! Opaque string-keyed stores the caches are layered on. Two mediums ship with
//! the crate: a session-scoped in-memory map and a persistent directory store.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;

// == Storage Medium Trait ==
/// Synchronous get/set/remove store for serialized values.
///
/// Last write wins. Implementations give no read-modify-write isolation;
/// callers owning a key are expected to be its only writer.
pub trait StorageMedium: Send + Sync {
    /// A name for logs, e.g. "memory" or "file".
    fn name(&self) -> &'static str;

    /// Returns the stored text, `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrites the text stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<()>;

    /// Lists the keys currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>>;

    /// Deletes every key.
    fn clear(&self) -> Result<()>;
}
