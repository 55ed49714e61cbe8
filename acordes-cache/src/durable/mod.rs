//! Durable store: synchronous, string-keyed, string-valued persistence
//!
//! The store has no structure of its own; the cache layer keeps one JSON
//! document per namespace key in it. Capacity is finite and
//! implementation-defined: a store may reject writes with
//! [`Error::QuotaExceeded`](acordes_common::Error::QuotaExceeded).

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use acordes_common::{Error, Result};

/// Origin-scoped key/value persistence shared by every cache instance
pub trait DurableStore: Send + Sync {
    /// Stored value, or `None` when the key was never written
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting an absent key succeeds
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Bytes currently used (keys plus values)
    fn used_bytes(&self) -> Result<usize>;

    /// Byte capacity, `None` when unbounded
    fn capacity(&self) -> Option<usize> {
        None
    }
}

/// Reject a write that would push usage past `capacity`
///
/// `used_by_others` excludes the entry being replaced, so rewriting a key
/// with a value of equal size always fits.
pub(crate) fn check_quota(
    key: &str,
    value: &str,
    used_by_others: usize,
    capacity: Option<usize>,
) -> Result<()> {
    let Some(capacity) = capacity else {
        return Ok(());
    };

    let needed = used_by_others + key.len() + value.len();
    if needed > capacity {
        return Err(Error::QuotaExceeded {
            key: key.to_string(),
            needed,
            capacity,
        });
    }
    Ok(())
}
