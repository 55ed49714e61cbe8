//! In-process durable store

use super::{check_quota, DurableStore};
use acordes_common::Result;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Map-backed store; shares state across every handle cloned from one `Arc`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store rejecting writes beyond `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity: Some(capacity),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DurableStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries();
        let used_by_others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        check_quota(key, value, used_by_others, self.capacity)?;

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.entries().remove(key);
        Ok(())
    }

    fn used_bytes(&self) -> Result<usize> {
        Ok(self.entries().iter().map(|(k, v)| k.len() + v.len()).sum())
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
