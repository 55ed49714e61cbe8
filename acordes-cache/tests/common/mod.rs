//! Shared helpers for acordes-cache integration tests

#![allow(dead_code)]

use acordes_cache::{DurableStore, MemoryStore, Namespace};
use acordes_common::{Instrument, Result, Song};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Memory store that counts writes
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl DurableStore for CountingStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.inner.remove_item(key)
    }

    fn used_bytes(&self) -> Result<usize> {
        self.inner.used_bytes()
    }
}

/// Song fragment carrying a single instrument variant
pub fn fragment(id: &str, instrument: Instrument, content: &str) -> Song {
    Song::new(id, format!("Title of {}", id), "Artist")
        .with_key("G")
        .with_variant(instrument, content)
}

/// Fragment as a generator sends it: only an id and one variant
pub fn chords_only(id: &str, instrument: Instrument, content: &str) -> Song {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "chords": { instrument.as_str(): content }
    }))
    .unwrap()
}

/// Write raw text under a namespace key, bypassing the cache
pub fn put_raw(store: &dyn DurableStore, ns: Namespace, raw: &str) {
    store.set_item(ns.key(), raw).unwrap();
}

/// Persisted JSON of a namespace as a value
pub fn persisted(store: &dyn DurableStore, ns: Namespace) -> serde_json::Value {
    let raw = store.get_item(ns.key()).unwrap().expect("namespace persisted");
    serde_json::from_str(&raw).unwrap()
}
