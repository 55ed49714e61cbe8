//! Read-through memory cache for one namespace
//!
//! A [`NamespaceCache`] is either unloaded or holds a loaded snapshot that
//! mirrors the durable store. `read` loads on first use; `write` replaces
//! snapshot and persisted document together; `invalidate` drops the snapshot
//! so the next `read` goes back to the durable store.

use crate::durable::DurableStore;
use crate::namespace::Namespace;
use acordes_common::config::ConsistencyMode;
use acordes_common::events::{ChangeBus, StorageChange};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Typed JSON document persisted under one namespace key
pub trait Document: Default + Serialize {
    const NAMESPACE: Namespace;

    /// Decode persisted text; never fails, degrading to (partial) defaults
    fn decode(raw: &str) -> Self;
}

/// Announces successful durable writes to other instances
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    bus: ChangeBus,
    writer: Uuid,
}

impl ChangeNotifier {
    pub fn new(bus: ChangeBus, writer: Uuid) -> Self {
        Self { bus, writer }
    }

    fn notify(&self, key: &str) {
        self.bus.publish(StorageChange::new(key, self.writer));
    }
}

struct Snapshot<D> {
    doc: D,
    /// Persisted text the snapshot corresponds to, for revalidation
    raw: Option<String>,
}

/// In-process mirror of one namespace document
pub struct NamespaceCache<D: Document> {
    store: Arc<dyn DurableStore>,
    mode: ConsistencyMode,
    notifier: Option<ChangeNotifier>,
    loaded: Option<Snapshot<D>>,
}

impl<D: Document> NamespaceCache<D> {
    pub fn new(store: Arc<dyn DurableStore>, mode: ConsistencyMode) -> Self {
        Self {
            store,
            mode,
            notifier: None,
            loaded: None,
        }
    }

    /// Publish a change notification after each durable write
    pub fn with_notifier(mut self, notifier: ChangeNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn namespace(&self) -> Namespace {
        D::NAMESPACE
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    /// Drop the snapshot; the next read goes back to the durable store
    pub fn invalidate(&mut self) {
        if self.loaded.take().is_some() {
            debug!("Invalidated {} snapshot", D::NAMESPACE);
        }
    }

    /// Current snapshot, loading it from the durable store if needed
    pub fn read(&mut self) -> &D {
        if self.mode == ConsistencyMode::Revalidate {
            self.revalidate();
        }

        let snapshot = match self.loaded.take() {
            Some(snapshot) => snapshot,
            None => self.load(),
        };
        &self.loaded.insert(snapshot).doc
    }

    /// Replace snapshot and persisted document
    ///
    /// Returns whether the durable write succeeded. A rejected write is
    /// logged and the snapshot still takes `doc`, so this instance stays
    /// consistent with what its caller just did.
    pub fn write(&mut self, doc: D) -> bool {
        let key = D::NAMESPACE.key();
        let persisted = match serde_json::to_string(&doc) {
            Ok(text) => match self.store.set_item(key, &text) {
                Ok(()) => Some(text),
                Err(e) => {
                    warn!("Failed to persist {} document, keeping it in memory only: {}", D::NAMESPACE, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to encode {} document: {}", D::NAMESPACE, e);
                None
            }
        };

        let stored = persisted.is_some();
        let raw = match persisted {
            Some(text) => {
                if let Some(notifier) = &self.notifier {
                    notifier.notify(key);
                }
                Some(text)
            }
            None => self.fetch_raw(),
        };

        self.loaded = Some(Snapshot { doc, raw });
        stored
    }

    /// Read, mutate in place, write back; returns the closure's result
    pub fn update<R>(&mut self, f: impl FnOnce(&mut D) -> R) -> R {
        self.read();
        let mut doc = self.loaded.take().map(|s| s.doc).unwrap_or_default();
        let result = f(&mut doc);
        self.write(doc);
        result
    }

    fn load(&self) -> Snapshot<D> {
        let raw = self.fetch_raw();
        let doc = raw.as_deref().map(D::decode).unwrap_or_default();
        debug!("Loaded {} snapshot from durable store", D::NAMESPACE);
        Snapshot { doc, raw }
    }

    fn revalidate(&mut self) {
        let Some(snapshot) = &self.loaded else {
            return;
        };
        let current = self.fetch_raw();
        if current != snapshot.raw {
            debug!("{} changed in durable store, reloading", D::NAMESPACE);
            let doc = current.as_deref().map(D::decode).unwrap_or_default();
            self.loaded = Some(Snapshot { doc, raw: current });
        }
    }

    fn fetch_raw(&self) -> Option<String> {
        match self.store.get_item(D::NAMESPACE.key()) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read {} from durable store, treating as empty: {}", D::NAMESPACE, e);
                None
            }
        }
    }
}
