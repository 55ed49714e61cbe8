//! Cache facade used by one front-end instance
//!
//! A [`StorageOrigin`] is what several instances ("tabs") share: the durable
//! store and the change bus. Each [`SongStore`] opened from it keeps its own
//! in-process snapshots and drops them when another instance announces a
//! write to the same namespace.
//!
//! Every public operation first drains pending change notifications, then
//! runs to completion synchronously. Results are visible to the same
//! instance immediately on return.

use crate::comments::CommentsDoc;
use crate::durable::DurableStore;
use crate::favorites::FavoritesDoc;
use crate::history::HistoryDoc;
use crate::memory_cache::{ChangeNotifier, NamespaceCache};
use crate::namespace::Namespace;
use crate::songs::SongsDoc;
use acordes_common::config::ConsistencyMode;
use acordes_common::events::{ChangeBus, StorageChange};
use acordes_common::{Comment, Instrument, Song};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Durable store and change bus shared by every instance of one origin
#[derive(Clone)]
pub struct StorageOrigin {
    store: Arc<dyn DurableStore>,
    bus: ChangeBus,
    mode: ConsistencyMode,
}

impl StorageOrigin {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            bus: ChangeBus::default(),
            mode: ConsistencyMode::default(),
        }
    }

    pub fn with_consistency(mut self, mode: ConsistencyMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_bus(mut self, bus: ChangeBus) -> Self {
        self.bus = bus;
        self
    }

    /// Attach a new instance with its own, initially unloaded, snapshots
    pub fn open_instance(&self) -> SongStore {
        let id = Uuid::new_v4();
        let notifier = ChangeNotifier::new(self.bus.clone(), id);
        let changes = self.bus.subscribe();
        debug!("Opened cache instance {}", id);

        SongStore {
            id,
            store: self.store.clone(),
            songs: NamespaceCache::new(self.store.clone(), self.mode).with_notifier(notifier.clone()),
            favorites: NamespaceCache::new(self.store.clone(), self.mode).with_notifier(notifier.clone()),
            history: NamespaceCache::new(self.store.clone(), self.mode).with_notifier(notifier.clone()),
            comments: NamespaceCache::new(self.store.clone(), self.mode).with_notifier(notifier),
            changes: Some(changes),
        }
    }
}

/// Byte usage of the durable store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageUsage {
    pub used_bytes: usize,
    pub capacity: Option<usize>,
    /// Persisted document size per namespace (0 when absent)
    pub namespaces: Vec<(Namespace, usize)>,
}

/// Song, favorites, history and comment cache for one instance
pub struct SongStore {
    id: Uuid,
    store: Arc<dyn DurableStore>,
    songs: NamespaceCache<SongsDoc>,
    favorites: NamespaceCache<FavoritesDoc>,
    history: NamespaceCache<HistoryDoc>,
    comments: NamespaceCache<CommentsDoc>,
    changes: Option<broadcast::Receiver<StorageChange>>,
}

impl SongStore {
    /// Standalone instance with no change bus
    ///
    /// Use [`ConsistencyMode::Revalidate`] if other writers may share `store`.
    pub fn new(store: Arc<dyn DurableStore>, mode: ConsistencyMode) -> Self {
        Self {
            id: Uuid::new_v4(),
            store: store.clone(),
            songs: NamespaceCache::new(store.clone(), mode),
            favorites: NamespaceCache::new(store.clone(), mode),
            history: NamespaceCache::new(store.clone(), mode),
            comments: NamespaceCache::new(store, mode),
            changes: None,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.id
    }

    // ---- songs -----------------------------------------------------------

    /// Merge a (possibly partial) record into the cache; returns the stored record
    pub fn cache_song(&mut self, song: Song) -> Song {
        self.sync_external_changes();
        self.songs.update(|doc| doc.merge(song).clone())
    }

    /// Set one instrument variant of a cached song and make it the displayed body
    ///
    /// Returns `None` and writes nothing when the song is not cached.
    pub fn update_song_instrument(&mut self, id: &str, instrument: Instrument, content: &str) -> Option<Song> {
        self.sync_external_changes();
        if !self.songs.read().contains(id) {
            debug!("Instrument update for uncached song '{}' ignored", id);
            return None;
        }
        self.songs
            .update(|doc| doc.set_variant(id, instrument, content).cloned())
    }

    /// Cached record for `id`; never fetches
    pub fn cached_song(&mut self, id: &str) -> Option<Song> {
        self.sync_external_changes();
        self.songs.read().get(id).cloned()
    }

    /// Number of cached song records
    pub fn cached_count(&mut self) -> usize {
        self.sync_external_changes();
        self.songs.read().len()
    }

    // ---- history ---------------------------------------------------------

    /// Record that `id` was viewed (front of history, deduplicated, bounded)
    pub fn add_to_history(&mut self, id: &str) {
        self.sync_external_changes();
        self.history.update(|doc| doc.record_view(id));
    }

    /// History ids, most recent first
    pub fn history(&mut self) -> Vec<String> {
        self.sync_external_changes();
        self.history.read().ids().to_vec()
    }

    /// History records, most recent first, skipping songs no longer cached
    pub fn history_songs(&mut self) -> Vec<Song> {
        self.sync_external_changes();
        let ids = self.history.read().ids().to_vec();
        self.songs.read().resolve(&ids)
    }

    // ---- favorites -------------------------------------------------------

    /// Flip favorite status; returns the state after the toggle
    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        self.sync_external_changes();
        self.favorites.update(|doc| doc.toggle(id))
    }

    pub fn is_favorite(&mut self, id: &str) -> bool {
        self.sync_external_changes();
        self.favorites.read().contains(id)
    }

    /// Favorite ids in the order they were added
    pub fn favorites(&mut self) -> Vec<String> {
        self.sync_external_changes();
        self.favorites.read().ids().to_vec()
    }

    /// Favorite records in stored order, skipping songs no longer cached
    pub fn favorite_songs(&mut self) -> Vec<Song> {
        self.sync_external_changes();
        let ids = self.favorites.read().ids().to_vec();
        self.songs.read().resolve(&ids)
    }

    // ---- comments --------------------------------------------------------

    /// Add a comment at the head of the song's thread and return it
    pub fn add_comment(&mut self, song_id: &str, text: &str) -> Comment {
        self.sync_external_changes();
        self.comments.update(|doc| doc.add(song_id, text))
    }

    /// Comments for `song_id`, newest first
    pub fn comments(&mut self, song_id: &str) -> Vec<Comment> {
        self.sync_external_changes();
        self.comments.read().list(song_id).to_vec()
    }

    // ---- consistency -----------------------------------------------------

    /// Drop the in-process snapshot of `namespace`
    pub fn invalidate(&mut self, namespace: Namespace) {
        match namespace {
            Namespace::Songs => self.songs.invalidate(),
            Namespace::Favorites => self.favorites.invalidate(),
            Namespace::History => self.history.invalidate(),
            Namespace::Comments => self.comments.invalidate(),
        }
    }

    pub fn invalidate_all(&mut self) {
        for namespace in Namespace::ALL {
            self.invalidate(namespace);
        }
    }

    pub fn is_loaded(&self, namespace: Namespace) -> bool {
        match namespace {
            Namespace::Songs => self.songs.is_loaded(),
            Namespace::Favorites => self.favorites.is_loaded(),
            Namespace::History => self.history.is_loaded(),
            Namespace::Comments => self.comments.is_loaded(),
        }
    }

    /// React to a durable store change made elsewhere
    ///
    /// Entry point for platforms that deliver change events themselves.
    /// Changes this instance made, and keys outside the four namespaces,
    /// are ignored.
    pub fn handle_storage_change(&mut self, change: &StorageChange) {
        if change.writer == self.id {
            return;
        }
        if let Some(namespace) = Namespace::from_key(&change.key) {
            debug!("External write to {} by {}", namespace, change.writer);
            self.invalidate(namespace);
        }
    }

    /// Apply every change notification queued on the bus
    pub fn sync_external_changes(&mut self) {
        let Some(mut changes) = self.changes.take() else {
            return;
        };

        let mut open = true;
        loop {
            match changes.try_recv() {
                Ok(change) => self.handle_storage_change(&change),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(missed)) => {
                    warn!("Missed {} storage change notifications, reloading everything", missed);
                    self.invalidate_all();
                }
                Err(TryRecvError::Closed) => {
                    open = false;
                    break;
                }
            }
        }

        if open {
            self.changes = Some(changes);
        }
    }

    /// Durable store usage, overall and per namespace
    pub fn usage(&self) -> StorageUsage {
        let used_bytes = self.store.used_bytes().unwrap_or_else(|e| {
            warn!("Could not measure durable store usage: {}", e);
            0
        });
        let namespaces = Namespace::ALL
            .into_iter()
            .map(|ns| {
                let size = self
                    .store
                    .get_item(ns.key())
                    .ok()
                    .flatten()
                    .map(|raw| raw.len())
                    .unwrap_or(0);
                (ns, size)
            })
            .collect();

        StorageUsage {
            used_bytes,
            capacity: self.store.capacity(),
            namespaces,
        }
    }
}
