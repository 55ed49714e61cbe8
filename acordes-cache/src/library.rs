//! Song loading flow on top of the cache
//!
//! The generation services are external; this module only fixes the order
//! in which they and the cache are consulted:
//! - load: cache first, fetch the guitar sheet on a miss, record history
//! - instrument switch: reuse a stored variant, otherwise fetch and
//!   point-update the cached record
//! - search: sanitized query, failures degrade to no results
//!
//! A failed service call never writes to the cache.

use crate::store::SongStore;
use acordes_common::sanitize::sanitize_input;
use acordes_common::{Error, Instrument, Result, Song, SongSearchResult};
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Free-text song search
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Candidates for `query` (already sanitized); may be empty
    async fn search(&self, query: &str) -> Result<Vec<SongSearchResult>>;
}

/// What the chord generator is asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordRequest {
    pub id: String,
    /// Known title, if any (already sanitized)
    pub title: Option<String>,
    /// Known artist, if any (already sanitized)
    pub artist: Option<String>,
    pub instrument: Instrument,
}

/// Chord sheet generation
#[async_trait]
pub trait ChordService: Send + Sync {
    /// Song fragment whose `content` is the sheet for `request.instrument`
    async fn fetch_song(&self, request: &ChordRequest) -> Result<Song>;
}

/// Instrument fetched when a song is loaded for the first time
pub const DEFAULT_INSTRUMENT: Instrument = Instrument::Guitar;

/// Cache plus the services it fronts
pub struct Library<S, C> {
    store: SongStore,
    search: S,
    chords: C,
}

impl<S: SearchService, C: ChordService> Library<S, C> {
    pub fn new(store: SongStore, search: S, chords: C) -> Self {
        Self { store, search, chords }
    }

    pub fn store(&mut self) -> &mut SongStore {
        &mut self.store
    }

    /// Search for songs; blank queries and service failures yield nothing
    pub async fn search(&self, query: &str) -> Vec<SongSearchResult> {
        let query = sanitize_input(query);
        if query.is_empty() {
            return Vec::new();
        }

        match self.search.search(&query).await {
            Ok(results) => {
                debug!("Search '{}' returned {} results", query, results.len());
                results
            }
            Err(e) => {
                warn!("Search '{}' failed: {}", query, e);
                Vec::new()
            }
        }
    }

    /// Load a song for display, from cache when possible
    ///
    /// Every successful load lands in history.
    pub async fn load_song(&mut self, id: &str, title: Option<&str>, artist: Option<&str>) -> Result<Song> {
        if let Some(cached) = self.store.cached_song(id) {
            debug!("Cache hit for '{}'", id);
            self.store.add_to_history(&cached.id);
            return Ok(cached);
        }

        let request = ChordRequest {
            id: id.to_string(),
            title: title.map(sanitize_input).filter(|t| !t.is_empty()),
            artist: artist.map(sanitize_input).filter(|a| !a.is_empty()),
            instrument: DEFAULT_INSTRUMENT,
        };
        let mut fragment = self.fetch(&request).await?;

        if fragment.id != id {
            debug!("Generator returned id '{}' for '{}', keeping requested id", fragment.id, id);
            fragment.id = id.to_string();
        }
        if !fragment.has_variant(DEFAULT_INSTRUMENT) {
            fragment.chords.insert(DEFAULT_INSTRUMENT, fragment.content.clone());
        }

        let stored = self.store.cache_song(fragment);
        self.store.add_to_history(&stored.id);
        info!("Cached '{}' ({} - {})", stored.id, stored.artist, stored.title);
        Ok(stored)
    }

    /// Show `song` for `instrument`, fetching the variant only if missing
    pub async fn switch_instrument(&mut self, song: &Song, instrument: Instrument) -> Result<Song> {
        if song.has_variant(instrument) {
            return Ok(song.clone());
        }

        let request = ChordRequest {
            id: song.id.clone(),
            title: Some(sanitize_input(&song.title)).filter(|t| !t.is_empty()),
            artist: Some(sanitize_input(&song.artist)).filter(|a| !a.is_empty()),
            instrument,
        };
        let fetched = self.fetch(&request).await?;

        match self.store.update_song_instrument(&song.id, instrument, &fetched.content) {
            Some(updated) => Ok(updated),
            None => {
                debug!("'{}' is not cached, returning unsaved {} variant", song.id, instrument);
                Ok(song.clone().with_variant(instrument, fetched.content))
            }
        }
    }

    async fn fetch(&self, request: &ChordRequest) -> Result<Song> {
        self.chords.fetch_song(request).await.map_err(|e| {
            warn!("Chord generation for '{}' ({}) failed: {}", request.id, request.instrument, e);
            match e {
                Error::Upstream(_) => e,
                other => Error::Upstream(other.to_string()),
            }
        })
    }
}
