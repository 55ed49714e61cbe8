//! Song records and the reconciler that merges partial fetches
//!
//! A fetch usually covers one instrument. Writes never drop variants that
//! were fetched earlier: `chords` only grows, and a variant is replaced
//! only by a newer write for that same instrument.
//!
//! The displayed `content` always mirrors the most recently written
//! variant.

use crate::decode;
use crate::memory_cache::Document;
use crate::namespace::Namespace;
use acordes_common::{Instrument, Song};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Combine an incoming (possibly partial) record with the stored one
///
/// Non-empty scalar fields come from `incoming`; empty ones and an absent
/// `source` keep the stored value. `chords` is the union with incoming
/// variants winning per instrument.
///
/// A fragment carrying exactly one variant and no `content` displays that
/// variant.
pub fn merge_song(existing: Option<Song>, mut incoming: Song) -> Song {
    if incoming.content.is_empty() && incoming.chords.len() == 1 {
        if let Some(only) = incoming.chords.values().next() {
            incoming.content = only.clone();
        }
    }

    let Some(existing) = existing else {
        return incoming;
    };

    let mut chords = existing.chords;
    chords.extend(incoming.chords);

    Song {
        id: incoming.id,
        title: non_empty_or(incoming.title, existing.title),
        artist: non_empty_or(incoming.artist, existing.artist),
        content: non_empty_or(incoming.content, existing.content),
        chords,
        key: non_empty_or(incoming.key, existing.key),
        source: incoming.source.or(existing.source),
    }
}

fn non_empty_or(incoming: String, existing: String) -> String {
    if incoming.is_empty() {
        existing
    } else {
        incoming
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SongsDoc(BTreeMap<String, Song>);

impl SongsDoc {
    pub fn get(&self, id: &str) -> Option<&Song> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge `song` into the record stored under its id
    pub fn merge(&mut self, song: Song) -> &Song {
        let existing = self.0.remove(&song.id);
        let id = song.id.clone();
        self.0.entry(id).or_insert(merge_song(existing, song))
    }

    /// Point update of one variant on an already cached song
    ///
    /// Also makes `content` the displayed body. Returns `None` without
    /// touching anything when the song is not cached.
    pub fn set_variant(&mut self, id: &str, instrument: Instrument, content: &str) -> Option<&Song> {
        let song = self.0.get_mut(id)?;
        song.chords.insert(instrument, content.to_string());
        song.content = content.to_string();
        Some(song)
    }

    /// Records for `ids` in order, skipping ids with no cached record
    pub fn resolve<'a>(&self, ids: impl IntoIterator<Item = &'a String>) -> Vec<Song> {
        ids.into_iter().filter_map(|id| self.0.get(id)).cloned().collect()
    }
}

impl Document for SongsDoc {
    const NAMESPACE: Namespace = Namespace::Songs;

    /// Records missing their inner `id` take it from the map key
    fn decode(raw: &str) -> Self {
        let songs = decode::map_of::<Value>(raw, Self::NAMESPACE)
            .into_iter()
            .filter_map(|(key, mut entry)| {
                if let Value::Object(fields) = &mut entry {
                    if !fields.contains_key("id") {
                        debug!("Song entry '{}' has no id, using its key", key);
                        fields.insert("id".to_string(), Value::String(key.clone()));
                    }
                }
                match serde_json::from_value::<Song>(entry) {
                    Ok(song) => Some((key, song)),
                    Err(e) => {
                        warn!("Dropping unreadable {} entry '{}': {}", Self::NAMESPACE, key, e);
                        None
                    }
                }
            })
            .collect();
        SongsDoc(songs)
    }
}
