//! Song, instrument and comment models
//!
//! Field names match the persisted JSON layout exactly (`songId`, `key`,
//! `chords`, ...). Decoding is tolerant: optional fields default when
//! absent and unknown instrument keys inside `chords` are ignored, so
//! documents written by older builds still load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::Error;

/// Instrument variant a chord sheet is written for
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    #[default]
    Guitar,
    Ukulele,
    Piano,
}

impl Instrument {
    /// All variants, in display order
    pub const ALL: [Instrument; 3] = [Instrument::Guitar, Instrument::Ukulele, Instrument::Piano];

    /// Wire name (`guitar`, `ukulele`, `piano`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Instrument::Guitar => "guitar",
            Instrument::Ukulele => "ukulele",
            Instrument::Piano => "piano",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Instrument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "guitar" => Ok(Instrument::Guitar),
            "ukulele" => Ok(Instrument::Ukulele),
            "piano" => Ok(Instrument::Piano),
            other => Err(Error::InvalidInput(format!("unknown instrument '{}'", other))),
        }
    }
}

/// Cached song record
///
/// `content` is the body currently displayed; `chords` holds every
/// instrument variant fetched so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Stable slug, usually `artist-title`
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// Default or currently displayed chord sheet
    #[serde(default)]
    pub content: String,
    /// Per-instrument chord sheets
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "deserialize_chords"
    )]
    pub chords: BTreeMap<Instrument, String>,
    /// Musical key
    #[serde(default)]
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Song {
    pub fn new(id: impl Into<String>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            content: String::new(),
            chords: BTreeMap::new(),
            key: String::new(),
            source: None,
        }
    }

    /// Set the musical key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Store `content` for `instrument` and make it the displayed body
    pub fn with_variant(mut self, instrument: Instrument, content: impl Into<String>) -> Self {
        let content = content.into();
        self.chords.insert(instrument, content.clone());
        self.content = content;
        self
    }

    /// Chord sheet fetched for `instrument`, if any
    pub fn variant(&self, instrument: Instrument) -> Option<&str> {
        self.chords.get(&instrument).map(String::as_str)
    }

    pub fn has_variant(&self, instrument: Instrument) -> bool {
        self.chords.contains_key(&instrument)
    }

    /// Body to render for `instrument`: its own variant, else the default content
    pub fn display_content(&self, instrument: Instrument) -> &str {
        self.variant(instrument).unwrap_or(&self.content)
    }
}

fn deserialize_chords<'de, D>(deserializer: D) -> Result<BTreeMap<Instrument, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    let mut chords = BTreeMap::new();

    for (name, value) in raw.unwrap_or_default() {
        let Ok(instrument) = name.parse::<Instrument>() else {
            debug!("Ignoring chords for unknown instrument '{}'", name);
            continue;
        };
        if let serde_json::Value::String(text) = value {
            chords.insert(instrument, text);
        }
    }

    Ok(chords)
}

/// User comment attached to a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Unique, time-ordered identifier
    pub id: String,
    pub song_id: String,
    /// Author label
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    /// Creation time, persisted as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// Candidate returned by the search service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSearchResult {
    pub id: String,
    pub title: String,
    pub artist: String,
}
