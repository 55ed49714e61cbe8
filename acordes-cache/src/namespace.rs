//! The four logical partitions of the durable store

use std::fmt;

/// Logical data partition; each maps to exactly one durable key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Songs,
    Favorites,
    History,
    Comments,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::Songs,
        Namespace::Favorites,
        Namespace::History,
        Namespace::Comments,
    ];

    /// Durable store key holding this namespace's JSON document
    pub fn key(&self) -> &'static str {
        match self {
            Namespace::Songs => "acordesai_songs_cache",
            Namespace::Favorites => "acordesai_favorites",
            Namespace::History => "acordesai_history",
            Namespace::Comments => "acordesai_comments",
        }
    }

    /// Reverse of [`Namespace::key`]; foreign keys map to `None`
    pub fn from_key(key: &str) -> Option<Namespace> {
        Namespace::ALL.into_iter().find(|ns| ns.key() == key)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Namespace::Songs => "songs",
            Namespace::Favorites => "favorites",
            Namespace::History => "history",
            Namespace::Comments => "comments",
        };
        f.write_str(name)
    }
}
