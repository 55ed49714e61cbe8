//! History: bounded, deduplicated, most-recent-first list of viewed songs

use crate::decode;
use crate::memory_cache::Document;
use crate::namespace::Namespace;
use serde::Serialize;

/// Maximum number of history entries kept
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryDoc(Vec<String>);

impl HistoryDoc {
    /// Move `id` to the front, dropping its older occurrence and anything
    /// past [`HISTORY_LIMIT`]
    pub fn record_view(&mut self, id: &str) {
        self.0.retain(|existing| existing != id);
        self.0.insert(0, id.to_string());
        self.0.truncate(HISTORY_LIMIT);
    }

    /// Song ids, most recent first
    pub fn ids(&self) -> &[String] {
        &self.0
    }
}

impl Document for HistoryDoc {
    const NAMESPACE: Namespace = Namespace::History;

    fn decode(raw: &str) -> Self {
        let mut ids = decode::id_list(raw, Self::NAMESPACE);
        ids.truncate(HISTORY_LIMIT);
        HistoryDoc(ids)
    }
}
