//! Comments: per-song, most-recent-first, append-only threads

use crate::decode;
use crate::memory_cache::Document;
use crate::namespace::Namespace;
use acordes_common::time;
use acordes_common::Comment;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Author label on every comment; there is no identity model
pub const ANONYMOUS_USER: &str = "Usuario Anónimo";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommentsDoc(BTreeMap<String, Vec<Comment>>);

impl CommentsDoc {
    /// Create a comment on `song_id` and put it at the head of the thread
    ///
    /// `text` is stored as given; bounding its length is the caller's job.
    pub fn add(&mut self, song_id: &str, text: &str) -> Comment {
        let comment = Comment {
            id: time::time_ordered_id(),
            song_id: song_id.to_string(),
            user: ANONYMOUS_USER.to_string(),
            text: text.to_string(),
            timestamp: time::now(),
        };
        self.0
            .entry(song_id.to_string())
            .or_default()
            .insert(0, comment.clone());
        comment
    }

    /// Thread for `song_id`, newest first; empty when there is none
    pub fn list(&self, song_id: &str) -> &[Comment] {
        self.0.get(song_id).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Document for CommentsDoc {
    const NAMESPACE: Namespace = Namespace::Comments;

    fn decode(raw: &str) -> Self {
        let threads = decode::map_of::<serde_json::Value>(raw, Self::NAMESPACE)
            .into_iter()
            .map(|(song_id, thread)| {
                let comments: Vec<Comment> = decode::list_of(thread, Self::NAMESPACE);
                if comments.iter().any(|c| c.song_id != song_id) {
                    warn!("Comment thread '{}' holds comments for another song", song_id);
                }
                (song_id, comments)
            })
            .collect();
        CommentsDoc(threads)
    }
}
