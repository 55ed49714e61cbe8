//! Favorites: set of song ids kept in the order they were added

use crate::decode;
use crate::memory_cache::Document;
use crate::namespace::Namespace;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FavoritesDoc(Vec<String>);

impl FavoritesDoc {
    /// Flip membership of `id`; returns `true` when it is now a favorite
    pub fn toggle(&mut self, id: &str) -> bool {
        if let Some(index) = self.0.iter().position(|existing| existing == id) {
            self.0.remove(index);
            false
        } else {
            self.0.push(id.to_string());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|existing| existing == id)
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }
}

impl Document for FavoritesDoc {
    const NAMESPACE: Namespace = Namespace::Favorites;

    fn decode(raw: &str) -> Self {
        FavoritesDoc(decode::id_list(raw, Self::NAMESPACE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_reports_post_state() {
        let mut favorites = FavoritesDoc::default();
        assert!(favorites.toggle("a"));
        assert!(favorites.contains("a"));
        assert!(!favorites.toggle("a"));
        assert!(!favorites.contains("a"));
    }

    #[test]
    fn test_toggle_appends_and_removes_in_place() {
        let mut favorites = FavoritesDoc::default();
        favorites.toggle("a");
        favorites.toggle("b");
        favorites.toggle("c");
        favorites.toggle("b");
        assert_eq!(favorites.ids(), ["a", "c"]);
    }

    #[test]
    fn test_decode_enforces_uniqueness() {
        let favorites = FavoritesDoc::decode(r#"["a","b","a"]"#);
        assert_eq!(favorites.ids(), ["a", "b"]);
    }
}
