//! Lenient decoding of persisted namespace documents
//!
//! A document with the wrong top-level shape decodes to empty; inside a
//! well-shaped document, entries that fail to decode are dropped one by one.

use crate::namespace::Namespace;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Parse raw text, warning and returning `None` on malformed JSON
pub(crate) fn parse(raw: &str, ns: Namespace) -> Option<Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Failed to parse stored {} document, starting empty: {}", ns, e);
            None
        }
    }
}

/// Object of `T` entries keyed by string
pub(crate) fn map_of<T: DeserializeOwned>(raw: &str, ns: Namespace) -> BTreeMap<String, T> {
    let Some(value) = parse(raw, ns) else {
        return BTreeMap::new();
    };
    let Value::Object(object) = value else {
        warn!("Stored {} document is not an object, starting empty", ns);
        return BTreeMap::new();
    };

    object
        .into_iter()
        .filter_map(|(key, entry)| match serde_json::from_value(entry) {
            Ok(decoded) => Some((key, decoded)),
            Err(e) => {
                warn!("Dropping unreadable {} entry '{}': {}", ns, key, e);
                None
            }
        })
        .collect()
}

/// Array of `T`, dropping elements that fail to decode
pub(crate) fn list_of<T: DeserializeOwned>(value: Value, ns: Namespace) -> Vec<T> {
    let Value::Array(items) = value else {
        warn!("Expected a list in stored {} document, ignoring entry", ns);
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                warn!("Dropping unreadable {} list item: {}", ns, e);
                None
            }
        })
        .collect()
}

/// Array of unique song ids; first occurrence wins
pub(crate) fn id_list(raw: &str, ns: Namespace) -> Vec<String> {
    let Some(value) = parse(raw, ns) else {
        return Vec::new();
    };
    if !value.is_array() {
        warn!("Stored {} document is not a list, starting empty", ns);
        return Vec::new();
    }

    let mut ids: Vec<String> = Vec::new();
    for id in list_of::<String>(value, ns) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_list_garbage() {
        assert!(id_list("{not json", Namespace::History).is_empty());
        assert!(id_list("{\"a\":1}", Namespace::History).is_empty());
        assert!(id_list("null", Namespace::Favorites).is_empty());
    }

    #[test]
    fn test_id_list_drops_non_strings_and_duplicates() {
        let ids = id_list(r#"["a", 3, "b", null, "a"]"#, Namespace::Favorites);
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_map_of_keeps_valid_entries() {
        let map: BTreeMap<String, u32> = map_of(r#"{"a": 1, "b": "x", "c": 3}"#, Namespace::Songs);
        assert_eq!(map.len(), 2);
        assert_eq!(map["c"], 3);
    }

    #[test]
    fn test_map_of_wrong_shape() {
        let map: BTreeMap<String, u32> = map_of("[1,2,3]", Namespace::Songs);
        assert!(map.is_empty());
    }
}
