//! Subcommand implementations
//!
//! Each command works on an open [`SongStore`] and writes its report to the
//! given writer, so the binary prints to stdout and tests capture a buffer.

use acordes_cache::SongStore;
use acordes_common::sanitize::bound_comment;
use acordes_common::slug::song_slug;
use acordes_common::{Instrument, Song};
use anyhow::{anyhow, bail, Context, Result};
use serde_json::Value;
use std::io::Write;
use tracing::{debug, info};

/// Print a cached song, or one instrument variant of it
pub fn show(
    store: &mut SongStore,
    out: &mut impl Write,
    id: &str,
    instrument: Option<Instrument>,
    json: bool,
) -> Result<()> {
    let song = store
        .cached_song(id)
        .ok_or_else(|| anyhow!("song '{}' is not cached", id))?;

    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&song)?)?;
        return Ok(());
    }

    writeln!(out, "{} - {} [{}]", song.artist, song.title, song.key)?;
    let variants: Vec<&str> = song.chords.keys().map(Instrument::as_str).collect();
    if !variants.is_empty() {
        writeln!(out, "variants: {}", variants.join(", "))?;
    }
    writeln!(out)?;
    match instrument {
        Some(instrument) => writeln!(out, "{}", song.display_content(instrument))?,
        None => writeln!(out, "{}", song.content)?,
    }
    Ok(())
}

/// Parse song JSON (one object or an array of them)
///
/// Records without an `id` get the `artist-title` slug.
pub fn parse_songs(text: &str) -> Result<Vec<Song>> {
    let value: Value = serde_json::from_str(text).context("input is not valid JSON")?;
    let items = match value {
        Value::Array(items) => items,
        item @ Value::Object(_) => vec![item],
        _ => bail!("expected a song object or an array of songs"),
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, mut item)| -> Result<Song> {
            let object = item
                .as_object_mut()
                .ok_or_else(|| anyhow!("entry {} is not an object", index))?;
            let has_id = object
                .get("id")
                .and_then(Value::as_str)
                .is_some_and(|id| !id.trim().is_empty());
            if !has_id {
                let field = |name: &str| object.get(name).and_then(Value::as_str).unwrap_or("").to_string();
                let slug = song_slug(&field("artist"), &field("title"));
                if slug.is_empty() {
                    bail!("entry {} has neither an id nor an artist/title", index);
                }
                debug!("Derived id '{}' for entry {}", slug, index);
                object.insert("id".to_string(), Value::String(slug));
            }
            serde_json::from_value(item).with_context(|| format!("entry {} is not a song", index))
        })
        .collect()
}

/// Merge songs into the cache
pub fn import(store: &mut SongStore, out: &mut impl Write, text: &str) -> Result<()> {
    let songs = parse_songs(text)?;
    for song in songs {
        let stored = store.cache_song(song);
        let variants: Vec<&str> = stored.chords.keys().map(Instrument::as_str).collect();
        writeln!(out, "{} ({})", stored.id, variants.join(", "))?;
    }
    Ok(())
}

/// Store one instrument variant on an already cached song
pub fn set_instrument(
    store: &mut SongStore,
    out: &mut impl Write,
    id: &str,
    instrument: Instrument,
    content: &str,
) -> Result<()> {
    let updated = store
        .update_song_instrument(id, instrument, content)
        .ok_or_else(|| anyhow!("song '{}' is not cached", id))?;
    info!("Stored {} variant for '{}'", instrument, updated.id);
    writeln!(out, "{}: {} variant stored", updated.id, instrument)?;
    Ok(())
}

/// Open a cached song: record it in history and print it
pub fn view(store: &mut SongStore, out: &mut impl Write, id: &str, instrument: Option<Instrument>) -> Result<()> {
    show(store, out, id, instrument, false)?;
    store.add_to_history(id);
    Ok(())
}

pub fn favorite(store: &mut SongStore, out: &mut impl Write, id: &str) -> Result<()> {
    if store.toggle_favorite(id) {
        writeln!(out, "{} added to favorites", id)?;
    } else {
        writeln!(out, "{} removed from favorites", id)?;
    }
    Ok(())
}

pub fn favorites(store: &mut SongStore, out: &mut impl Write) -> Result<()> {
    let songs = store.favorite_songs();
    if songs.is_empty() {
        writeln!(out, "no favorites")?;
    }
    for song in songs {
        writeln!(out, "{}\t{} - {}", song.id, song.artist, song.title)?;
    }
    Ok(())
}

pub fn history(store: &mut SongStore, out: &mut impl Write) -> Result<()> {
    let songs = store.history_songs();
    if songs.is_empty() {
        writeln!(out, "history is empty")?;
    }
    for (position, song) in songs.iter().enumerate() {
        writeln!(out, "{:2}. {}\t{} - {}", position + 1, song.id, song.artist, song.title)?;
    }
    Ok(())
}

pub fn comment(store: &mut SongStore, out: &mut impl Write, song_id: &str, text: &str) -> Result<()> {
    let text = bound_comment(text).ok_or_else(|| anyhow!("comment is empty"))?;
    let created = store.add_comment(song_id, &text);
    writeln!(out, "comment {} added to {}", created.id, song_id)?;
    Ok(())
}

pub fn comments(store: &mut SongStore, out: &mut impl Write, song_id: &str) -> Result<()> {
    let thread = store.comments(song_id);
    if thread.is_empty() {
        writeln!(out, "no comments for {}", song_id)?;
    }
    for comment in thread {
        writeln!(
            out,
            "[{}] {}: {}",
            comment.timestamp.format("%Y-%m-%d %H:%M"),
            comment.user,
            comment.text
        )?;
    }
    Ok(())
}

/// Durable store usage per namespace
pub fn stats(store: &mut SongStore, out: &mut impl Write) -> Result<()> {
    let usage = store.usage();
    for (namespace, size) in &usage.namespaces {
        writeln!(out, "{:<10} {:>10} bytes", namespace.to_string(), size)?;
    }
    match usage.capacity {
        Some(capacity) => writeln!(out, "{:<10} {:>10} / {} bytes", "total", usage.used_bytes, capacity)?,
        None => writeln!(out, "{:<10} {:>10} bytes", "total", usage.used_bytes)?,
    }
    writeln!(
        out,
        "{} songs cached, {} favorites, {} in history",
        store.cached_count(),
        store.favorites().len(),
        store.history().len()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acordes_cache::MemoryStore;
    use acordes_common::config::ConsistencyMode;
    use std::sync::Arc;

    fn store() -> SongStore {
        SongStore::new(Arc::new(MemoryStore::new()), ConsistencyMode::Notify)
    }

    fn run(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_single_song_derives_id() {
        let songs = parse_songs(r#"{"title": "Oye Mi Amor", "artist": "Maná", "content": "Am"}"#).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].id, "maná-oye-mi-amor");
    }

    #[test]
    fn test_parse_array_keeps_explicit_ids() {
        let songs = parse_songs(r#"[{"id": "a", "title": "A"}, {"id": "b", "chords": {"piano": "C"}}]"#).unwrap();
        let ids: Vec<&str> = songs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(songs[1].variant(Instrument::Piano), Some("C"));
    }

    #[test]
    fn test_parse_rejects_unidentifiable_entries() {
        assert!(parse_songs(r#"{"content": "x"}"#).is_err());
        assert!(parse_songs("42").is_err());
        assert!(parse_songs("[1]").is_err());
        assert!(parse_songs("not json").is_err());
    }

    #[test]
    fn test_import_merges_variants() {
        let mut store = store();
        run(|out| import(&mut store, out, r#"{"id": "s", "chords": {"guitar": "G"}, "content": "G"}"#));
        let report = run(|out| import(&mut store, out, r#"{"id": "s", "chords": {"piano": "P"}, "content": "P"}"#));

        assert_eq!(report.trim(), "s (guitar, piano)");
    }

    #[test]
    fn test_import_chords_only_keeps_title_and_body_in_sync() {
        let mut store = store();
        store.cache_song(Song::new("s", "Title", "Artist").with_variant(Instrument::Guitar, "X"));

        run(|out| import(&mut store, out, r#"{"id": "s", "chords": {"piano": "P"}}"#));

        let song = store.cached_song("s").unwrap();
        assert_eq!(song.title, "Title");
        assert_eq!(song.artist, "Artist");
        assert_eq!(song.content, "P");
    }

    #[test]
    fn test_view_records_history_only_when_cached() {
        let mut store = store();
        assert!(view(&mut store, &mut std::io::sink(), "missing", None).is_err());
        assert!(store.history().is_empty());

        store.cache_song(Song::new("s", "T", "A").with_variant(Instrument::Guitar, "G C"));
        let page = run(|out| view(&mut store, out, "s", Some(Instrument::Piano)));

        assert!(page.starts_with("A - T"));
        assert!(page.contains("G C"));
        assert_eq!(store.history(), ["s"]);
    }

    #[test]
    fn test_set_instrument_requires_cached_song() {
        let mut store = store();
        assert!(set_instrument(&mut store, &mut std::io::sink(), "s", Instrument::Piano, "P").is_err());

        store.cache_song(Song::new("s", "T", "A"));
        run(|out| set_instrument(&mut store, out, "s", Instrument::Piano, "P"));
        assert_eq!(store.cached_song("s").unwrap().content, "P");
    }

    #[test]
    fn test_favorite_toggle_report() {
        let mut store = store();
        assert_eq!(run(|out| favorite(&mut store, out, "s")).trim(), "s added to favorites");
        assert_eq!(run(|out| favorite(&mut store, out, "s")).trim(), "s removed from favorites");
    }

    #[test]
    fn test_comment_rejects_blank_text() {
        let mut store = store();
        assert!(comment(&mut store, &mut std::io::sink(), "s", "   ").is_err());

        run(|out| comment(&mut store, out, "s", " first "));
        let listing = run(|out| comments(&mut store, out, "s"));
        assert!(listing.contains("Usuario Anónimo: first"));
    }

    #[test]
    fn test_stats_lists_every_namespace() {
        let mut store = store();
        store.add_to_history("s");
        let report = run(|out| stats(&mut store, out));

        for name in ["songs", "favorites", "history", "comments", "total"] {
            assert!(report.contains(name), "missing {} in {}", name, report);
        }
        assert!(report.contains("0 songs cached, 0 favorites, 1 in history"));
    }
}
