//! Several cache instances over one durable store
//!
//! Each instance plays the role of a browser tab: same origin storage, own
//! memory snapshots, kept honest by change notifications or revalidation.

mod common;

use acordes_cache::{MemoryStore, Namespace, SongStore, StorageOrigin};
use acordes_common::config::ConsistencyMode;
use acordes_common::events::{ChangeBus, StorageChange};
use acordes_common::Instrument;
use common::{fragment, put_raw};
use std::sync::Arc;
use uuid::Uuid;

fn origin(mode: ConsistencyMode) -> StorageOrigin {
    StorageOrigin::new(Arc::new(MemoryStore::new())).with_consistency(mode)
}

#[test]
fn test_instance_sees_other_instance_favorite() {
    let origin = origin(ConsistencyMode::Notify);
    let mut tab_a = origin.open_instance();
    let mut tab_b = origin.open_instance();

    // B loads its snapshot before A writes
    assert!(!tab_b.is_favorite("song"));
    assert!(tab_a.toggle_favorite("song"));

    assert!(tab_b.is_favorite("song"));
    assert_eq!(tab_b.favorites(), ["song"]);
}

#[test]
fn test_notification_invalidates_only_written_namespace() {
    let origin = origin(ConsistencyMode::Notify);
    let mut tab_a = origin.open_instance();
    let mut tab_b = origin.open_instance();
    tab_b.history();
    tab_b.favorites();

    tab_a.add_to_history("song");
    tab_b.sync_external_changes();

    assert!(!tab_b.is_loaded(Namespace::History));
    assert!(tab_b.is_loaded(Namespace::Favorites));
    assert_eq!(tab_b.history(), ["song"]);
}

#[test]
fn test_own_writes_do_not_invalidate() {
    let origin = origin(ConsistencyMode::Notify);
    let mut tab = origin.open_instance();

    tab.add_to_history("song");
    tab.sync_external_changes();

    assert!(tab.is_loaded(Namespace::History));
}

#[test]
fn test_stale_snapshot_does_not_overwrite_other_instance() {
    let origin = origin(ConsistencyMode::Notify);
    let mut tab_a = origin.open_instance();
    let mut tab_b = origin.open_instance();
    tab_a.cache_song(fragment("song", Instrument::Guitar, "X"));
    tab_b.cached_song("song");

    tab_a.cache_song(fragment("song", Instrument::Piano, "Y"));
    let merged = tab_b.cache_song(fragment("song", Instrument::Ukulele, "U"));

    assert_eq!(merged.chords.len(), 3);
    let seen_by_a = tab_a.cached_song("song").unwrap();
    assert_eq!(seen_by_a.variant(Instrument::Piano), Some("Y"));
    assert_eq!(seen_by_a.variant(Instrument::Ukulele), Some("U"));
}

#[test]
fn test_comment_threads_shared_between_instances() {
    let origin = origin(ConsistencyMode::Notify);
    let mut tab_a = origin.open_instance();
    let mut tab_b = origin.open_instance();

    let first = tab_a.add_comment("song", "first");
    let second = tab_b.add_comment("song", "second");

    assert_eq!(tab_a.comments("song"), vec![second, first]);
}

#[test]
fn test_lagged_receiver_reloads_everything() {
    let store = Arc::new(MemoryStore::new());
    let origin = StorageOrigin::new(store).with_bus(ChangeBus::new(1));
    let mut tab_a = origin.open_instance();
    let mut tab_b = origin.open_instance();
    tab_b.history();
    tab_b.favorites();
    tab_b.comments("song");

    tab_a.add_to_history("one");
    tab_a.add_to_history("two");
    tab_a.toggle_favorite("one");
    tab_b.sync_external_changes();

    for ns in Namespace::ALL {
        assert!(!tab_b.is_loaded(ns), "{} should have been dropped", ns);
    }
    assert_eq!(tab_b.history(), ["two", "one"]);
    assert_eq!(tab_b.favorites(), ["one"]);
}

#[test]
fn test_revalidate_mode_without_notifications() {
    let store = Arc::new(MemoryStore::new());
    let mut writer = SongStore::new(store.clone(), ConsistencyMode::Revalidate);
    let mut reader = SongStore::new(store, ConsistencyMode::Revalidate);

    assert!(reader.history().is_empty());
    writer.add_to_history("song");

    assert_eq!(reader.history(), ["song"]);
}

#[test]
fn test_revalidate_mode_picks_up_raw_edits() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = SongStore::new(store.clone(), ConsistencyMode::Revalidate);
    assert!(cache.favorites().is_empty());

    put_raw(store.as_ref(), Namespace::Favorites, r#"["a","b"]"#);

    assert_eq!(cache.favorites(), ["a", "b"]);
}

#[test]
fn test_notify_mode_standalone_keeps_snapshot() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = SongStore::new(store.clone(), ConsistencyMode::Notify);
    assert!(cache.favorites().is_empty());

    put_raw(store.as_ref(), Namespace::Favorites, r#"["a"]"#);
    assert!(cache.favorites().is_empty());

    cache.invalidate(Namespace::Favorites);
    assert_eq!(cache.favorites(), ["a"]);
}

#[test]
fn test_manual_storage_change_events() {
    let store = Arc::new(MemoryStore::new());
    let mut cache = SongStore::new(store.clone(), ConsistencyMode::Notify);
    cache.history();
    cache.favorites();

    put_raw(store.as_ref(), Namespace::History, r#"["x"]"#);

    cache.handle_storage_change(&StorageChange::new("unrelated_key", Uuid::new_v4()));
    assert!(cache.is_loaded(Namespace::History));

    cache.handle_storage_change(&StorageChange::new(Namespace::History.key(), cache.instance_id()));
    assert!(cache.is_loaded(Namespace::History));

    cache.handle_storage_change(&StorageChange::new(Namespace::History.key(), Uuid::new_v4()));
    assert!(!cache.is_loaded(Namespace::History));
    assert!(cache.is_loaded(Namespace::Favorites));
    assert_eq!(cache.history(), ["x"]);
}

#[test]
fn test_failed_write_is_not_announced() {
    let store = Arc::new(MemoryStore::with_capacity(48));
    let origin = StorageOrigin::new(store);
    let mut tab_a = origin.open_instance();
    let mut tab_b = origin.open_instance();
    tab_b.cached_song("song");

    tab_a.cache_song(fragment("song", Instrument::Guitar, &"x".repeat(512)));
    tab_b.sync_external_changes();

    assert!(tab_b.is_loaded(Namespace::Songs));
    assert_eq!(tab_b.cached_song("song"), None);
    assert!(tab_a.cached_song("song").is_some());
}
