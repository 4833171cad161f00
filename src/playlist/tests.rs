use super::*;
use crate::catalog::Track;
use serde_json::json;
use std::cell::Cell;
use std::fs;
use std::rc::Rc;

fn t(id: &str) -> Track {
    Track::new(id, format!("Song {id}"), "Artist")
}

fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn missing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = PlaylistStore::open(dir.path());
    assert!(store.names().is_empty());
    assert_eq!(store.path(), dir.path().join(PLAYLIST_FILE));
}

#[test]
fn persisted_playlist_reloads_identically() {
    let dir = tempfile::tempdir().unwrap();
    let mut track = t("42");
    track.album_title = Some("LP".into());
    track.duration = 201.5;
    track.extra.insert("albumCover".into(), json!("https://img/c.jpg"));

    let mut store = PlaylistStore::open(dir.path());
    assert!(store.create("Road trip").unwrap());
    assert!(store.add_track("Road trip", t("1")).unwrap());
    assert!(store.add_track("Road trip", track.clone()).unwrap());
    assert!(store.add_track("Road trip", t("3")).unwrap());
    let before = store.get("Road trip").unwrap().to_vec();

    let reloaded = PlaylistStore::open(dir.path());
    assert_eq!(reloaded.names(), vec!["Road trip"]);
    assert_eq!(reloaded.get("Road trip").unwrap(), before.as_slice());
    assert_eq!(reloaded.get("Road trip").unwrap()[1], track);
}

#[test]
fn file_has_name_to_tracks_shape() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path());
    store.create("mix").unwrap();
    store.add_track("mix", t("7")).unwrap();

    let raw = fs::read_to_string(store.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["mix"][0]["id"], json!("7"));
    assert_eq!(value["mix"][0]["title"], json!("Song 7"));
}

#[test]
fn duplicate_track_id_is_rejected_and_list_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path());
    store.create("mix").unwrap();
    store.add_track("mix", t("1")).unwrap();
    store.add_track("mix", t("2")).unwrap();

    let mut dup = t("1");
    dup.title = Some("Different title".into());
    assert!(!store.add_track("mix", dup).unwrap());
    assert_eq!(ids(store.get("mix").unwrap()), vec!["1", "2"]);

    let reloaded = PlaylistStore::open(dir.path());
    assert_eq!(ids(reloaded.get("mix").unwrap()), vec!["1", "2"]);
}

#[test]
fn create_rejects_blank_and_existing_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path());
    assert!(!store.create("   ").unwrap());
    assert!(store.create("a").unwrap());
    assert!(!store.create("a").unwrap());
    assert!(!store.add_track("missing", t("1")).unwrap());
}

#[test]
fn rename_and_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path());
    store.create("old").unwrap();
    store.create("taken").unwrap();
    store.add_track("old", t("1")).unwrap();

    assert!(!store.rename("old", "taken").unwrap());
    assert!(!store.rename("old", "").unwrap());
    assert!(!store.rename("nope", "fresh").unwrap());
    assert!(store.rename("old", "fresh").unwrap());
    assert_eq!(store.names(), vec!["fresh", "taken"]);
    assert_eq!(store.count("fresh"), 1);

    assert!(store.delete("taken").unwrap());
    assert!(!store.delete("taken").unwrap());

    let reloaded = PlaylistStore::open(dir.path());
    assert_eq!(reloaded.names(), vec!["fresh"]);
}

#[test]
fn remove_by_index_id_and_clear() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path());
    store.create("p").unwrap();
    for id in ["1", "2", "3", "4"] {
        store.add_track("p", t(id)).unwrap();
    }

    assert!(!store.remove_track("p", 9).unwrap());
    assert!(store.remove_track("p", 0).unwrap());
    assert!(store.remove_track_by_id("p", "3").unwrap());
    assert!(!store.remove_track_by_id("p", "3").unwrap());
    assert_eq!(ids(store.get("p").unwrap()), vec!["2", "4"]);

    assert!(store.clear_playlist("p").unwrap());
    assert_eq!(store.count("p"), 0);
    assert!(store.get("p").is_some());
}

#[test]
fn corrupt_file_is_moved_aside() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(PLAYLIST_FILE);
    fs::write(&path, "{ not json").unwrap();

    let mut store = PlaylistStore::open(dir.path());
    assert!(store.names().is_empty());
    assert!(dir.path().join("playlists.json.bak").exists());

    assert!(store.create("fresh").unwrap());
    assert_eq!(
        fs::read_to_string(dir.path().join("playlists.json.bak")).unwrap(),
        "{ not json"
    );
}

#[test]
fn save_creates_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let mut store = PlaylistStore::open(&nested);
    assert!(store.create("x").unwrap());
    assert!(nested.join(PLAYLIST_FILE).exists());
}

#[test]
fn change_callback_fires_on_mutation_and_survives_panics() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = PlaylistStore::open(dir.path());

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    store.set_on_change(move |_| counter.set(counter.get() + 1));
    store.create("a").unwrap();
    store.add_track("a", t("1")).unwrap();
    // rejected: no notification
    store.add_track("a", t("1")).unwrap();
    assert_eq!(calls.get(), 2);

    store.set_on_change(|_| panic!("listener bug"));
    assert!(store.add_track("a", t("2")).unwrap());
    assert_eq!(store.count("a"), 2);
}

#[test]
fn failed_save_leaves_memory_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().join("playlists");
    let mut store = PlaylistStore::open(&home);
    store.create("a").unwrap();
    store.add_track("a", t("1")).unwrap();

    let calls = Rc::new(Cell::new(0));
    let counter = calls.clone();
    store.set_on_change(move |_| counter.set(counter.get() + 1));

    // A plain file where the directory was makes every save fail.
    fs::remove_dir_all(&home).unwrap();
    fs::write(&home, "not a directory").unwrap();

    assert!(store.add_track("a", t("2")).is_err());
    assert!(store.remove_track("a", 0).is_err());
    assert!(store.remove_track_by_id("a", "1").is_err());
    assert!(store.clear_playlist("a").is_err());
    assert!(store.rename("a", "b").is_err());
    assert!(store.create("c").is_err());
    assert!(store.delete("a").is_err());

    assert_eq!(store.names(), vec!["a"]);
    assert_eq!(ids(store.get("a").unwrap()), vec!["1"]);
    assert_eq!(calls.get(), 0);

    // rejected requests never reach the disk, so they still answer Ok(false)
    assert!(!store.add_track("a", t("1")).unwrap());
}
