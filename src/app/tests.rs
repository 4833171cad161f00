use std::time::{Duration, Instant};

use super::*;
use crate::catalog::{SearchKind, Track};
use crate::config::UiSettings;
use crate::player::{Notice, PlayerState};
use crate::playlist::PlaylistStore;

fn t(id: &str) -> Track {
    Track::new(id, format!("Title {id}"), "Artist")
}

fn tracks(n: usize) -> Vec<Track> {
    (0..n).map(|i| t(&i.to_string())).collect()
}

fn app_with(dir: &tempfile::TempDir, per_page: usize) -> App {
    let ui = UiSettings {
        items_per_page: per_page,
        notice_ttl_ms: 1000,
        ..UiSettings::default()
    };
    App::new(PlaylistStore::open(dir.path()), &ui)
}

fn app_with_results(dir: &tempfile::TempDir, per_page: usize, n: usize) -> App {
    let mut app = app_with(dir, per_page);
    app.start_search("q");
    assert!(app.finish_search("q", SearchKind::Track, tracks(n)));
    app
}

fn notice_texts(app: &App) -> Vec<String> {
    app.notices().map(|n| n.text.clone()).collect()
}

#[test]
fn paging_splits_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 25);

    assert_eq!(app.total_pages(), 3);
    assert_eq!(app.page_items().len(), 10);
    assert!(app.next_page());
    assert!(app.next_page());
    assert_eq!(app.page(), 2);
    assert_eq!(app.page_items().len(), 5);
    assert_eq!(app.page_items()[0].id, "20");
    assert!(!app.next_page());

    assert!(app.prev_page());
    assert_eq!(app.page(), 1);
    assert_eq!(app.selected_track().map(|t| t.id.as_str()), Some("10"));
}

#[test]
fn paging_an_empty_result_set_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);

    assert_eq!(app.total_pages(), 0);
    assert!(app.page_items().is_empty());
    assert!(!app.next_page());
    assert!(!app.prev_page());
    app.select_next();
    assert!(app.selected_track().is_none());
}

#[test]
fn selection_wraps_within_the_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 3, 5);

    app.select_prev();
    assert_eq!(app.selected_row(), 2);
    app.select_next();
    assert_eq!(app.selected_row(), 0);

    app.next_page();
    app.select_next();
    app.select_next();
    assert_eq!(app.selected_row(), 0);
    assert_eq!(app.selected_track().map(|t| t.id.as_str()), Some("3"));
}

#[test]
fn stale_search_results_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);

    app.start_search("first");
    app.start_search("second");
    assert!(!app.finish_search("first", SearchKind::Track, tracks(3)));
    assert!(app.results.is_empty());
    assert!(app.searching);

    assert!(app.finish_search("second", SearchKind::Track, tracks(2)));
    assert_eq!(app.results.len(), 2);
    assert!(!app.searching);
}

#[test]
fn empty_search_keeps_old_results_and_posts_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 4);

    app.start_search("nothing");
    assert!(app.finish_search("nothing", SearchKind::Track, Vec::new()));
    assert_eq!(app.results.len(), 4);
    assert_eq!(notice_texts(&app), vec!["No results found"]);
}

#[test]
fn new_results_reset_page_and_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 2, 6);
    app.next_page();
    app.select_next();

    app.start_search("other");
    app.finish_search("other", SearchKind::Track, tracks(3));
    assert_eq!(app.page(), 0);
    assert_eq!(app.selected_row(), 0);
}

#[test]
fn info_popup_requests_detail_only_when_opening() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 2);

    assert_eq!(app.toggle_info().as_deref(), Some("0"));
    assert!(app.show_info);
    assert_eq!(app.toggle_info(), None);
    assert!(!app.show_info);

    let mut empty = app_with(&dir, 10);
    assert_eq!(empty.toggle_info(), None);
    assert!(!empty.show_info);
}

#[test]
fn merge_detail_updates_matching_results() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 3);

    let mut detail = t("1");
    detail.genre = Some("Jazz".into());
    app.merge_detail("1", detail);

    assert_eq!(app.results[1].genre.as_deref(), Some("Jazz"));
    assert_eq!(app.results[0].genre, None);
}

#[test]
fn take_input_trims_and_returns_to_normal() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);

    app.begin_input(InputMode::Search);
    for c in " miles x".chars() {
        app.push_input(c);
    }
    app.pop_input();
    app.pop_input();
    assert_eq!(app.take_input(), (InputMode::Search, "miles".to_string()));
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.input.is_empty());

    app.begin_input(InputMode::NewPlaylist);
    app.push_input('a');
    app.cancel_input();
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.input.is_empty());
}

#[test]
fn notices_expire_after_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);
    let start = Instant::now();

    app.notify_at(Notice::info("old"), start);
    app.notify_at(Notice::info("new"), start + Duration::from_millis(600));

    app.prune_notices(start + Duration::from_millis(500));
    assert_eq!(notice_texts(&app), vec!["old", "new"]);

    app.prune_notices(start + Duration::from_millis(1200));
    assert_eq!(notice_texts(&app), vec!["new"]);

    app.prune_notices(start + Duration::from_millis(5000));
    assert_eq!(app.notices().count(), 0);
}

#[test]
fn playlist_create_selects_the_new_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);

    app.create_playlist("b");
    app.create_playlist("a");
    assert_eq!(app.selected_playlist().as_deref(), Some("a"));

    app.create_playlist("a");
    app.create_playlist("");
    assert_eq!(
        notice_texts(&app),
        vec![
            "Created playlist: b",
            "Created playlist: a",
            "Playlist 'a' already exists",
            "Please enter a playlist name",
        ]
    );
}

#[test]
fn playlist_selection_wraps_and_survives_delete() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);
    app.create_playlist("a");
    app.create_playlist("b");
    app.create_playlist("c");

    assert_eq!(app.selected_playlist().as_deref(), Some("c"));
    app.playlist_next();
    assert_eq!(app.selected_playlist().as_deref(), Some("a"));
    app.playlist_prev();
    assert_eq!(app.selected_playlist().as_deref(), Some("c"));

    app.delete_selected_playlist();
    assert_eq!(app.selected_playlist().as_deref(), Some("b"));
    app.delete_selected_playlist();
    app.delete_selected_playlist();
    assert_eq!(app.selected_playlist(), None);
    app.delete_selected_playlist();
    assert_eq!(notice_texts(&app).last().map(String::as_str), Some("No playlist selected"));
}

#[test]
fn rename_keeps_the_renamed_playlist_selected() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);
    app.create_playlist("m");
    app.create_playlist("z");
    app.playlist_prev();

    app.rename_selected_playlist("a");
    assert_eq!(app.playlists.names(), vec!["a", "z"]);
    assert_eq!(app.selected_playlist().as_deref(), Some("a"));

    app.rename_selected_playlist("z");
    assert_eq!(app.playlists.names(), vec!["a", "z"]);
}

#[test]
fn add_selected_to_playlist_reports_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 2);

    app.add_selected_to_playlist();
    assert_eq!(
        notice_texts(&app),
        vec!["No playlists available. Create one first."]
    );

    app.create_playlist("mix");
    app.add_selected_to_playlist();
    app.add_selected_to_playlist();
    assert_eq!(app.playlists.count("mix"), 1);
    assert_eq!(
        notice_texts(&app)[2..].to_vec(),
        vec!["Added 'Title 0' to 'mix'", "'Title 0' is already in 'mix'"]
    );
}

#[test]
fn selected_playlist_tracks_skips_empty_playlists() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 2);

    assert!(app.selected_playlist_tracks().is_none());
    app.create_playlist("mix");
    assert!(app.selected_playlist_tracks().is_none());
    assert_eq!(notice_texts(&app).last().map(String::as_str), Some("Playlist is empty"));

    app.add_selected_to_playlist();
    let loaded = app.selected_playlist_tracks().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "0");
}

#[test]
fn playlist_track_removal_follows_the_highlighted_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 3);
    app.remove_selected_playlist_track();
    app.create_playlist("mix");
    for _ in 0..3 {
        app.add_selected_to_playlist();
        app.select_next();
    }
    assert_eq!(app.playlists.count("mix"), 3);

    app.playlist_track_prev();
    assert_eq!(app.playlist_track_row(), 2);
    app.remove_selected_playlist_track();
    // the last row went away, so the highlight moves up
    assert_eq!(app.playlist_track_row(), 1);
    app.playlist_track_next();
    assert_eq!(app.playlist_track_row(), 0);
    app.remove_selected_playlist_track();

    let left: Vec<&str> = app
        .playlists
        .get("mix")
        .unwrap()
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(left, vec!["1"]);
    let texts = notice_texts(&app);
    assert_eq!(texts[0], "No playlist selected");
    assert_eq!(
        texts[texts.len() - 2..].to_vec(),
        vec!["Removed 'Title 2' from 'mix'", "Removed 'Title 0' from 'mix'"]
    );
}

#[test]
fn selected_result_can_be_taken_out_of_a_playlist() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 2);
    app.create_playlist("mix");
    app.add_selected_to_playlist();

    app.remove_selected_from_playlist();
    assert_eq!(app.playlists.count("mix"), 0);
    app.remove_selected_from_playlist();
    assert_eq!(
        notice_texts(&app).last().map(String::as_str),
        Some("'Title 0' is not in 'mix'")
    );
}

#[test]
fn clearing_a_playlist_keeps_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 2);
    app.create_playlist("mix");
    app.add_selected_to_playlist();
    app.select_next();
    app.add_selected_to_playlist();
    app.playlist_track_next();

    app.clear_selected_playlist();
    assert_eq!(app.playlists.names(), vec!["mix"]);
    assert_eq!(app.playlists.count("mix"), 0);
    assert_eq!(app.playlist_track_row(), 0);
    assert_eq!(notice_texts(&app).last().map(String::as_str), Some("Cleared playlist: mix"));

    // reloading from disk shows the same empty playlist
    let reloaded = PlaylistStore::open(dir.path());
    assert_eq!(reloaded.count("mix"), 0);
}

#[test]
fn switching_playlists_resets_the_track_row() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with_results(&dir, 10, 2);
    app.create_playlist("b");
    app.add_selected_to_playlist();
    app.select_next();
    app.add_selected_to_playlist();
    app.playlist_track_next();
    assert_eq!(app.playlist_track_row(), 1);

    app.create_playlist("a");
    assert_eq!(app.playlist_track_row(), 0);
    app.playlist_next();
    assert_eq!(app.selected_playlist().as_deref(), Some("b"));
    assert_eq!(app.playlist_track_row(), 0);
}

#[test]
fn queue_row_wraps_and_clamps_to_the_queue() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = app_with(&dir, 10);
    assert_eq!(app.queue_row(0), None);
    app.queue_select_next(0);
    assert_eq!(app.queue_row(3), Some(0));

    app.queue_select_prev(3);
    assert_eq!(app.queue_row(3), Some(2));
    app.queue_select_next(3);
    assert_eq!(app.queue_row(3), Some(0));

    app.queue_select_prev(3);
    // the queue shrank under the highlight
    assert_eq!(app.queue_row(2), Some(1));
}

#[test]
fn progress_line_shows_fill_and_times() {
    let line = progress_line(30.0, 120.0, PlayerState::Playing, 60);
    // 40 cells, a quarter filled.
    assert_eq!(line.matches('█').count(), 10);
    assert_eq!(line.matches('░').count(), 30);
    assert!(line.ends_with(" 0:30 / 2:00 (Playing)"));
}

#[test]
fn progress_line_idle_and_degenerate_values() {
    let idle = progress_line(50.0, 100.0, PlayerState::Idle, 40);
    assert_eq!(idle.matches('█').count(), 0);
    assert!(idle.ends_with(" 0:00 / 0:00 (Stopped)"));

    let unknown = progress_line(12.0, 0.0, PlayerState::Paused, 0);
    assert_eq!(unknown.matches('░').count(), 10);
    assert!(unknown.ends_with(" 0:12 / 0:00 (Paused)"));

    let overrun = progress_line(200.0, 100.0, PlayerState::Playing, 30);
    assert_eq!(overrun.matches('█').count(), 10);
}
