//! Application model types: `App`, `InputMode` and notice bookkeeping.
//!
//! The `App` struct holds the search results, the selection within the
//! current page, panel visibility and the playlist store. It never talks to
//! the network or the audio engine; the runtime does that and feeds results
//! back in.

use std::time::{Duration, Instant};

use tracing::warn;

use crate::catalog::{SearchKind, Track};
use crate::config::UiSettings;
use crate::error::Error;
use crate::player::Notice;
use crate::playlist::PlaylistStore;

/// What typed characters go to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
    NewPlaylist,
    RenamePlaylist,
}

impl InputMode {
    pub fn prompt(self) -> &'static str {
        match self {
            InputMode::Normal => "",
            InputMode::Search => "Search",
            InputMode::NewPlaylist => "New playlist",
            InputMode::RenamePlaylist => "Rename playlist",
        }
    }
}

/// The main application model.
pub struct App {
    pub results: Vec<Track>,
    /// Last submitted query; search results for any other query are stale.
    pub query: String,
    pub kind: SearchKind,
    pub searching: bool,

    page: usize,
    selected: usize,
    items_per_page: usize,

    pub input_mode: InputMode,
    pub input: String,

    pub show_queue: bool,
    pub show_playlists: bool,
    pub show_info: bool,
    pub show_keybinds: bool,

    pub playlists: PlaylistStore,
    playlist_selected: usize,
    // Row inside the selected playlist's track list.
    playlist_track_selected: usize,
    // Row in the queue panel; clamped to the queue length when read.
    queue_selected: usize,

    /// Lyric line the lyrics panel is centred on.
    pub lyric_anchor: usize,

    notices: Vec<(Notice, Instant)>,
    notice_ttl: Duration,
}

impl App {
    pub fn new(playlists: PlaylistStore, ui: &UiSettings) -> Self {
        Self {
            results: Vec::new(),
            query: String::new(),
            kind: SearchKind::Track,
            searching: false,

            page: 0,
            selected: 0,
            items_per_page: ui.items_per_page.max(1),

            input_mode: InputMode::Normal,
            input: String::new(),

            show_queue: false,
            show_playlists: false,
            show_info: false,
            show_keybinds: false,

            playlists,
            playlist_selected: 0,
            playlist_track_selected: 0,
            queue_selected: 0,

            lyric_anchor: 0,

            notices: Vec::new(),
            notice_ttl: Duration::from_millis(ui.notice_ttl_ms),
        }
    }

    // Paging

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn total_pages(&self) -> usize {
        self.results.len().div_ceil(self.items_per_page)
    }

    /// Index into `results` of the first row on the current page.
    pub fn page_start(&self) -> usize {
        (self.page * self.items_per_page).min(self.results.len())
    }

    /// The slice of results on the current page.
    pub fn page_items(&self) -> &[Track] {
        let start = self.page_start();
        let end = (start + self.items_per_page).min(self.results.len());
        &self.results[start..end]
    }

    /// Row of the selection within the current page.
    pub fn selected_row(&self) -> usize {
        self.selected
    }

    pub fn selected_track(&self) -> Option<&Track> {
        self.page_items().get(self.selected)
    }

    /// Go to the next page. Returns `false` on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.page + 1 >= self.total_pages() {
            return false;
        }
        self.page += 1;
        self.selected = 0;
        self.show_info = false;
        true
    }

    /// Go to the previous page. Returns `false` on the first page.
    pub fn prev_page(&mut self) -> bool {
        if self.page == 0 {
            return false;
        }
        self.page -= 1;
        self.selected = 0;
        self.show_info = false;
        true
    }

    /// Move the selection down, wrapping within the page.
    pub fn select_next(&mut self) {
        let len = self.page_items().len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    /// Move the selection up, wrapping within the page.
    pub fn select_prev(&mut self) {
        let len = self.page_items().len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    // Search

    /// Record a submitted query. Results for earlier queries are ignored from
    /// now on.
    pub fn start_search(&mut self, query: &str) {
        self.query = query.to_string();
        self.searching = true;
        self.show_info = false;
    }

    /// Apply finished search results. Returns `false` if they are stale.
    pub fn finish_search(&mut self, query: &str, kind: SearchKind, results: Vec<Track>) -> bool {
        if query != self.query || kind != self.kind {
            return false;
        }
        self.searching = false;
        if results.is_empty() {
            self.notify(Notice::info("No results found"));
            return true;
        }
        self.results = results;
        self.page = 0;
        self.selected = 0;
        true
    }

    /// Overlay a detail record on every result with the same id.
    pub fn merge_detail(&mut self, track_id: &str, detail: Track) {
        for track in self.results.iter_mut().filter(|t| t.id == track_id) {
            track.merge_detail(detail.clone());
        }
    }

    /// Toggle the info popup. Returns the id to fetch details for when the
    /// popup opens.
    pub fn toggle_info(&mut self) -> Option<String> {
        if self.show_info {
            self.show_info = false;
            return None;
        }
        let id = self.selected_track()?.id.clone();
        self.show_info = true;
        Some(id)
    }

    pub fn toggle_keybinds(&mut self) {
        self.show_keybinds = !self.show_keybinds;
    }

    pub fn toggle_queue(&mut self) {
        self.show_queue = !self.show_queue;
    }

    pub fn toggle_playlists(&mut self) {
        self.show_playlists = !self.show_playlists;
        self.clamp_playlist_selection();
    }

    // Text input

    pub fn begin_input(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.input.clear();
    }

    pub fn push_input(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input(&mut self) {
        self.input.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    /// Leave input mode, returning the mode and the trimmed text.
    pub fn take_input(&mut self) -> (InputMode, String) {
        let mode = std::mem::take(&mut self.input_mode);
        let text = std::mem::take(&mut self.input).trim().to_string();
        (mode, text)
    }

    // Playlists

    pub fn selected_playlist(&self) -> Option<String> {
        self.playlists.names().into_iter().nth(self.playlist_selected)
    }

    pub fn playlist_selected_row(&self) -> usize {
        self.playlist_selected
    }

    pub fn playlist_next(&mut self) {
        let len = self.playlists.names().len();
        if len > 0 {
            self.playlist_selected = (self.playlist_selected + 1) % len;
            self.playlist_track_selected = 0;
        }
    }

    pub fn playlist_prev(&mut self) {
        let len = self.playlists.names().len();
        if len > 0 {
            self.playlist_selected = (self.playlist_selected + len - 1) % len;
            self.playlist_track_selected = 0;
        }
    }

    pub fn playlist_track_row(&self) -> usize {
        self.playlist_track_selected
    }

    /// Move down the selected playlist's tracks, wrapping at the end.
    pub fn playlist_track_next(&mut self) {
        let len = self.selected_playlist_len();
        if len > 0 {
            self.playlist_track_selected = (self.playlist_track_selected + 1) % len;
        }
    }

    pub fn playlist_track_prev(&mut self) {
        let len = self.selected_playlist_len();
        if len > 0 {
            self.playlist_track_selected = (self.playlist_track_selected + len - 1) % len;
        }
    }

    pub fn create_playlist(&mut self, name: &str) {
        if name.is_empty() {
            self.notify(Notice::info("Please enter a playlist name"));
            return;
        }
        match self.playlists.create(name) {
            Ok(true) => {
                self.select_playlist(name);
                self.notify(Notice::info(format!("Created playlist: {name}")));
            }
            Ok(false) => self.notify(Notice::warn(format!("Playlist '{name}' already exists"))),
            Err(e) => self.storage_failed("create playlist", e),
        }
    }

    pub fn rename_selected_playlist(&mut self, new_name: &str) {
        let Some(old) = self.selected_playlist() else {
            self.notify(Notice::info("No playlist selected"));
            return;
        };
        if new_name.is_empty() {
            self.notify(Notice::info("Please enter a new playlist name"));
            return;
        }
        match self.playlists.rename(&old, new_name) {
            Ok(true) => {
                self.select_playlist(new_name);
                self.notify(Notice::info(format!("Renamed playlist to '{new_name}'")));
            }
            Ok(false) => self.notify(Notice::warn(format!(
                "Failed to rename playlist or '{new_name}' already exists"
            ))),
            Err(e) => self.storage_failed("rename playlist", e),
        }
    }

    pub fn delete_selected_playlist(&mut self) {
        let Some(name) = self.selected_playlist() else {
            self.notify(Notice::info("No playlist selected"));
            return;
        };
        match self.playlists.delete(&name) {
            Ok(_) => {
                self.clamp_playlist_selection();
                self.notify(Notice::info(format!("Deleted playlist: {name}")));
            }
            Err(e) => self.storage_failed("delete playlist", e),
        }
    }

    /// Add the selected result to the selected playlist.
    pub fn add_selected_to_playlist(&mut self) {
        let Some(track) = self.selected_track().cloned() else {
            self.notify(Notice::info("No track selected"));
            return;
        };
        let Some(name) = self.selected_playlist() else {
            self.notify(Notice::info("No playlists available. Create one first."));
            return;
        };
        let title = track.title_or_unknown().to_string();
        match self.playlists.add_track(&name, track) {
            Ok(true) => self.notify(Notice::info(format!("Added '{title}' to '{name}'"))),
            Ok(false) => self.notify(Notice::warn(format!(
                "'{title}' is already in '{name}'"
            ))),
            Err(e) => self.storage_failed("add to playlist", e),
        }
    }

    /// Drop the highlighted track from the selected playlist.
    pub fn remove_selected_playlist_track(&mut self) {
        let Some(name) = self.selected_playlist() else {
            self.notify(Notice::info("No playlist selected"));
            return;
        };
        let index = self.playlist_track_selected;
        let Some(title) = self
            .playlists
            .get(&name)
            .and_then(|tracks| tracks.get(index))
            .map(|t| t.title_or_unknown().to_string())
        else {
            self.notify(Notice::info("No track selected"));
            return;
        };
        match self.playlists.remove_track(&name, index) {
            Ok(true) => {
                self.clamp_playlist_track_selection();
                self.notify(Notice::info(format!("Removed '{title}' from '{name}'")));
            }
            Ok(false) => self.notify(Notice::warn("Failed to remove track")),
            Err(e) => self.storage_failed("remove track from playlist", e),
        }
    }

    /// Take the selected result out of the selected playlist.
    pub fn remove_selected_from_playlist(&mut self) {
        let Some(track) = self.selected_track() else {
            self.notify(Notice::info("No track selected"));
            return;
        };
        let (id, title) = (track.id.clone(), track.title_or_unknown().to_string());
        let Some(name) = self.selected_playlist() else {
            self.notify(Notice::info("No playlist selected"));
            return;
        };
        match self.playlists.remove_track_by_id(&name, &id) {
            Ok(true) => {
                self.clamp_playlist_track_selection();
                self.notify(Notice::info(format!("Removed '{title}' from '{name}'")));
            }
            Ok(false) => self.notify(Notice::info(format!("'{title}' is not in '{name}'"))),
            Err(e) => self.storage_failed("remove track from playlist", e),
        }
    }

    pub fn clear_selected_playlist(&mut self) {
        let Some(name) = self.selected_playlist() else {
            self.notify(Notice::info("No playlist selected"));
            return;
        };
        match self.playlists.clear_playlist(&name) {
            Ok(_) => {
                self.playlist_track_selected = 0;
                self.notify(Notice::info(format!("Cleared playlist: {name}")));
            }
            Err(e) => self.storage_failed("clear playlist", e),
        }
    }

    /// Tracks of the selected playlist, for loading into the queue.
    pub fn selected_playlist_tracks(&mut self) -> Option<Vec<Track>> {
        let Some(name) = self.selected_playlist() else {
            self.notify(Notice::info("No playlist selected"));
            return None;
        };
        match self.playlists.get(&name) {
            Some(tracks) if !tracks.is_empty() => Some(tracks.to_vec()),
            _ => {
                self.notify(Notice::info("Playlist is empty"));
                None
            }
        }
    }

    fn select_playlist(&mut self, name: &str) {
        if let Some(pos) = self.playlists.names().iter().position(|n| n == name) {
            self.playlist_selected = pos;
            self.playlist_track_selected = 0;
        }
    }

    fn clamp_playlist_selection(&mut self) {
        let len = self.playlists.names().len();
        if self.playlist_selected >= len {
            self.playlist_selected = len.saturating_sub(1);
        }
        self.playlist_track_selected = 0;
    }

    fn clamp_playlist_track_selection(&mut self) {
        let len = self.selected_playlist_len();
        if self.playlist_track_selected >= len {
            self.playlist_track_selected = len.saturating_sub(1);
        }
    }

    fn selected_playlist_len(&self) -> usize {
        self.selected_playlist()
            .map_or(0, |name| self.playlists.count(&name))
    }

    fn storage_failed(&mut self, action: &str, e: Error) {
        warn!(error = %e, path = %self.playlists.path().display(), "could not {action}");
        self.notify(Notice::error(format!("Could not {action}: {e}")));
    }

    // Queue panel

    /// Highlighted queue row for a queue of `len` entries.
    pub fn queue_row(&self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.queue_selected.min(len - 1))
    }

    pub fn queue_select_next(&mut self, len: usize) {
        if let Some(row) = self.queue_row(len) {
            self.queue_selected = (row + 1) % len;
        }
    }

    pub fn queue_select_prev(&mut self, len: usize) {
        if let Some(row) = self.queue_row(len) {
            self.queue_selected = (row + len - 1) % len;
        }
    }

    // Notices

    pub fn notify(&mut self, notice: Notice) {
        self.notify_at(notice, Instant::now());
    }

    pub fn notify_at(&mut self, notice: Notice, now: Instant) {
        self.notices.push((notice, now));
    }

    /// Drop notices older than the configured TTL.
    pub fn prune_notices(&mut self, now: Instant) {
        let ttl = self.notice_ttl;
        self.notices
            .retain(|(_, shown)| now.saturating_duration_since(*shown) < ttl);
    }

    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter().map(|(n, _)| n)
    }
}

