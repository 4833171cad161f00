use std::sync::mpsc::{SyncSender, TrySendError};

use tracing::{debug, info, warn};

use crate::audio::{MediaBackend, PlaybackEngine};
use crate::catalog::Track;
use crate::config::Settings;
use crate::lyrics::{LineChange, LyricsSync};
use crate::queue::QueueStore;

use super::events::{Event, Notice};
use super::jobs::Jobs;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    Playing,
    Paused,
}

impl PlayerState {
    pub fn label(self) -> &'static str {
        match self {
            PlayerState::Idle => "Stopped",
            PlayerState::Playing => "Playing",
            PlayerState::Paused => "Paused",
        }
    }
}

/// Where the lyrics panel stands for the current track.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LyricsStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    NotFound,
    Failed,
}

/// Read-only view of the player for one frame.
pub struct PlayerView<'a> {
    pub state: PlayerState,
    pub current: Option<&'a Track>,
    pub position: f64,
    pub duration: f64,
    pub repeat: bool,
    pub lyrics_visible: bool,
    pub lyrics_status: LyricsStatus,
    pub lyrics: &'a LyricsSync,
}

/// Decides what plays next.
///
/// Lives on the UI thread and owns the engine, the queue and the lyrics
/// state. Everything from other threads arrives as an [`Event`] through
/// [`PlaybackController::handle_event`]; no call here waits on the network
/// or the media backend.
pub struct PlaybackController<B: MediaBackend + 'static> {
    engine: PlaybackEngine<B>,
    queue: QueueStore,
    lyrics: LyricsSync,
    jobs: Jobs,
    state: PlayerState,
    current: Option<Track>,
    repeat: bool,
    lyrics_visible: bool,
    lyrics_status: LyricsStatus,
    // Bumped by every play and stop; results tagged with an older value are stale.
    token: u64,
    pending: Option<u64>,
    // Track handed to the engine, waiting for the session to confirm.
    starting: Option<Track>,
    session: Option<u64>,
    seek_step: f64,
    line_change: Option<LineChange>,
    notices: Vec<Notice>,
}

impl<B: MediaBackend + 'static> PlaybackController<B> {
    pub fn new(engine: PlaybackEngine<B>, jobs: Jobs, settings: &Settings) -> Self {
        let tx = jobs.sender();
        engine.set_position_callback(move |update| {
            // Ticks are disposable; drop them rather than block the sampler.
            if let Err(TrySendError::Disconnected(_)) = tx.try_send(Event::Position(update)) {
                debug!("event receiver gone; position dropped");
            }
        });
        let tx: SyncSender<Event> = jobs.sender();
        engine.set_on_end_callback(move |session| {
            if tx.send(Event::TrackEnded { session }).is_err() {
                debug!(session, "event receiver gone; end-of-track dropped");
            }
        });
        let tx: SyncSender<Event> = jobs.sender();
        engine.set_on_start_callback(move |session, confirmed| {
            let event = if confirmed {
                Event::Started { session }
            } else {
                Event::StartFailed { session }
            };
            if tx.send(event).is_err() {
                debug!(session, "event receiver gone; start result dropped");
            }
        });

        Self {
            engine,
            queue: QueueStore::new(),
            lyrics: LyricsSync::new(),
            jobs,
            state: PlayerState::Idle,
            current: None,
            repeat: settings.playback.repeat,
            lyrics_visible: settings.lyrics.show_on_start,
            lyrics_status: LyricsStatus::Idle,
            token: 0,
            pending: None,
            starting: None,
            session: None,
            seek_step: settings.playback.seek_seconds as f64,
            line_change: None,
            notices: Vec::new(),
        }
    }

    pub fn queue(&self) -> &QueueStore {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut QueueStore {
        &mut self.queue
    }

    pub fn jobs(&self) -> &Jobs {
        &self.jobs
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn lyrics_visible(&self) -> bool {
        self.lyrics_visible
    }

    #[cfg(test)]
    pub fn session_id(&self) -> Option<u64> {
        self.session
    }

    /// A play request is still resolving its stream or waiting for the
    /// backend to start.
    pub fn is_resolving(&self) -> bool {
        self.pending.is_some() || self.starting.is_some()
    }

    pub fn snapshot(&self) -> PlayerView<'_> {
        let mut duration = self.engine.get_duration();
        if duration <= 0.0 {
            duration = self.current.as_ref().map_or(0.0, |t| t.duration.max(0.0));
        }
        PlayerView {
            state: self.state,
            current: self.current.as_ref(),
            position: self.engine.get_current_time(),
            duration,
            repeat: self.repeat,
            lyrics_visible: self.lyrics_visible,
            lyrics_status: self.lyrics_status,
            lyrics: &self.lyrics,
        }
    }

    /// Notices posted since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// The last active-line change not yet consumed by the view.
    pub fn take_line_change(&mut self) -> Option<LineChange> {
        self.line_change.take()
    }

    /// Start `track`: drop the current session, then resolve its stream off
    /// the UI thread. Playback begins when the matching
    /// [`Event::StreamResolved`] arrives.
    pub fn play(&mut self, track: Track) {
        self.reset_session();
        let token = self.token;
        self.pending = Some(token);
        info!(token, id = %track.id, title = track.title_or_unknown(), "resolving stream");
        self.jobs.resolve_stream(token, track);
    }

    /// Play the queue's current track.
    pub fn play_queue_current(&mut self) {
        match self.queue.current().cloned() {
            Some(track) => self.play(track),
            None => self.notice(Notice::info("Queue is empty")),
        }
    }

    /// Jump to queue entry `index` and play it.
    pub fn play_queue_index(&mut self, index: usize) {
        match self.queue.set_current(index).cloned() {
            Some(track) => self.play(track),
            None => self.notice(Notice::info("No such queue entry")),
        }
    }

    /// Back to idle. Cancels an in-flight stream resolution or start as well.
    pub fn stop(&mut self) {
        self.reset_session();
    }

    pub fn pause(&mut self) {
        if self.state == PlayerState::Playing {
            self.engine.pause();
            self.state = PlayerState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PlayerState::Paused {
            self.engine.resume();
            self.state = PlayerState::Playing;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            PlayerState::Playing => self.pause(),
            PlayerState::Paused => self.resume(),
            PlayerState::Idle => self.notice(Notice::info("Nothing is playing")),
        }
    }

    /// User skip forward through the queue.
    pub fn next(&mut self) {
        match self.queue.next().cloned() {
            Some(track) => self.play(track),
            None => self.notice(Notice::info("No next track in queue")),
        }
    }

    /// User skip backward through the queue.
    pub fn previous(&mut self) {
        match self.queue.previous().cloned() {
            Some(track) => self.play(track),
            None => self.notice(Notice::info("No previous track in queue")),
        }
    }

    /// Jump by `steps` seek intervals (negative rewinds).
    pub fn seek_by(&mut self, steps: f64) {
        if self.state == PlayerState::Idle {
            return;
        }
        let target = self.engine.get_current_time() + steps * self.seek_step;
        self.engine.seek(target);
        if self.lyrics_visible {
            let position = self.engine.get_current_time();
            self.sync_lyrics(position);
        }
    }

    pub fn toggle_repeat(&mut self) {
        self.repeat = !self.repeat;
        let text = if self.repeat {
            "Repeat enabled"
        } else {
            "Repeat disabled"
        };
        self.notice(Notice::info(text));
    }

    /// Show or hide the lyrics panel. Showing needs a current track.
    pub fn toggle_lyrics(&mut self) {
        if self.lyrics_visible {
            self.lyrics_visible = false;
            self.lyrics.clear();
            self.lyrics_status = LyricsStatus::Idle;
            self.line_change = None;
            return;
        }
        if self.current.is_none() {
            self.notice(Notice::info("Play a track to see its lyrics"));
            return;
        }
        self.lyrics_visible = true;
        self.request_lyrics();
    }

    /// Apply one event from the channel. Search and detail results are not
    /// player business and are ignored here.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Position(update) => {
                if Some(update.session) != self.session {
                    return;
                }
                if self.lyrics_visible {
                    self.sync_lyrics(update.position);
                }
            }
            Event::TrackEnded { session } => {
                if Some(session) != self.session {
                    debug!(session, "end-of-track from an old session ignored");
                    return;
                }
                self.on_track_end();
            }
            Event::Started { session } => {
                if Some(session) != self.session {
                    debug!(session, "start of an old session ignored");
                    return;
                }
                if let Some(track) = self.starting.take() {
                    self.state = PlayerState::Playing;
                    info!(session, id = %track.id, "now playing");
                    self.current = Some(track);
                    if self.lyrics_visible {
                        self.request_lyrics();
                    }
                }
            }
            Event::StartFailed { session } => {
                if Some(session) != self.session {
                    debug!(session, "failure of an old session ignored");
                    return;
                }
                self.session = None;
                if let Some(track) = self.starting.take() {
                    self.notice(Notice::error(format!(
                        "Playback did not start for {}",
                        track.title_or_unknown()
                    )));
                }
            }
            Event::StreamResolved { token, track, url } => {
                if self.pending != Some(token) {
                    debug!(token, id = %track.id, "stale stream resolution discarded");
                    return;
                }
                self.pending = None;
                match url {
                    Ok(Some(url)) => self.start(track, url),
                    Ok(None) => {
                        warn!(id = %track.id, "no stream URL");
                        self.notice(Notice::warn(format!(
                            "No stream available for {}",
                            track.title_or_unknown()
                        )));
                    }
                    Err(e) => {
                        warn!(id = %track.id, error = %e, "stream resolution failed");
                        self.notice(Notice::error(format!("Could not get stream: {e}")));
                    }
                }
            }
            Event::LyricsFetched { token, raw } => {
                if token != self.token || !self.lyrics_visible {
                    debug!(token, "stale lyrics discarded");
                    return;
                }
                match raw {
                    Ok(Some(raw)) => {
                        self.lyrics.load(&raw);
                        if self.lyrics.has_lyrics() {
                            self.lyrics_status = LyricsStatus::Loaded;
                            let position = self.engine.get_current_time();
                            self.sync_lyrics(position);
                        } else {
                            self.lyrics_status = LyricsStatus::NotFound;
                        }
                    }
                    Ok(None) => self.lyrics_status = LyricsStatus::NotFound,
                    Err(e) => {
                        warn!(error = %e, "lyrics fetch failed");
                        self.lyrics_status = LyricsStatus::Failed;
                        self.notice(Notice::warn("Could not fetch lyrics"));
                    }
                }
            }
            Event::DetailFetched { .. } | Event::SearchFinished { .. } => {}
        }
    }

    /// Hand the resolved stream to the engine. The player turns `Playing`
    /// once the session reports [`Event::Started`].
    fn start(&mut self, mut track: Track, url: String) {
        track.stream_url = Some(url.clone());
        let hint = track.length().map(|d| d.as_secs_f64());
        let session = self.engine.play(&url, hint);
        debug!(session, id = %track.id, "waiting for the backend to start");
        self.session = Some(session);
        self.starting = Some(track);
    }

    fn on_track_end(&mut self) {
        if self.repeat {
            if let Some(track) = self.current.clone() {
                debug!(id = %track.id, "repeating track");
                self.play(track);
                return;
            }
        }
        match self.queue.next().cloned() {
            Some(track) => self.play(track),
            None => {
                self.stop();
                self.notice(Notice::info("Reached the end of the queue"));
            }
        }
    }

    fn reset_session(&mut self) {
        self.token += 1;
        self.pending = None;
        self.starting = None;
        self.engine.stop();
        self.session = None;
        self.current = None;
        self.lyrics.clear();
        self.lyrics_status = LyricsStatus::Idle;
        self.line_change = None;
        self.state = PlayerState::Idle;
    }

    fn request_lyrics(&mut self) {
        let Some(track) = &self.current else {
            return;
        };
        self.lyrics.clear();
        self.lyrics_status = LyricsStatus::Loading;
        self.jobs.fetch_lyrics(self.token, track);
    }

    fn sync_lyrics(&mut self, position: f64) {
        if let Some(change) = self.lyrics.update_position(position) {
            self.line_change = Some(change);
        }
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
