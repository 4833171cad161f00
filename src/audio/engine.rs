use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use super::backend::MediaBackend;
use super::types::{BackendState, EngineTiming, PositionUpdate};

pub type PositionCallback = Arc<dyn Fn(PositionUpdate) + Send + Sync>;
/// Receives the id of the session that finished.
pub type EndCallback = Arc<dyn Fn(u64) + Send + Sync>;
/// Receives the session id and whether the backend confirmed playback.
pub type StartCallback = Arc<dyn Fn(u64, bool) + Send + Sync>;

#[derive(Default)]
struct Callbacks {
    position: Option<PositionCallback>,
    end: Option<EndCallback>,
    start: Option<StartCallback>,
}

#[derive(Debug, Default, Copy, Clone)]
struct Sample {
    position: f64,
    duration: f64,
}

struct Session {
    id: u64,
    paused: Arc<AtomicBool>,
    stop_tx: Sender<()>,
    done_rx: Receiver<()>,
    handle: JoinHandle<()>,
}

/// Transport controls plus a background session thread over a [`MediaBackend`].
///
/// Owned by the UI thread, which never waits on the backend. Each session
/// thread first waits (bounded) for the backend to confirm playback, reports
/// the outcome through the start callback, then samples position until the
/// track ends. It never touches player state; it only reads the backend and
/// invokes the registered callbacks.
pub struct PlaybackEngine<B: MediaBackend + 'static> {
    backend: Arc<Mutex<B>>,
    timing: EngineTiming,
    callbacks: Arc<Mutex<Callbacks>>,
    sample: Arc<Mutex<Sample>>,
    // Id of the only session allowed to report; 0 when none.
    live: Arc<AtomicU64>,
    session: Option<Session>,
    last_session: u64,
}

impl<B: MediaBackend + 'static> PlaybackEngine<B> {
    pub fn new(backend: B, timing: EngineTiming) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
            timing,
            callbacks: Arc::new(Mutex::new(Callbacks::default())),
            sample: Arc::new(Mutex::new(Sample::default())),
            live: Arc::new(AtomicU64::new(0)),
            session: None,
            last_session: 0,
        }
    }

    /// Register the position listener, replacing any earlier one.
    pub fn set_position_callback(&self, callback: impl Fn(PositionUpdate) + Send + Sync + 'static) {
        if let Ok(mut cbs) = self.callbacks.lock() {
            cbs.position = Some(Arc::new(callback));
        }
    }

    /// Register the end-of-track listener, replacing any earlier one.
    pub fn set_on_end_callback(&self, callback: impl Fn(u64) + Send + Sync + 'static) {
        if let Ok(mut cbs) = self.callbacks.lock() {
            cbs.end = Some(Arc::new(callback));
        }
    }

    /// Register the start listener, replacing any earlier one.
    pub fn set_on_start_callback(&self, callback: impl Fn(u64, bool) + Send + Sync + 'static) {
        if let Ok(mut cbs) = self.callbacks.lock() {
            cbs.start = Some(Arc::new(callback));
        }
    }

    /// Stop whatever is playing, hand `url` to the backend and return the new
    /// session id right away. `expected_duration` (seconds) stands in when the
    /// media does not report its length.
    ///
    /// The session thread waits (bounded) for the backend to confirm and
    /// reports through the start callback. A session that never confirms
    /// stops the backend and goes idle on its own.
    pub fn play(&mut self, url: &str, expected_duration: Option<f64>) -> u64 {
        self.stop();

        self.with_backend(|b| {
            b.load(url, expected_duration);
            b.play();
        });

        self.last_session += 1;
        let id = self.last_session;
        self.live.store(id, Ordering::SeqCst);
        self.session = Some(self.spawn_session(id));
        info!(session = id, url, "playback requested");
        id
    }

    /// No-op when idle or already paused.
    pub fn pause(&mut self) {
        let Some(session) = self.live_session() else {
            return;
        };
        if session.paused.swap(true, Ordering::SeqCst) {
            return;
        }
        self.with_backend(|b| b.pause());
    }

    /// No-op when idle or not paused.
    pub fn resume(&mut self) {
        let Some(session) = self.live_session() else {
            return;
        };
        if !session.paused.swap(false, Ordering::SeqCst) {
            return;
        }
        self.with_backend(|b| b.play());
    }

    /// End the session: signal the sampler, stop the backend, join the sampler
    /// (bounded) and zero position/duration. Safe to call when idle.
    pub fn stop(&mut self) {
        self.live.store(0, Ordering::SeqCst);

        let session = self.session.take();
        if let Some(s) = &session {
            debug!(session = s.id, "stopping session");
        }
        let session = session.map(|s| {
            // Dropping the sender wakes the sampler out of its sleep.
            drop(s.stop_tx);
            (s.id, s.done_rx, s.handle)
        });

        self.with_backend(|b| b.stop());

        if let Some((id, done_rx, handle)) = session {
            match done_rx.recv_timeout(self.timing.join_timeout) {
                Err(RecvTimeoutError::Timeout) => {
                    warn!(session = id, "sampling thread did not exit in time; detaching");
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    if handle.join().is_err() {
                        warn!(session = id, "sampling thread panicked");
                    }
                }
            }
        }

        if let Ok(mut sample) = self.sample.lock() {
            *sample = Sample::default();
        }
    }

    /// Jump to `position` seconds, clamped to the track. No-op when idle.
    pub fn seek(&mut self, position: f64) {
        if self.session_id().is_none() {
            return;
        }
        let duration = self.get_duration();
        let mut target = position.max(0.0);
        if duration > 0.0 {
            target = target.min(duration);
        }
        self.with_backend(|b| b.seek(target));
        if let Ok(mut sample) = self.sample.lock() {
            sample.position = target;
        }
    }

    /// Last sampled position in seconds; 0 when idle.
    pub fn get_current_time(&self) -> f64 {
        if self.session_id().is_none() {
            return 0.0;
        }
        self.sample.lock().map(|s| s.position).unwrap_or(0.0)
    }

    /// Last sampled duration in seconds; 0 when idle.
    pub fn get_duration(&self) -> f64 {
        if self.session_id().is_none() {
            return 0.0;
        }
        self.sample.lock().map(|s| s.duration).unwrap_or(0.0)
    }

    /// Id of the current session; None when idle or when the session gave up
    /// waiting for the backend.
    pub fn session_id(&self) -> Option<u64> {
        self.live_session().map(|s| s.id)
    }

    fn live_session(&self) -> Option<&Session> {
        let live = self.live.load(Ordering::SeqCst);
        self.session.as_ref().filter(|s| s.id == live)
    }

    fn with_backend(&self, f: impl FnOnce(&mut B)) {
        match self.backend.lock() {
            Ok(mut b) => f(&mut b),
            Err(_) => warn!("media backend lock poisoned"),
        }
    }

    fn spawn_session(&self, id: u64) -> Session {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (done_tx, done_rx) = mpsc::channel::<()>();
        let paused = Arc::new(AtomicBool::new(false));

        let sampler = Sampler {
            id,
            backend: self.backend.clone(),
            callbacks: self.callbacks.clone(),
            sample: self.sample.clone(),
            live: self.live.clone(),
            paused: paused.clone(),
            timing: self.timing,
        };

        let handle = thread::spawn(move || {
            if sampler.confirm_start(&stop_rx) {
                sampler.run(&stop_rx);
            }
            let _ = done_tx.send(());
        });

        Session {
            id,
            paused,
            stop_tx,
            done_rx,
            handle,
        }
    }
}

impl<B: MediaBackend + 'static> Drop for PlaybackEngine<B> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State moved onto the sampling thread for one session.
struct Sampler<B> {
    id: u64,
    backend: Arc<Mutex<B>>,
    callbacks: Arc<Mutex<Callbacks>>,
    sample: Arc<Mutex<Sample>>,
    live: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    timing: EngineTiming,
}

impl<B: MediaBackend> Sampler<B> {
    /// Poll the backend until it reports playing. Returns false when it
    /// fails, never confirms, or the session is stopped first.
    fn confirm_start(&self, stop_rx: &Receiver<()>) -> bool {
        let attempts = self.timing.confirm_attempts.max(1);
        for attempt in 0..attempts {
            if !self.is_live() {
                return false;
            }
            match self.backend_state() {
                BackendState::Playing => {
                    debug!(session = self.id, attempt, "backend confirmed playback");
                    self.emit_start(true);
                    return true;
                }
                BackendState::Error => break,
                _ => {}
            }
            if attempt + 1 < attempts {
                match stop_rx.recv_timeout(self.timing.confirm_interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return false,
                }
            }
        }

        // Holding the backend lock keeps a newer play from loading in between.
        let Ok(mut backend) = self.backend.lock() else {
            return false;
        };
        // Only the live session may stop the backend; a newer play owns it otherwise.
        if self
            .live
            .compare_exchange(self.id, 0, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        warn!(session = self.id, "backend never confirmed playback; going idle");
        backend.stop();
        drop(backend);
        self.emit_start(false);
        false
    }

    fn run(&self, stop_rx: &Receiver<()>) {
        debug!(session = self.id, "sampling loop started");
        loop {
            if !self.is_live() {
                break;
            }
            if !self.paused.load(Ordering::SeqCst) && self.tick() {
                break;
            }
            match stop_rx.recv_timeout(self.timing.sample_interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        debug!(session = self.id, "sampling loop exited");
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst) == self.id
    }

    fn backend_state(&self) -> BackendState {
        let read = panic::catch_unwind(AssertUnwindSafe(|| {
            self.backend.lock().map(|b| b.state()).ok()
        }));
        match read {
            Ok(Some(state)) => state,
            Ok(None) => BackendState::Error,
            Err(_) => {
                warn!(session = self.id, "media backend panicked while starting");
                BackendState::Error
            }
        }
    }

    /// One sampling step. Returns true once the track has ended.
    fn tick(&self) -> bool {
        let read = panic::catch_unwind(AssertUnwindSafe(|| {
            let backend = self.backend.lock().ok()?;
            Some((backend.state(), backend.position(), backend.duration()))
        }));
        let (state, position, duration) = match read {
            Ok(Some(values)) => values,
            Ok(None) => return false,
            Err(_) => {
                warn!(session = self.id, "media backend panicked while sampling");
                return false;
            }
        };

        if state == BackendState::Error {
            debug!(session = self.id, "backend in error state; nothing to report");
            return false;
        }
        if !self.is_live() {
            return false;
        }

        if let Ok(mut sample) = self.sample.lock() {
            *sample = Sample { position, duration };
        }

        if duration > 0.0 {
            self.emit_position(PositionUpdate {
                session: self.id,
                position,
                duration,
            });
        }

        let tolerance = self.timing.end_tolerance.as_secs_f64();
        let ended = state == BackendState::Ended
            || (duration > 0.0 && position >= duration - tolerance);
        if ended {
            self.emit_end();
        }
        ended
    }

    fn emit_position(&self, update: PositionUpdate) {
        let callback = self.callbacks.lock().ok().and_then(|c| c.position.clone());
        if let Some(callback) = callback {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(update))).is_err() {
                warn!(session = self.id, "position callback panicked");
            }
        }
    }

    fn emit_start(&self, confirmed: bool) {
        let callback = self.callbacks.lock().ok().and_then(|c| c.start.clone());
        if let Some(callback) = callback {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(self.id, confirmed))).is_err() {
                warn!(session = self.id, "start callback panicked");
            }
        }
    }

    fn emit_end(&self) {
        debug!(session = self.id, "end of track");
        let callback = self.callbacks.lock().ok().and_then(|c| c.end.clone());
        if let Some(callback) = callback {
            if panic::catch_unwind(AssertUnwindSafe(|| callback(self.id))).is_err() {
                warn!(session = self.id, "end callback panicked");
            }
        }
    }
}
