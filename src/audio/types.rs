//! Small types shared by the engine and its backends.

use std::time::Duration;

use crate::config::PlaybackSettings;

/// What the media backend says it is doing.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum BackendState {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Loaded, still fetching or decoding.
    Opening,
    Playing,
    Paused,
    /// Reached the end of the media.
    Ended,
    /// Fetch, decode or output failed; the backend will not play this media.
    Error,
}

/// One sample from the sampling thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PositionUpdate {
    /// Session the sample belongs to.
    pub session: u64,
    /// Seconds.
    pub position: f64,
    /// Seconds; always > 0.
    pub duration: f64,
}

/// Engine timing knobs, taken from `[playback]` in the config.
#[derive(Debug, Copy, Clone)]
pub struct EngineTiming {
    pub sample_interval: Duration,
    pub end_tolerance: Duration,
    pub confirm_attempts: u32,
    pub confirm_interval: Duration,
    pub join_timeout: Duration,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self::from(&PlaybackSettings::default())
    }
}

impl From<&PlaybackSettings> for EngineTiming {
    fn from(s: &PlaybackSettings) -> Self {
        Self {
            sample_interval: Duration::from_millis(s.sample_interval_ms.max(1)),
            end_tolerance: Duration::from_millis(s.end_tolerance_ms),
            confirm_attempts: s.confirm_attempts.max(1),
            confirm_interval: Duration::from_millis(s.confirm_interval_ms),
            join_timeout: Duration::from_millis(s.join_timeout_ms),
        }
    }
}
