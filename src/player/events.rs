use crate::audio::PositionUpdate;
use crate::catalog::{SearchKind, Track};
use crate::error::Result;

/// Messages posted to the UI thread by the sampling thread and by one-shot
/// network jobs. The UI drains them every tick.
#[derive(Debug)]
pub enum Event {
    /// Sampled position of a playback session.
    Position(PositionUpdate),
    /// The backend confirmed playback for the session.
    Started { session: u64 },
    /// The session gave up waiting for the backend and went idle.
    StartFailed { session: u64 },
    /// The session reached its end.
    TrackEnded { session: u64 },
    /// Stream URL lookup for the play request identified by `token`.
    StreamResolved {
        token: u64,
        track: Track,
        url: Result<Option<String>>,
    },
    /// Lyrics lookup for the play request identified by `token`.
    LyricsFetched {
        token: u64,
        raw: Result<Option<String>>,
    },
    DetailFetched {
        track_id: String,
        detail: Result<Option<Track>>,
    },
    SearchFinished {
        query: String,
        kind: SearchKind,
        results: Vec<Track>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A short user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: NoticeLevel::Info,
        }
    }

    pub fn warn(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: NoticeLevel::Warn,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: NoticeLevel::Error,
        }
    }
}
