//! The playback controller and the event plumbing around it.
//!
//! `controller` is the state machine binding engine, queue and lyrics.
//! `jobs` runs network lookups off the UI thread and `events` carries their
//! results (and engine callbacks) back.

mod controller;
mod events;
mod jobs;

pub use controller::{LyricsStatus, PlaybackController, PlayerState, PlayerView};
pub use events::{Event, Notice, NoticeLevel};
pub use jobs::{Job, Jobs, Spawn, ThreadSpawn};
