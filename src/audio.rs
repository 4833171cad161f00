//! Playback engine and media backends.
//!
//! `PlaybackEngine` wraps any `MediaBackend` with transport controls and one
//! background thread per session. That thread waits (bounded) for the backend
//! to confirm playback, then samples it, reporting start, position and
//! end-of-track through registered callbacks.
//! `RodioBackend` is the real backend: it streams the URL progressively and
//! plays it on the process-wide rodio mixer.

mod backend;
mod engine;
mod rodio_backend;
mod types;

pub use backend::MediaBackend;
pub use engine::PlaybackEngine;
pub use rodio_backend::{RodioBackend, open_output};
pub use types::{BackendState, EngineTiming, PositionUpdate};
