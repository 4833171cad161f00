//! Crate-wide error type.
//!
//! Errors stay inside the I/O wrappers (catalog, lyrics, playlists, media
//! backend). The playback core turns them into notices or an idle state.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level HTTP failure (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote answered with a non-success status.
    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The audio stream could not be opened or downloaded.
    #[error("Stream error: {0}")]
    Stream(String),

    /// The downloaded stream could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No usable audio output device.
    #[error("Audio output error: {0}")]
    Output(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
