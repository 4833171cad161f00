use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/flacterm/config.toml` or `~/.config/flacterm/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `FLACTERM__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub lyrics: LyricsSettings,
    pub playback: PlaybackSettings,
    pub playlists: PlaylistSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Catalog API root; a trailing slash is ignored.
    pub base_url: String,
    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://dab.yeet.su/api".to_string(),
            timeout_secs: 15,
            user_agent: concat!("flacterm/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LyricsSettings {
    /// LRCLIB API root, without a trailing slash.
    pub base_url: String,
    /// Whether the lyrics panel starts open.
    pub show_on_start: bool,
}

impl Default for LyricsSettings {
    fn default() -> Self {
        Self {
            base_url: "https://lrclib.net/api".to_string(),
            show_on_start: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether repeat-one starts enabled.
    pub repeat: bool,
    /// Sampling loop period (milliseconds).
    pub sample_interval_ms: u64,
    /// A track counts as finished once within this window of its end (milliseconds).
    pub end_tolerance_ms: u64,
    /// How many times the session thread polls the backend for a confirmed "playing" state.
    pub confirm_attempts: u32,
    /// Sleep between confirmation polls (milliseconds).
    pub confirm_interval_ms: u64,
    /// Upper bound on waiting for the sampling thread to exit on `stop` (milliseconds).
    pub join_timeout_ms: u64,
    /// Seconds skipped by forward/rewind.
    pub seek_seconds: u64,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            repeat: false,
            sample_interval_ms: 250,
            end_tolerance_ms: 500,
            // Covers the stream prefetch on a slow link.
            confirm_attempts: 50,
            confirm_interval_ms: 200,
            join_timeout_ms: 1000,
            seek_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaylistSettings {
    /// Directory holding `playlists.json`.
    ///
    /// Defaults to `$XDG_DATA_HOME/flacterm/playlists`.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Rows per page in the results table.
    pub items_per_page: usize,
    /// How long a notice stays on screen (milliseconds).
    pub notice_ttl_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ flacterm: lossless in your terminal ~ ".to_string(),
            items_per_page: 10,
            notice_ttl_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Log file path. Defaults to `$XDG_STATE_HOME/flacterm/flacterm.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
