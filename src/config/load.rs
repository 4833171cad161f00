use std::{env, path::PathBuf};

use crate::error::{Error, Result};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `FLACTERM__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("FLACTERM")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Settings>())
            .map_err(|e| Error::Config(e.to_string()))
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(invalid("api.base_url must not be empty"));
        }
        if self.playback.sample_interval_ms == 0 {
            return Err(invalid("playback.sample_interval_ms must be >= 1"));
        }
        if self.playback.confirm_attempts == 0 {
            return Err(invalid("playback.confirm_attempts must be >= 1"));
        }
        if self.ui.items_per_page == 0 {
            return Err(invalid("ui.items_per_page must be >= 1"));
        }
        Ok(())
    }

    /// Playlist directory, honoring `playlists.dir` when set.
    pub fn playlist_dir(&self) -> PathBuf {
        self.playlists
            .dir
            .clone()
            .unwrap_or_else(|| data_home().join("flacterm").join("playlists"))
    }

    /// Log file path, honoring `logging.file` when set.
    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| state_home().join("flacterm").join("flacterm.log"))
    }
}

fn invalid(msg: &str) -> Error {
    Error::Config(msg.to_string())
}

/// Resolve the config path from `FLACTERM_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("FLACTERM_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/flacterm/config.toml`
/// or `~/.config/flacterm/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("flacterm").join("config.toml"))
}

fn data_home() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", &[".local", "share"])
}

fn state_home() -> PathBuf {
    xdg_dir("XDG_STATE_HOME", &[".local", "state"])
}

fn xdg_dir(var: &str, fallback: &[&str]) -> PathBuf {
    if let Some(dir) = env::var_os(var) {
        return PathBuf::from(dir);
    }
    let mut base = env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(env::temp_dir);
    for part in fallback {
        base.push(part);
    }
    base
}
