use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::catalog::Track;
use crate::error::Result;

pub const PLAYLIST_FILE: &str = "playlists.json";

type ChangeCallback = Box<dyn FnMut(&PlaylistStore)>;
type Playlists = BTreeMap<String, Vec<Track>>;

/// Playlists keyed by name, backed by a single JSON file of the shape
/// `{"name": [track, ...]}`.
///
/// Every mutation rewrites the whole file. Methods return `Ok(false)` when the
/// request breaks a rule (unknown playlist, duplicate id, taken name) and
/// `Err` only when persisting fails, in which case nothing changes.
pub struct PlaylistStore {
    path: PathBuf,
    playlists: Playlists,
    on_change: Option<ChangeCallback>,
}

impl PlaylistStore {
    /// Load `dir/playlists.json`, starting empty when it is missing.
    ///
    /// An unreadable file is moved aside to `playlists.json.bak` so the next
    /// write does not destroy it.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(PLAYLIST_FILE);
        let playlists = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt playlist file; starting empty");
                    let backup = path.with_extension("json.bak");
                    if let Err(e) = fs::rename(&path, &backup) {
                        warn!(error = %e, "could not move corrupt playlist file aside");
                    }
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read playlist file");
                BTreeMap::new()
            }
        };
        debug!(count = playlists.len(), path = %path.display(), "playlists loaded");

        Self {
            path,
            playlists,
            on_change: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_on_change(&mut self, callback: impl FnMut(&PlaylistStore) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Playlist names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.playlists.keys().cloned().collect()
    }

    pub fn get(&self, name: &str) -> Option<&[Track]> {
        self.playlists.get(name).map(Vec::as_slice)
    }

    pub fn count(&self, name: &str) -> usize {
        self.playlists.get(name).map_or(0, Vec::len)
    }

    pub fn create(&mut self, name: &str) -> Result<bool> {
        let name = name.trim();
        self.mutate(|playlists| {
            if name.is_empty() || playlists.contains_key(name) {
                return false;
            }
            playlists.insert(name.to_string(), Vec::new());
            true
        })
    }

    pub fn delete(&mut self, name: &str) -> Result<bool> {
        self.mutate(|playlists| playlists.remove(name).is_some())
    }

    pub fn rename(&mut self, old: &str, new: &str) -> Result<bool> {
        let new = new.trim();
        self.mutate(|playlists| {
            if new.is_empty() || playlists.contains_key(new) {
                return false;
            }
            let Some(tracks) = playlists.remove(old) else {
                return false;
            };
            playlists.insert(new.to_string(), tracks);
            true
        })
    }

    /// Append `track`; rejected when a track with the same id is already there.
    pub fn add_track(&mut self, name: &str, track: Track) -> Result<bool> {
        self.mutate(|playlists| {
            let Some(tracks) = playlists.get_mut(name) else {
                return false;
            };
            if tracks.iter().any(|t| t.same_track(&track)) {
                return false;
            }
            tracks.push(track);
            true
        })
    }

    pub fn remove_track(&mut self, name: &str, index: usize) -> Result<bool> {
        self.mutate(|playlists| match playlists.get_mut(name) {
            Some(tracks) if index < tracks.len() => {
                tracks.remove(index);
                true
            }
            _ => false,
        })
    }

    pub fn remove_track_by_id(&mut self, name: &str, track_id: &str) -> Result<bool> {
        self.mutate(|playlists| {
            let Some(tracks) = playlists.get_mut(name) else {
                return false;
            };
            let Some(index) = tracks.iter().position(|t| t.id == track_id) else {
                return false;
            };
            tracks.remove(index);
            true
        })
    }

    pub fn clear_playlist(&mut self, name: &str) -> Result<bool> {
        self.mutate(|playlists| {
            let Some(tracks) = playlists.get_mut(name) else {
                return false;
            };
            tracks.clear();
            true
        })
    }

    /// Apply `change` and persist it. `change` returns false to reject the
    /// request untouched. A failed save rolls the map back, so memory never
    /// shows what the file does not hold.
    fn mutate(&mut self, change: impl FnOnce(&mut Playlists) -> bool) -> Result<bool> {
        let before = self.playlists.clone();
        if !change(&mut self.playlists) {
            return Ok(false);
        }
        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), error = %e, "saving playlists failed; change rolled back");
            self.playlists = before;
            return Err(e);
        }
        self.notify();
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(&self.playlists)?;

        let tmp = self.path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&body)?;
        file.sync_all()?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "playlists saved");
        Ok(())
    }

    fn notify(&mut self) {
        let Some(mut callback) = self.on_change.take() else {
            return;
        };
        let this: &PlaylistStore = self;
        if panic::catch_unwind(AssertUnwindSafe(|| callback(this))).is_err() {
            warn!("playlist change callback panicked");
        }
        self.on_change = Some(callback);
    }
}
