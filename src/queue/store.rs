use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::catalog::Track;

use super::cursor::{QueueOp, repair_cursor};

type ChangeCallback = Box<dyn FnMut(&QueueStore)>;

/// The play queue: an ordered track list plus the "current" cursor.
///
/// Owned by the UI thread. Every mutation re-derives the cursor through
/// [`repair_cursor`] and then fires the change callback once.
#[derive(Default)]
pub struct QueueStore {
    tracks: Vec<Track>,
    cursor: Option<usize>,
    on_change: Option<ChangeCallback>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the change listener, replacing any previous one.
    pub fn set_on_change(&mut self, callback: impl FnMut(&QueueStore) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    pub fn add(&mut self, track: Track) {
        self.tracks.push(track);
        self.apply(QueueOp::Append);
    }

    /// Append several tracks with a single notification.
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) {
        let before = self.tracks.len();
        self.tracks.extend(tracks);
        if self.tracks.len() != before {
            self.apply(QueueOp::Append);
        }
    }

    /// Remove the track at `index`; false when out of range.
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.tracks.len() {
            return false;
        }
        self.tracks.remove(index);
        self.apply(QueueOp::Remove { index });
        true
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
        self.apply(QueueOp::Clear);
    }

    /// Advance the cursor. `None` at the last track (no wrap-around).
    pub fn next(&mut self) -> Option<&Track> {
        let c = self.cursor?;
        if c + 1 >= self.tracks.len() {
            return None;
        }
        self.cursor = Some(c + 1);
        self.notify();
        self.current()
    }

    /// Step the cursor back. `None` at the first track (no wrap-around).
    pub fn previous(&mut self) -> Option<&Track> {
        let c = self.cursor?;
        if c == 0 {
            return None;
        }
        self.cursor = Some(c - 1);
        self.notify();
        self.current()
    }

    /// Jump straight to `index`.
    pub fn set_current(&mut self, index: usize) -> Option<&Track> {
        if index >= self.tracks.len() {
            return None;
        }
        self.cursor = Some(index);
        self.notify();
        self.current()
    }

    /// Relocate a track; false when either index is out of range.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        let len = self.tracks.len();
        if from >= len || to >= len {
            return false;
        }
        let track = self.tracks.remove(from);
        self.tracks.insert(to, track);
        self.apply(QueueOp::Move { from, to });
        true
    }

    fn apply(&mut self, op: QueueOp) {
        self.cursor = repair_cursor(self.cursor, op, self.tracks.len());
        self.notify();
    }

    fn notify(&mut self) {
        let Some(mut callback) = self.on_change.take() else {
            return;
        };
        let this: &QueueStore = self;
        if panic::catch_unwind(AssertUnwindSafe(|| callback(this))).is_err() {
            warn!("queue change callback panicked");
        }
        self.on_change = Some(callback);
    }
}
