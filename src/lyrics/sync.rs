use super::parse::{LyricLine, parse_lrc};

/// The active line moved.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// Lyrics for the current session plus the index of the highlighted line.
#[derive(Debug, Default)]
pub struct LyricsSync {
    lines: Vec<LyricLine>,
    active: Option<usize>,
}

impl LyricsSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the line set with `raw`, resetting the highlight.
    pub fn load(&mut self, raw: &str) {
        self.lines = parse_lrc(raw);
        self.active = None;
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.active = None;
    }

    pub fn has_lyrics(&self) -> bool {
        !self.lines.is_empty()
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Move the highlight to the line due at `position` seconds.
    ///
    /// Returns the change when the active line differs from the last one
    /// reported, `None` otherwise. The index is recomputed on every call so
    /// backward seeks land on the right line.
    pub fn update_position(&mut self, position: f64) -> Option<LineChange> {
        let current = self.index_at(position);
        if current == self.active {
            return None;
        }
        let change = LineChange {
            previous: self.active,
            current,
        };
        self.active = current;
        Some(change)
    }

    fn index_at(&self, position: f64) -> Option<usize> {
        // Count of lines already due; lines are sorted ascending.
        let due = self.lines.partition_point(|l| l.timestamp <= position);
        due.checked_sub(1)
    }
}
