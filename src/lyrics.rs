//! Time-synced lyrics: LRC parsing, active-line tracking, and the LRCLIB
//! client that supplies the raw text.

mod lrclib;
mod parse;
mod sync;

pub use lrclib::{LrcLibClient, LyricsSource};
pub use parse::{LyricLine, parse_lrc};
pub use sync::{LineChange, LyricsSync};
