//! Application module: the view state the TUI renders and the runtime mutates.
//!
//! The `App` model lives in `app::model` and holds search results, paging,
//! panel visibility, input modes, notices and the playlist store.

mod model;
mod progress;

pub use model::*;
pub use progress::progress_line;

#[cfg(test)]
mod tests;
