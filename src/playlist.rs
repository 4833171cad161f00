//! Named, persisted track collections.

mod store;

pub use store::{PLAYLIST_FILE, PlaylistStore};

#[cfg(test)]
mod tests;
