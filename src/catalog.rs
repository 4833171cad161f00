//! Remote catalog: track metadata, search paging, stream URL resolution.
//!
//! `model` defines the `Track` record, `client` talks to the HTTP API,
//! `pages` walks paginated searches and `display` formats metadata for the UI.

mod client;
mod display;
mod model;
mod pages;

pub(crate) use client::ensure_success;
pub use client::{Catalog, DabClient};
pub use display::*;
pub use model::*;
pub use pages::fetch_all;

#[cfg(test)]
mod tests;
