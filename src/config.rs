//! Player settings.
//!
//! `schema` holds the typed sections with their defaults; `load` layers a
//! TOML file and `FLACTERM__*` environment variables over them.

mod load;
mod schema;

pub use schema::*;
