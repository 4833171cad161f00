//! Play queue with a cursor-consistent "current" track.

mod cursor;
mod store;

pub use cursor::{QueueOp, repair_cursor};
pub use store::QueueStore;
