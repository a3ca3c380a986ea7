//! Required-job tracking for a watched commit.

mod checker;
mod verdict;
mod watcher;

pub use checker::Checker;
pub use watcher::{Watcher, DEFAULT_POLL_INTERVAL};
