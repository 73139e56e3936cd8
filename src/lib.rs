//! Keeps a local JSON archive of tournament match results in sync with a
//! live results site, extracting only matches it has not captured yet.

pub use error::{Result, SyncError};
pub use monitor::Monitor;
pub use sync::{CycleReport, SyncEngine, SyncMode};

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod monitor;
pub mod renderer;
pub mod report;
pub mod scraper;
pub mod store;
pub mod sync;
