//! abyssal-stats - Daily and overall rollups for tracked abyssal runs
//!
//! This library provides functionality to:
//! - Load run records and item prices from a local data directory
//! - Build daily and per-category rollups, and patch them when a run is deleted
//! - Value a run's loot list against a price lookup
//! - Render reports as tables or JSON
//!
//! # Examples
//!
//! ```no_run
//! use abyssal_stats::{config::AppConfig, data_loader::JsonRecordStore, tracker::Tracker};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> abyssal_stats::Result<()> {
//!     let config = AppConfig::load(None)?;
//!     let store = Arc::new(JsonRecordStore::from_config(&config));
//!     let tracker = Tracker::new(store.clone(), store);
//!
//!     let snapshot = tracker.reload().await?;
//!     println!("{} runs loaded", snapshot.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod data_loader;
pub mod output;
pub mod rollup;
pub mod summary;
pub mod tracker;

/// Record, key and rollup types
pub mod types {
    pub use abyssal_core::rollup_types::*;
    pub use abyssal_core::types::*;
}

pub use abyssal_core::error;
pub use abyssal_loot as loot;

// Re-export commonly used types
pub use error::{AbyssalError, Result};
pub use types::{DayKey, RunId, RunRecord, Snapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
