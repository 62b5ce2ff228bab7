//! Core types, traits, and utilities for abyssal-stats
//!
//! This crate provides the run record model, the snapshot and rollup data
//! structures, the error type, and the traits through which the bulk-analysis
//! and record-deletion collaborators are reached.

pub mod error;
pub mod provider;
pub mod rollup_types;
pub mod types;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{AbyssalError, Result};
pub use rollup_types::{CategoryStats, DailyRollup, OverallRollup, Snapshot};
pub use types::{Category, DayKey, PriceLookup, RunId, RunRecord, ShipClass};
