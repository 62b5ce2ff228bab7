//! Shared test utilities for unit tests
//!
//! Integration tests (in tests/) cannot access this module because it's
//! marked with #[cfg(test)]; they have their own builder in
//! tests/common/mod.rs.

use crate::types::{Category, RunRecord, parse_local_time};
use chrono::{Duration, NaiveDateTime};

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp, panicking on bad input
pub fn at(s: &str) -> NaiveDateTime {
    parse_local_time(s).expect("test timestamp must parse")
}

/// Build a run that starts at `start` and lasts `minutes`
pub fn record(start: &str, minutes: i64, category: &str, net_profit: f64) -> RunRecord {
    let start_time = at(start);
    RunRecord::new(
        start_time,
        start_time + Duration::minutes(minutes),
        Category::from_label(category),
        net_profit,
        "",
    )
}
