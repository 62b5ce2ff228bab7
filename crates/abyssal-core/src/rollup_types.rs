//! Rollup and snapshot data types for abyssal-stats
//!
//! Pure data structures describing the result of an analysis pass. The
//! arithmetic that fills them in lives in the rollup engine; nothing here
//! computes a mean.

use crate::types::{DayKey, PriceLookup, RunId, RunRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregates for one calendar day
///
/// A `DailyRollup` never has an empty `runs` list: a day with no runs has no
/// rollup at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRollup {
    /// Runs started on this day, in record order
    pub runs: Vec<RunRecord>,
    /// Mean net profit
    pub avg_profit: f64,
    /// Mean duration in minutes
    pub avg_duration: f64,
    /// Mean of the stored ISK/h values
    pub avg_profit_per_hour: f64,
}

/// Aggregates for one (tier, weather) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub tier: String,
    pub weather: String,
    pub runs_count: usize,
    pub avg_profit: f64,
    pub avg_duration: f64,
    pub avg_profit_per_hour: f64,
    /// Sum of the per-run entry costs resolved upstream
    pub total_entry_cost: f64,
}

/// All-time aggregates
///
/// The `Default` value is the zeroed form used for an empty record set:
/// every scalar is `0.0` and the breakdown is present but empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallRollup {
    pub avg_profit: f64,
    pub avg_duration: f64,
    pub avg_profit_per_hour: f64,
    /// One entry per distinct (tier, weather), in order of first appearance
    pub category_breakdown: Vec<CategoryStats>,
}

impl OverallRollup {
    /// Breakdown entry for a tier and weather, if any run had that pair
    pub fn category(&self, tier: &str, weather: &str) -> Option<&CategoryStats> {
        self.category_breakdown
            .iter()
            .find(|stats| stats.tier == tier && stats.weather == weather)
    }
}

/// Complete analysis result held by the presentation layer
///
/// Snapshots are replaced, never edited: the rollup engine takes one by
/// reference and returns a new value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every run in the dataset
    pub records: Vec<RunRecord>,
    /// Per-day aggregates, keyed and iterated by day
    pub daily_rollups: BTreeMap<DayKey, DailyRollup>,
    /// All-time aggregates
    pub overall_rollup: OverallRollup,
    /// Prices the snapshot was computed with
    pub price_lookup: PriceLookup,
}

impl Snapshot {
    /// Number of runs in the snapshot
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the snapshot holds no runs
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a run by identity
    pub fn find(&self, id: &RunId) -> Option<&RunRecord> {
        self.records.iter().find(|record| record.matches(id))
    }

    /// Rollup for one day
    pub fn day(&self, day: &DayKey) -> Option<&DailyRollup> {
        self.daily_rollups.get(day)
    }

    /// Days that have at least one run, newest first
    pub fn available_days(&self) -> Vec<DayKey> {
        self.daily_rollups.keys().rev().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::record;

    fn rollup_of(runs: Vec<RunRecord>) -> DailyRollup {
        DailyRollup {
            runs,
            avg_profit: 0.0,
            avg_duration: 0.0,
            avg_profit_per_hour: 0.0,
        }
    }

    #[test]
    fn test_default_overall_is_zeroed() {
        let overall = OverallRollup::default();
        assert_eq!(overall.avg_profit, 0.0);
        assert_eq!(overall.avg_duration, 0.0);
        assert_eq!(overall.avg_profit_per_hour, 0.0);
        assert!(overall.category_breakdown.is_empty());

        // The empty breakdown is serialized, not omitted
        let json = serde_json::to_value(&overall).unwrap();
        assert_eq!(json["category_breakdown"], serde_json::json!([]));
    }

    #[test]
    fn test_available_days_newest_first() {
        let a = record("2024-05-01 10:00:00", 20, "T3 Dark", 1.0);
        let b = record("2024-05-03 10:00:00", 20, "T3 Dark", 1.0);
        let c = record("2024-05-02 10:00:00", 20, "T3 Dark", 1.0);

        let mut snapshot = Snapshot::default();
        for r in [a, b, c] {
            snapshot.daily_rollups.insert(r.day_key, rollup_of(vec![r.clone()]));
            snapshot.records.push(r);
        }

        let days: Vec<String> = snapshot
            .available_days()
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(days, vec!["2024-05-03", "2024-05-02", "2024-05-01"]);
    }

    #[test]
    fn test_find_by_identity() {
        let a = record("2024-05-01 10:00:00", 20, "T3 Dark", 1.0);
        let b = record("2024-05-01 11:00:00", 20, "T3 Dark", 2.0);
        let snapshot = Snapshot {
            records: vec![a.clone(), b.clone()],
            ..Snapshot::default()
        };

        assert_eq!(snapshot.find(&b.id()).map(|r| r.net_profit), Some(2.0));
        let missing = record("2024-05-01 12:00:00", 20, "T3 Dark", 1.0);
        assert!(snapshot.find(&missing.id()).is_none());
        assert_eq!(snapshot.len(), 2);
    }
}
