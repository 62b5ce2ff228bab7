//! Rollup engine
//!
//! Computes daily and overall aggregates from a set of run records, and
//! keeps a [`Snapshot`] consistent when a single run is removed.
//!
//! # Incremental removal
//!
//! [`remove_record`] touches only the day bucket of the removed run and then
//! rebuilds the overall rollup from the surviving flat list. Rebuilding the
//! overall rollup is linear in the record count and already requires
//! re-grouping by category, so there is nothing cheaper to update in place.
//! Sums are taken in record order in both paths, which makes the incremental
//! result identical to a fresh [`build`] of the remaining records.
//!
//! # Examples
//!
//! ```
//! use abyssal_stats::rollup::{build, remove_record};
//! use abyssal_stats::types::{parse_local_time, Category, PriceLookup, RunRecord};
//!
//! let run = |start: &str, end: &str, profit: f64| {
//!     RunRecord::new(
//!         parse_local_time(start).unwrap(),
//!         parse_local_time(end).unwrap(),
//!         Category::new("T3", "Dark"),
//!         profit,
//!         "",
//!     )
//! };
//!
//! let a = run("2024-05-01 10:00:00", "2024-05-01 10:20:00", 100.0);
//! let b = run("2024-05-01 11:00:00", "2024-05-01 11:20:00", 300.0);
//!
//! let snapshot = build(vec![a.clone(), b], PriceLookup::new());
//! assert_eq!(snapshot.overall_rollup.avg_profit, 200.0);
//!
//! let snapshot = remove_record(&snapshot, &a.id());
//! assert_eq!(snapshot.overall_rollup.avg_profit, 300.0);
//! ```

use crate::types::{
    CategoryStats, DailyRollup, DayKey, OverallRollup, PriceLookup, RunId, RunRecord, Snapshot,
};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Running sums for one group of runs
#[derive(Debug, Default)]
struct MeanAccumulator {
    count: usize,
    profit: f64,
    duration: f64,
    profit_per_hour: f64,
}

impl MeanAccumulator {
    fn add(&mut self, record: &RunRecord) {
        self.count += 1;
        self.profit += record.net_profit;
        self.duration += record.duration_minutes;
        self.profit_per_hour += record.profit_per_hour;
    }

    /// Means of profit, duration and ISK/h; zero for an empty group
    fn means(&self) -> (f64, f64, f64) {
        if self.count == 0 {
            return (0.0, 0.0, 0.0);
        }
        let n = self.count as f64;
        (
            self.profit / n,
            self.duration / n,
            self.profit_per_hour / n,
        )
    }
}

/// Accumulator for one (tier, weather) pair
struct CategoryAccumulator {
    tier: String,
    weather: String,
    sums: MeanAccumulator,
    entry_cost: f64,
}

impl CategoryAccumulator {
    fn into_stats(self) -> CategoryStats {
        let (avg_profit, avg_duration, avg_profit_per_hour) = self.sums.means();
        CategoryStats {
            tier: self.tier,
            weather: self.weather,
            runs_count: self.sums.count,
            avg_profit,
            avg_duration,
            avg_profit_per_hour,
            total_entry_cost: self.entry_cost,
        }
    }
}

/// Build a daily rollup from a non-empty run list
fn daily_rollup(runs: Vec<RunRecord>) -> DailyRollup {
    let mut sums = MeanAccumulator::default();
    for run in &runs {
        sums.add(run);
    }
    let (avg_profit, avg_duration, avg_profit_per_hour) = sums.means();

    DailyRollup {
        runs,
        avg_profit,
        avg_duration,
        avg_profit_per_hour,
    }
}

/// Group runs by day key, preserving record order inside each day
fn daily_rollups(records: &[RunRecord]) -> BTreeMap<DayKey, DailyRollup> {
    let mut grouped: BTreeMap<DayKey, Vec<RunRecord>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.day_key).or_default().push(record.clone());
    }

    grouped
        .into_iter()
        .map(|(day, runs)| (day, daily_rollup(runs)))
        .collect()
}

/// Compute the all-time rollup
///
/// Every record counts toward the scalar means. Only records whose category
/// has both a tier and a weather token appear in the breakdown, which lists
/// categories in order of first appearance. An empty slice yields the zeroed
/// rollup.
pub fn overall_rollup(records: &[RunRecord]) -> OverallRollup {
    let mut totals = MeanAccumulator::default();
    let mut categories: Vec<CategoryAccumulator> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for record in records {
        totals.add(record);

        let Some((tier, weather)) = record.category.tier_weather() else {
            debug!(
                "Run {} has category '{}' without tier and weather; left out of breakdown",
                record.id(),
                record.category
            );
            continue;
        };

        let key = (tier.to_string(), weather.to_string());
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                categories.push(CategoryAccumulator {
                    tier: key.0.clone(),
                    weather: key.1.clone(),
                    sums: MeanAccumulator::default(),
                    entry_cost: 0.0,
                });
                index.insert(key, categories.len() - 1);
                categories.len() - 1
            }
        };

        let category = &mut categories[slot];
        category.sums.add(record);
        category.entry_cost += record.entry_cost;
    }

    let (avg_profit, avg_duration, avg_profit_per_hour) = totals.means();
    OverallRollup {
        avg_profit,
        avg_duration,
        avg_profit_per_hour,
        category_breakdown: categories
            .into_iter()
            .map(CategoryAccumulator::into_stats)
            .collect(),
    }
}

/// Compute a complete snapshot from a set of records
///
/// This is the computation the bulk-analysis path performs once records and
/// prices are loaded. The price lookup is carried through untouched.
pub fn build(records: Vec<RunRecord>, price_lookup: PriceLookup) -> Snapshot {
    let daily_rollups = daily_rollups(&records);
    let overall_rollup = overall_rollup(&records);

    debug!(
        "Built snapshot: {} runs over {} days, {} categories",
        records.len(),
        daily_rollups.len(),
        overall_rollup.category_breakdown.len()
    );

    Snapshot {
        records,
        daily_rollups,
        overall_rollup,
        price_lookup,
    }
}

/// Remove one run from a snapshot, returning the updated snapshot
///
/// The run's day bucket is reduced and its means recomputed, or dropped if
/// it becomes empty. The overall rollup is rebuilt from the remaining
/// records, re-summing their entry costs per category.
///
/// Removing a run that is not in the snapshot returns an identical copy, so
/// the operation is idempotent.
pub fn remove_record(snapshot: &Snapshot, target: &RunId) -> Snapshot {
    let Some(removed) = snapshot.find(target) else {
        debug!("Run {} is not in the snapshot; nothing to remove", target);
        return snapshot.clone();
    };
    let day = removed.day_key;

    let records: Vec<RunRecord> = snapshot
        .records
        .iter()
        .filter(|record| !record.matches(target))
        .cloned()
        .collect();

    let remaining_runs: Option<Vec<RunRecord>> = snapshot
        .day(&day)
        .filter(|bucket| bucket.runs.iter().any(|run| run.matches(target)))
        .map(|bucket| {
            bucket
                .runs
                .iter()
                .filter(|run| !run.matches(target))
                .cloned()
                .collect()
        });

    let mut daily_rollups = snapshot.daily_rollups.clone();
    match remaining_runs {
        Some(runs) if runs.is_empty() => {
            daily_rollups.remove(&day);
        }
        Some(runs) => {
            daily_rollups.insert(day, daily_rollup(runs));
        }
        None => {
            warn!(
                "Run {} has no entry in the {} daily rollup; snapshot may come from another source",
                target, day
            );
        }
    }

    let overall_rollup = overall_rollup(&records);

    info!(
        "Removed run {}; {} runs remain over {} days",
        target,
        records.len(),
        daily_rollups.len()
    );

    Snapshot {
        records,
        daily_rollups,
        overall_rollup,
        price_lookup: snapshot.price_lookup.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, parse_local_time};
    use chrono::Duration;

    fn run(start: &str, minutes: i64, category: &str, profit: f64) -> RunRecord {
        let start_time = parse_local_time(start).unwrap();
        RunRecord::new(
            start_time,
            start_time + Duration::minutes(minutes),
            Category::from_label(category),
            profit,
            "",
        )
    }

    #[test]
    fn test_daily_means() {
        let records = vec![
            run("2024-05-01 10:00:00", 10, "T3 Dark", 100.0),
            run("2024-05-01 11:00:00", 20, "T3 Dark", 300.0),
            run("2024-05-01 12:00:00", 30, "T3 Dark", 200.0),
        ];
        let snapshot = build(records, PriceLookup::new());

        let day = snapshot.day(&"2024-05-01".parse().unwrap()).unwrap();
        assert_eq!(day.runs.len(), 3);
        assert_eq!(day.avg_profit, 200.0);
        assert_eq!(day.avg_duration, 20.0);
    }

    #[test]
    fn test_stored_profit_per_hour_is_averaged_as_is() {
        // Imported records may carry a rate that disagrees with their duration
        let records = vec![
            run("2024-05-01 10:00:00", 20, "T3 Dark", 100.0).with_profit_per_hour(1_000.0),
            run("2024-05-01 11:00:00", 20, "T3 Dark", 100.0).with_profit_per_hour(3_000.0),
        ];
        let snapshot = build(records, PriceLookup::new());

        let day = snapshot.day(&"2024-05-01".parse().unwrap()).unwrap();
        assert_eq!(day.avg_profit_per_hour, 2_000.0);
        assert_eq!(snapshot.overall_rollup.avg_profit_per_hour, 2_000.0);
        assert_eq!(
            snapshot.overall_rollup.category("T3", "Dark").unwrap().avg_profit_per_hour,
            2_000.0
        );
    }

    #[test]
    fn test_category_grouping() {
        let records = vec![
            run("2024-05-01 10:00:00", 20, "T3 Dark", 100.0),
            run("2024-05-01 11:00:00", 20, "T3 Dark", 300.0),
            run("2024-05-01 12:00:00", 20, "T4 Firestorm", 500.0),
            run("2024-05-01 13:00:00", 20, "Unknown", 900.0),
        ];
        let overall = build(records, PriceLookup::new()).overall_rollup;

        assert_eq!(overall.category_breakdown.len(), 2);
        let dark = overall.category("T3", "Dark").unwrap();
        assert_eq!(dark.runs_count, 2);
        assert_eq!(dark.avg_profit, 200.0);
        assert_eq!(overall.category("T4", "Firestorm").unwrap().runs_count, 1);

        // The one-token category still counts in the global mean
        assert_eq!(overall.avg_profit, 450.0);
    }

    #[test]
    fn test_breakdown_in_first_seen_order() {
        let records = vec![
            run("2024-05-01 10:00:00", 20, "T5 Gamma", 1.0),
            run("2024-05-01 11:00:00", 20, "T1 Dark", 1.0),
            run("2024-05-01 12:00:00", 20, "T5 Gamma", 1.0),
        ];
        let overall = overall_rollup(&records);
        let tiers: Vec<&str> = overall
            .category_breakdown
            .iter()
            .map(|c| c.tier.as_str())
            .collect();
        assert_eq!(tiers, vec!["T5", "T1"]);
    }

    #[test]
    fn test_entry_cost_summed_per_category() {
        let records = vec![
            run("2024-05-01 10:00:00", 20, "T3 Dark", 1.0).with_entry_cost(10_000_000.0),
            run("2024-05-01 11:00:00", 20, "T3 Dark", 1.0).with_entry_cost(30_000_000.0),
            run("2024-05-01 12:00:00", 20, "T4 Dark", 1.0).with_entry_cost(5_000_000.0),
        ];
        let snapshot = build(records, PriceLookup::new());
        let overall = &snapshot.overall_rollup;
        assert_eq!(overall.category("T3", "Dark").unwrap().total_entry_cost, 40_000_000.0);

        let first = snapshot.records[0].id();
        let after = remove_record(&snapshot, &first);
        assert_eq!(
            after.overall_rollup.category("T3", "Dark").unwrap().total_entry_cost,
            30_000_000.0
        );
    }

    #[test]
    fn test_empty_build_is_zeroed() {
        let snapshot = build(Vec::new(), PriceLookup::new());
        assert!(snapshot.daily_rollups.is_empty());
        assert_eq!(snapshot.overall_rollup, OverallRollup::default());
    }

    #[test]
    fn test_remove_last_run_of_day_drops_bucket() {
        let a = run("2024-05-01 10:00:00", 20, "T3 Dark", 100.0);
        let b = run("2024-05-02 10:00:00", 20, "T3 Dark", 300.0);
        let snapshot = build(vec![a.clone(), b], PriceLookup::new());

        let after = remove_record(&snapshot, &a.id());
        assert!(after.day(&a.day_key).is_none());
        assert_eq!(after.daily_rollups.len(), 1);
        assert_eq!(after.overall_rollup.avg_profit, 300.0);
    }

    #[test]
    fn test_remove_everything_zeroes_overall() {
        let a = run("2024-05-01 10:00:00", 20, "T3 Dark", 100.0);
        let snapshot = build(vec![a.clone()], PriceLookup::new());

        let after = remove_record(&snapshot, &a.id());
        assert!(after.is_empty());
        assert!(after.daily_rollups.is_empty());
        assert_eq!(after.overall_rollup, OverallRollup::default());
        assert!(!after.overall_rollup.avg_profit.is_nan());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let a = run("2024-05-01 10:00:00", 20, "T3 Dark", 100.0);
        let stranger = run("2024-05-03 10:00:00", 20, "T3 Dark", 100.0);
        let snapshot = build(vec![a], PriceLookup::new());

        assert_eq!(remove_record(&snapshot, &stranger.id()), snapshot);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let a = run("2024-05-01 10:00:00", 20, "T3 Dark", 100.0);
        let b = run("2024-05-01 11:00:00", 25, "T4 Dark", 250.0);
        let snapshot = build(vec![a.clone(), b], PriceLookup::new());

        let once = remove_record(&snapshot, &a.id());
        let twice = remove_record(&once, &a.id());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_remove_matches_rebuild() {
        let records = vec![
            run("2024-05-01 10:00:00", 17, "T3 Dark", 120.5),
            run("2024-05-01 11:00:00", 23, "T4 Firestorm", -40.0),
            run("2024-05-02 09:30:00", 19, "T3 Dark", 333.3),
            run("2024-05-02 10:30:00", 21, "Unknown", 10.0),
        ];
        let prices: PriceLookup = [("Arkonor".to_string(), 100.0)].into_iter().collect();
        let snapshot = build(records.clone(), prices.clone());

        for target in &records {
            let remaining: Vec<RunRecord> = records
                .iter()
                .filter(|r| !r.matches(&target.id()))
                .cloned()
                .collect();
            assert_eq!(
                remove_record(&snapshot, &target.id()),
                build(remaining, prices.clone())
            );
        }
    }

    #[test]
    fn test_inconsistent_snapshot_keeps_daily_map() {
        let a = run("2024-05-01 10:00:00", 20, "T3 Dark", 100.0);
        let b = run("2024-05-01 11:00:00", 20, "T3 Dark", 300.0);
        let mut snapshot = build(vec![a.clone(), b], PriceLookup::new());
        snapshot.daily_rollups.clear();

        let after = remove_record(&snapshot, &a.id());
        assert_eq!(after.len(), 1);
        assert!(after.daily_rollups.is_empty());
        assert_eq!(after.overall_rollup.avg_profit, 300.0);
    }
}
