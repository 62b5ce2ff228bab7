//! Summary views derived from a snapshot
//!
//! Totals, the per-day profit trend, and the highlights of a single day.
//! Everything here is a read-only projection of a [`Snapshot`]; nothing is
//! stored back into it.

use crate::loot::{LootLine, value_loot_text};
use crate::types::{DailyRollup, DayKey, PriceLookup, RunRecord, Snapshot};
use serde::Serialize;

/// Sums over a set of runs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallTotals {
    pub total_runs: usize,
    pub total_profit: f64,
    pub total_minutes: f64,
}

impl OverallTotals {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.total_runs += 1;
            totals.total_profit += record.net_profit;
            totals.total_minutes += record.duration_minutes;
        }
        totals
    }

    /// Total play time as whole hours and remaining minutes
    pub fn play_time(&self) -> (u64, u64) {
        let minutes = self.total_minutes.max(0.0).round() as u64;
        (minutes / 60, minutes % 60)
    }
}

/// One point of the daily profit trend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub day: DayKey,
    pub total_profit: f64,
    pub avg_profit: f64,
    pub run_count: usize,
}

/// Profit per day, oldest day first
pub fn daily_trend(snapshot: &Snapshot) -> Vec<TrendPoint> {
    snapshot
        .daily_rollups
        .iter()
        .map(|(day, rollup)| {
            let total_profit: f64 = rollup.runs.iter().map(|run| run.net_profit).sum();
            TrendPoint {
                day: *day,
                total_profit,
                avg_profit: total_profit / rollup.runs.len() as f64,
                run_count: rollup.runs.len(),
            }
        })
        .collect()
}

/// Notable runs and loot of one day
///
/// Ties go to the earliest run in the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHighlights {
    pub day: DayKey,
    pub best_run: RunRecord,
    pub worst_run: RunRecord,
    pub fastest_run: RunRecord,
    pub slowest_run: RunRecord,
    /// Most valuable single loot line across the day's runs, if any has value
    pub most_valuable_item: Option<LootLine>,
    pub totals: OverallTotals,
}

impl DailyHighlights {
    /// Highlights for a day; `None` if the rollup has no runs
    pub fn for_day(day: DayKey, rollup: &DailyRollup, prices: &PriceLookup) -> Option<Self> {
        let first = rollup.runs.first()?;

        let mut best = first;
        let mut worst = first;
        let mut fastest = first;
        let mut slowest = first;
        for run in &rollup.runs[1..] {
            if run.net_profit > best.net_profit {
                best = run;
            }
            if run.net_profit < worst.net_profit {
                worst = run;
            }
            if run.duration_minutes < fastest.duration_minutes {
                fastest = run;
            }
            if run.duration_minutes > slowest.duration_minutes {
                slowest = run;
            }
        }

        let mut most_valuable_item: Option<LootLine> = None;
        for run in &rollup.runs {
            for line in value_loot_text(&run.loot_text, prices) {
                let current = most_valuable_item.as_ref().map_or(0.0, |l| l.total_value);
                if line.total_value > current {
                    most_valuable_item = Some(line);
                }
            }
        }

        Some(Self {
            day,
            best_run: best.clone(),
            worst_run: worst.clone(),
            fastest_run: fastest.clone(),
            slowest_run: slowest.clone(),
            most_valuable_item,
            totals: OverallTotals::from_records(&rollup.runs),
        })
    }
}
