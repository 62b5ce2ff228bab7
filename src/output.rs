//! Output formatting module for abyssal-stats
//!
//! This module provides formatters for displaying rollups in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```no_run
//! use abyssal_stats::output::get_formatter;
//! use abyssal_stats::rollup::build;
//! use abyssal_stats::types::PriceLookup;
//!
//! let snapshot = build(Vec::new(), PriceLookup::new());
//!
//! // Get table formatter for human-readable output
//! let formatter = get_formatter(false);
//! println!("{}", formatter.format_daily(&snapshot));
//!
//! // Get JSON formatter for machine-readable output
//! let json_formatter = get_formatter(true);
//! println!("{}", json_formatter.format_daily(&snapshot));
//! ```

use crate::loot::{LootLine, total_value};
use crate::summary::{DailyHighlights, OverallTotals, TrendPoint};
use crate::types::{DailyRollup, DayKey, OverallRollup, RunId, RunRecord, Snapshot};
use colored::Colorize;
use prettytable::{Row, Table, format, row};
use serde_json::json;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Every day's rollup, newest day first
    fn format_daily(&self, snapshot: &Snapshot) -> String;

    /// One day's runs, with highlights when available
    fn format_day(
        &self,
        day: DayKey,
        rollup: &DailyRollup,
        highlights: Option<&DailyHighlights>,
    ) -> String;

    /// All-time averages, totals and the category breakdown
    fn format_overall(&self, overall: &OverallRollup, totals: &OverallTotals) -> String;

    /// Valued loot lines of one run
    fn format_loot(&self, id: &RunId, lines: &[LootLine]) -> String;

    /// Per-day profit trend
    fn format_trend(&self, trend: &[TrendPoint]) -> String;
}

/// Table formatter for human-readable output
///
/// ISK amounts are rounded to whole units with thousands separators, and
/// profits are colored by sign.
pub struct TableFormatter;

impl TableFormatter {
    /// Format a whole number with thousands separators
    fn format_number(n: u64) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, ch) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(ch);
        }

        result.chars().rev().collect()
    }

    /// Format an ISK amount, rounded to whole ISK
    fn format_isk(amount: f64) -> String {
        let rounded = amount.round();
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{sign}{} ISK", Self::format_number(rounded.abs() as u64))
    }

    /// ISK amount colored green or red by sign
    fn format_profit(amount: f64) -> String {
        let text = Self::format_isk(amount);
        if amount < 0.0 {
            text.red().to_string()
        } else if amount > 0.0 {
            text.green().to_string()
        } else {
            text
        }
    }

    fn format_minutes(minutes: f64) -> String {
        format!("{minutes:.1} min")
    }

    fn format_play_time(totals: &OverallTotals) -> String {
        let (hours, minutes) = totals.play_time();
        format!("{hours}h {minutes}m")
    }

    fn run_row(record: &RunRecord) -> Row {
        row![
            record.start_time.format("%H:%M:%S"),
            record.end_time.format("%H:%M:%S"),
            record.category.as_str(),
            record.ship_class(),
            r -> Self::format_minutes(record.duration_minutes),
            r -> Self::format_profit(record.net_profit),
            r -> Self::format_isk(record.profit_per_hour)
        ]
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }
}

impl OutputFormatter for TableFormatter {
    fn format_daily(&self, snapshot: &Snapshot) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Date",
            b -> "Runs",
            b -> "Avg Profit",
            b -> "Avg Duration",
            b -> "Avg ISK/h"
        ]);

        for day in snapshot.available_days() {
            let Some(rollup) = snapshot.day(&day) else {
                continue;
            };
            table.add_row(row![
                day,
                r -> rollup.runs.len(),
                r -> Self::format_profit(rollup.avg_profit),
                r -> Self::format_minutes(rollup.avg_duration),
                r -> Self::format_isk(rollup.avg_profit_per_hour)
            ]);
        }

        let totals = OverallTotals::from_records(&snapshot.records);
        table.add_row(row![
            b -> "TOTAL",
            b -> totals.total_runs,
            b -> Self::format_profit(totals.total_profit),
            b -> Self::format_play_time(&totals),
            ""
        ]);

        table.to_string()
    }

    fn format_day(
        &self,
        day: DayKey,
        rollup: &DailyRollup,
        highlights: Option<&DailyHighlights>,
    ) -> String {
        let mut output = format!("{}\n", day.to_string().bold());

        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Start",
            b -> "End",
            b -> "Category",
            b -> "Ship",
            b -> "Duration",
            b -> "Net Profit",
            b -> "ISK/h"
        ]);
        for record in &rollup.runs {
            table.add_row(Self::run_row(record));
        }
        table.add_row(row![
            b -> "AVERAGE",
            "",
            "",
            "",
            r -> Self::format_minutes(rollup.avg_duration),
            r -> Self::format_profit(rollup.avg_profit),
            r -> Self::format_isk(rollup.avg_profit_per_hour)
        ]);
        output.push_str(&table.to_string());

        if let Some(highlights) = highlights {
            let mut summary = Self::new_table();
            summary.set_titles(row![b -> "Highlight", b -> "Run", b -> "Value"]);
            let run_label = |record: &RunRecord| record.start_time.format("%H:%M:%S").to_string();

            summary.add_row(row![
                "Best run",
                run_label(&highlights.best_run),
                r -> Self::format_profit(highlights.best_run.net_profit)
            ]);
            summary.add_row(row![
                "Worst run",
                run_label(&highlights.worst_run),
                r -> Self::format_profit(highlights.worst_run.net_profit)
            ]);
            summary.add_row(row![
                "Fastest run",
                run_label(&highlights.fastest_run),
                r -> Self::format_minutes(highlights.fastest_run.duration_minutes)
            ]);
            summary.add_row(row![
                "Slowest run",
                run_label(&highlights.slowest_run),
                r -> Self::format_minutes(highlights.slowest_run.duration_minutes)
            ]);
            if let Some(item) = &highlights.most_valuable_item {
                summary.add_row(row![
                    "Top item",
                    item.name,
                    r -> Self::format_isk(item.total_value)
                ]);
            }
            summary.add_row(row![
                "Play time",
                "",
                r -> Self::format_play_time(&highlights.totals)
            ]);

            output.push('\n');
            output.push_str(&summary.to_string());
        }

        output
    }

    fn format_overall(&self, overall: &OverallRollup, totals: &OverallTotals) -> String {
        let mut summary = Self::new_table();
        summary.set_titles(row![b -> "Metric", b -> "Value"]);
        summary.add_row(row!["Runs", r -> totals.total_runs]);
        summary.add_row(row!["Total profit", r -> Self::format_profit(totals.total_profit)]);
        summary.add_row(row!["Play time", r -> Self::format_play_time(totals)]);
        summary.add_row(row!["Avg profit", r -> Self::format_profit(overall.avg_profit)]);
        summary.add_row(row!["Avg duration", r -> Self::format_minutes(overall.avg_duration)]);
        summary.add_row(row!["Avg ISK/h", r -> Self::format_isk(overall.avg_profit_per_hour)]);

        let mut breakdown = Self::new_table();
        breakdown.set_titles(row![
            b -> "Tier",
            b -> "Weather",
            b -> "Runs",
            b -> "Avg Profit",
            b -> "Avg Duration",
            b -> "Avg ISK/h",
            b -> "Entry Cost"
        ]);
        for stats in &overall.category_breakdown {
            breakdown.add_row(row![
                stats.tier,
                stats.weather,
                r -> stats.runs_count,
                r -> Self::format_profit(stats.avg_profit),
                r -> Self::format_minutes(stats.avg_duration),
                r -> Self::format_isk(stats.avg_profit_per_hour),
                r -> Self::format_isk(stats.total_entry_cost)
            ]);
        }

        format!("{summary}\n{breakdown}")
    }

    fn format_loot(&self, id: &RunId, lines: &[LootLine]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Item",
            b -> "Quantity",
            b -> "Unit Price",
            b -> "Total"
        ]);
        for line in lines {
            table.add_row(row![
                line.name,
                r -> Self::format_number(line.quantity),
                r -> Self::format_isk(line.unit_price),
                r -> Self::format_isk(line.total_value)
            ]);
        }
        table.add_row(row![
            b -> "TOTAL",
            "",
            "",
            b -> Self::format_isk(total_value(lines))
        ]);

        format!("{id}\n{table}")
    }

    fn format_trend(&self, trend: &[TrendPoint]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Date",
            b -> "Runs",
            b -> "Total Profit",
            b -> "Avg Profit"
        ]);
        for point in trend {
            table.add_row(row![
                point.day,
                r -> point.run_count,
                r -> Self::format_profit(point.total_profit),
                r -> Self::format_profit(point.avg_profit)
            ]);
        }
        table.to_string()
    }
}

/// JSON formatter for machine-readable output
///
/// Amounts are emitted unrounded.
pub struct JsonFormatter;

impl JsonFormatter {
    fn render(value: serde_json::Value) -> String {
        serde_json::to_string_pretty(&value).unwrap_or_default()
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_daily(&self, snapshot: &Snapshot) -> String {
        let totals = OverallTotals::from_records(&snapshot.records);
        Self::render(json!({
            "daily": snapshot.available_days().iter().filter_map(|day| {
                snapshot.day(day).map(|rollup| json!({
                    "date": day,
                    "runs": rollup.runs.len(),
                    "avg_profit": rollup.avg_profit,
                    "avg_duration": rollup.avg_duration,
                    "avg_profit_per_hour": rollup.avg_profit_per_hour,
                }))
            }).collect::<Vec<_>>(),
            "totals": totals,
        }))
    }

    fn format_day(
        &self,
        day: DayKey,
        rollup: &DailyRollup,
        highlights: Option<&DailyHighlights>,
    ) -> String {
        Self::render(json!({
            "date": day,
            "rollup": rollup,
            "highlights": highlights,
        }))
    }

    fn format_overall(&self, overall: &OverallRollup, totals: &OverallTotals) -> String {
        Self::render(json!({
            "overall": overall,
            "totals": totals,
        }))
    }

    fn format_loot(&self, id: &RunId, lines: &[LootLine]) -> String {
        Self::render(json!({
            "run": id.to_string(),
            "items": lines,
            "total_value": total_value(lines),
        }))
    }

    fn format_trend(&self, trend: &[TrendPoint]) -> String {
        Self::render(json!({ "trend": trend }))
    }
}

/// Get the appropriate formatter for the requested output mode
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter)
    }
}
