//! Property-based tests for abyssal-stats using proptest

use abyssal_stats::loot::{aggregate, parse_loot_text};
use abyssal_stats::rollup::{build, remove_record};
use abyssal_stats::types::{Category, PriceLookup, RunRecord};
use chrono::{Duration, NaiveDate};
use proptest::prelude::*;

// Strategies for generating test data

prop_compose! {
    fn arb_record()(
        day in 0i64..5,
        minute_of_day in 0i64..1380,
        second in 0i64..60,
        minutes in 1i64..60,
        category in prop::sample::select(vec![
            "T3 Dark",
            "T4 Firestorm",
            "T5 Exotic",
            "T6 Gamma",
            "Unknown",
        ]),
        profit in -50_000_000.0f64..150_000_000.0,
        entry_cost in 0.0f64..20_000_000.0,
    ) -> RunRecord {
        let base = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let start = base
            + Duration::days(day)
            + Duration::minutes(minute_of_day)
            + Duration::seconds(second);
        RunRecord::new(
            start,
            start + Duration::minutes(minutes),
            Category::from_label(category),
            profit,
            "",
        )
        .with_entry_cost(entry_cost)
    }
}

fn arb_records() -> impl Strategy<Value = Vec<RunRecord>> {
    prop::collection::vec(arb_record(), 1..40).prop_map(|mut records| {
        // Identity is the (start, end) pair; keep one record per identity
        records.sort_by_key(|r| (r.start_time, r.end_time));
        records.dedup_by_key(|r| (r.start_time, r.end_time));
        records
    })
}

prop_compose! {
    fn arb_records_with_target()(records in arb_records())(
        index in 0..records.len(),
        records in Just(records),
    ) -> (Vec<RunRecord>, usize) {
        (records, index)
    }
}

proptest! {
    #[test]
    fn incremental_removal_matches_rebuild((records, index) in arb_records_with_target()) {
        let target = records[index].id();
        let snapshot = build(records.clone(), PriceLookup::new());

        let remaining: Vec<RunRecord> = records
            .iter()
            .filter(|r| !r.matches(&target))
            .cloned()
            .collect();

        prop_assert_eq!(
            remove_record(&snapshot, &target),
            build(remaining, PriceLookup::new())
        );
    }

    #[test]
    fn removal_is_idempotent((records, index) in arb_records_with_target()) {
        let target = records[index].id();
        let snapshot = build(records, PriceLookup::new());

        let once = remove_record(&snapshot, &target);
        let twice = remove_record(&once, &target);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn daily_buckets_never_empty((records, index) in arb_records_with_target()) {
        let target = records[index].id();
        let snapshot = remove_record(&build(records, PriceLookup::new()), &target);

        let bucketed: usize = snapshot.daily_rollups.values().map(|d| d.runs.len()).sum();
        prop_assert_eq!(bucketed, snapshot.len());
        for (day, rollup) in &snapshot.daily_rollups {
            prop_assert!(!rollup.runs.is_empty());
            prop_assert!(rollup.runs.iter().all(|r| r.day_key == *day));
        }
    }

    #[test]
    fn category_counts_cover_labeled_runs(records in arb_records()) {
        let snapshot = build(records.clone(), PriceLookup::new());
        let labeled = records
            .iter()
            .filter(|r| r.category.tier_weather().is_some())
            .count();
        let counted: usize = snapshot
            .overall_rollup
            .category_breakdown
            .iter()
            .map(|c| c.runs_count)
            .sum();
        prop_assert_eq!(counted, labeled);
    }

    #[test]
    fn loot_parsing_never_panics(text in ".{0,200}") {
        for (name, quantity) in parse_loot_text(&text) {
            prop_assert!(quantity >= 1);
            prop_assert!(!name.is_empty());
        }
    }

    #[test]
    fn loot_lines_sorted_and_quantities_conserved(
        pairs in prop::collection::vec(
            (prop::sample::select(vec!["Arkonor*", "Arkonor", "Blueprint", "Scrap", "Plasma*"]), 1u32..1000),
            0..30,
        ),
    ) {
        let prices: PriceLookup = [
            ("Arkonor".to_string(), 120.4),
            ("Blueprint".to_string(), 5_000.0),
            ("Plasma".to_string(), 2.5),
        ]
        .into_iter()
        .collect();

        let lines = aggregate(pairs.iter().map(|(n, q)| (*n, *q)), &prices);

        prop_assert!(lines.windows(2).all(|w| w[0].total_value >= w[1].total_value));

        let input_total: u64 = pairs.iter().map(|(_, q)| u64::from(*q)).sum();
        let line_total: u64 = lines.iter().map(|l| l.quantity).sum();
        prop_assert_eq!(input_total, line_total);

        let mut names: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        prop_assert_eq!(names.len(), lines.len());
    }
}
