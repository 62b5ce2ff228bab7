//! Common test utilities and helpers for abyssal-stats tests

use abyssal_stats::data_loader::JsonRecordStore;
use abyssal_stats::types::{Category, RunRecord, ShipClass, parse_local_time};
use chrono::{Duration, NaiveDateTime};
use tempfile::TempDir;

/// Builder for test RunRecord instances
pub struct RunRecordBuilder {
    start_time: NaiveDateTime,
    minutes: i64,
    category: String,
    net_profit: f64,
    loot_text: String,
    entry_cost: f64,
    ship_class: Option<ShipClass>,
}

impl RunRecordBuilder {
    /// Start a builder for a 20 minute T3 Dark run
    pub fn new(start: &str) -> Self {
        Self {
            start_time: parse_local_time(start).expect("valid test timestamp"),
            minutes: 20,
            category: "T3 Dark".to_string(),
            net_profit: 0.0,
            loot_text: String::new(),
            entry_cost: 0.0,
            ship_class: None,
        }
    }

    pub fn minutes(mut self, minutes: i64) -> Self {
        self.minutes = minutes;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = category.to_string();
        self
    }

    pub fn profit(mut self, net_profit: f64) -> Self {
        self.net_profit = net_profit;
        self
    }

    #[allow(dead_code)]
    pub fn loot(mut self, loot_text: &str) -> Self {
        self.loot_text = loot_text.to_string();
        self
    }

    #[allow(dead_code)]
    pub fn entry_cost(mut self, entry_cost: f64) -> Self {
        self.entry_cost = entry_cost;
        self
    }

    #[allow(dead_code)]
    pub fn ship_class(mut self, ship_class: ShipClass) -> Self {
        self.ship_class = Some(ship_class);
        self
    }

    pub fn build(self) -> RunRecord {
        let record = RunRecord::new(
            self.start_time,
            self.start_time + Duration::minutes(self.minutes),
            Category::from_label(self.category),
            self.net_profit,
            self.loot_text,
        )
        .with_entry_cost(self.entry_cost);

        match self.ship_class {
            Some(ship_class) => record.with_ship_class(ship_class),
            None => record,
        }
    }
}

/// A store over a fresh temporary directory, pre-filled with `records`
#[allow(dead_code)]
pub async fn store_with(records: &[RunRecord]) -> (TempDir, JsonRecordStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonRecordStore::new(dir.path());
    for record in records {
        store.save_record(record).await.expect("save record");
    }
    (dir, store)
}
