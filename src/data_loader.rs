//! File-backed record store
//!
//! Runs are stored as JSON lines, one file per day of play:
//!
//! ```text
//! <data_dir>/abyssal_results_2024-05-01.jsonl
//! <data_dir>/abyssal_results_2024-05-02.jsonl
//! <data_dir>/prices.json
//! ```
//!
//! Each line is one serialized [`RunRecord`]. Lines that fail to parse or
//! validate are skipped with a warning, so one bad line never hides a day.
//! `prices.json` is a flat `{ "<item name>": <price> }` object.
//!
//! # Examples
//!
//! ```no_run
//! use abyssal_stats::data_loader::JsonRecordStore;
//! use abyssal_core::provider::BulkAnalyzer;
//!
//! # async fn example() -> abyssal_stats::Result<()> {
//! let store = JsonRecordStore::new("/home/pilot/.local/share/abyssal-stats");
//! let snapshot = store.analyze().await?;
//! println!("{} runs over {} days", snapshot.len(), snapshot.daily_rollups.len());
//! # Ok(())
//! # }
//! ```

use crate::config::AppConfig;
use crate::error::{AbyssalError, Result};
use crate::loot::{lookup_name, parse_loot_text};
use crate::rollup::build;
use crate::types::{Category, DayKey, PriceLookup, RunId, RunRecord, Snapshot};
use abyssal_core::provider::{BulkAnalyzer, RecordStore};
use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, Stream};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

const RECORD_FILE_PREFIX: &str = "abyssal_results_";
const RECORD_FILE_EXTENSION: &str = "jsonl";

/// Name of the record file for a day
pub fn record_file_name(day: &DayKey) -> String {
    format!("{RECORD_FILE_PREFIX}{day}.{RECORD_FILE_EXTENSION}")
}

fn is_record_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == RECORD_FILE_EXTENSION)
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(RECORD_FILE_PREFIX))
}

/// Record and price storage under one data directory
pub struct JsonRecordStore {
    data_dir: PathBuf,
    prices_file: PathBuf,
    show_progress: bool,
}

impl JsonRecordStore {
    /// Store over `data_dir` with `prices.json` inside it
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let prices_file = data_dir.join(crate::config::DEFAULT_PRICES_FILE);
        Self {
            data_dir,
            prices_file,
            show_progress: false,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.data_dir.clone()).with_prices_file(config.prices_path())
    }

    pub fn with_prices_file(mut self, prices_file: PathBuf) -> Self {
        self.prices_file = prices_file;
        self
    }

    /// Show a spinner while analyzing
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Record files directly under the data directory, sorted by name
    pub fn find_record_files(&self) -> Vec<PathBuf> {
        if !self.data_dir.exists() {
            debug!("Data directory not found: {}", self.data_dir.display());
            return Vec::new();
        }

        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&self.data_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|entry| entry.into_path())
            .filter(|path| is_record_file(path))
            .collect();
        files.sort();

        debug!("Found {} record files", files.len());
        files
    }

    /// Stream every valid record, file by file
    pub fn load_records(&self) -> impl Stream<Item = RunRecord> + '_ {
        stream::iter(self.find_record_files())
            .then(|path| async move {
                match read_record_file(&path).await {
                    Ok(records) => records,
                    Err(e) => {
                        warn!("Failed to read {}: {}", path.display(), e);
                        Vec::new()
                    }
                }
            })
            .flat_map(stream::iter)
    }

    /// All valid records, ordered by start time
    pub async fn load_all_records(&self) -> Vec<RunRecord> {
        let mut records: Vec<RunRecord> = self.load_records().collect().await;
        records.sort_by_key(|record| record.start_time);
        records
    }

    /// Load the price file; a missing file is an empty lookup
    pub async fn load_prices(&self) -> Result<PriceLookup> {
        let content = match tokio::fs::read_to_string(&self.prices_file).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No price file at {}", self.prices_file.display());
                return Ok(PriceLookup::new());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| AbyssalError::Parse {
            file: self.prices_file.clone(),
            error: e.to_string(),
        })
    }

    /// Append one record to its day's file
    pub async fn save_record(&self, record: &RunRecord) -> Result<()> {
        record.validate()?;
        tokio::fs::create_dir_all(&self.data_dir).await?;

        let path = self.data_dir.join(record_file_name(&record.day_key));
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Candidate files for a run, its own day's file first
    fn files_for(&self, id: &RunId) -> Vec<PathBuf> {
        let own = self.data_dir.join(record_file_name(&id.day_key()));
        let mut files = vec![own.clone()];
        files.extend(self.find_record_files().into_iter().filter(|path| *path != own));
        files
    }

    /// Load records and prices and build a snapshot; the spinner is
    /// cleared whether or not loading succeeds
    async fn analyze_with_progress(&self, progress: Option<&ProgressBar>) -> Result<Snapshot> {
        let records = self.load_all_records().await;
        let prices = self.load_prices().await;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let prices = prices?;
        info!(
            "Analyzing {} runs with {} known prices",
            records.len(),
            prices.len()
        );
        Ok(build(records, prices))
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Analyzing runs");
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

/// Read and validate every record line of one file
///
/// Lines are handled as raw bytes, so a line that is not UTF-8 is skipped
/// like any other unparseable line.
async fn read_record_file(path: &Path) -> Result<Vec<RunRecord>> {
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        AbyssalError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })?;
    let mut lines = BufReader::new(file).split(b'\n');

    let mut records = Vec::new();
    let mut line_number = 0usize;
    while let Some(line) = lines.next_segment().await? {
        line_number += 1;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        let record: RunRecord = match serde_json::from_slice(&line) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping {}:{}: {}", path.display(), line_number, e);
                continue;
            }
        };

        if let Err(e) = record.validate() {
            warn!("Skipping {}:{}: {}", path.display(), line_number, e);
            continue;
        }
        records.push(record);
    }

    Ok(records)
}

/// Remove the lines holding `id` from one file; returns whether any matched
///
/// Every other non-empty line is written back byte for byte.
async fn remove_from_file(path: &Path, id: &RunId) -> Result<bool> {
    let content = match tokio::fs::read(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    let mut removed = false;
    let mut kept: Vec<u8> = Vec::with_capacity(content.len());
    for line in content.split(|b| *b == b'\n') {
        if line.is_empty() {
            continue;
        }
        let is_target = serde_json::from_slice::<RunRecord>(line)
            .map(|record| record.matches(id))
            .unwrap_or(false);
        if is_target {
            removed = true;
            continue;
        }
        kept.extend_from_slice(line);
        kept.push(b'\n');
    }

    if removed {
        tokio::fs::write(path, kept).await?;
    }
    Ok(removed)
}

#[async_trait]
impl BulkAnalyzer for JsonRecordStore {
    async fn analyze(&self) -> Result<Snapshot> {
        let progress = self.spinner();
        self.analyze_with_progress(progress.as_ref()).await
    }
}

#[async_trait]
impl RecordStore for JsonRecordStore {
    async fn delete_persisted(&self, id: &RunId) -> Result<()> {
        for path in self.files_for(id) {
            if remove_from_file(&path, id).await? {
                info!("Deleted run {} from {}", id, path.display());
                return Ok(());
            }
        }
        Err(AbyssalError::RecordNotFound(*id))
    }
}

/// Entry filament for a category, e.g. `T5 Exotic` → `Chaotic Exotic Filament`
pub fn filament_name(category: &Category) -> Option<String> {
    let (tier, weather) = category.tier_weather()?;
    let level = match tier {
        "T1" => "Calm",
        "T2" => "Agitated",
        "T3" => "Fierce",
        "T4" => "Raging",
        "T5" => "Chaotic",
        "T6" => "Cataclysmic",
        _ => return None,
    };
    Some(format!("{level} {weather} Filament"))
}

/// Every item name a price source would need for these runs
///
/// Loot names are reduced to their lookup form, and each run's category
/// contributes its entry filament.
pub fn collect_item_names(records: &[RunRecord]) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for record in records {
        for (name, _) in parse_loot_text(&record.loot_text) {
            let name = lookup_name(name);
            if !name.is_empty() {
                names.insert(name);
            }
        }
        if let Some(filament) = filament_name(&record.category) {
            names.insert(filament);
        }
    }
    names
}
