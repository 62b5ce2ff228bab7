//! CLI interface for abyssal-stats
//!
//! # Example
//!
//! ```bash
//! # Daily rollups, newest day first
//! abyssal-stats daily
//!
//! # One day with its highlights, as JSON
//! abyssal-stats daily --date 2024-05-01 --json
//!
//! # Loot of one run
//! abyssal-stats loot --start "2024-05-01 20:00:00" --end "2024-05-01 20:20:00"
//! ```

use crate::error::{AbyssalError, Result};
use crate::types::{DayKey, RunId, parse_local_time};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Rollups and loot valuation for tracked abyssal runs
#[derive(Parser, Debug, Clone)]
#[command(name = "abyssal-stats")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to ./abyssal-stats.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the run record files
    #[arg(long, global = true, env = "ABYSSAL_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Identity of one run on the command line
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Run start time (YYYY-MM-DD HH:MM:SS)
    #[arg(long)]
    pub start: String,

    /// Run end time (YYYY-MM-DD HH:MM:SS)
    #[arg(long)]
    pub end: String,
}

impl RunArgs {
    pub fn run_id(&self) -> Result<RunId> {
        parse_run_id(&self.start, &self.end)
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show daily rollups, or one day with its highlights
    Daily {
        /// Day to show (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show all-time averages, totals and the per-category breakdown
    Overall,

    /// Show the valued loot of one run
    Loot(RunArgs),

    /// Show profit per day
    Trend,

    /// Delete one run and show the refreshed overall rollup
    Delete(RunArgs),
}

/// Parse a day argument in YYYY-MM-DD format
pub fn parse_day(s: &str) -> Result<DayKey> {
    s.trim().parse()
}

/// Parse a start/end pair into a run identity
pub fn parse_run_id(start: &str, end: &str) -> Result<RunId> {
    let start_time = parse_local_time(start.trim())?;
    let end_time = parse_local_time(end.trim())?;
    if end_time < start_time {
        return Err(AbyssalError::InvalidArgument(format!(
            "run end {end} is before its start {start}"
        )));
    }
    Ok(RunId::new(start_time, end_time))
}
