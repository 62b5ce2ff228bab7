//! abyssal-stats - Daily and overall rollups for tracked abyssal runs

use abyssal_stats::{
    cli::{Cli, Command, parse_day},
    config::AppConfig,
    data_loader::JsonRecordStore,
    loot::value_loot_text,
    output::get_formatter,
    summary::{DailyHighlights, OverallTotals, daily_trend},
    tracker::Tracker,
};
use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --verbose overrides RUST_LOG
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("abyssal_stats=info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(data_dir) = &cli.data_dir {
        config = config.with_data_dir(data_dir.clone());
    }
    info!("Using data directory {}", config.data_dir.display());

    let show_progress = !cli.json && is_terminal::is_terminal(std::io::stdout());
    let store = Arc::new(JsonRecordStore::from_config(&config).with_progress(show_progress));
    let tracker = Tracker::new(Arc::clone(&store), Arc::clone(&store));
    let formatter = get_formatter(cli.json);

    let snapshot = tracker.reload().await.context("Failed to analyze runs")?;

    match cli.command {
        Command::Daily { date: None } => {
            println!("{}", formatter.format_daily(&snapshot));
        }
        Command::Daily { date: Some(date) } => {
            let day = parse_day(&date)?;
            let rollup = snapshot
                .day(&day)
                .with_context(|| format!("No runs recorded on {day}"))?;
            let highlights = DailyHighlights::for_day(day, rollup, &snapshot.price_lookup);
            println!("{}", formatter.format_day(day, rollup, highlights.as_ref()));
        }
        Command::Overall => {
            let totals = OverallTotals::from_records(&snapshot.records);
            println!("{}", formatter.format_overall(&snapshot.overall_rollup, &totals));
        }
        Command::Loot(args) => {
            let id = args.run_id()?;
            let record = snapshot
                .find(&id)
                .with_context(|| format!("No run found for {id}"))?;
            let lines = value_loot_text(&record.loot_text, &snapshot.price_lookup);
            println!("{}", formatter.format_loot(&id, &lines));
        }
        Command::Trend => {
            println!("{}", formatter.format_trend(&daily_trend(&snapshot)));
        }
        Command::Delete(args) => {
            let id = args.run_id()?;
            let present = tracker.delete_run(&id).await?;
            info!("Deleted run {} (in snapshot: {})", id, present);

            let snapshot = tracker
                .snapshot()
                .await
                .context("No snapshot loaded after delete")?;
            let totals = OverallTotals::from_records(&snapshot.records);
            println!("{}", formatter.format_overall(&snapshot.overall_rollup, &totals));
        }
    }

    Ok(())
}
