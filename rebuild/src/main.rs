use anyhow::Context as _;
use clap::Parser;

use crate::rebuilder::{RebuildReport, Rebuilder};
use crate::settings::Settings;

mod error;
mod history;
mod rebuilder;
mod settings;
mod statistics;
mod storage;

/// Rebuilds the long- and short-term statistics of the energy conversion sensors
/// from the hourly heat-pump statistics in the Home Assistant recorder database.
///
/// Home Assistant must be stopped while this runs.
#[derive(Debug, Parser)]
#[command(name = "rebuild-history", version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "REBUILD_CONFIG", default_value = "rebuild.toml")]
    config: String,

    /// Compute and report without touching database or storage file
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let settings = Settings::new(&cli.config).expect("Error reading configuration");
    settings.monitoring.init().expect("Error initializing monitoring");

    match run(&settings, cli.dry_run).await {
        Ok(report) => print_report(&report),
        Err(e) => {
            tracing::error!("Rebuild failed: {:?}", e);
            std::process::exit(1);
        }
    }
}

async fn run(settings: &Settings, dry_run: bool) -> anyhow::Result<RebuildReport> {
    let pool = settings
        .database
        .new_pool()
        .await
        .context("Error opening recorder database")?;

    let report = Rebuilder::new(pool.clone(), settings).run(dry_run).await;
    pool.close().await;

    report
}

fn print_report(report: &RebuildReport) {
    tracing::info!(
        "Rebuilt {} outputs over {} hours ({} .. {}){}",
        report.outputs.len(),
        report.hours,
        report.first_hour,
        report.last_hour,
        if report.dry_run { " [dry run]" } else { "" }
    );

    for output in &report.outputs {
        tracing::info!(
            "{} -> {}: deleted {}/{}/{} rows, inserted {} hourly and {} 5-minute rows",
            output.output,
            output.statistic_id,
            output.deleted.statistics,
            output.deleted.short_term,
            output.deleted.meta,
            output.inserted_hourly,
            output.inserted_short_term
        );
    }

    for channel in energy::Channel::ALL {
        tracing::info!(
            "{} {} = {}",
            report.storage_file.display(),
            channel.storage_key(),
            report.totals.get(channel)
        );
    }
}
