use anyhow::Context as _;
use energy::{Accumulator, persistence::JsonFileStore};
use settings::Settings;

use crate::adapter::metrics_export::EnergyMetricsExporter;
use crate::runner::EnergyRunner;
use crate::schedule::HourlySchedule;

mod adapter;
mod output;
mod runner;
mod schedule;
mod settings;

#[tokio::main(flavor = "current_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");
    settings.monitoring.init().expect("Error initializing monitoring");

    if let Err(e) = run(settings).await {
        tracing::error!("Energy conversion stopped: {:?}", e);
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    let sensors = settings
        .homeassistant
        .new_sensor_source(&settings.sensors)
        .context("Error initializing Home Assistant sensor source")?;
    let store = JsonFileStore::new(&settings.storage.path, &settings.storage.key);

    let accumulator = Accumulator::load(sensors, store).await?;
    let runner = EnergyRunner::new(
        accumulator,
        HourlySchedule::new(settings.schedule.update_minute),
        settings.schedule.run_on_start,
    );

    let metrics_exporter = EnergyMetricsExporter::new(runner.subscribe());

    let publisher_exec = {
        let publisher = if settings.publish.enabled {
            let publisher = settings
                .homeassistant
                .new_publisher(&settings.publish)
                .context("Error initializing Home Assistant publisher")?;
            Some(publisher)
        } else {
            tracing::info!("Publishing of energy sensors disabled");
            None
        };
        let listener = runner.subscribe();

        async move {
            match publisher {
                Some(publisher) => publisher.run(listener).await,
                None => std::future::pending().await,
            }
        }
    };

    tracing::info!(
        "Starting energy conversion, ticking at minute {} of every hour",
        settings.schedule.update_minute
    );

    tokio::select!(
        _ = runner.run() => {},
        _ = metrics_exporter.run() => {},
        _ = publisher_exec => {},
    );

    Ok(())
}
