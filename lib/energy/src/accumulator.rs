use anyhow::Context as _;

use crate::{
    channel::Channel,
    port::{SensorSource, StateStore},
    reading::{HourlyReadings, sanitize},
    state::EnergyState,
    time::DateTime,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    AlreadyProcessed(DateTime),
    Applied(EnergyState),
}

pub struct Accumulator<S, P> {
    sensors: S,
    store: P,
    state: EnergyState,
}

impl<S: SensorSource, P: StateStore> Accumulator<S, P> {
    pub async fn load(sensors: S, store: P) -> anyhow::Result<Self> {
        let state = store.load().await.context("Error loading energy state")?;

        let state = match state {
            Some(state) => {
                tracing::info!(
                    "Loaded energy state, last processed hour {}",
                    state
                        .last_processed
                        .map(|dt| dt.to_string())
                        .unwrap_or_else(|| "-".to_owned())
                );
                state
            }
            None => {
                tracing::info!("No energy state found, starting from zero");
                EnergyState::default()
            }
        };

        Ok(Self { sensors, store, state })
    }

    pub fn state(&self) -> &EnergyState {
        &self.state
    }

    #[tracing::instrument(skip(self), fields(hour_end = tracing::field::Empty))]
    pub async fn process_tick(&mut self, now: DateTime) -> anyhow::Result<TickOutcome> {
        let hour_end = now.hour_end();
        tracing::Span::current().record("hour_end", tracing::field::display(hour_end));

        if self.state.is_processed(hour_end) {
            tracing::info!("Hour ending {} already processed, skipping", hour_end);
            return Ok(TickOutcome::AlreadyProcessed(hour_end));
        }

        let readings = self.read_sensors().await;
        let next = self.state.apply(hour_end, &readings);

        self.store
            .save(&next)
            .await
            .with_context(|| format!("Error persisting energy state for hour ending {}", hour_end))?;

        tracing::info!(
            "Processed hour ending {}: produced {:.3} kWh, used {:.3} kWh, {}",
            hour_end,
            readings.produced(),
            readings.used(),
            next.cop
        );

        self.state = next.clone();
        Ok(TickOutcome::Applied(next))
    }

    async fn read_sensors(&self) -> HourlyReadings {
        let mut readings = HourlyReadings::default();

        for channel in Channel::ALL {
            let raw = self.sensors.current_value(channel).await;
            let value = sanitize(raw);

            if raw != Some(value) {
                tracing::warn!("Reading of {} unusable ({:?}), counting as 0.0", channel, raw);
            }

            *readings.get_mut(channel) = value;
        }

        readings
    }
}
