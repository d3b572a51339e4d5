use energy::{Accumulator, EnergyState, SensorSource, StateStore, TickOutcome, t};
use infrastructure::{EventBus, EventListener};

use crate::schedule::HourlySchedule;

pub struct EnergyRunner<S, P> {
    accumulator: Accumulator<S, P>,
    schedule: HourlySchedule,
    run_on_start: bool,
    state_updated: EventBus<EnergyState>,
}

impl<S: SensorSource, P: StateStore> EnergyRunner<S, P> {
    pub fn new(accumulator: Accumulator<S, P>, schedule: HourlySchedule, run_on_start: bool) -> Self {
        Self {
            accumulator,
            schedule,
            run_on_start,
            state_updated: EventBus::new(16),
        }
    }

    pub fn subscribe(&self) -> EventListener<EnergyState> {
        self.state_updated.subscribe()
    }

    pub async fn run(mut self) {
        self.state_updated.emitter().send(self.accumulator.state().clone());

        if self.run_on_start && self.schedule.is_due_on_start(t!(now)) {
            tracing::info!("Trigger minute already passed, running catch-up tick");
            self.tick().await;
        }

        loop {
            let now = t!(now);
            let next = self.schedule.next_run_after(now);
            tracing::debug!("Next energy tick at {}", next);

            tokio::time::sleep(next.elapsed_since(now).as_std()).await;
            self.tick().await;
        }
    }

    async fn tick(&mut self) {
        match self.accumulator.process_tick(t!(now)).await {
            Ok(TickOutcome::Applied(state)) => self.state_updated.emitter().send(state),
            Ok(TickOutcome::AlreadyProcessed(_)) => {}
            Err(e) => tracing::error!("Energy tick failed: {:?}", e),
        }
    }
}
