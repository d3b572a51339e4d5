use energy::{Channel, CopKind, EnergyState};
use infrastructure::{EventListener, meter::set};

const CHANNEL: &str = "channel";
const KIND: &str = "kind";

pub struct EnergyMetricsExporter {
    state_updated: EventListener<EnergyState>,
}

impl EnergyMetricsExporter {
    pub fn new(state_updated: EventListener<EnergyState>) -> Self {
        Self { state_updated }
    }

    pub async fn run(mut self) {
        while let Some(state) = self.state_updated.recv().await {
            record(&state);
        }
    }
}

fn record(state: &EnergyState) {
    for channel in Channel::ALL {
        let name = channel.to_string();
        set("energy_total_kwh", state.totals.get(channel), &[(CHANNEL, name.as_str())]);
    }

    for kind in CopKind::ALL {
        let name = kind.to_string();
        set("energy_cop", state.cop.get(kind), &[(KIND, name.as_str())]);
    }
}
