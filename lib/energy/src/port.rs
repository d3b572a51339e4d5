#![allow(async_fn_in_trait)]

use crate::{channel::Channel, state::EnergyState};

pub trait SensorSource {
    /// Current reading of the meter in kWh, `None` if it can't be read or is not a number.
    async fn current_value(&self, channel: Channel) -> Option<f64>;
}

pub trait StateStore {
    async fn load(&self) -> anyhow::Result<Option<EnergyState>>;

    async fn save(&self, state: &EnergyState) -> anyhow::Result<()>;
}
