use energy::{Channel, SensorSource};

use super::HaHttpClient;
use crate::settings::SensorSettings;

pub struct HaSensorSource {
    client: HaHttpClient,
    sensors: SensorSettings,
}

impl HaSensorSource {
    pub fn new(client: HaHttpClient, sensors: SensorSettings) -> Self {
        Self { client, sensors }
    }
}

impl SensorSource for HaSensorSource {
    async fn current_value(&self, channel: Channel) -> Option<f64> {
        let entity_id = self.sensors.entity_id(channel);

        match self.client.get_state(entity_id).await {
            Ok(Some(state)) => {
                let value = state.state.as_f64();
                if value.is_none() {
                    tracing::warn!("State of {} is not numeric: {:?}", state.entity_id, state.state);
                }
                value
            }
            Ok(None) => {
                tracing::warn!("Entity {} for {} not found", entity_id, channel);
                None
            }
            Err(e) => {
                tracing::warn!("Error reading {} for {}: {:?}", entity_id, channel, e);
                None
            }
        }
    }
}
