use std::collections::HashMap;

use energy::EnergyState;
use infrastructure::EventListener;
use serde_json::{Value, json};

use super::{HaHttpClient, StateUpdate};
use crate::output::OutputSensor;

pub struct HaStatePublisher {
    client: HaHttpClient,
    entity_prefix: String,
    outputs: Vec<OutputSensor>,
}

impl HaStatePublisher {
    pub fn new(client: HaHttpClient, entity_prefix: &str) -> Self {
        Self {
            client,
            entity_prefix: entity_prefix.to_owned(),
            outputs: OutputSensor::all(),
        }
    }

    pub fn entity_id(&self, output: &OutputSensor) -> String {
        format!("{}{}", self.entity_prefix, output.object_id())
    }

    /// Publishes all outputs. Failures are logged per entity, returns the number of published entities.
    #[tracing::instrument(skip_all)]
    pub async fn publish(&self, state: &EnergyState) -> usize {
        let mut published = 0;

        for output in &self.outputs {
            let entity_id = self.entity_id(output);
            match self.client.set_state(&entity_id, &state_update(output, state)).await {
                Ok(()) => published += 1,
                Err(e) => tracing::error!("Error publishing {}: {:?}", entity_id, e),
            }
        }

        tracing::info!("Published {}/{} energy sensors", published, self.outputs.len());
        published
    }

    pub async fn run(self, mut state_updated: EventListener<EnergyState>) {
        while let Some(state) = state_updated.recv().await {
            self.publish(&state).await;
        }
    }
}

fn state_update(output: &OutputSensor, state: &EnergyState) -> StateUpdate {
    let mut attributes: HashMap<String, Value> = HashMap::new();
    attributes.insert("friendly_name".to_owned(), json!(output.name()));
    attributes.insert("unit_of_measurement".to_owned(), json!(output.unit()));
    attributes.insert("state_class".to_owned(), json!(output.state_class()));

    if let Some(device_class) = output.device_class() {
        attributes.insert("device_class".to_owned(), json!(device_class));
    }
    if let Some(icon) = output.icon() {
        attributes.insert("icon".to_owned(), json!(icon));
    }

    if let Some(dt) = state.last_processed {
        attributes.insert("last_processed_hour_end".to_owned(), json!(dt.to_local_iso_string()));
    }

    StateUpdate {
        state: output.value(state).to_string(),
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_include;
    use energy::{Channel, CopKind, Totals, time::DateTime};

    use super::*;

    #[test]
    fn test_energy_state_update() {
        let state = EnergyState {
            totals: Totals {
                used_heating_total: 12.345,
                ..Default::default()
            },
            ..Default::default()
        };

        let update = state_update(&OutputSensor::Total(Channel::UsedHeating), &state);

        assert_eq!(update.state, "12.345");
        assert_json_include!(
            actual: serde_json::to_value(&update).unwrap(),
            expected: json!({
                "state": "12.345",
                "attributes": {
                    "friendly_name": "Used heating (kWh)",
                    "unit_of_measurement": "kWh",
                    "device_class": "energy",
                    "state_class": "total_increasing"
                }
            })
        );
        assert!(!update.attributes.contains_key("last_processed_hour_end"));
    }

    #[test]
    fn test_last_processed_hour_end_attribute() {
        let last_processed = DateTime::from_iso("2024-03-01T10:00:00Z").unwrap();
        let state = EnergyState {
            last_processed: Some(last_processed),
            ..Default::default()
        };

        let update = state_update(&OutputSensor::UsedTotal, &state);

        assert_eq!(
            update.attributes.get("last_processed_hour_end"),
            Some(&json!(last_processed.to_local_iso_string()))
        );
    }

    #[test]
    fn test_cop_state_update_has_icon() {
        let update = state_update(&OutputSensor::Cop(CopKind::HotWater), &EnergyState::default());

        assert_eq!(update.state, "0");
        assert_eq!(update.attributes.get("icon"), Some(&json!("mdi:alpha-c-circle")));
        assert!(!update.attributes.contains_key("device_class"));
    }

    #[test]
    fn test_entity_id_uses_prefix() {
        let client = HaHttpClient::new("http://localhost:8123", "token").unwrap();
        let publisher = HaStatePublisher::new(client, "sensor.energy_conversion_");

        assert_eq!(
            publisher.entity_id(&OutputSensor::ProducedTotal),
            "sensor.energy_conversion_sum_produced"
        );
    }
}
