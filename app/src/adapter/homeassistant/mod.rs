mod client;
mod publisher;
mod source;

use std::collections::HashMap;

pub use client::HaHttpClient;
pub use publisher::HaStatePublisher;
pub use source::HaSensorSource;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::settings::{PublishSettings, SensorSettings};

#[derive(Debug, Deserialize, Clone)]
pub struct HomeAssistant {
    pub url: String,
    pub token: String,
}

impl HomeAssistant {
    pub fn new_client(&self) -> anyhow::Result<HaHttpClient> {
        HaHttpClient::new(&self.url, &self.token)
    }

    pub fn new_sensor_source(&self, sensors: &SensorSettings) -> anyhow::Result<HaSensorSource> {
        Ok(HaSensorSource::new(self.new_client()?, sensors.clone()))
    }

    pub fn new_publisher(&self, publish: &PublishSettings) -> anyhow::Result<HaStatePublisher> {
        Ok(HaStatePublisher::new(self.new_client()?, &publish.entity_prefix))
    }
}

#[derive(Deserialize, Debug)]
pub struct EntityState {
    pub entity_id: String,
    pub state: StateValue,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StateUpdate {
    pub state: String,
    pub attributes: HashMap<String, Value>,
}

#[derive(Debug, PartialEq)]
pub enum StateValue {
    Available(String),
    Unavailable,
}

impl StateValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Available(v) => v.trim().parse::<f64>().ok(),
            StateValue::Unavailable => None,
        }
    }
}

impl<'de> Deserialize<'de> for StateValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        match value.as_str() {
            "unavailable" | "unknown" => Ok(StateValue::Unavailable),
            _ => Ok(StateValue::Available(value)),
        }
    }
}
