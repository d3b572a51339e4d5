use config::{Config, ConfigError, Environment, File};
use energy::Channel;
use infrastructure::MonitoringConfig;
use serde::Deserialize;

use crate::adapter::homeassistant::HomeAssistant;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub monitoring: MonitoringConfig,
    pub homeassistant: HomeAssistant,
    pub sensors: SensorSettings,
    #[serde(default)]
    pub schedule: ScheduleSettings,
    pub storage: StorageSettings,
    #[serde(default)]
    pub publish: PublishSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name("config.toml"))
            .add_source(Environment::default().separator("_").list_separator(","));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.update_minute > 59 {
            return Err(ConfigError::Message(format!(
                "schedule.update_minute must be within 0..=59, got {}",
                self.schedule.update_minute
            )));
        }

        Ok(())
    }
}

/// Home Assistant entity ids of the eight meters.
#[derive(Debug, Deserialize, Clone)]
pub struct SensorSettings {
    pub prod_cooling: String,
    pub prod_heating: String,
    pub prod_hot_water: String,
    pub used_cooling: String,
    pub used_heating: String,
    pub used_hot_water: String,
    pub aux_used_heating: String,
    pub aux_used_hot_water: String,
}

impl SensorSettings {
    pub fn entity_id(&self, channel: Channel) -> &str {
        match channel {
            Channel::ProducedCooling => &self.prod_cooling,
            Channel::ProducedHeating => &self.prod_heating,
            Channel::ProducedHotWater => &self.prod_hot_water,
            Channel::UsedCooling => &self.used_cooling,
            Channel::UsedHeating => &self.used_heating,
            Channel::UsedHotWater => &self.used_hot_water,
            Channel::AuxUsedHeating => &self.aux_used_heating,
            Channel::AuxUsedHotWater => &self.aux_used_hot_water,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleSettings {
    #[serde(default = "default_update_minute")]
    pub update_minute: u32,
    #[serde(default = "default_true")]
    pub run_on_start: bool,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            update_minute: default_update_minute(),
            run_on_start: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub path: String,
    #[serde(default = "default_storage_key")]
    pub key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PublishSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_entity_prefix")]
    pub entity_prefix: String,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            entity_prefix: default_entity_prefix(),
        }
    }
}

fn default_update_minute() -> u32 {
    15
}

fn default_true() -> bool {
    true
}

fn default_storage_key() -> String {
    "energy_conversion_data".to_owned()
}

fn default_entity_prefix() -> String {
    "sensor.energy_conversion_".to_owned()
}
