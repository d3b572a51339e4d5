use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use energy::Channel;
use infrastructure::{DatabaseConfig, MonitoringConfig};
use serde::Deserialize;

use crate::history::OutputChannel;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub monitoring: MonitoringConfig,
    pub database: DatabaseConfig,
    pub storage: StorageLocation,
    pub inputs: InputStatistics,
    pub outputs: OutputStatistics,
    #[serde(default = "default_short_term_days")]
    pub short_term_days: u32,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_source_tag")]
    pub source_tag: String,
}

impl Settings {
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::default().separator("_").list_separator(","));

        let s = builder.build()?;
        s.try_deserialize()
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageLocation {
    pub file: Option<PathBuf>,
    pub dir: Option<PathBuf>,
}

/// Statistic ids of the hourly "energy during past hour" sensors.
#[derive(Debug, Deserialize, Clone)]
pub struct InputStatistics {
    pub prod_cooling: String,
    pub prod_heating: String,
    pub prod_hot_water: String,
    pub used_cooling: String,
    pub used_heating: String,
    pub used_hot_water: String,
    pub aux_heat: String,
    pub aux_hot_water: String,
}

impl InputStatistics {
    pub fn statistic_id(&self, channel: Channel) -> &str {
        match channel {
            Channel::ProducedCooling => &self.prod_cooling,
            Channel::ProducedHeating => &self.prod_heating,
            Channel::ProducedHotWater => &self.prod_hot_water,
            Channel::UsedCooling => &self.used_cooling,
            Channel::UsedHeating => &self.used_heating,
            Channel::UsedHotWater => &self.used_hot_water,
            Channel::AuxUsedHeating => &self.aux_heat,
            Channel::AuxUsedHotWater => &self.aux_hot_water,
        }
    }
}

/// Statistic ids of the cumulative sensors to rebuild.
#[derive(Debug, Deserialize, Clone)]
pub struct OutputStatistics {
    pub aux_heating: String,
    pub aux_hot_water: String,
    pub used_cooling: String,
    pub used_heating: String,
    pub used_hot_water: String,
    pub used_total: String,
    pub produced_cooling: String,
    pub produced_heating: String,
    pub produced_hot_water: String,
    pub produced_total: String,
}

impl OutputStatistics {
    pub fn statistic_id(&self, output: OutputChannel) -> &str {
        match output {
            OutputChannel::AuxHeating => &self.aux_heating,
            OutputChannel::AuxHotWater => &self.aux_hot_water,
            OutputChannel::UsedCooling => &self.used_cooling,
            OutputChannel::UsedHeating => &self.used_heating,
            OutputChannel::UsedHotWater => &self.used_hot_water,
            OutputChannel::UsedTotal => &self.used_total,
            OutputChannel::ProducedCooling => &self.produced_cooling,
            OutputChannel::ProducedHeating => &self.produced_heating,
            OutputChannel::ProducedHotWater => &self.produced_hot_water,
            OutputChannel::ProducedTotal => &self.produced_total,
        }
    }
}

fn default_short_term_days() -> u32 {
    10
}

fn default_unit() -> String {
    "kWh".to_owned()
}

fn default_source_tag() -> String {
    "rebuild_wizard".to_owned()
}
