use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    channel::Channel,
    reading::{CopValues, HourlyReadings},
    time::DateTime,
    unit::round_to,
};

/// Cumulative kWh per channel since first activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub prod_cooling_total: f64,
    pub prod_heating_total: f64,
    pub prod_hot_water_total: f64,
    pub used_cooling_total: f64,
    pub used_heating_total: f64,
    pub used_hot_water_total: f64,
    pub aux_used_heating_total: f64,
    pub aux_used_hot_water_total: f64,
}

impl Totals {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::ProducedCooling => self.prod_cooling_total,
            Channel::ProducedHeating => self.prod_heating_total,
            Channel::ProducedHotWater => self.prod_hot_water_total,
            Channel::UsedCooling => self.used_cooling_total,
            Channel::UsedHeating => self.used_heating_total,
            Channel::UsedHotWater => self.used_hot_water_total,
            Channel::AuxUsedHeating => self.aux_used_heating_total,
            Channel::AuxUsedHotWater => self.aux_used_hot_water_total,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut f64 {
        match channel {
            Channel::ProducedCooling => &mut self.prod_cooling_total,
            Channel::ProducedHeating => &mut self.prod_heating_total,
            Channel::ProducedHotWater => &mut self.prod_hot_water_total,
            Channel::UsedCooling => &mut self.used_cooling_total,
            Channel::UsedHeating => &mut self.used_heating_total,
            Channel::UsedHotWater => &mut self.used_hot_water_total,
            Channel::AuxUsedHeating => &mut self.aux_used_heating_total,
            Channel::AuxUsedHotWater => &mut self.aux_used_hot_water_total,
        }
    }

    pub fn produced(&self) -> f64 {
        round_to(Channel::PRODUCED.iter().map(|c| self.get(*c)).sum(), 3)
    }

    pub fn used(&self) -> f64 {
        round_to(Channel::USED.iter().map(|c| self.get(*c)).sum(), 3)
    }

    fn add(&mut self, readings: &HourlyReadings) {
        for channel in Channel::ALL {
            let total = self.get_mut(channel);
            *total = round_to(*total + readings.get(channel), 3);
        }
    }
}

/// Persisted state of the hourly accumulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyState {
    #[serde(default)]
    pub totals: Totals,
    #[serde(default, deserialize_with = "lenient_datetime")]
    pub last_processed: Option<DateTime>,
    #[serde(flatten)]
    pub cop: CopValues,
}

impl EnergyState {
    pub fn is_processed(&self, hour_end: DateTime) -> bool {
        self.last_processed == Some(hour_end)
    }

    /// Adds one hour of readings to the totals and replaces the COP values with those of this hour.
    pub fn apply(&self, hour_end: DateTime, readings: &HourlyReadings) -> EnergyState {
        let mut totals = self.totals;
        totals.add(readings);

        EnergyState {
            totals,
            last_processed: Some(hour_end),
            cop: readings.cop(),
        }
    }
}

//an unparsable marker is treated like a missing one, the next tick will then be applied
fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match DateTime::from_iso(&v) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::warn!("Ignoring unparsable last_processed value {}: {:?}", v, e);
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    use super::*;

    fn hour(iso: &str) -> DateTime {
        DateTime::from_iso(iso).unwrap()
    }

    #[test]
    fn test_apply_adds_readings_rounded() {
        let state = EnergyState::default();
        let readings = HourlyReadings {
            produced_heating: 0.1,
            used_heating: 0.2,
            ..Default::default()
        };

        let state = state.apply(hour("2024-01-01T10:00:00Z"), &readings);
        let state = state.apply(hour("2024-01-01T11:00:00Z"), &HourlyReadings {
            produced_heating: 0.2,
            ..readings
        });

        assert_eq!(state.totals.prod_heating_total, 0.3);
        assert_eq!(state.totals.used_heating_total, 0.4);
        assert_eq!(state.last_processed, Some(hour("2024-01-01T11:00:00Z")));
    }

    #[test]
    fn test_apply_replaces_cop_values() {
        let state = EnergyState::default().apply(
            hour("2024-01-01T10:00:00Z"),
            &HourlyReadings {
                produced_hot_water: 3.0,
                used_hot_water: 2.0,
                aux_used_hot_water: 1.0,
                ..Default::default()
            },
        );

        let state = state.apply(hour("2024-01-01T11:00:00Z"), &HourlyReadings::default());

        assert_eq!(state.cop, CopValues::default());
        assert_eq!(state.totals.prod_hot_water_total, 3.0);
    }

    #[test]
    fn test_derived_sums() {
        let totals = Totals {
            prod_cooling_total: 0.1,
            prod_heating_total: 0.2,
            prod_hot_water_total: 0.3,
            used_cooling_total: 1.0,
            used_heating_total: 1.0,
            used_hot_water_total: 1.0,
            aux_used_heating_total: 0.5,
            aux_used_hot_water_total: 0.25,
        };

        assert_eq!(totals.produced(), 0.6);
        assert_eq!(totals.used(), 3.75);
    }

    #[test]
    fn test_serialized_shape() {
        let state = EnergyState {
            totals: Totals {
                prod_heating_total: 12.5,
                ..Default::default()
            },
            last_processed: Some(hour("2024-01-01T10:00:00Z")),
            cop: CopValues {
                overall: 3.1,
                total: 3.1,
                ..Default::default()
            },
        };

        assert_json_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "totals": {
                    "prod_cooling_total": 0.0,
                    "prod_heating_total": 12.5,
                    "prod_hot_water_total": 0.0,
                    "used_cooling_total": 0.0,
                    "used_heating_total": 0.0,
                    "used_hot_water_total": 0.0,
                    "aux_used_heating_total": 0.0,
                    "aux_used_hot_water_total": 0.0
                },
                "last_processed": "2024-01-01T10:00:00+00:00",
                "last_cop": 3.1,
                "last_cop_total": 3.1,
                "last_cop_hot_water": 0.0,
                "last_cop_heating": 0.0,
                "last_cop_cooling": 0.0
            })
        );
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let state: EnergyState = serde_json::from_value(json!({
            "totals": { "used_cooling_total": 4.2 },
            "last_cop_heating": 2.5
        }))
        .unwrap();

        assert_eq!(state.totals.used_cooling_total, 4.2);
        assert_eq!(state.totals.prod_heating_total, 0.0);
        assert_eq!(state.last_processed, None);
        assert_eq!(state.cop.heating, 2.5);
        assert_eq!(state.cop.overall, 0.0);
    }

    #[test]
    fn test_null_and_garbage_last_processed() {
        let null: EnergyState = serde_json::from_value(json!({ "last_processed": null })).unwrap();
        let garbage: EnergyState = serde_json::from_value(json!({ "last_processed": "yesterday" })).unwrap();

        assert_eq!(null.last_processed, None);
        assert_eq!(garbage.last_processed, None);
    }
}
