use serde::{Deserialize, Serialize};

use crate::{
    channel::{Channel, CopKind},
    unit::Cop,
};

/// Energy in kWh of each channel for a single hour.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourlyReadings {
    pub produced_cooling: f64,
    pub produced_heating: f64,
    pub produced_hot_water: f64,
    pub used_cooling: f64,
    pub used_heating: f64,
    pub used_hot_water: f64,
    pub aux_used_heating: f64,
    pub aux_used_hot_water: f64,
}

impl HourlyReadings {
    pub fn from_fn(mut f: impl FnMut(Channel) -> f64) -> Self {
        let mut readings = Self::default();
        for channel in Channel::ALL {
            *readings.get_mut(channel) = f(channel);
        }
        readings
    }

    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::ProducedCooling => self.produced_cooling,
            Channel::ProducedHeating => self.produced_heating,
            Channel::ProducedHotWater => self.produced_hot_water,
            Channel::UsedCooling => self.used_cooling,
            Channel::UsedHeating => self.used_heating,
            Channel::UsedHotWater => self.used_hot_water,
            Channel::AuxUsedHeating => self.aux_used_heating,
            Channel::AuxUsedHotWater => self.aux_used_hot_water,
        }
    }

    pub fn get_mut(&mut self, channel: Channel) -> &mut f64 {
        match channel {
            Channel::ProducedCooling => &mut self.produced_cooling,
            Channel::ProducedHeating => &mut self.produced_heating,
            Channel::ProducedHotWater => &mut self.produced_hot_water,
            Channel::UsedCooling => &mut self.used_cooling,
            Channel::UsedHeating => &mut self.used_heating,
            Channel::UsedHotWater => &mut self.used_hot_water,
            Channel::AuxUsedHeating => &mut self.aux_used_heating,
            Channel::AuxUsedHotWater => &mut self.aux_used_hot_water,
        }
    }

    pub fn produced(&self) -> f64 {
        self.produced_cooling + self.produced_heating + self.produced_hot_water
    }

    pub fn used(&self) -> f64 {
        self.used_cooling + self.used_heating + self.used_hot_water + self.aux_used_heating + self.aux_used_hot_water
    }

    pub fn used_heating_with_aux(&self) -> f64 {
        self.used_heating + self.aux_used_heating
    }

    pub fn used_hot_water_with_aux(&self) -> f64 {
        self.used_hot_water + self.aux_used_hot_water
    }

    pub fn cop(&self) -> CopValues {
        let overall = Cop::of(self.produced(), self.used()).0;

        CopValues {
            overall,
            total: overall,
            hot_water: Cop::of(self.produced_hot_water, self.used_hot_water_with_aux()).0,
            heating: Cop::of(self.produced_heating, self.used_heating_with_aux()).0,
            cooling: Cop::of(self.produced_cooling, self.used_cooling).0,
        }
    }
}

/// Sanitizes a raw meter value: anything that is not a finite, non-negative number counts as zero.
pub fn sanitize(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() && v >= 0.0 => v,
        _ => 0.0,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CopValues {
    #[serde(rename = "last_cop")]
    pub overall: f64,
    #[serde(rename = "last_cop_total")]
    pub total: f64,
    #[serde(rename = "last_cop_hot_water")]
    pub hot_water: f64,
    #[serde(rename = "last_cop_heating")]
    pub heating: f64,
    #[serde(rename = "last_cop_cooling")]
    pub cooling: f64,
}

impl CopValues {
    pub fn get(&self, kind: CopKind) -> f64 {
        match kind {
            CopKind::Overall => self.overall,
            CopKind::Total => self.total,
            CopKind::HotWater => self.hot_water,
            CopKind::Heating => self.heating,
            CopKind::Cooling => self.cooling,
        }
    }
}

impl std::fmt::Display for CopValues {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "overall={:.2} hot_water={:.2} heating={:.2} cooling={:.2}",
            self.overall, self.hot_water, self.heating, self.cooling
        )
    }
}
