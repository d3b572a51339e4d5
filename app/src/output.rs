use energy::{Channel, CopKind, EnergyState};

/// A display value derived from the energy state, published as its own entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputSensor {
    Total(Channel),
    ProducedTotal,
    UsedTotal,
    Cop(CopKind),
}

pub const ENERGY_UNIT: &str = "kWh";
pub const COP_UNIT: &str = "COP";
const COP_ICON: &str = "mdi:alpha-c-circle";

impl OutputSensor {
    pub fn all() -> Vec<OutputSensor> {
        Channel::ALL
            .into_iter()
            .map(OutputSensor::Total)
            .chain([OutputSensor::ProducedTotal, OutputSensor::UsedTotal])
            .chain(CopKind::ALL.into_iter().map(OutputSensor::Cop))
            .collect()
    }

    pub fn object_id(&self) -> &'static str {
        match self {
            OutputSensor::Total(channel) => channel.storage_key(),
            OutputSensor::ProducedTotal => "sum_produced",
            OutputSensor::UsedTotal => "sum_used",
            OutputSensor::Cop(kind) => kind.key(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputSensor::Total(Channel::ProducedCooling) => "Produced cooling (kWh)",
            OutputSensor::Total(Channel::ProducedHeating) => "Produced heating (kWh)",
            OutputSensor::Total(Channel::ProducedHotWater) => "Produced hot water (kWh)",
            OutputSensor::Total(Channel::UsedCooling) => "Used cooling (kWh)",
            OutputSensor::Total(Channel::UsedHeating) => "Used heating (kWh)",
            OutputSensor::Total(Channel::UsedHotWater) => "Used hot water (kWh)",
            OutputSensor::Total(Channel::AuxUsedHeating) => "Auxiliary heating (kWh)",
            OutputSensor::Total(Channel::AuxUsedHotWater) => "Auxiliary hot water (kWh)",
            OutputSensor::ProducedTotal => "Produced total (kWh)",
            OutputSensor::UsedTotal => "Used total (kWh)",
            OutputSensor::Cop(CopKind::Overall) => "COP (last hour)",
            OutputSensor::Cop(CopKind::Total) => "COP total (last hour)",
            OutputSensor::Cop(CopKind::HotWater) => "COP hot water (last hour)",
            OutputSensor::Cop(CopKind::Heating) => "COP heating (last hour)",
            OutputSensor::Cop(CopKind::Cooling) => "COP cooling (last hour)",
        }
    }

    pub fn value(&self, state: &EnergyState) -> f64 {
        match self {
            OutputSensor::Total(channel) => state.totals.get(*channel),
            OutputSensor::ProducedTotal => state.totals.produced(),
            OutputSensor::UsedTotal => state.totals.used(),
            OutputSensor::Cop(kind) => state.cop.get(*kind),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            OutputSensor::Cop(_) => COP_UNIT,
            _ => ENERGY_UNIT,
        }
    }

    pub fn device_class(&self) -> Option<&'static str> {
        match self {
            OutputSensor::Cop(_) => None,
            _ => Some("energy"),
        }
    }

    pub fn state_class(&self) -> &'static str {
        match self {
            OutputSensor::Cop(_) => "measurement",
            _ => "total_increasing",
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            OutputSensor::Cop(_) => Some(COP_ICON),
            _ => None,
        }
    }
}
