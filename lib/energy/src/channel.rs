use derive_more::derive::Display;

/// One of the eight energy meters of the heat pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Channel {
    #[display("produced_cooling")]
    ProducedCooling,
    #[display("produced_heating")]
    ProducedHeating,
    #[display("produced_hot_water")]
    ProducedHotWater,
    #[display("used_cooling")]
    UsedCooling,
    #[display("used_heating")]
    UsedHeating,
    #[display("used_hot_water")]
    UsedHotWater,
    #[display("aux_used_heating")]
    AuxUsedHeating,
    #[display("aux_used_hot_water")]
    AuxUsedHotWater,
}

impl Channel {
    pub const ALL: [Channel; 8] = [
        Channel::ProducedCooling,
        Channel::ProducedHeating,
        Channel::ProducedHotWater,
        Channel::UsedCooling,
        Channel::UsedHeating,
        Channel::UsedHotWater,
        Channel::AuxUsedHeating,
        Channel::AuxUsedHotWater,
    ];

    pub const PRODUCED: [Channel; 3] = [
        Channel::ProducedCooling,
        Channel::ProducedHeating,
        Channel::ProducedHotWater,
    ];

    pub const USED: [Channel; 5] = [
        Channel::UsedCooling,
        Channel::UsedHeating,
        Channel::UsedHotWater,
        Channel::AuxUsedHeating,
        Channel::AuxUsedHotWater,
    ];

    /// Key of the running total inside the persisted `totals` object.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Channel::ProducedCooling => "prod_cooling_total",
            Channel::ProducedHeating => "prod_heating_total",
            Channel::ProducedHotWater => "prod_hot_water_total",
            Channel::UsedCooling => "used_cooling_total",
            Channel::UsedHeating => "used_heating_total",
            Channel::UsedHotWater => "used_hot_water_total",
            Channel::AuxUsedHeating => "aux_used_heating_total",
            Channel::AuxUsedHotWater => "aux_used_hot_water_total",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CopKind {
    #[display("overall")]
    Overall,
    #[display("total")]
    Total,
    #[display("hot_water")]
    HotWater,
    #[display("heating")]
    Heating,
    #[display("cooling")]
    Cooling,
}

impl CopKind {
    pub const ALL: [CopKind; 5] = [
        CopKind::Overall,
        CopKind::Total,
        CopKind::HotWater,
        CopKind::Heating,
        CopKind::Cooling,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CopKind::Overall => "cop_last_hour",
            CopKind::Total => "cop_total",
            CopKind::HotWater => "cop_hot_water",
            CopKind::Heating => "cop_heating",
            CopKind::Cooling => "cop_cooling",
        }
    }
}
