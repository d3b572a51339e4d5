use std::collections::{BTreeMap, BTreeSet, HashMap};

use derive_more::derive::Display;
use energy::{
    Channel, HourlyReadings, Totals, round_to,
    time::{DateTime, Duration},
};

pub fn short_term_step() -> Duration {
    Duration::minutes(5)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub value: f64,
    pub timestamp: DateTime,
}

impl DataPoint {
    pub fn new(value: f64, timestamp: DateTime) -> Self {
        Self { value, timestamp }
    }
}

/// Cumulative statistics rebuilt from the hourly inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum OutputChannel {
    #[display("aux_heating")]
    AuxHeating,
    #[display("aux_hot_water")]
    AuxHotWater,
    #[display("used_cooling")]
    UsedCooling,
    #[display("used_heating")]
    UsedHeating,
    #[display("used_hot_water")]
    UsedHotWater,
    #[display("used_total")]
    UsedTotal,
    #[display("produced_cooling")]
    ProducedCooling,
    #[display("produced_heating")]
    ProducedHeating,
    #[display("produced_hot_water")]
    ProducedHotWater,
    #[display("produced_total")]
    ProducedTotal,
}

impl OutputChannel {
    pub const ALL: [OutputChannel; 10] = [
        OutputChannel::AuxHeating,
        OutputChannel::AuxHotWater,
        OutputChannel::UsedCooling,
        OutputChannel::UsedHeating,
        OutputChannel::UsedHotWater,
        OutputChannel::UsedTotal,
        OutputChannel::ProducedCooling,
        OutputChannel::ProducedHeating,
        OutputChannel::ProducedHotWater,
        OutputChannel::ProducedTotal,
    ];

    /// Energy of this output within one hour. Consumption by purpose includes the auxiliary heater.
    pub fn hourly(&self, readings: &HourlyReadings) -> f64 {
        match self {
            OutputChannel::AuxHeating => readings.aux_used_heating,
            OutputChannel::AuxHotWater => readings.aux_used_hot_water,
            OutputChannel::UsedCooling => readings.used_cooling,
            OutputChannel::UsedHeating => readings.used_heating_with_aux(),
            OutputChannel::UsedHotWater => readings.used_hot_water_with_aux(),
            OutputChannel::UsedTotal => readings.used(),
            OutputChannel::ProducedCooling => readings.produced_cooling,
            OutputChannel::ProducedHeating => readings.produced_heating,
            OutputChannel::ProducedHotWater => readings.produced_hot_water,
            OutputChannel::ProducedTotal => readings.produced(),
        }
    }
}

/// Hourly samples of all eight inputs, keyed by the start of the hour.
#[derive(Debug, Clone, Default)]
pub struct HistoryInputs {
    series: HashMap<Channel, BTreeMap<DateTime, f64>>,
}

impl HistoryInputs {
    /// Adds the usable samples of one input: negative and non-finite values are dropped.
    pub fn insert(&mut self, channel: Channel, samples: impl IntoIterator<Item = DataPoint>) -> usize {
        let series = self.series.entry(channel).or_default();

        for dp in samples {
            if dp.value.is_finite() && dp.value >= 0.0 {
                series.insert(dp.timestamp, dp.value);
            }
        }

        series.len()
    }

    pub fn timeline(&self) -> Vec<DateTime> {
        let all: BTreeSet<DateTime> = self.series.values().flat_map(|s| s.keys().copied()).collect();
        all.into_iter().collect()
    }

    //missing samples count as zero
    pub fn readings_at(&self, timestamp: DateTime) -> HourlyReadings {
        HourlyReadings::from_fn(|channel| {
            self.series
                .get(&channel)
                .and_then(|s| s.get(&timestamp))
                .copied()
                .unwrap_or(0.0)
        })
    }
}

#[derive(Debug, Clone)]
pub struct OutputHistory {
    pub output: OutputChannel,
    pub hourly: Vec<DataPoint>,
    pub short_term: Vec<DataPoint>,
}

impl OutputHistory {
    pub fn last_value(&self) -> f64 {
        self.hourly.last().map(|dp| dp.value).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct RebuildPlan {
    pub timeline: Vec<DateTime>,
    pub outputs: Vec<OutputHistory>,
    pub totals: Totals,
}

impl RebuildPlan {
    /// Computes all output series. `None` if there is no input sample at all.
    pub fn compute(inputs: &HistoryInputs, short_term_days: u32) -> Option<Self> {
        let timeline = inputs.timeline();
        let (first, last) = (*timeline.first()?, *timeline.last()?);

        let readings: Vec<(DateTime, HourlyReadings)> =
            timeline.iter().map(|ts| (*ts, inputs.readings_at(*ts))).collect();

        let window_start = short_term_window_start(first, last, short_term_days);

        let outputs = OutputChannel::ALL
            .iter()
            .map(|output| {
                let hourly = cumulative(readings.iter().map(|(ts, r)| (*ts, output.hourly(r))));
                let short_term = match window_start {
                    Some(from) => resample(&hourly, from, last, short_term_step()),
                    None => vec![],
                };

                OutputHistory {
                    output: *output,
                    hourly,
                    short_term,
                }
            })
            .collect();

        let mut totals = Totals::default();
        for channel in Channel::ALL {
            let sum = cumulative(readings.iter().map(|(ts, r)| (*ts, r.get(channel))))
                .last()
                .map(|dp| dp.value)
                .unwrap_or(0.0);
            *totals.get_mut(channel) = round_to(sum, 3);
        }

        Some(Self {
            timeline,
            outputs,
            totals,
        })
    }

    pub fn first(&self) -> Option<DateTime> {
        self.timeline.first().copied()
    }

    pub fn last_processed(&self) -> Option<DateTime> {
        self.timeline.last().copied()
    }
}

/// Running sum over hourly values, negative values count as zero.
pub fn cumulative(hourly: impl IntoIterator<Item = (DateTime, f64)>) -> Vec<DataPoint> {
    let mut sum = 0.0;

    hourly
        .into_iter()
        .map(|(ts, value)| {
            sum += value.max(0.0);
            DataPoint::new(sum, ts)
        })
        .collect()
}

fn short_term_window_start(first: DateTime, last: DateTime, days: u32) -> Option<DateTime> {
    if days == 0 {
        return None;
    }

    Some(std::cmp::max(first, last - Duration::days(days as i64)))
}

/// Resamples a cumulative series onto a fixed grid from `from` to `to` (both floored to the step).
/// Each tick carries the last value at or before it; ticks before the first point carry the first value.
pub fn resample(points: &[DataPoint], from: DateTime, to: DateTime, step: Duration) -> Vec<DataPoint> {
    let Some(first) = points.first() else {
        return vec![];
    };

    let mut result = vec![];
    let mut current = first.value;
    let mut idx = 0;
    let mut tick = from.floor_to(step);
    let end = to.floor_to(step);

    while tick <= end {
        while idx < points.len() && points[idx].timestamp <= tick {
            current = points[idx].value;
            idx += 1;
        }

        result.push(DataPoint::new(current, tick));
        tick = tick + step;
    }

    result
}
