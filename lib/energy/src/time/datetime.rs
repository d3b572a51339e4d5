use std::{
    fmt::Display,
    ops::{Add, Sub},
};

use chrono::{DurationRound as _, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tokio::task_local;

use super::Duration;

task_local! {
    pub static FIXED_NOW: DateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    delegate: chrono::DateTime<Utc>,
}

impl DateTime {
    pub fn now() -> Self {
        FIXED_NOW.try_with(|t| *t).unwrap_or_else(|_| Utc::now().into())
    }

    pub fn from_iso(iso8601: &str) -> anyhow::Result<Self> {
        Ok(chrono::DateTime::parse_from_rfc3339(iso8601)?.into())
    }

    //explicit +00:00 offset, the format Home Assistant writes into its storage files
    pub fn to_iso_string(&self) -> String {
        self.delegate.to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    pub fn to_local_iso_string(&self) -> String {
        self.delegate
            .with_timezone(&chrono::Local)
            .to_rfc3339_opts(SecondsFormat::Secs, false)
    }

    pub fn from_timestamp_secs(secs: f64) -> Option<Self> {
        if !secs.is_finite() {
            return None;
        }

        chrono::DateTime::from_timestamp_millis((secs * 1000.0).round() as i64).map(Into::into)
    }

    pub fn timestamp_secs(&self) -> f64 {
        self.delegate.timestamp_millis() as f64 / 1000.0
    }

    pub fn hour_end(&self) -> Self {
        self.floor_to(Duration::hours(1))
    }

    pub fn floor_to(&self, step: Duration) -> Self {
        //fails only for steps exceeding the distance to the epoch
        match self.delegate.duration_trunc(step.delegate()) {
            Ok(dt) => dt.into(),
            Err(_) => *self,
        }
    }

    pub fn elapsed_since(&self, since: Self) -> Duration {
        Duration::new(self.delegate - since.delegate)
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_iso_string())
    }
}

impl Add<Duration> for DateTime {
    type Output = DateTime;

    fn add(self, rhs: Duration) -> Self::Output {
        Self {
            delegate: self.delegate + rhs.delegate(),
        }
    }
}

impl Sub<Duration> for DateTime {
    type Output = DateTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        Self {
            delegate: self.delegate - rhs.delegate(),
        }
    }
}

impl<T: chrono::TimeZone> From<chrono::DateTime<T>> for DateTime {
    fn from(val: chrono::DateTime<T>) -> Self {
        Self {
            delegate: val.with_timezone(&Utc),
        }
    }
}

impl Serialize for DateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso_string())
    }
}

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        DateTime::from_iso(&value).map_err(serde::de::Error::custom)
    }
}
