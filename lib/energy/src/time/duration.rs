use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    delegate: chrono::TimeDelta,
}

impl Duration {
    pub fn new(delegate: chrono::TimeDelta) -> Self {
        Self { delegate }
    }

    pub fn minutes(minutes: i64) -> Self {
        Self::new(chrono::TimeDelta::minutes(minutes))
    }

    pub fn hours(hours: i64) -> Self {
        Self::new(chrono::TimeDelta::hours(hours))
    }

    pub fn days(days: i64) -> Self {
        Self::new(chrono::TimeDelta::days(days))
    }

    //negative durations are clamped to zero
    pub fn as_std(&self) -> std::time::Duration {
        self.delegate.to_std().unwrap_or(std::time::Duration::ZERO)
    }

    pub(super) fn delegate(&self) -> chrono::TimeDelta {
        self.delegate
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}s", self.delegate.num_seconds())
    }
}
