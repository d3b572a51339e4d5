use energy::time::{DateTime, Duration};

/// Hourly trigger at a fixed minute past the full hour.
#[derive(Debug, Clone, Copy)]
pub struct HourlySchedule {
    minute: i64,
}

impl HourlySchedule {
    pub fn new(minute: u32) -> Self {
        Self { minute: minute as i64 }
    }

    pub fn next_run_after(&self, now: DateTime) -> DateTime {
        let candidate = now.hour_end() + Duration::minutes(self.minute);

        if candidate > now {
            candidate
        } else {
            candidate + Duration::hours(1)
        }
    }

    //a restart after the trigger minute must not skip the current hour
    pub fn is_due_on_start(&self, now: DateTime) -> bool {
        now.elapsed_since(now.hour_end()) >= Duration::minutes(self.minute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(iso: &str) -> DateTime {
        DateTime::from_iso(iso).unwrap()
    }

    #[test]
    fn test_next_run_later_in_same_hour() {
        let schedule = HourlySchedule::new(15);

        assert_eq!(
            schedule.next_run_after(at("2024-03-01T10:05:00Z")),
            at("2024-03-01T10:15:00Z")
        );
    }

    #[test]
    fn test_next_run_in_next_hour() {
        let schedule = HourlySchedule::new(15);

        assert_eq!(
            schedule.next_run_after(at("2024-03-01T10:15:00Z")),
            at("2024-03-01T11:15:00Z")
        );
        assert_eq!(
            schedule.next_run_after(at("2024-03-01T23:40:00Z")),
            at("2024-03-02T00:15:00Z")
        );
    }

    #[test]
    fn test_due_on_start() {
        let schedule = HourlySchedule::new(15);

        assert!(!schedule.is_due_on_start(at("2024-03-01T10:14:59Z")));
        assert!(schedule.is_due_on_start(at("2024-03-01T10:15:00Z")));
        assert!(schedule.is_due_on_start(at("2024-03-01T10:59:00Z")));
        assert!(HourlySchedule::new(0).is_due_on_start(at("2024-03-01T10:00:00Z")));
    }
}
