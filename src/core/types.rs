use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Handle to a container registered with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(pub(crate) usize);

/// Handle to a spawned process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub(crate) usize);

/// A point on the simulated timeline, measured in hours.
///
/// Processing durations are drawn from continuous distributions, so the
/// timeline is continuous rather than cycle-counted. Ordering is total
/// (`f64::total_cmp`), which lets wakeups live in a heap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    pub fn hours(hours: f64) -> Self {
        SimTime(hours)
    }

    pub fn as_hours(&self) -> f64 {
        self.0
    }

    /// The instant `hours` after this one.
    pub fn after(&self, hours: f64) -> SimTime {
        SimTime(self.0 + hours)
    }

    /// Split into working-day and hour-of-day for human-readable logs.
    pub fn clock(&self, hours_per_day: f64) -> WorkdayClock {
        WorkdayClock {
            day: (self.0 / hours_per_day) as u64,
            hour: self.0 % hours_per_day,
        }
    }
}

impl PartialEq for SimTime {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for SimTime {}

impl PartialOrd for SimTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}h", self.0)
    }
}

/// A simulated instant rendered as `day D, hour H`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkdayClock {
    pub day: u64,
    pub hour: f64,
}

impl fmt::Display for WorkdayClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "day {}, hour {:.1}", self.day, self.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_ordering() {
        let early = SimTime::hours(1.5);
        let late = SimTime::hours(2.0);
        assert!(early < late);
        assert_eq!(early, SimTime::hours(1.5));
        assert_eq!(early.after(0.5), late);
    }

    #[test]
    fn test_workday_clock() {
        let t = SimTime::hours(20.5);
        let clock = t.clock(8.0);
        assert_eq!(clock.day, 2);
        assert!((clock.hour - 4.5).abs() < 1e-9);
        assert_eq!(clock.to_string(), "day 2, hour 4.5");
    }
}
