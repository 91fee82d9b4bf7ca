//! Progress report throttling
//!
//! A stream only reaches its handler when the value moved by at least the
//! configured step, when it hits 100, or when the heartbeat interval passed
//! since the last report. Suppressed updates leave the state untouched.

use std::time::{Duration, Instant};

use pkgbridge_config::ThrottleConfig;

/// Reporting thresholds shared by every throttled stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    pub step: i64,
    pub heartbeat: Duration,
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            step: 5,
            heartbeat: Duration::from_secs(3),
        }
    }
}

impl From<&ThrottleConfig> for ThrottlePolicy {
    fn from(config: &ThrottleConfig) -> Self {
        Self {
            step: i64::from(config.step_percent),
            heartbeat: config.heartbeat(),
        }
    }
}

/// Throttle state of one progress stream
#[derive(Debug, Clone)]
pub struct ProgressThrottle {
    policy: ThrottlePolicy,
    last_value: i64,
    last_time: Instant,
}

impl ProgressThrottle {
    /// Start a stream now, at value 0.
    #[must_use]
    pub fn start(policy: ThrottlePolicy) -> Self {
        Self::start_at(policy, Instant::now())
    }

    #[must_use]
    pub fn start_at(policy: ThrottlePolicy, now: Instant) -> Self {
        Self {
            policy,
            last_value: 0,
            last_time: now,
        }
    }

    #[must_use]
    pub fn policy(&self) -> ThrottlePolicy {
        self.policy
    }

    #[must_use]
    pub fn last_value(&self) -> i64 {
        self.last_value
    }

    pub fn should_report(&mut self, value: i64) -> bool {
        self.should_report_at(value, Instant::now())
    }

    /// Decide whether `value`, observed at `now`, is reported; records it if so.
    pub fn should_report_at(&mut self, value: i64, now: Instant) -> bool {
        let due = (value - self.last_value).abs() >= self.policy.step
            || value == 100
            || now.saturating_duration_since(self.last_time) >= self.policy.heartbeat;

        if due {
            self.last_value = value;
            self.last_time = now;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_stream_without_time_passing() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::start_at(ThrottlePolicy::default(), start);
        let reported: Vec<i64> = (0..=100)
            .filter(|value| throttle.should_report_at(*value, start))
            .collect();

        // 5, 10, ..., 95 by step and 100 as completion
        assert_eq!(reported.len(), 20);
        assert_eq!(reported.first(), Some(&5));
        assert_eq!(reported.last(), Some(&100));
    }

    #[test]
    fn large_first_jump_is_reported() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::start_at(ThrottlePolicy::default(), start);
        assert!(throttle.should_report_at(42, start));
        assert_eq!(throttle.last_value(), 42);
    }

    #[test]
    fn heartbeat_forces_report() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::start_at(ThrottlePolicy::default(), start);
        assert!(!throttle.should_report_at(1, start + Duration::from_secs(2)));
        assert!(throttle.should_report_at(2, start + Duration::from_secs(3)));
        assert!(!throttle.should_report_at(3, start + Duration::from_secs(4)));
    }

    #[test]
    fn suppressed_update_keeps_state() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::start_at(ThrottlePolicy::default(), start);
        assert!(!throttle.should_report_at(3, start));
        assert_eq!(throttle.last_value(), 0);
        assert!(throttle.should_report_at(5, start));
    }

    #[test]
    fn repeated_completion_is_reported() {
        let start = Instant::now();
        let mut throttle = ProgressThrottle::start_at(ThrottlePolicy::default(), start);
        assert!(throttle.should_report_at(100, start));
        assert!(throttle.should_report_at(100, start));
    }
}
