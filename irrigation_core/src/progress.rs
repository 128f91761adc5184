//! Progress of a dispensing run derived purely from elapsed time.

use std::time::Duration;

/// Percent complete and time remaining for a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// In `[0, 100]`.
    pub percent: f64,
    pub remaining: Duration,
}

impl Progress {
    /// Nothing dispensed, nothing scheduled.
    pub const IDLE: Progress = Progress {
        percent: 0.0,
        remaining: Duration::ZERO,
    };

    pub const DONE: Progress = Progress {
        percent: 100.0,
        remaining: Duration::ZERO,
    };

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }

    #[inline]
    pub fn remaining_secs(&self) -> f64 {
        self.remaining.as_secs_f64()
    }
}

/// Map elapsed time onto a run of `total` length.
///
/// A zero-length run is complete immediately.
pub fn progress(elapsed: Duration, total: Duration) -> Progress {
    if total.is_zero() {
        return Progress::DONE;
    }
    let percent = (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).min(100.0);
    Progress {
        percent,
        remaining: total.saturating_sub(elapsed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn zero_total_is_done() {
        assert_eq!(progress(Duration::ZERO, Duration::ZERO), Progress::DONE);
        assert_eq!(progress(Duration::from_secs(5), Duration::ZERO), Progress::DONE);
    }

    #[rstest]
    #[case(0.0, 10.0, 0.0, 10.0)]
    #[case(2.5, 10.0, 25.0, 7.5)]
    #[case(10.0, 10.0, 100.0, 0.0)]
    #[case(15.0, 10.0, 100.0, 0.0)]
    fn linear_then_clamped(
        #[case] elapsed: f64,
        #[case] total: f64,
        #[case] percent: f64,
        #[case] remaining: f64,
    ) {
        let p = progress(
            Duration::from_secs_f64(elapsed),
            Duration::from_secs_f64(total),
        );
        assert!((p.percent - percent).abs() < 1e-9, "percent {}", p.percent);
        assert!((p.remaining_secs() - remaining).abs() < 1e-9);
    }

    #[test]
    fn thirty_liters_halfway() {
        let total = crate::util::duration_for_volume(30.0, 0.67);
        let p = progress(Duration::from_secs_f64(22.39), total);
        assert!((p.percent - 50.0).abs() < 0.01);
        assert!((p.remaining_secs() - 22.39).abs() < 0.01);
        assert!(!p.is_complete());
    }
}
