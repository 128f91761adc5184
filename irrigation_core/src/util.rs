//! Volume and duration helpers.

use std::time::Duration;

/// Round a volume to the nearest 0.1 liter.
#[inline]
pub fn round_to_tenth(liters: f64) -> f64 {
    (liters * 10.0).round() / 10.0
}

/// Time needed to dispense `target_l` at `flow_rate_lps`.
/// - Non-positive or non-finite targets take no time.
/// - Saturates at `Duration::MAX` instead of panicking on huge ratios.
#[inline]
pub fn duration_for_volume(target_l: f64, flow_rate_lps: f64) -> Duration {
    if !(target_l.is_finite() && target_l > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(target_l / flow_rate_lps).unwrap_or(Duration::MAX)
}
