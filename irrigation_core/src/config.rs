//! Runtime configuration of the session controller.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerCfg {
    /// Pump flow rate, liters per second. Must be > 0.
    pub flow_rate_lps: f64,
    /// Upper bound for a session target, liters.
    pub max_volume_l: f64,
    /// Cadence of progress ticks while running.
    pub tick_interval: Duration,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            flow_rate_lps: 0.67,
            max_volume_l: 80.0,
            tick_interval: Duration::from_secs(1),
        }
    }
}

/// How recommendations are captured before a session starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationCfg {
    pub fallback_volume_l: f64,
    pub timeout: Duration,
}

impl Default for RecommendationCfg {
    fn default() -> Self {
        Self {
            fallback_volume_l: 10.05,
            timeout: Duration::from_secs(5),
        }
    }
}
