//! `From` implementations bridging `irrigation_config` types to `irrigation_core` types.

use crate::config::{ControllerCfg, RecommendationCfg};
use std::time::Duration;

// ── ControllerCfg ────────────────────────────────────────────────────────────

impl From<&irrigation_config::ControllerCfg> for ControllerCfg {
    fn from(c: &irrigation_config::ControllerCfg) -> Self {
        Self {
            flow_rate_lps: c.flow_rate_lps,
            max_volume_l: c.max_volume_l,
            tick_interval: Duration::from_millis(c.tick_ms),
        }
    }
}

// ── RecommendationCfg ────────────────────────────────────────────────────────

impl From<&irrigation_config::RecommendationCfg> for RecommendationCfg {
    fn from(c: &irrigation_config::RecommendationCfg) -> Self {
        Self {
            fallback_volume_l: c.fallback_volume_l,
            timeout: Duration::from_millis(c.timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_cfg_maps_tick_ms() {
        let src = irrigation_config::ControllerCfg {
            flow_rate_lps: 1.5,
            max_volume_l: 40.0,
            tick_ms: 250,
        };
        let core: ControllerCfg = (&src).into();
        assert_eq!(core.tick_interval, Duration::from_millis(250));
        assert_eq!(core.flow_rate_lps, 1.5);
        assert_eq!(core.max_volume_l, 40.0);
    }

    #[test]
    fn defaults_agree_with_config_crate() {
        let from_cfg: ControllerCfg = (&irrigation_config::ControllerCfg::default()).into();
        assert_eq!(from_cfg, ControllerCfg::default());
        let rec: RecommendationCfg = (&irrigation_config::RecommendationCfg::default()).into();
        assert_eq!(rec, RecommendationCfg::default());
    }
}
