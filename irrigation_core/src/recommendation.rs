//! One-shot capture of the recommendation frozen into a session.
//!
//! The source is queried on a helper thread and the caller waits at most
//! `timeout`; a failure, a timeout, or a nonsensical value all degrade to the
//! configured fallback volume with a warning. Capture never fails.
use crossbeam_channel as xch;
use irrigation_traits::{Recommendation, RecommendationSource, SensorSnapshot, SensorSource};
use std::sync::Arc;

use crate::config::RecommendationCfg;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecommendationOrigin {
    Remote,
    Fallback,
    /// Supplied by the operator; the source was not asked.
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRecommendation {
    pub recommendation: Recommendation,
    pub origin: RecommendationOrigin,
    /// Why the fallback was used, when it was.
    pub warning: Option<String>,
}

impl CapturedRecommendation {
    pub fn predicted_volume_l(&self) -> f64 {
        self.recommendation.predicted_volume_l
    }

    pub fn is_fallback(&self) -> bool {
        self.origin == RecommendationOrigin::Fallback
    }

    pub fn manual(predicted_volume_l: f64) -> Self {
        Self {
            recommendation: Recommendation {
                predicted_volume_l,
                rainfall_forecast_mm: 0.0,
                decision: format!("Operator supplied: {predicted_volume_l:.2} liters"),
            },
            origin: RecommendationOrigin::Manual,
            warning: None,
        }
    }

    fn fallback(cfg: &RecommendationCfg, warning: String) -> Self {
        tracing::warn!(
            fallback_l = cfg.fallback_volume_l,
            reason = %warning,
            "recommendation unavailable; using fallback"
        );
        Self {
            recommendation: Recommendation {
                predicted_volume_l: cfg.fallback_volume_l,
                rainfall_forecast_mm: 0.0,
                decision: format!(
                    "Recommendation unavailable; assuming {:.2} liters",
                    cfg.fallback_volume_l
                ),
            },
            origin: RecommendationOrigin::Fallback,
            warning: Some(warning),
        }
    }
}

pub fn capture<R>(
    source: Arc<R>,
    snapshot: SensorSnapshot,
    cfg: &RecommendationCfg,
) -> CapturedRecommendation
where
    R: RecommendationSource + Send + Sync + ?Sized + 'static,
{
    let (tx, rx) = xch::bounded(1);
    let spawned = std::thread::Builder::new()
        .name("recommendation".into())
        .spawn(move || {
            let res = source.request(&snapshot).map_err(|e| e.to_string());
            // Receiver may have timed out already; nothing to do then.
            let _ = tx.send(res);
        });
    if let Err(e) = spawned {
        return CapturedRecommendation::fallback(cfg, format!("spawn failed: {e}"));
    }

    match rx.recv_timeout(cfg.timeout) {
        Ok(Ok(rec)) => {
            if !(rec.predicted_volume_l.is_finite() && rec.predicted_volume_l >= 0.0) {
                return CapturedRecommendation::fallback(
                    cfg,
                    format!("invalid predicted volume {}", rec.predicted_volume_l),
                );
            }
            tracing::info!(
                predicted_l = rec.predicted_volume_l,
                rainfall_mm = rec.rainfall_forecast_mm,
                "recommendation captured"
            );
            CapturedRecommendation {
                recommendation: rec,
                origin: RecommendationOrigin::Remote,
                warning: None,
            }
        }
        Ok(Err(e)) => CapturedRecommendation::fallback(cfg, e),
        Err(xch::RecvTimeoutError::Timeout) => CapturedRecommendation::fallback(
            cfg,
            format!("timed out after {} ms", cfg.timeout.as_millis()),
        ),
        Err(xch::RecvTimeoutError::Disconnected) => {
            CapturedRecommendation::fallback(cfg, "recommendation worker exited".into())
        }
    }
}

/// Latest sensor readings, or the default snapshot when the feed fails.
pub fn read_snapshot<S: SensorSource + ?Sized>(source: &S) -> SensorSnapshot {
    match source.snapshot() {
        Ok(s) => s,
        Err(e) => {
            let fallback = SensorSnapshot::default();
            tracing::warn!(
                error = %e,
                soil_moisture = fallback.soil_moisture,
                temperature = fallback.temperature,
                "sensor data unavailable; using defaults"
            );
            fallback
        }
    }
}
