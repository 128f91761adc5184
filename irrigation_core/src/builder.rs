//! Builder for `SessionController`.
//!
//! The gateway is mandatory; everything else has a default. Configuration is
//! validated on `build()`.

use std::sync::Arc;
use std::time::Duration;

use irrigation_traits::IrrigationRecord;
use irrigation_traits::clock::{Clock, MonotonicClock};

use crate::config::ControllerCfg;
use crate::controller::SessionController;
use crate::error::{IrrigationError, Result};
use crate::gateway::GatewayDispatcher;
use crate::history::HistoryLog;
use crate::progress::Progress;
use crate::session::IrrigationSession;

/// Longest accepted tick cadence; matches `controller.tick_ms` validation.
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Default)]
pub struct SessionControllerBuilder {
    cfg: Option<ControllerCfg>,
    flow_rate_lps: Option<f64>,
    max_volume_l: Option<f64>,
    tick_interval: Option<Duration>,
    clock: Option<Arc<dyn Clock + Send + Sync>>,
    gateway: Option<GatewayDispatcher>,
    history: Vec<IrrigationRecord>,
}

impl SessionControllerBuilder {
    pub fn with_config(mut self, cfg: ControllerCfg) -> Self {
        self.cfg = Some(cfg);
        self
    }

    /// Overrides the flow rate from `with_config`.
    pub fn with_flow_rate(mut self, lps: f64) -> Self {
        self.flow_rate_lps = Some(lps);
        self
    }

    pub fn with_max_volume(mut self, liters: f64) -> Self {
        self.max_volume_l = Some(liters);
        self
    }

    pub fn with_tick_interval(mut self, d: Duration) -> Self {
        self.tick_interval = Some(d);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + Send + Sync + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn with_gateway<G: irrigation_traits::ActuatorGateway + Send + 'static>(
        mut self,
        gateway: G,
    ) -> Self {
        self.gateway = Some(GatewayDispatcher::spawn(gateway));
        self
    }

    /// Initial history, newest first.
    pub fn with_history(mut self, records: Vec<IrrigationRecord>) -> Self {
        self.history = records;
        self
    }

    pub fn build(self) -> Result<SessionController> {
        let mut cfg = self.cfg.unwrap_or_default();
        if let Some(v) = self.flow_rate_lps {
            cfg.flow_rate_lps = v;
        }
        if let Some(v) = self.max_volume_l {
            cfg.max_volume_l = v;
        }
        if let Some(v) = self.tick_interval {
            cfg.tick_interval = v;
        }

        if !(cfg.flow_rate_lps.is_finite() && cfg.flow_rate_lps > 0.0) {
            return Err(config_err("flow_rate_lps must be > 0"));
        }
        if !(cfg.max_volume_l.is_finite() && cfg.max_volume_l > 0.0) {
            return Err(config_err("max_volume_l must be > 0"));
        }
        if cfg.tick_interval.is_zero() {
            return Err(config_err("tick_interval must be > 0"));
        }
        if cfg.tick_interval > MAX_TICK_INTERVAL {
            return Err(config_err("tick_interval must be <= 60s"));
        }
        let gateway = self
            .gateway
            .ok_or_else(|| config_err("missing actuator gateway"))?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(MonotonicClock::new()));

        Ok(SessionController {
            cfg,
            clock,
            gateway,
            session: IrrigationSession::idle(),
            history: HistoryLog::from_records(self.history),
            timer: None,
            generation: 0,
            last_progress: Progress::IDLE,
        })
    }
}

fn config_err(msg: &str) -> eyre::Report {
    eyre::Report::new(IrrigationError::Config(msg.to_string()))
}
