//! The session state machine (`SessionController`).
//!
//! ```text
//! Idle ──start──▶ Running ──tick reaches 100%──▶ Completed ──reset──▶ Idle
//!                    │
//!                    └──────stop──────▶ Stopped ──reset──▶ Idle
//! ```
//!
//! The controller never waits: `start` schedules a tick by returning a
//! `TickHandle`, and whoever owns the timer delivers it back through `tick`.
//! Only the most recently issued handle is live; any other handle is stale.

use std::sync::Arc;
use std::time::Instant;

use irrigation_traits::IrrigationRecord;
use irrigation_traits::clock::Clock;

use crate::config::ControllerCfg;
use crate::error::{IrrigationError, Result, StartRejection};
use crate::gateway::{GatewayDispatcher, PumpCommand};
use crate::history::HistoryLog;
use crate::progress::{Progress, progress};
use crate::session::{IrrigationSession, SessionSnapshot, SessionStatus, TickHandle};
use crate::status::{StopOutcome, TickStatus};
use crate::util::{duration_for_volume, round_to_tenth};

pub struct SessionController {
    pub(crate) cfg: ControllerCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) gateway: GatewayDispatcher,
    pub(crate) session: IrrigationSession,
    pub(crate) history: HistoryLog,
    pub(crate) timer: Option<TickHandle>,
    pub(crate) generation: u64,
    pub(crate) last_progress: Progress,
}

impl core::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionController")
            .field("status", &self.session.status)
            .field("target_l", &self.session.target_volume_l)
            .field("percent", &self.last_progress.percent)
            .field("history_len", &self.history.len())
            .finish()
    }
}

impl SessionController {
    pub fn builder() -> crate::builder::SessionControllerBuilder {
        crate::builder::SessionControllerBuilder::default()
    }

    /// Begin a run from Idle.
    ///
    /// Rejected (nothing changes) when not Idle or when the target is outside
    /// `[0, max_volume_l]`. The predicted volume is frozen for the whole run.
    pub fn start(&mut self, target_volume_l: f64, predicted_volume_l: f64) -> Result<TickHandle> {
        if let Err(rejection) = self.check_start(target_volume_l, predicted_volume_l) {
            tracing::warn!(
                target_l = target_volume_l,
                status = %self.session.status,
                reason = %rejection,
                "start rejected"
            );
            return Err(eyre::Report::new(IrrigationError::from(rejection)));
        }

        let now = self.clock.now();
        let total = duration_for_volume(target_volume_l, self.cfg.flow_rate_lps);
        self.session = IrrigationSession {
            status: SessionStatus::Running,
            target_volume_l,
            predicted_volume_l,
            started_at: Some(now),
            total,
        };
        self.last_progress = progress(std::time::Duration::ZERO, total);

        let first = self.schedule(now, self.last_progress);
        self.gateway.notify(PumpCommand::Start {
            volume_l: target_volume_l,
            predicted_l: predicted_volume_l,
        });
        tracing::info!(
            target_l = target_volume_l,
            predicted_l = predicted_volume_l,
            total_s = total.as_secs_f64(),
            "irrigation start"
        );
        Ok(first)
    }

    fn check_start(
        &self,
        target_volume_l: f64,
        predicted_volume_l: f64,
    ) -> core::result::Result<(), StartRejection> {
        match self.session.status {
            SessionStatus::Idle => {}
            SessionStatus::Running => return Err(StartRejection::AlreadyRunning),
            other => return Err(StartRejection::NotIdle(other)),
        }
        if !(target_volume_l.is_finite()
            && (0.0..=self.cfg.max_volume_l).contains(&target_volume_l))
        {
            return Err(StartRejection::TargetOutOfRange {
                target_l: target_volume_l,
                max_l: self.cfg.max_volume_l,
            });
        }
        if !(predicted_volume_l.is_finite() && predicted_volume_l >= 0.0) {
            return Err(StartRejection::InvalidPrediction(predicted_volume_l));
        }
        Ok(())
    }

    /// Issue the next live handle. The final tick lands exactly on the end of
    /// the run instead of overshooting by up to one cadence.
    fn schedule(&mut self, now: Instant, current: Progress) -> TickHandle {
        self.generation = self.generation.wrapping_add(1);
        let delay = self.cfg.tick_interval.min(current.remaining);
        let handle = TickHandle {
            generation: self.generation,
            due: now + delay,
        };
        self.timer = Some(handle);
        handle
    }

    /// Deliver a scheduled tick.
    ///
    /// Re-reads the authoritative status and live handle first; a tick that
    /// outlived its session (or was superseded) changes nothing.
    pub fn tick(&mut self, handle: TickHandle, now: Instant) -> TickStatus {
        let live = self.timer.is_some_and(|t| t.generation == handle.generation);
        if self.session.status != SessionStatus::Running || !live {
            tracing::debug!(
                generation = handle.generation,
                status = %self.session.status,
                "stale tick ignored"
            );
            return TickStatus::StaleIgnored;
        }
        let Some(started_at) = self.session.started_at else {
            return TickStatus::StaleIgnored;
        };

        let elapsed = now.saturating_duration_since(started_at);
        let p = progress(elapsed, self.session.total);
        self.last_progress = p;
        tracing::trace!(percent = p.percent, remaining_s = p.remaining_secs(), "tick");

        if p.is_complete() {
            TickStatus::Completed(self.complete())
        } else {
            let next = self.schedule(now, p);
            TickStatus::Running { progress: p, next }
        }
    }

    /// Normal end of a run: record the full target.
    fn complete(&mut self) -> IrrigationRecord {
        let target = self.session.target_volume_l;
        let record = IrrigationRecord::new(
            self.clock.today(),
            target,
            self.session.predicted_volume_l,
        );
        self.session.status = SessionStatus::Completed;
        self.session.started_at = None;
        self.timer = None;
        self.last_progress = Progress::DONE;
        self.history.prepend(record.clone());
        self.gateway.notify(PumpCommand::Stop {
            dispensed_l: target,
        });
        tracing::info!(dispensed_l = target, "irrigation complete");
        record
    }

    /// Stop a running session early and reconcile the dispensed volume.
    ///
    /// No-op (returns `None`) unless Running. The live tick is cancelled before
    /// anything else, so no tick can act after this returns.
    pub fn stop(&mut self) -> Option<StopOutcome> {
        if self.session.status != SessionStatus::Running {
            tracing::debug!(status = %self.session.status, "stop ignored");
            return None;
        }
        self.timer = None;

        let now = self.clock.now();
        let elapsed = self
            .session
            .started_at
            .map_or(std::time::Duration::ZERO, |t| now.saturating_duration_since(t));
        let p = progress(elapsed, self.session.total);
        let target = self.session.target_volume_l;
        let dispensed_l = round_to_tenth(target * p.percent / 100.0).min(target);

        self.session.status = SessionStatus::Stopped;
        self.session.started_at = None;
        self.last_progress = p;

        let record = (dispensed_l > 0.0).then(|| {
            IrrigationRecord::new(
                self.clock.today(),
                dispensed_l,
                self.session.predicted_volume_l,
            )
        });
        if let Some(r) = &record {
            self.history.prepend(r.clone());
        }
        self.gateway.notify(PumpCommand::Stop { dispensed_l });
        tracing::info!(
            dispensed_l,
            target_l = target,
            percent = p.percent,
            recorded = record.is_some(),
            "irrigation stopped"
        );
        Some(StopOutcome {
            progress: p,
            dispensed_l,
            record,
        })
    }

    /// Return a finished session to Idle so a new run may start.
    pub fn reset(&mut self) -> Result<()> {
        match self.session.status {
            SessionStatus::Running => Err(eyre::Report::new(IrrigationError::State(
                "cannot reset while running; stop first".into(),
            ))),
            SessionStatus::Idle => Ok(()),
            SessionStatus::Completed | SessionStatus::Stopped => {
                self.session = IrrigationSession::idle();
                self.timer = None;
                self.last_progress = Progress::IDLE;
                tracing::debug!("session reset");
                Ok(())
            }
        }
    }

    /// Replace the history after a successful external refresh.
    pub fn refresh_history(&mut self, records: Vec<IrrigationRecord>) {
        tracing::debug!(len = records.len(), "history replaced");
        self.history.replace_all(records);
    }

    pub fn status(&self) -> SessionStatus {
        self.session.status
    }

    pub fn session(&self) -> &IrrigationSession {
        &self.session
    }

    /// Last observed percent/remaining.
    pub fn progress(&self) -> Progress {
        self.last_progress
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The one live tick, if any.
    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.timer
    }

    pub fn config(&self) -> &ControllerCfg {
        &self.cfg
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.session.status,
            target_volume_l: self.session.target_volume_l,
            predicted_volume_l: self.session.predicted_volume_l,
            progress: self.last_progress,
            history_len: self.history.len(),
        }
    }
}
