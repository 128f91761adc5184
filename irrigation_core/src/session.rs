//! The single active-or-idle dispensing run.

use crate::progress::Progress;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Stopped,
}

impl SessionStatus {
    /// Completed or Stopped; only `reset` leaves these.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Stopped)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Stopped => "stopped",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrrigationSession {
    pub(crate) status: SessionStatus,
    pub(crate) target_volume_l: f64,
    pub(crate) predicted_volume_l: f64,
    pub(crate) started_at: Option<Instant>,
    pub(crate) total: Duration,
}

impl IrrigationSession {
    pub fn idle() -> Self {
        Self {
            status: SessionStatus::Idle,
            target_volume_l: 0.0,
            predicted_volume_l: 0.0,
            started_at: None,
            total: Duration::ZERO,
        }
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }
    pub fn target_volume_l(&self) -> f64 {
        self.target_volume_l
    }
    /// Frozen at `start`.
    pub fn predicted_volume_l(&self) -> f64 {
        self.predicted_volume_l
    }
    /// Set only while Running.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }
    pub fn total_duration(&self) -> Duration {
        self.total
    }
}

impl Default for IrrigationSession {
    fn default() -> Self {
        Self::idle()
    }
}

/// Identity of the one live scheduled tick.
///
/// Each scheduling bumps the generation, so a handle captured before a
/// stop/complete/reschedule can never match the controller's live handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle {
    pub(crate) generation: u64,
    pub(crate) due: Instant,
}

impl TickHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
    pub fn due(&self) -> Instant {
        self.due
    }
    /// Wait before this tick should fire, zero if already due.
    pub fn delay_from(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }
}

/// Read-only view of the controller for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub target_volume_l: f64,
    pub predicted_volume_l: f64,
    pub progress: Progress,
    pub history_len: usize,
}
