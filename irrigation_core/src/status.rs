//! Outcomes returned from controller transitions.

use crate::progress::Progress;
use crate::session::TickHandle;
use irrigation_traits::IrrigationRecord;

/// Result of delivering one scheduled tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickStatus {
    /// Still dispensing; `next` is the new live tick.
    Running { progress: Progress, next: TickHandle },
    /// Target reached; the record is already in the history log.
    Completed(IrrigationRecord),
    /// The tick no longer matches a running session; nothing changed.
    StaleIgnored,
}

/// Result of an early stop.
#[derive(Debug, Clone, PartialEq)]
pub struct StopOutcome {
    /// Progress at the moment of the stop.
    pub progress: Progress,
    /// Reconciled volume, rounded to 0.1 L and never above the target.
    pub dispensed_l: f64,
    /// Present only when something was dispensed.
    pub record: Option<IrrigationRecord>,
}
