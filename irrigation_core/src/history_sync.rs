//! Periodic history refresh from an external source.
//!
//! A background thread owns the `HistorySource`, loads it immediately and
//! then every `interval`, and pushes each successful result into the session
//! actor as a wholesale replacement. Any failed load, first or periodic,
//! pushes the placeholder set instead.
//!
//! Dropping the refresher wakes the thread at once and joins it.
use chrono::NaiveDate;
use crossbeam_channel as xch;
use irrigation_traits::{HistorySource, IrrigationRecord};
use std::time::Duration;

use crate::runner::SessionHandle;

/// Static history shown whenever the source cannot be reached.
pub fn placeholder_history() -> Vec<IrrigationRecord> {
    [(25, 45.0, 42.0), (24, 50.0, 48.0), (23, 38.0, 35.0), (22, 42.0, 40.0), (21, 55.0, 52.0)]
        .into_iter()
        .filter_map(|(day, actual, predicted)| {
            NaiveDate::from_ymd_opt(2025, 2, day)
                .map(|d| IrrigationRecord::new(d, actual, predicted))
        })
        .collect()
}

/// One load attempt; a failure yields the placeholder set.
pub fn load_history<H: HistorySource + ?Sized>(source: &H) -> Vec<IrrigationRecord> {
    match source.list() {
        Ok(records) => {
            tracing::debug!(len = records.len(), "history fetched");
            records
        }
        Err(e) => {
            tracing::warn!(error = %e, "history unavailable; showing placeholder records");
            placeholder_history()
        }
    }
}

pub struct HistoryRefresher {
    stop_tx: Option<xch::Sender<()>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl HistoryRefresher {
    pub fn spawn<H: HistorySource + Send + 'static>(
        source: H,
        interval: Duration,
        session: SessionHandle,
    ) -> Self {
        let (stop_tx, stop_rx) = xch::bounded::<()>(0);

        let join_handle = std::thread::Builder::new()
            .name("history-refresh".into())
            .spawn(move || {
                loop {
                    if session.refresh_history(load_history(&source)).is_err() {
                        tracing::debug!("session service gone; history refresher exiting");
                        break;
                    }
                    match stop_rx.recv_timeout(interval) {
                        Err(xch::RecvTimeoutError::Timeout) => continue,
                        // Sender dropped (or an explicit stop): exit promptly.
                        _ => break,
                    }
                }
                tracing::trace!("history refresher exiting cleanly");
            });

        let join_handle = match join_handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn history refresher");
                None
            }
        };

        Self {
            stop_tx: Some(stop_tx),
            join_handle,
        }
    }
}

impl Drop for HistoryRefresher {
    fn drop(&mut self) {
        drop(self.stop_tx.take());
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(?e, "history refresher panicked during shutdown");
        }
    }
}
