//! Fire-and-forget delivery of pump notifications.
//!
//! Spawns a thread that owns the `ActuatorGateway` and drains an unbounded
//! channel of commands, so callers never wait on the network. Failures are
//! logged and dropped; they never reach the session.
//!
//! Dropping the dispatcher closes the channel; the worker delivers whatever
//! is already queued, then exits and is joined.
use crossbeam_channel as xch;
use irrigation_traits::ActuatorGateway;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpCommand {
    Start { volume_l: f64, predicted_l: f64 },
    Stop { dispensed_l: f64 },
}

pub struct GatewayDispatcher {
    tx: Option<xch::Sender<PumpCommand>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl GatewayDispatcher {
    pub fn spawn<G: ActuatorGateway + Send + 'static>(mut gateway: G) -> Self {
        let (tx, rx) = xch::unbounded::<PumpCommand>();

        let join_handle = std::thread::Builder::new()
            .name("pump-gateway".into())
            .spawn(move || {
                for cmd in rx.iter() {
                    let res = match cmd {
                        PumpCommand::Start {
                            volume_l,
                            predicted_l,
                        } => gateway.start_pump(volume_l, predicted_l),
                        PumpCommand::Stop { dispensed_l } => gateway.stop_pump(dispensed_l),
                    };
                    match res {
                        Ok(()) => tracing::debug!(?cmd, "pump notification delivered"),
                        Err(e) => tracing::warn!(error = %e, ?cmd, "pump notification failed"),
                    }
                }
                tracing::trace!("gateway thread exiting cleanly");
            });

        let join_handle = match join_handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn gateway thread; pump notifications disabled");
                None
            }
        };

        Self {
            tx: Some(tx),
            join_handle,
        }
    }

    /// Queue a notification. Never blocks.
    pub fn notify(&self, cmd: PumpCommand) {
        let Some(tx) = self.tx.as_ref() else {
            return;
        };
        if tx.send(cmd).is_err() {
            tracing::warn!(?cmd, "gateway thread gone; pump notification dropped");
        }
    }
}

impl Drop for GatewayDispatcher {
    fn drop(&mut self) {
        // Closing the sender ends the worker's iterator after the backlog.
        drop(self.tx.take());
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(?e, "gateway thread panicked during shutdown");
        }
    }
}

impl std::fmt::Debug for GatewayDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayDispatcher")
            .field("running", &self.join_handle.is_some())
            .finish()
    }
}
