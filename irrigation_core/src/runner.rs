//! Single-actor driver for the session controller.
//!
//! One thread owns the `SessionController` and is the only place session state
//! changes. Commands arrive over a channel; while a tick is pending the actor
//! waits on the channel with a timeout set to the tick's due time, so timer
//! expiries and commands are processed strictly one at a time. A stop always
//! runs before any tick queued behind it, and the controller rejects the old
//! handle anyway.
//!
//! Observers subscribe to `SessionEvent`s; a dropped subscriber is pruned on
//! the next broadcast.
use crossbeam_channel as xch;
use irrigation_traits::IrrigationRecord;
use std::time::Duration;

use crate::controller::SessionController;
use crate::error::{IrrigationError, Result};
use crate::progress::Progress;
use crate::session::{SessionSnapshot, TickHandle};
use crate::status::{StopOutcome, TickStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Started {
        target_l: f64,
        predicted_l: f64,
        total: Duration,
    },
    Progress(Progress),
    Completed(IrrigationRecord),
    Stopped(StopOutcome),
    Reset,
    HistoryReplaced { len: usize },
}

enum Command {
    Start {
        target_l: f64,
        predicted_l: f64,
        reply: xch::Sender<Result<TickHandle>>,
    },
    Stop {
        reply: xch::Sender<Option<StopOutcome>>,
    },
    Reset {
        reply: xch::Sender<Result<()>>,
    },
    Snapshot {
        reply: xch::Sender<SessionSnapshot>,
    },
    History {
        reply: xch::Sender<Vec<IrrigationRecord>>,
    },
    RefreshHistory(Vec<IrrigationRecord>),
    Subscribe(xch::Sender<SessionEvent>),
    Shutdown,
}

/// Cloneable handle for talking to the actor.
#[derive(Clone)]
pub struct SessionHandle {
    tx: xch::Sender<Command>,
}

fn service_gone() -> eyre::Report {
    eyre::Report::new(IrrigationError::State("session service stopped".into()))
}

impl SessionHandle {
    fn request<T>(&self, make: impl FnOnce(xch::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = xch::bounded(1);
        self.tx.send(make(reply)).map_err(|_| service_gone())?;
        rx.recv().map_err(|_| service_gone())
    }

    pub fn start(&self, target_l: f64, predicted_l: f64) -> Result<TickHandle> {
        self.request(|reply| Command::Start {
            target_l,
            predicted_l,
            reply,
        })?
    }

    pub fn stop(&self) -> Result<Option<StopOutcome>> {
        self.request(|reply| Command::Stop { reply })
    }

    pub fn reset(&self) -> Result<()> {
        self.request(|reply| Command::Reset { reply })?
    }

    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        self.request(|reply| Command::Snapshot { reply })
    }

    pub fn history(&self) -> Result<Vec<IrrigationRecord>> {
        self.request(|reply| Command::History { reply })
    }

    /// Fire-and-forget wholesale history replacement.
    pub fn refresh_history(&self, records: Vec<IrrigationRecord>) -> Result<()> {
        self.tx
            .send(Command::RefreshHistory(records))
            .map_err(|_| service_gone())
    }

    pub fn subscribe(&self) -> Result<xch::Receiver<SessionEvent>> {
        let (tx, rx) = xch::unbounded();
        self.tx
            .send(Command::Subscribe(tx))
            .map_err(|_| service_gone())?;
        Ok(rx)
    }
}

/// Owns the actor thread. Dropping it stops any running session and joins.
pub struct SessionService {
    handle: SessionHandle,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SessionService {
    pub fn spawn(controller: SessionController) -> Result<Self> {
        let (tx, rx) = xch::unbounded();
        let join_handle = std::thread::Builder::new()
            .name("irrigation-session".into())
            .spawn(move || Actor::new(controller).run(rx))
            .map_err(|e| {
                eyre::Report::new(IrrigationError::State(format!(
                    "spawn session thread: {e}"
                )))
            })?;
        Ok(Self {
            handle: SessionHandle { tx },
            join_handle: Some(join_handle),
        })
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }
}

impl std::ops::Deref for SessionService {
    type Target = SessionHandle;
    fn deref(&self) -> &SessionHandle {
        &self.handle
    }
}

impl Drop for SessionService {
    fn drop(&mut self) {
        let _ = self.handle.tx.send(Command::Shutdown);
        if let Some(handle) = self.join_handle.take()
            && let Err(e) = handle.join()
        {
            tracing::warn!(?e, "session thread panicked during shutdown");
        }
    }
}

struct Actor {
    controller: SessionController,
    subscribers: Vec<xch::Sender<SessionEvent>>,
}

impl Actor {
    fn new(controller: SessionController) -> Self {
        Self {
            controller,
            subscribers: Vec::new(),
        }
    }

    fn run(mut self, rx: xch::Receiver<Command>) {
        loop {
            let next = match self.controller.pending_tick() {
                Some(tick) => {
                    let wait = tick.delay_from(self.controller.clock().now());
                    match rx.recv_timeout(wait) {
                        Ok(cmd) => cmd,
                        Err(xch::RecvTimeoutError::Timeout) => {
                            self.fire(tick);
                            continue;
                        }
                        Err(xch::RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match rx.recv() {
                    Ok(cmd) => cmd,
                    Err(_) => break,
                },
            };
            if !self.handle(next) {
                break;
            }
        }
        if let Some(outcome) = self.controller.stop() {
            tracing::warn!(
                dispensed_l = outcome.dispensed_l,
                "session service shutting down; running session stopped"
            );
        }
        tracing::trace!("session thread exiting cleanly");
    }

    fn fire(&mut self, tick: TickHandle) {
        let now = self.controller.clock().now();
        match self.controller.tick(tick, now) {
            TickStatus::Running { progress, .. } => self.broadcast(SessionEvent::Progress(progress)),
            TickStatus::Completed(record) => {
                self.broadcast(SessionEvent::Progress(Progress::DONE));
                self.broadcast(SessionEvent::Completed(record));
            }
            TickStatus::StaleIgnored => {}
        }
    }

    /// Returns false on shutdown.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Start {
                target_l,
                predicted_l,
                reply,
            } => {
                let res = self.controller.start(target_l, predicted_l);
                if res.is_ok() {
                    let total = self.controller.session().total_duration();
                    self.broadcast(SessionEvent::Started {
                        target_l,
                        predicted_l,
                        total,
                    });
                }
                let _ = reply.send(res);
            }
            Command::Stop { reply } => {
                let outcome = self.controller.stop();
                if let Some(o) = &outcome {
                    self.broadcast(SessionEvent::Stopped(o.clone()));
                }
                let _ = reply.send(outcome);
            }
            Command::Reset { reply } => {
                let was_terminal = self.controller.status().is_terminal();
                let res = self.controller.reset();
                if res.is_ok() && was_terminal {
                    self.broadcast(SessionEvent::Reset);
                }
                let _ = reply.send(res);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.controller.snapshot());
            }
            Command::History { reply } => {
                let _ = reply.send(self.controller.history().to_vec());
            }
            Command::RefreshHistory(records) => {
                let len = records.len();
                self.controller.refresh_history(records);
                self.broadcast(SessionEvent::HistoryReplaced { len });
            }
            Command::Subscribe(tx) => self.subscribers.push(tx),
            Command::Shutdown => return false,
        }
        true
    }

    fn broadcast(&mut self, event: SessionEvent) {
        self.subscribers.retain(|s| s.send(event.clone()).is_ok());
    }
}
