use crate::session::SessionStatus;
use thiserror::Error;

/// Why a `start` request was refused. State and history are untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StartRejection {
    #[error("a session is already running")]
    AlreadyRunning,
    #[error("session is {0}; reset it before starting a new one")]
    NotIdle(SessionStatus),
    #[error("target volume {target_l} L is outside [0, {max_l}] L")]
    TargetOutOfRange { target_l: f64, max_l: f64 },
    #[error("predicted volume {0} L is not a finite non-negative number")]
    InvalidPrediction(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum IrrigationError {
    #[error("invalid start request: {0}")]
    InvalidStart(StartRejection),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
}

impl From<StartRejection> for IrrigationError {
    fn from(r: StartRejection) -> Self {
        IrrigationError::InvalidStart(r)
    }
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
