#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Irrigation session control (network-agnostic).
//!
//! This crate owns the lifecycle of one dispensing run. All remote
//! interactions go through the `irrigation_traits` source/gateway traits.
//!
//! ## Architecture
//!
//! - **Progress**: pure elapsed→percent mapping (`progress` module)
//! - **History**: newest-first record log (`history` module)
//! - **Control**: the session state machine (`SessionController`)
//! - **Gateway**: non-blocking pump notifications (`gateway` module)
//! - **Recommendation**: bounded one-shot capture with fallback
//! - **Runner**: the single actor thread that drives ticks (`runner` module)
//! - **Weather**: display-only conditions with a fallback (`weather` module)
//!
//! Volumes are liters (`f64`); reconciled volumes are rounded to 0.1 L.

pub mod builder;
pub mod config;
pub mod controller;
pub mod conversions;
pub mod error;
pub mod gateway;
pub mod history;
pub mod history_sync;
pub mod mocks;
pub mod progress;
pub mod recommendation;
pub mod runner;
pub mod session;
pub mod status;
pub mod util;
pub mod weather;

pub use builder::SessionControllerBuilder;
pub use config::{ControllerCfg, RecommendationCfg};
pub use controller::SessionController;
pub use error::{IrrigationError, StartRejection};
pub use gateway::{GatewayDispatcher, PumpCommand};
pub use history::HistoryLog;
pub use progress::{Progress, progress};
pub use recommendation::{CapturedRecommendation, RecommendationOrigin};
pub use runner::{SessionEvent, SessionHandle, SessionService};
pub use session::{IrrigationSession, SessionSnapshot, SessionStatus, TickHandle};
pub use status::{StopOutcome, TickStatus};
