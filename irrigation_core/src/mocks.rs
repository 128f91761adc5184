//! Test and helper mocks for irrigation_core

use crate::gateway::PumpCommand;
use irrigation_traits::ActuatorGateway;
use std::sync::{Arc, Mutex};

/// A gateway that accepts every notification and does nothing.
pub struct NullGateway;

impl ActuatorGateway for NullGateway {
    fn start_pump(
        &mut self,
        _volume_l: f64,
        _predicted_l: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
    fn stop_pump(
        &mut self,
        _dispensed_l: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Ok(())
    }
}

/// A gateway that remembers every notification it receives.
#[derive(Default, Clone)]
pub struct RecordingGateway {
    calls: Arc<Mutex<Vec<PumpCommand>>>,
}

impl RecordingGateway {
    /// Shared view of the calls; stays valid after the gateway is moved.
    pub fn calls_handle(&self) -> Arc<Mutex<Vec<PumpCommand>>> {
        self.calls.clone()
    }

    fn push(&self, cmd: PumpCommand) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(cmd);
        }
    }
}

impl ActuatorGateway for RecordingGateway {
    fn start_pump(
        &mut self,
        volume_l: f64,
        predicted_l: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.push(PumpCommand::Start {
            volume_l,
            predicted_l,
        });
        Ok(())
    }
    fn stop_pump(
        &mut self,
        dispensed_l: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.push(PumpCommand::Stop { dispensed_l });
        Ok(())
    }
}
