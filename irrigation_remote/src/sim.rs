//! Offline backend answering every call locally.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use irrigation_core::history_sync::placeholder_history;
use irrigation_traits::{
    ActuatorGateway, HistorySource, IrrigationRecord, Recommendation, RecommendationSource,
    SensorSnapshot, SensorSource, Weather, WeatherSource,
};

pub const SIM_PREDICTED_VOLUME_L: f64 = 10.05;
pub const SIM_RAINFALL_FORECAST_MM: f64 = 32.61;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Simulated backend. Clones share the pump counters.
#[derive(Debug, Clone)]
pub struct SimBackend {
    snapshot: SensorSnapshot,
    history: Vec<IrrigationRecord>,
    weather: Weather,
    starts: Arc<AtomicU32>,
    stops: Arc<AtomicU32>,
    offline: bool,
}

impl Default for SimBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBackend {
    pub fn new() -> Self {
        Self {
            snapshot: SensorSnapshot::default(),
            history: placeholder_history(),
            weather: Weather::fallback(),
            starts: Arc::new(AtomicU32::new(0)),
            stops: Arc::new(AtomicU32::new(0)),
            offline: false,
        }
    }

    /// Every call fails, as if the service were unreachable.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn reachable(&self) -> Result<(), BoxError> {
        if self.offline {
            return Err("simulated backend offline".into());
        }
        Ok(())
    }

    /// Serve these records from `list` instead of the placeholder set.
    pub fn with_history(mut self, history: Vec<IrrigationRecord>) -> Self {
        self.history = history;
        self
    }

    pub fn with_snapshot(mut self, snapshot: SensorSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    /// (start, stop) notifications received so far.
    pub fn pump_calls(&self) -> (u32, u32) {
        (
            self.starts.load(Ordering::Relaxed),
            self.stops.load(Ordering::Relaxed),
        )
    }
}

impl RecommendationSource for SimBackend {
    fn request(&self, snapshot: &SensorSnapshot) -> Result<Recommendation, BoxError> {
        self.reachable()?;
        tracing::debug!(
            soil_moisture = snapshot.soil_moisture,
            temperature = snapshot.temperature,
            "prediction request (simulated)"
        );
        Ok(Recommendation::from_forecast(
            SIM_PREDICTED_VOLUME_L,
            SIM_RAINFALL_FORECAST_MM,
        ))
    }
}

impl ActuatorGateway for SimBackend {
    fn start_pump(&mut self, volume_l: f64, predicted_l: f64) -> Result<(), BoxError> {
        self.reachable()?;
        self.starts.fetch_add(1, Ordering::Relaxed);
        tracing::info!(volume_l, predicted_l, "pump started (simulated)");
        Ok(())
    }

    fn stop_pump(&mut self, dispensed_l: f64) -> Result<(), BoxError> {
        self.reachable()?;
        self.stops.fetch_add(1, Ordering::Relaxed);
        tracing::info!(dispensed_l, "pump stopped (simulated)");
        Ok(())
    }
}

impl HistorySource for SimBackend {
    fn list(&self) -> Result<Vec<IrrigationRecord>, BoxError> {
        self.reachable()?;
        Ok(self.history.clone())
    }
}

impl SensorSource for SimBackend {
    fn snapshot(&self) -> Result<SensorSnapshot, BoxError> {
        self.reachable()?;
        Ok(self.snapshot)
    }
}

impl WeatherSource for SimBackend {
    fn current(&self) -> Result<Weather, BoxError> {
        self.reachable()?;
        Ok(self.weather.clone())
    }
}
