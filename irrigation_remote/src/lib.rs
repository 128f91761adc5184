//! Backend adapters for the irrigation controller.
//!
//! `HttpBackend` talks to the JSON service; `SimBackend` answers offline.
//! `Backend` picks one from configuration and forwards every trait call.
//! Weather comes from a separate `WeatherProvider`.

pub mod csv_source;
pub mod error;
pub mod http;
pub mod sim;
pub mod weather;

use std::time::Duration;

use irrigation_config::{BackendCfg, BackendMode};
use irrigation_traits::{
    ActuatorGateway, HistorySource, IrrigationRecord, Recommendation, RecommendationSource,
    SensorSnapshot, SensorSource,
};

pub use csv_source::CsvHistorySource;
pub use error::RemoteError;
pub use http::HttpBackend;
pub use sim::SimBackend;
pub use weather::{OpenWeatherClient, WeatherProvider};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
pub enum Backend {
    Sim(SimBackend),
    Http(HttpBackend),
}

impl Backend {
    pub fn from_config(cfg: &BackendCfg) -> error::Result<Self> {
        match cfg.mode {
            BackendMode::Sim => {
                tracing::info!("using simulated backend");
                Ok(Backend::Sim(SimBackend::new()))
            }
            BackendMode::Http => {
                let http =
                    HttpBackend::new(&cfg.base_url, Duration::from_millis(cfg.timeout_ms))?;
                tracing::info!(base_url = http.base_url(), "using http backend");
                Ok(Backend::Http(http))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::Sim(_) => "sim".to_string(),
            Backend::Http(h) => format!("http {}", h.base_url()),
        }
    }
}

impl RecommendationSource for Backend {
    fn request(&self, snapshot: &SensorSnapshot) -> Result<Recommendation, BoxError> {
        match self {
            Backend::Sim(b) => b.request(snapshot),
            Backend::Http(b) => b.request(snapshot),
        }
    }
}

impl ActuatorGateway for Backend {
    fn start_pump(&mut self, volume_l: f64, predicted_l: f64) -> Result<(), BoxError> {
        match self {
            Backend::Sim(b) => b.start_pump(volume_l, predicted_l),
            Backend::Http(b) => b.start_pump(volume_l, predicted_l),
        }
    }

    fn stop_pump(&mut self, dispensed_l: f64) -> Result<(), BoxError> {
        match self {
            Backend::Sim(b) => b.stop_pump(dispensed_l),
            Backend::Http(b) => b.stop_pump(dispensed_l),
        }
    }
}

impl HistorySource for Backend {
    fn list(&self) -> Result<Vec<IrrigationRecord>, BoxError> {
        match self {
            Backend::Sim(b) => b.list(),
            Backend::Http(b) => b.list(),
        }
    }
}

impl SensorSource for Backend {
    fn snapshot(&self) -> Result<SensorSnapshot, BoxError> {
        match self {
            Backend::Sim(b) => b.snapshot(),
            Backend::Http(b) => b.snapshot(),
        }
    }
}
