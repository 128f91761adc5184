pub mod clock;
pub mod types;

pub use clock::{Clock, MonotonicClock};
pub use types::{IrrigationRecord, Recommendation, SensorSnapshot, Weather};

pub trait RecommendationSource {
    fn request(
        &self,
        snapshot: &SensorSnapshot,
    ) -> Result<Recommendation, Box<dyn std::error::Error + Send + Sync>>;
}

pub trait ActuatorGateway {
    fn start_pump(
        &mut self,
        volume_l: f64,
        predicted_l: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
    fn stop_pump(&mut self, dispensed_l: f64)
    -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub trait HistorySource {
    fn list(&self) -> Result<Vec<IrrigationRecord>, Box<dyn std::error::Error + Send + Sync>>;
}

pub trait SensorSource {
    fn snapshot(&self) -> Result<SensorSnapshot, Box<dyn std::error::Error + Send + Sync>>;
}

pub trait WeatherSource {
    fn current(&self) -> Result<Weather, Box<dyn std::error::Error + Send + Sync>>;
}
