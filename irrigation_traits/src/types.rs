//! Wire types shared between the controller and the irrigation backend.
//!
//! Field names on the wire follow the backend JSON (`actual_water`,
//! `predicted_water`, ...); Rust field names carry their units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Latest field sensor readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Soil moisture in percent.
    pub soil_moisture: f64,
    /// Air temperature in °C.
    pub temperature: f64,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            soil_moisture: 30.0,
            temperature: 28.0,
        }
    }
}

/// Water recommendation for a sensor snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "predicted_water")]
    pub predicted_volume_l: f64,
    #[serde(rename = "rainfall_forecast", default)]
    pub rainfall_forecast_mm: f64,
    #[serde(default)]
    pub decision: String,
}

/// Rainfall above this many millimetres changes the decision wording.
pub const RAIN_FORECAST_THRESHOLD_MM: f64 = 20.0;

impl Recommendation {
    /// Build a recommendation with the standard decision wording.
    pub fn from_forecast(predicted_volume_l: f64, rainfall_forecast_mm: f64) -> Self {
        let decision = if rainfall_forecast_mm > RAIN_FORECAST_THRESHOLD_MM {
            format!("Less Water Needed: {predicted_volume_l:.2} liters (Rain forecasted)")
        } else {
            format!("Recommended Water: {predicted_volume_l:.2} liters")
        };
        Self {
            predicted_volume_l,
            rainfall_forecast_mm,
            decision,
        }
    }
}

/// Current weather at the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    #[serde(rename = "temp")]
    pub temp_c: f64,
    #[serde(rename = "humidity")]
    pub humidity_pct: f64,
    pub description: String,
    #[serde(rename = "wind_speed")]
    pub wind_speed_ms: f64,
    /// Provider icon code, e.g. `01d`.
    #[serde(default)]
    pub icon: String,
}

impl Weather {
    /// Clear-sky conditions shown when no weather service answers.
    pub fn fallback() -> Self {
        Self {
            temp_c: 28.5,
            humidity_pct: 60.0,
            description: "Clear sky".to_string(),
            wind_speed_ms: 3.5,
            icon: "01d".to_string(),
        }
    }
}

/// Immutable outcome of one dispensing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationRecord {
    pub date: NaiveDate,
    #[serde(rename = "actual_water")]
    pub actual_volume_l: f64,
    #[serde(rename = "predicted_water")]
    pub predicted_volume_l: f64,
}

impl IrrigationRecord {
    pub fn new(date: NaiveDate, actual_volume_l: f64, predicted_volume_l: f64) -> Self {
        Self {
            date,
            actual_volume_l,
            predicted_volume_l,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uses_backend_field_names() {
        let rec = IrrigationRecord::new(
            NaiveDate::from_ymd_opt(2025, 2, 25).unwrap(),
            45.0,
            42.0,
        );
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["date"], "2025-02-25");
        assert_eq!(v["actual_water"], 45.0);
        assert_eq!(v["predicted_water"], 42.0);
    }

    #[test]
    fn weather_fallback_is_clear_sky() {
        let w = Weather::fallback();
        assert_eq!(w.temp_c, 28.5);
        assert_eq!(w.humidity_pct, 60.0);
        assert_eq!(w.description, "Clear sky");
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["wind_speed"], 3.5);
        assert_eq!(v["icon"], "01d");
    }

    #[test]
    fn decision_wording_follows_rain_threshold() {
        let wet = Recommendation::from_forecast(10.05, 32.61);
        assert_eq!(wet.decision, "Less Water Needed: 10.05 liters (Rain forecasted)");
        let dry = Recommendation::from_forecast(18.0, 4.0);
        assert_eq!(dry.decision, "Recommended Water: 18.00 liters");
    }

    #[test]
    fn recommendation_tolerates_missing_optional_fields() {
        let rec: Recommendation = serde_json::from_str(r#"{"predicted_water": 12.5}"#).unwrap();
        assert_eq!(rec.predicted_volume_l, 12.5);
        assert_eq!(rec.rainfall_forecast_mm, 0.0);
        assert!(rec.decision.is_empty());
    }
}
