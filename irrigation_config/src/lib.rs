#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and history CSV parsing for the irrigation controller.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section has defaults, so an empty file is a valid config.
//! - The history CSV loader enforces headers and rejects malformed rows.
use irrigation_traits::IrrigationRecord;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// History CSV schema.
///
/// Expected headers:
/// date,actual_water,predicted_water
///
/// Example:
/// date,actual_water,predicted_water
/// 2025-02-25,45,42
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct HistoryRow {
    pub date: chrono::NaiveDate,
    pub actual_water: f64,
    pub predicted_water: f64,
}

impl From<HistoryRow> for IrrigationRecord {
    fn from(r: HistoryRow) -> Self {
        IrrigationRecord::new(r.date, r.actual_water, r.predicted_water)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ControllerCfg {
    /// Pump flow rate in liters per second; shared by every session.
    pub flow_rate_lps: f64,
    /// Upper bound of the operator's target-volume control.
    pub max_volume_l: f64,
    /// Progress tick cadence.
    pub tick_ms: u64,
}

impl Default for ControllerCfg {
    fn default() -> Self {
        Self {
            flow_rate_lps: 0.67,
            max_volume_l: 80.0,
            tick_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RecommendationCfg {
    /// Predicted volume substituted when the recommendation source fails.
    pub fallback_volume_l: f64,
    /// Upper bound on how long `start` waits for a recommendation.
    pub timeout_ms: u64,
}

impl Default for RecommendationCfg {
    fn default() -> Self {
        Self {
            fallback_volume_l: 10.05,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Offline backend answering every call locally.
    #[default]
    Sim,
    /// JSON-over-HTTP irrigation backend.
    Http,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendCfg {
    pub mode: BackendMode,
    pub base_url: String,
    /// Per-request timeout for every backend call.
    pub timeout_ms: u64,
}

impl Default for BackendCfg {
    fn default() -> Self {
        Self {
            mode: BackendMode::Sim,
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    /// Fixed clear-sky conditions, no network.
    #[default]
    Sim,
    /// OpenWeather current-conditions API.
    OpenWeather,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherCfg {
    pub mode: WeatherMode,
    pub base_url: String,
    pub api_key: String,
    /// Field location in decimal degrees.
    pub lat: f64,
    pub lon: f64,
    pub timeout_ms: u64,
}

impl Default for WeatherCfg {
    fn default() -> Self {
        Self {
            mode: WeatherMode::Sim,
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: String::new(),
            lat: 31.326,
            lon: 75.5762,
            timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HistoryCfg {
    /// Interval between external history refreshes.
    pub refresh_secs: u64,
    /// Optional CSV file used as the history source instead of the backend.
    pub csv: Option<PathBuf>,
}

impl Default for HistoryCfg {
    fn default() -> Self {
        Self {
            refresh_secs: 300,
            csv: None,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub controller: ControllerCfg,
    pub recommendation: RecommendationCfg,
    pub backend: BackendCfg,
    pub weather: WeatherCfg,
    pub history: HistoryCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse, and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_history_csv(path: &Path) -> eyre::Result<Vec<IrrigationRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open history CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["date", "actual_water", "predicted_water"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "history CSV must have headers 'date,actual_water,predicted_water', got: {}",
            actual.join(",")
        );
    }

    let mut records = Vec::new();
    for (idx, rec) in rdr.deserialize::<HistoryRow>().enumerate() {
        match rec {
            Ok(row) => {
                if row.actual_water < 0.0 || row.predicted_water < 0.0 {
                    eyre::bail!("invalid CSV row {}: volumes must be >= 0", idx + 2);
                }
                records.push(IrrigationRecord::from(row));
            }
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(records)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Controller
        let c = &self.controller;
        if !(c.flow_rate_lps.is_finite() && c.flow_rate_lps > 0.0) {
            eyre::bail!("controller.flow_rate_lps must be > 0");
        }
        if !(c.max_volume_l.is_finite() && c.max_volume_l > 0.0) {
            eyre::bail!("controller.max_volume_l must be > 0");
        }
        if c.tick_ms == 0 {
            eyre::bail!("controller.tick_ms must be >= 1");
        }
        if c.tick_ms > 60 * 1000 {
            eyre::bail!("controller.tick_ms is unreasonably large (>1min)");
        }

        // Recommendation
        let r = &self.recommendation;
        if !(r.fallback_volume_l.is_finite()
            && (0.0..=c.max_volume_l).contains(&r.fallback_volume_l))
        {
            eyre::bail!("recommendation.fallback_volume_l must be in [0, controller.max_volume_l]");
        }
        if r.timeout_ms == 0 {
            eyre::bail!("recommendation.timeout_ms must be >= 1");
        }

        // Backend
        if self.backend.timeout_ms == 0 {
            eyre::bail!("backend.timeout_ms must be >= 1");
        }
        if self.backend.mode == BackendMode::Http {
            let url = self.backend.base_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                eyre::bail!("backend.base_url must start with http:// or https://");
            }
        }

        // Weather
        let w = &self.weather;
        if w.timeout_ms == 0 {
            eyre::bail!("weather.timeout_ms must be >= 1");
        }
        if !(w.lat.is_finite() && (-90.0..=90.0).contains(&w.lat)) {
            eyre::bail!("weather.lat must be in [-90, 90]");
        }
        if !(w.lon.is_finite() && (-180.0..=180.0).contains(&w.lon)) {
            eyre::bail!("weather.lon must be in [-180, 180]");
        }
        if w.mode == WeatherMode::OpenWeather {
            let url = w.base_url.trim();
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                eyre::bail!("weather.base_url must start with http:// or https://");
            }
            if w.api_key.trim().is_empty() {
                eyre::bail!("weather.api_key is required when weather.mode = \"openweather\"");
            }
        }

        // History
        if self.history.refresh_secs == 0 {
            eyre::bail!("history.refresh_secs must be >= 1");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
