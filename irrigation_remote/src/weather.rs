//! Current weather for the field location.
//!
//! `OpenWeatherClient` queries the OpenWeather current-conditions endpoint in
//! metric units; `WeatherProvider` picks it or the simulator from config.

use std::time::Duration;

use irrigation_config::{WeatherCfg, WeatherMode};
use irrigation_traits::{Weather, WeatherSource};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::{RemoteError, Result};
use crate::http::decode;
use crate::sim::SimBackend;

const CURRENT: &str = "/weather";

#[derive(Deserialize)]
struct CurrentBody {
    main: MainBody,
    #[serde(default)]
    weather: Vec<ConditionBody>,
    #[serde(default)]
    wind: WindBody,
}

#[derive(Deserialize)]
struct MainBody {
    temp: f64,
    humidity: f64,
}

#[derive(Deserialize)]
struct ConditionBody {
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Deserialize, Default)]
struct WindBody {
    #[serde(default)]
    speed: f64,
}

impl From<CurrentBody> for Weather {
    fn from(b: CurrentBody) -> Self {
        let (description, icon) = b
            .weather
            .into_iter()
            .next()
            .map_or_else(|| (String::new(), String::new()), |c| (c.description, c.icon));
        Self {
            temp_c: b.main.temp,
            humidity_pct: b.main.humidity,
            description,
            wind_speed_ms: b.wind.speed,
            icon,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
    lat: f64,
    lon: f64,
}

impl OpenWeatherClient {
    pub fn new(cfg: &WeatherCfg) -> Result<Self> {
        let base_url = cfg.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|source| RemoteError::Transport {
                endpoint: "client",
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            lat: cfg.lat,
            lon: cfg.lon,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn current_weather(&self) -> Result<Weather> {
        let resp = self
            .client
            .get(format!("{}{CURRENT}", self.base_url))
            .query(&[
                ("lat", self.lat.to_string()),
                ("lon", self.lon.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send();
        let body: CurrentBody = decode(CURRENT, resp)?;
        Ok(body.into())
    }
}

impl WeatherSource for OpenWeatherClient {
    fn current(&self) -> std::result::Result<Weather, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.current_weather()?)
    }
}

#[derive(Debug, Clone)]
pub enum WeatherProvider {
    Sim(SimBackend),
    OpenWeather(OpenWeatherClient),
}

impl WeatherProvider {
    pub fn from_config(cfg: &WeatherCfg) -> Result<Self> {
        match cfg.mode {
            WeatherMode::Sim => Ok(WeatherProvider::Sim(SimBackend::new())),
            WeatherMode::OpenWeather => {
                let client = OpenWeatherClient::new(cfg)?;
                tracing::info!(base_url = client.base_url(), "using openweather");
                Ok(WeatherProvider::OpenWeather(client))
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            WeatherProvider::Sim(_) => "sim".to_string(),
            WeatherProvider::OpenWeather(c) => format!("openweather {}", c.base_url()),
        }
    }
}

impl WeatherSource for WeatherProvider {
    fn current(&self) -> std::result::Result<Weather, Box<dyn std::error::Error + Send + Sync>> {
        match self {
            WeatherProvider::Sim(s) => s.current(),
            WeatherProvider::OpenWeather(c) => c.current(),
        }
    }
}
