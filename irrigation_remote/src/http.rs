//! Blocking JSON client for the irrigation backend.
//!
//! Every call carries the configured timeout. Non-2xx answers are errors even
//! when the body looks usable; callers decide what to fall back to.

use std::time::Duration;

use irrigation_traits::{IrrigationRecord, Recommendation, SensorSnapshot};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};

const PREDICT: &str = "/predict";
const HISTORY: &str = "/history";
const SENSOR_DATA: &str = "/sensor-data";
const START_IRRIGATION: &str = "/start-irrigation";
const STOP_IRRIGATION: &str = "/stop-irrigation";

#[derive(Serialize)]
struct StartBody {
    water_amount: f64,
    predicted_water: f64,
}

#[derive(Serialize)]
struct StopBody {
    dispensed_amount: f64,
}

#[derive(Deserialize)]
struct HistoryBody {
    history: Vec<IrrigationRecord>,
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(RemoteError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RemoteError::Transport {
                endpoint: "client",
                source,
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub fn predict(&self, snapshot: &SensorSnapshot) -> Result<Recommendation> {
        let resp = self.client.post(self.url(PREDICT)).json(snapshot).send();
        let mut rec: Recommendation = decode(PREDICT, resp)?;
        if rec.decision.is_empty() {
            rec = Recommendation::from_forecast(rec.predicted_volume_l, rec.rainfall_forecast_mm);
        }
        Ok(rec)
    }

    pub fn history(&self) -> Result<Vec<IrrigationRecord>> {
        let resp = self.client.get(self.url(HISTORY)).send();
        let body: HistoryBody = decode(HISTORY, resp)?;
        Ok(body.history)
    }

    pub fn sensor_data(&self) -> Result<SensorSnapshot> {
        let resp = self.client.get(self.url(SENSOR_DATA)).send();
        decode(SENSOR_DATA, resp)
    }

    pub fn start_irrigation(&self, water_amount: f64, predicted_water: f64) -> Result<()> {
        let resp = self
            .client
            .post(self.url(START_IRRIGATION))
            .json(&StartBody {
                water_amount,
                predicted_water,
            })
            .send();
        check(START_IRRIGATION, resp).map(drop)
    }

    pub fn stop_irrigation(&self, dispensed_amount: f64) -> Result<()> {
        let resp = self
            .client
            .post(self.url(STOP_IRRIGATION))
            .json(&StopBody { dispensed_amount })
            .send();
        check(STOP_IRRIGATION, resp).map(drop)
    }
}

fn transport(endpoint: &'static str, source: reqwest::Error) -> RemoteError {
    if source.is_timeout() {
        RemoteError::Timeout { endpoint }
    } else {
        RemoteError::Transport { endpoint, source }
    }
}

fn check(endpoint: &'static str, resp: reqwest::Result<Response>) -> Result<Response> {
    let resp = resp.map_err(|e| transport(endpoint, e))?;
    let status = resp.status();
    if !status.is_success() {
        tracing::warn!(endpoint, status = status.as_u16(), "backend error status");
        return Err(RemoteError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }
    Ok(resp)
}

pub(crate) fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    resp: reqwest::Result<Response>,
) -> Result<T> {
    let text = check(endpoint, resp)?
        .text()
        .map_err(|e| transport(endpoint, e))?;
    serde_json::from_str(&text).map_err(|e| RemoteError::Decode {
        endpoint,
        message: e.to_string(),
    })
}

type BoxError = Box<dyn std::error::Error + Send + Sync>;

impl irrigation_traits::RecommendationSource for HttpBackend {
    fn request(&self, snapshot: &SensorSnapshot) -> std::result::Result<Recommendation, BoxError> {
        Ok(self.predict(snapshot)?)
    }
}

impl irrigation_traits::ActuatorGateway for HttpBackend {
    fn start_pump(&mut self, volume_l: f64, predicted_l: f64) -> std::result::Result<(), BoxError> {
        Ok(self.start_irrigation(volume_l, predicted_l)?)
    }

    fn stop_pump(&mut self, dispensed_l: f64) -> std::result::Result<(), BoxError> {
        Ok(self.stop_irrigation(dispensed_l)?)
    }
}

impl irrigation_traits::HistorySource for HttpBackend {
    fn list(&self) -> std::result::Result<Vec<IrrigationRecord>, BoxError> {
        Ok(self.history()?)
    }
}

impl irrigation_traits::SensorSource for HttpBackend {
    fn snapshot(&self) -> std::result::Result<SensorSnapshot, BoxError> {
        Ok(self.sensor_data()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_urls() {
        let err = HttpBackend::new("ftp://farm", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, RemoteError::InvalidUrl(_)));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let b = HttpBackend::new("http://127.0.0.1:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(b.url(PREDICT), "http://127.0.0.1:8000/predict");
    }
}
