//! Subcommand bodies: backend wiring, session run, and output.

use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel as xch;
use irrigation_config::Config;
use irrigation_core::history_sync::{HistoryRefresher, load_history};
use irrigation_core::recommendation::{capture, read_snapshot};
use irrigation_core::weather::read_weather;
use irrigation_core::{
    CapturedRecommendation, ControllerCfg, IrrigationError, RecommendationCfg, SessionController,
    SessionEvent, SessionService,
};
use irrigation_remote::{Backend, CsvHistorySource, WeatherProvider};
use irrigation_traits::{IrrigationRecord, SensorSnapshot, Weather};
use serde_json::json;

const BAR_WIDTH: usize = 30;

/// Set to make the simulated backend and weather fail every call.
pub const SIM_OFFLINE_ENV: &str = "IRRIGATE_SIM_OFFLINE";

pub fn make_backend(cfg: &Config) -> eyre::Result<Backend> {
    let backend = Backend::from_config(&cfg.backend)
        .map_err(|e| eyre::Report::new(IrrigationError::Config(e.to_string())))?;
    Ok(match backend {
        Backend::Sim(sim) if sim_offline() => {
            tracing::warn!("simulated backend forced offline");
            Backend::Sim(sim.offline())
        }
        other => other,
    })
}

pub fn make_weather(cfg: &Config) -> eyre::Result<WeatherProvider> {
    let provider = WeatherProvider::from_config(&cfg.weather)
        .map_err(|e| eyre::Report::new(IrrigationError::Config(e.to_string())))?;
    Ok(match provider {
        WeatherProvider::Sim(sim) if sim_offline() => WeatherProvider::Sim(sim.offline()),
        other => other,
    })
}

fn sim_offline() -> bool {
    std::env::var(SIM_OFFLINE_ENV).is_ok_and(|v| v == "1")
}

fn initial_history(cfg: &Config, backend: &Backend) -> Vec<IrrigationRecord> {
    match &cfg.history.csv {
        Some(path) => load_history(&CsvHistorySource::new(path)),
        None => load_history(backend),
    }
}

fn recommendation(
    cfg: &Config,
    backend: &Backend,
    snapshot: SensorSnapshot,
) -> CapturedRecommendation {
    let rec_cfg = RecommendationCfg::from(&cfg.recommendation);
    capture(Arc::new(backend.clone()), snapshot, &rec_cfg)
}

fn origin_name(c: &CapturedRecommendation) -> &'static str {
    use irrigation_core::RecommendationOrigin::*;
    match c.origin {
        Remote => "remote",
        Fallback => "fallback",
        Manual => "manual",
    }
}

fn record_json(r: &IrrigationRecord) -> serde_json::Value {
    serde_json::to_value(r).unwrap_or(serde_json::Value::Null)
}

fn print_conditions(snapshot: &SensorSnapshot, weather: &Weather) {
    println!("{}", irrigation_ui::render_sensors(snapshot));
    println!("{}", irrigation_ui::render_weather(weather));
}

pub fn run_predict(
    cfg: &Config,
    backend: &Backend,
    weather: &WeatherProvider,
    json: bool,
) -> eyre::Result<()> {
    let snapshot = read_snapshot(backend);
    let conditions = read_weather(weather);
    let captured = recommendation(cfg, backend, snapshot);
    if json {
        let r = &captured.recommendation;
        println!(
            "{}",
            json!({
                "predicted_water": r.predicted_volume_l,
                "rainfall_forecast": r.rainfall_forecast_mm,
                "decision": r.decision,
                "origin": origin_name(&captured),
                "warning": captured.warning,
                "sensors": snapshot,
                "weather": conditions,
            })
        );
    } else {
        print_conditions(&snapshot, &conditions);
        println!("{}", irrigation_ui::render_recommendation(&captured));
    }
    Ok(())
}

pub fn run_history(cfg: &Config, backend: &Backend, json: bool) -> eyre::Result<()> {
    let records = initial_history(cfg, backend);
    if json {
        let rows: Vec<_> = records.iter().map(record_json).collect();
        println!("{}", json!({ "history": rows }));
    } else {
        println!("{}", irrigation_ui::render_last_irrigation(records.first()));
        print!("{}", irrigation_ui::render_history_table(&records));
    }
    Ok(())
}

pub fn run_self_check(
    cfg: &Config,
    backend: &Backend,
    weather: &WeatherProvider,
    json: bool,
) -> eyre::Result<()> {
    let c = &cfg.controller;
    if json {
        println!(
            "{}",
            json!({
                "status": "ok",
                "backend": backend.describe(),
                "weather": weather.describe(),
                "flow_rate_lps": c.flow_rate_lps,
                "max_volume_l": c.max_volume_l,
            })
        );
    } else {
        println!(
            "OK: backend {}, weather {}, flow {} L/s, max {} L",
            backend.describe(),
            weather.describe(),
            c.flow_rate_lps,
            c.max_volume_l
        );
    }
    Ok(())
}

pub fn run_start(
    cfg: &Config,
    backend: &Backend,
    weather: &WeatherProvider,
    liters: f64,
    predicted: Option<f64>,
    json: bool,
) -> eyre::Result<()> {
    let snapshot = read_snapshot(backend);
    let captured = match predicted {
        Some(p) => CapturedRecommendation::manual(p),
        None => recommendation(cfg, backend, snapshot),
    };
    if !json {
        print_conditions(&snapshot, &read_weather(weather));
        println!("{}", irrigation_ui::render_recommendation(&captured));
    }

    let controller = SessionController::builder()
        .with_config(ControllerCfg::from(&cfg.controller))
        .with_gateway(backend.clone())
        .build()?;
    let service = SessionService::spawn(controller)?;
    let events = service.subscribe()?;

    let interval = Duration::from_secs(cfg.history.refresh_secs);
    let _refresher = match &cfg.history.csv {
        Some(path) => {
            HistoryRefresher::spawn(CsvHistorySource::new(path), interval, service.handle())
        }
        None => HistoryRefresher::spawn(backend.clone(), interval, service.handle()),
    };
    // The first load replaces the log wholesale; let it land before this run
    // appends its own record.
    let first_load_wait = Duration::from_millis(cfg.backend.timeout_ms) + Duration::from_secs(1);
    match events.recv_timeout(first_load_wait) {
        Ok(SessionEvent::HistoryReplaced { len }) => tracing::debug!(len, "history loaded"),
        Ok(other) => tracing::debug!(?other, "unexpected event before start"),
        Err(_) => tracing::warn!("history not loaded yet; starting anyway"),
    }

    let stopper = service.handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("interrupt received; stopping irrigation");
        if let Err(e) = stopper.stop() {
            tracing::warn!(error = %e, "stop after interrupt failed");
        }
    }) {
        tracing::warn!(error = %e, "could not install Ctrl-C handler");
    }

    service.start(liters, captured.predicted_volume_l())?;
    follow(&events, liters, json)?;

    if !json {
        let history = service.history()?;
        println!("{}", irrigation_ui::render_last_irrigation(history.first()));
        print!("{}", irrigation_ui::render_history_table(&history));
    }
    Ok(())
}

/// Render events until the session reaches a terminal state.
fn follow(events: &xch::Receiver<SessionEvent>, target_l: f64, json: bool) -> eyre::Result<()> {
    let mut stdout = std::io::stdout();
    loop {
        let event = events.recv().map_err(|_| {
            eyre::Report::new(IrrigationError::State("session service stopped".into()))
        })?;
        match event {
            SessionEvent::Started {
                target_l,
                predicted_l,
                total,
            } => {
                if json {
                    println!(
                        "{}",
                        json!({
                            "event": "started",
                            "target_l": target_l,
                            "predicted_l": predicted_l,
                            "duration_s": total.as_secs_f64(),
                        })
                    );
                } else {
                    println!(
                        "Irrigation started: {target_l:.1} L over {:.1}s",
                        total.as_secs_f64()
                    );
                }
            }
            SessionEvent::Progress(p) => {
                if json {
                    println!(
                        "{}",
                        json!({
                            "event": "progress",
                            "percent": p.percent,
                            "remaining_s": p.remaining_secs(),
                        })
                    );
                } else {
                    print!(
                        "\r{}",
                        irrigation_ui::render_progress_line(target_l, p, BAR_WIDTH)
                    );
                    let _ = stdout.flush();
                }
            }
            SessionEvent::Completed(record) => {
                if json {
                    println!(
                        "{}",
                        json!({
                            "event": "completed",
                            "dispensed_l": record.actual_volume_l,
                            "record": record_json(&record),
                        })
                    );
                } else {
                    println!("\nIrrigation complete: {:.1} L dispensed", record.actual_volume_l);
                }
                return Ok(());
            }
            SessionEvent::Stopped(outcome) => {
                if json {
                    println!(
                        "{}",
                        json!({
                            "event": "stopped",
                            "percent": outcome.progress.percent,
                            "dispensed_l": outcome.dispensed_l,
                            "record": outcome.record.as_ref().map(record_json),
                        })
                    );
                } else {
                    println!(
                        "\nIrrigation stopped at {:.1}%: {:.1} L dispensed",
                        outcome.progress.percent, outcome.dispensed_l
                    );
                    if outcome.record.is_none() {
                        println!("Nothing dispensed; no history record added.");
                    }
                }
                return Ok(());
            }
            SessionEvent::HistoryReplaced { .. } | SessionEvent::Reset => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use irrigation_remote::SimBackend;

    #[test]
    fn sim_backend_is_default() {
        let backend = make_backend(&Config::default()).unwrap();
        assert!(matches!(backend, Backend::Sim(_)));
    }

    #[test]
    fn sim_weather_is_default() {
        let weather = make_weather(&Config::default()).unwrap();
        assert_eq!(weather.describe(), "sim");
    }

    #[test]
    fn history_falls_back_to_placeholder() {
        let cfg = Config::default();
        let backend = Backend::Sim(SimBackend::new().offline());
        let records = initial_history(&cfg, &backend);
        assert_eq!(records, irrigation_core::history_sync::placeholder_history());
    }

    #[test]
    fn offline_recommendation_uses_fallback() {
        let cfg = Config::default();
        let backend = Backend::Sim(SimBackend::new().offline());
        let captured = recommendation(&cfg, &backend, read_snapshot(&backend));
        assert!(captured.is_fallback());
        assert_eq!(captured.predicted_volume_l(), cfg.recommendation.fallback_volume_l);
    }
}
