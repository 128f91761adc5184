use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use irrigation_config::{WeatherCfg, WeatherMode};
use irrigation_remote::{HttpBackend, OpenWeatherClient, RemoteError};
use irrigation_traits::{ActuatorGateway, RecommendationSource, SensorSnapshot, WeatherSource};
use rstest::rstest;

fn read_request(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).expect("read request");
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let len = head
                .lines()
                .find_map(|l| {
                    l.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if buf.len() >= pos + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// One-shot HTTP responder; the join handle yields the raw request.
fn serve_once(status: u16, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let req = read_request(&mut stream);
        let resp = format!(
            "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(resp.as_bytes()).expect("write response");
        req
    });
    (format!("http://{addr}"), handle)
}

fn backend(url: &str) -> HttpBackend {
    HttpBackend::new(url, Duration::from_secs(2)).expect("backend")
}

#[test]
fn predict_posts_snapshot_and_parses_reply() {
    let (url, server) = serve_once(
        200,
        r#"{"predicted_water": 12.5, "rainfall_forecast": 3.0, "decision": "Recommended Water: 12.50 liters"}"#,
    );
    let rec = backend(&url)
        .request(&SensorSnapshot {
            soil_moisture: 41.0,
            temperature: 22.5,
        })
        .expect("predict");
    assert_eq!(rec.predicted_volume_l, 12.5);
    assert_eq!(rec.rainfall_forecast_mm, 3.0);

    let req = server.join().expect("server");
    assert!(req.starts_with("POST /predict "));
    assert!(req.contains(r#""soil_moisture":41.0"#));
    assert!(req.contains(r#""temperature":22.5"#));
}

#[test]
fn missing_decision_is_derived_from_forecast() {
    let (url, server) = serve_once(200, r#"{"predicted_water": 8, "rainfall_forecast": 25}"#);
    let rec = backend(&url).predict(&SensorSnapshot::default()).expect("predict");
    assert_eq!(rec.decision, "Less Water Needed: 8.00 liters (Rain forecasted)");
    server.join().expect("server");
}

#[test]
fn history_unwraps_envelope() {
    let (url, server) = serve_once(
        200,
        r#"{"history": [{"date": "2025-02-25", "actual_water": 45, "predicted_water": 42}]}"#,
    );
    let records = backend(&url).history().expect("history");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].actual_volume_l, 45.0);
    assert_eq!(records[0].date.to_string(), "2025-02-25");
    assert!(server.join().expect("server").starts_with("GET /history "));
}

#[test]
fn sensor_data_parses_integers() {
    let (url, server) = serve_once(200, r#"{"soil_moisture": 30, "temperature": 28}"#);
    let snap = backend(&url).sensor_data().expect("sensor data");
    assert_eq!(snap, SensorSnapshot::default());
    server.join().expect("server");
}

#[rstest]
#[case::start(true)]
#[case::stop(false)]
fn pump_notifications_use_backend_field_names(#[case] start: bool) {
    let (url, server) = serve_once(200, r#"{"status": "success"}"#);
    let mut b = backend(&url);
    if start {
        b.start_pump(30.0, 10.05).expect("start");
    } else {
        b.stop_pump(15.0).expect("stop");
    }
    let req = server.join().expect("server");
    if start {
        assert!(req.starts_with("POST /start-irrigation "));
        assert!(req.contains(r#""water_amount":30.0"#));
        assert!(req.contains(r#""predicted_water":10.05"#));
    } else {
        assert!(req.starts_with("POST /stop-irrigation "));
        assert!(req.contains(r#""dispensed_amount":15.0"#));
    }
}

#[test]
fn error_status_is_reported_even_with_body() {
    let (url, server) = serve_once(500, r#"{"error": "model missing", "predicted_water": 10.05}"#);
    let err = backend(&url).predict(&SensorSnapshot::default()).unwrap_err();
    assert!(matches!(
        err,
        RemoteError::Status {
            endpoint: "/predict",
            status: 500
        }
    ));
    server.join().expect("server");
}

#[test]
fn malformed_json_is_a_decode_error() {
    let (url, server) = serve_once(200, r#"{"history": "nope"}"#);
    let err = backend(&url).history().unwrap_err();
    assert!(matches!(err, RemoteError::Decode { .. }));
    server.join().expect("server");
}

#[test]
fn slow_backend_times_out() {
    // Accepted by the kernel backlog but never answered.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));
    let b = HttpBackend::new(&url, Duration::from_millis(150)).expect("backend");
    let err = b.history().unwrap_err();
    assert!(matches!(err, RemoteError::Timeout { .. }), "{err}");
    drop(listener);
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").expect("bind");
        l.local_addr().expect("addr").port()
    };
    let b = backend(&format!("http://127.0.0.1:{port}"));
    let err = b.sensor_data().unwrap_err();
    assert!(matches!(err, RemoteError::Transport { .. }), "{err}");
}

fn openweather(url: &str) -> OpenWeatherClient {
    OpenWeatherClient::new(&WeatherCfg {
        mode: WeatherMode::OpenWeather,
        base_url: url.to_string(),
        api_key: "k123".into(),
        lat: 31.326,
        lon: 75.5762,
        timeout_ms: 2000,
    })
    .expect("weather client")
}

#[test]
fn openweather_query_and_reply() {
    let (url, server) = serve_once(
        200,
        r#"{"main": {"temp": 31.2, "humidity": 48}, "weather": [{"description": "haze", "icon": "50d"}], "wind": {"speed": 4.6}}"#,
    );
    let w = openweather(&url).current().expect("weather");
    assert_eq!(w.temp_c, 31.2);
    assert_eq!(w.humidity_pct, 48.0);
    assert_eq!(w.description, "haze");
    assert_eq!(w.wind_speed_ms, 4.6);

    let req = server.join().expect("server");
    let line = req.lines().next().unwrap_or_default();
    assert!(line.starts_with("GET /weather?"), "{line}");
    assert!(line.contains("lat=31.326"));
    assert!(line.contains("lon=75.5762"));
    assert!(line.contains("appid=k123"));
    assert!(line.contains("units=metric"));
}

#[test]
fn openweather_rejected_key_is_a_status_error() {
    let (url, server) = serve_once(401, r#"{"cod": 401, "message": "Invalid API key"}"#);
    let err = openweather(&url).current_weather().unwrap_err();
    assert!(matches!(
        err,
        RemoteError::Status {
            endpoint: "/weather",
            status: 401
        }
    ));
    server.join().expect("server");
}
