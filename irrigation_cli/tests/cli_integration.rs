use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Sim backend with a fast pump so runs finish in well under a second
fn write_fast_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[controller]
flow_rate_lps = 50.0
max_volume_l = 80.0
tick_ms = 20

[recommendation]
fallback_volume_l = 10.05
timeout_ms = 500

[backend]
mode = "sim"

[history]
refresh_secs = 300
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn irrigate(cfg: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("irrigate").unwrap();
    cmd.arg("--config").arg(cfg).arg("--log-level").arg("error");
    cmd
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["start", "--liters", "5"], 0, "Irrigation complete: 5.0 L dispensed", "stdout")]
#[case(&["start"], 2, "required", "stderr")]
#[case(&["start", "--liters", "81"], 2, "between 0 and 80 L", "stderr")]
#[case(&["start", "--liters=-1"], 2, "rejected", "stderr")]
#[case(&["predict"], 0, "Less Water Needed: 10.05 liters (Rain forecasted)", "stdout")]
#[case(&["predict"], 0, "Soil Moisture: 30%", "stdout")]
#[case(&["predict"], 0, "Weather Conditions: 28.5°C, Clear Sky", "stdout")]
#[case(&["start", "--liters", "5"], 0, "Humidity: 60%  Wind: 3.5 m/s", "stdout")]
#[case(&["history"], 0, "Last Irrigation: 45L on 2025-02-25", "stdout")]
#[case(&["self-check"], 0, "OK: backend sim", "stdout")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);

    let mut cmd = irrigate(&cfg);
    cmd.args(args);

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn start_json_emits_event_lines() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);

    let out = irrigate(&cfg)
        .args(["--json", "start", "--liters", "2", "--predicted", "1.5"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).expect("every stdout line is JSON"))
        .collect();

    assert_eq!(events.first().unwrap()["event"], "started");
    assert_eq!(events.first().unwrap()["predicted_l"], 1.5);
    let last = events.last().unwrap();
    assert_eq!(last["event"], "completed");
    assert_eq!(last["dispensed_l"], 2.0);
    assert_eq!(last["record"]["actual_water"], 2.0);
    assert_eq!(last["record"]["predicted_water"], 1.5);
    assert!(events.iter().any(|e| e["event"] == "progress"));
}

#[rstest]
fn offline_backend_falls_back() {
    let dir = tempdir().unwrap();
    let cfg = write_fast_config(&dir);

    let out = irrigate(&cfg)
        .env("IRRIGATE_SIM_OFFLINE", "1")
        .args(["--json", "predict"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("json");
    assert_eq!(v["origin"], "fallback");
    assert_eq!(v["predicted_water"], 10.05);
    assert_eq!(v["sensors"]["soil_moisture"], 30.0);
    assert_eq!(v["weather"]["temp"], 28.5);
    assert_eq!(v["weather"]["description"], "Clear sky");

    irrigate(&cfg)
        .env("IRRIGATE_SIM_OFFLINE", "1")
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-02-21"));
}

#[rstest]
fn history_csv_overrides_backend() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("history.csv");
    let mut f = fs::File::create(&csv).unwrap();
    writeln!(f, "date,actual_water,predicted_water").unwrap();
    writeln!(f, "2025-04-01,12.5,11").unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        format!("[history]\ncsv = {:?}\n", csv.to_string_lossy()),
    )
    .unwrap();

    irrigate(&cfg)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("Last Irrigation: 12.5L on 2025-04-01"));
}

#[rstest]
fn invalid_config_exits_three() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[controller]\nflow_rate_lps = 0.0\n").unwrap();

    irrigate(&cfg)
        .arg("self-check")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("flow_rate_lps must be > 0"));
}

#[rstest]
fn invalid_config_json_error() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[backend]\nmode = \"http\"\nbase_url = \"localhost\"\n").unwrap();

    let out = irrigate(&cfg)
        .args(["--json", "self-check"])
        .assert()
        .code(3)
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).expect("json error object");
    assert_eq!(v["reason"], "Config");
}

#[rstest]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    irrigate(&missing).arg("self-check").assert().code(3);
}

#[rstest]
fn bad_history_csv_falls_back_to_placeholder() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("history.csv");
    fs::write(&csv, "day,water\n2025-04-01,1\n").unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(
        &cfg,
        format!("[history]\ncsv = {:?}\n", csv.to_string_lossy()),
    )
    .unwrap();

    // Unreadable history degrades to the placeholder set.
    irrigate(&cfg)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("2025-02-25"));
}

#[rstest]
fn openweather_without_key_is_a_config_error() {
    let dir = tempdir().unwrap();
    let cfg = dir.path().join("cfg.toml");
    fs::write(&cfg, "[weather]\nmode = \"openweather\"\n").unwrap();

    irrigate(&cfg)
        .arg("predict")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("weather.api_key is required"));
}
