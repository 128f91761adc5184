#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Plain-text rendering for the terminal dashboard.
//!
//! Everything here returns a `String`; the caller decides where it goes.

use std::fmt::Write as _;

use irrigation_core::{CapturedRecommendation, Progress};
use irrigation_traits::{IrrigationRecord, SensorSnapshot, Weather};

/// Rows shown in the history table.
pub const HISTORY_ROWS: usize = 5;

/// `[#####-----]` style bar for a percent in `[0, 100]`.
pub fn render_progress_bar(percent: f64, width: usize) -> String {
    let ratio = if percent.is_finite() {
        (percent / 100.0).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = ((ratio * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// One status line for a running session.
pub fn render_progress_line(target_l: f64, p: Progress, width: usize) -> String {
    format!(
        "Dispensing {target_l:.1} L {} {:5.1}% ({}s remaining)",
        render_progress_bar(p.percent, width),
        p.percent,
        p.remaining.as_secs_f64().ceil() as u64
    )
}

pub fn render_recommendation(rec: &CapturedRecommendation) -> String {
    let mut out = format!(
        "AI Recommendation: {:.2}L\n{}\nRainfall forecast: {:.1} mm",
        rec.predicted_volume_l(),
        rec.recommendation.decision,
        rec.recommendation.rainfall_forecast_mm
    );
    if let Some(w) = &rec.warning {
        let _ = write!(out, "\n(fallback: {w})");
    }
    out
}

/// Soil moisture and field temperature, one reading per line.
pub fn render_sensors(s: &SensorSnapshot) -> String {
    format!(
        "Soil Moisture: {}%\nTemperature: {}°C",
        trim_number(s.soil_moisture),
        trim_number(s.temperature)
    )
}

pub fn render_weather(w: &Weather) -> String {
    let mut out = format!("Weather Conditions: {:.1}°C", w.temp_c);
    if !w.description.is_empty() {
        let _ = write!(out, ", {}", capitalize_words(&w.description));
    }
    let _ = write!(
        out,
        "\nHumidity: {}%  Wind: {} m/s",
        trim_number(w.humidity_pct),
        trim_number(w.wind_speed_ms)
    );
    out
}

pub fn render_last_irrigation(latest: Option<&IrrigationRecord>) -> String {
    match latest {
        Some(r) => format!("Last Irrigation: {}L on {}", trim_number(r.actual_volume_l), r.date),
        None => "Last Irrigation: N/A (no recent irrigation)".to_string(),
    }
}

/// Newest `HISTORY_ROWS` records with the actual-minus-predicted difference.
pub fn render_history_table(records: &[IrrigationRecord]) -> String {
    let mut out = format!(
        "{:<10}  {:>16}  {:>19}  {:>10}\n",
        "Date", "Actual Water (L)", "Predicted Water (L)", "Difference"
    );
    if records.is_empty() {
        out.push_str("(no irrigation history)\n");
        return out;
    }
    for r in records.iter().take(HISTORY_ROWS) {
        let diff = r.actual_volume_l - r.predicted_volume_l;
        let _ = writeln!(
            out,
            "{:<10}  {:>16}  {:>19.2}  {:>9.2}L",
            r.date.to_string(),
            trim_number(r.actual_volume_l),
            r.predicted_volume_l,
            diff
        );
    }
    out
}

// 45.0 -> "45", 15.3 -> "15.3"
fn trim_number(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

// "scattered clouds" -> "Scattered Clouds"
fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use irrigation_core::RecommendationOrigin;
    use irrigation_traits::Recommendation;
    use rstest::rstest;
    use std::time::Duration;

    fn rec(day: u32, actual: f64, predicted: f64) -> IrrigationRecord {
        IrrigationRecord::new(
            NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            actual,
            predicted,
        )
    }

    #[rstest]
    #[case(0.0, "[----------]")]
    #[case(50.0, "[#####-----]")]
    #[case(100.0, "[##########]")]
    #[case(140.0, "[##########]")]
    #[case(-5.0, "[----------]")]
    #[case(f64::NAN, "[----------]")]
    fn bar_is_clamped(#[case] percent: f64, #[case] expected: &str) {
        assert_eq!(render_progress_bar(percent, 10), expected);
    }

    #[test]
    fn progress_line_rounds_remaining_up() {
        let p = Progress {
            percent: 50.0,
            remaining: Duration::from_secs_f64(22.39),
        };
        let line = render_progress_line(30.0, p, 10);
        assert_eq!(line, "Dispensing 30.0 L [#####-----]  50.0% (23s remaining)");
    }

    #[test]
    fn history_table_shows_five_newest_with_difference() {
        let records: Vec<_> = (20..=26).rev().map(|d| rec(d, 45.0, 42.0)).collect();
        let table = render_history_table(&records);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 1 + HISTORY_ROWS);
        assert!(lines[1].starts_with("2025-02-26"));
        assert!(lines[1].ends_with("3.00L"));
        assert!(!table.contains("2025-02-21"));
    }

    #[test]
    fn empty_history_is_explicit() {
        assert!(render_history_table(&[]).contains("no irrigation history"));
        assert_eq!(
            render_last_irrigation(None),
            "Last Irrigation: N/A (no recent irrigation)"
        );
    }

    #[test]
    fn last_irrigation_trims_whole_liters() {
        assert_eq!(
            render_last_irrigation(Some(&rec(25, 45.0, 42.0))),
            "Last Irrigation: 45L on 2025-02-25"
        );
        assert_eq!(
            render_last_irrigation(Some(&rec(25, 15.3, 42.0))),
            "Last Irrigation: 15.3L on 2025-02-25"
        );
    }

    #[test]
    fn recommendation_badge_mentions_fallback() {
        let captured = CapturedRecommendation {
            recommendation: Recommendation::from_forecast(10.05, 32.61),
            origin: RecommendationOrigin::Fallback,
            warning: Some("timed out after 5000 ms".into()),
        };
        let text = render_recommendation(&captured);
        assert!(text.starts_with("AI Recommendation: 10.05L"));
        assert!(text.contains("Rain forecasted"));
        assert!(text.contains("32.6 mm"));
        assert!(text.ends_with("(fallback: timed out after 5000 ms)"));
    }

    #[test]
    fn sensors_show_both_readings() {
        assert_eq!(
            render_sensors(&SensorSnapshot::default()),
            "Soil Moisture: 30%\nTemperature: 28°C"
        );
        let wet = SensorSnapshot {
            soil_moisture: 41.5,
            temperature: 22.0,
        };
        assert!(render_sensors(&wet).starts_with("Soil Moisture: 41.5%"));
    }

    #[test]
    fn weather_card_capitalizes_description() {
        assert_eq!(
            render_weather(&Weather::fallback()),
            "Weather Conditions: 28.5°C, Clear Sky\nHumidity: 60%  Wind: 3.5 m/s"
        );
    }

    #[test]
    fn weather_without_description_omits_it() {
        let w = Weather {
            description: String::new(),
            ..Weather::fallback()
        };
        assert!(render_weather(&w).starts_with("Weather Conditions: 28.5°C\n"));
    }
}
