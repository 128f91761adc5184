//! Weather conditions shown next to the session; never part of control.
use irrigation_traits::{Weather, WeatherSource};

/// Current conditions, or the clear-sky fallback when the source fails.
pub fn read_weather<W: WeatherSource + ?Sized>(source: &W) -> Weather {
    match source.current() {
        Ok(w) => {
            tracing::debug!(temp_c = w.temp_c, description = %w.description, "weather fetched");
            w
        }
        Err(e) => {
            tracing::warn!(error = %e, "weather unavailable; showing fallback conditions");
            Weather::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    struct Sunny;
    impl WeatherSource for Sunny {
        fn current(&self) -> Result<Weather, Box<dyn Error + Send + Sync>> {
            Ok(Weather {
                temp_c: 19.2,
                humidity_pct: 71.0,
                description: "light rain".into(),
                wind_speed_ms: 6.1,
                icon: "10d".into(),
            })
        }
    }

    struct Unreachable;
    impl WeatherSource for Unreachable {
        fn current(&self) -> Result<Weather, Box<dyn Error + Send + Sync>> {
            Err("401 invalid api key".into())
        }
    }

    #[test]
    fn live_conditions_pass_through() {
        let w = read_weather(&Sunny);
        assert_eq!(w.temp_c, 19.2);
        assert_eq!(w.description, "light rain");
    }

    #[test]
    fn failure_shows_fallback() {
        assert_eq!(read_weather(&Unreachable), Weather::fallback());
    }
}
