#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject anything, but must never panic.
    let Ok(cfg) = toml::from_str::<irrigation_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        // Accepted configs must be usable by the controller as-is.
        assert!(cfg.controller.flow_rate_lps > 0.0);
        assert!((1..=60_000).contains(&cfg.controller.tick_ms));
        assert!(
            (0.0..=cfg.controller.max_volume_l).contains(&cfg.recommendation.fallback_volume_l)
        );
        assert!((-90.0..=90.0).contains(&cfg.weather.lat));
        assert!((-180.0..=180.0).contains(&cfg.weather.lon));
    }
});
