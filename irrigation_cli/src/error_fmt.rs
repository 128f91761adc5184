//! Human-readable error descriptions and structured JSON error formatting.

use irrigation_core::error::{IrrigationError, StartRejection};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(ie) = err.downcast_ref::<IrrigationError>() {
        return match ie {
            IrrigationError::InvalidStart(StartRejection::TargetOutOfRange { target_l, max_l }) => format!(
                "What happened: Target volume {target_l} L was rejected.\nLikely causes: The target is negative or above the {max_l} L maximum.\nHow to fix: Pick a volume between 0 and {max_l} L, or raise controller.max_volume_l in the config."
            ),
            IrrigationError::InvalidStart(StartRejection::InvalidPrediction(v)) => format!(
                "What happened: Predicted volume {v} L is not usable.\nLikely causes: --predicted was negative or not a number.\nHow to fix: Pass a non-negative --predicted value, or omit it to ask the recommendation service."
            ),
            IrrigationError::InvalidStart(r) => format!(
                "What happened: Irrigation could not start ({r}).\nLikely causes: Another session is still active.\nHow to fix: Wait for the current run to finish or stop it first."
            ),
            IrrigationError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun `irrigate self-check`."
            ),
            IrrigationError::State(msg) => format!(
                "What happened: {msg}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("history csv must have headers") {
        return "Invalid headers in history CSV. Expected 'date,actual_water,predicted_water'.".to_string();
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 invalid start, 3 configuration, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<IrrigationError>() {
        Some(IrrigationError::InvalidStart(_)) => 2,
        Some(IrrigationError::Config(_)) => 3,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<IrrigationError>() {
        Some(IrrigationError::InvalidStart(StartRejection::AlreadyRunning)) => "AlreadyRunning",
        Some(IrrigationError::InvalidStart(StartRejection::NotIdle(_))) => "NotIdle",
        Some(IrrigationError::InvalidStart(StartRejection::TargetOutOfRange { .. })) => {
            "TargetOutOfRange"
        }
        Some(IrrigationError::InvalidStart(StartRejection::InvalidPrediction(_))) => {
            "InvalidPrediction"
        }
        Some(IrrigationError::Config(_)) => "Config",
        Some(IrrigationError::State(_)) => "State",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let details = match err.downcast_ref::<IrrigationError>() {
        Some(IrrigationError::InvalidStart(StartRejection::TargetOutOfRange { target_l, max_l })) => {
            Some(json!({ "target_l": target_l, "max_l": max_l }))
        }
        _ => None,
    };
    let obj = match details {
        Some(d) => json!({ "reason": reason_name(err), "details": d, "message": humanize(err) }),
        None => json!({ "reason": reason_name(err), "message": humanize(err) }),
    };
    obj.to_string()
}
