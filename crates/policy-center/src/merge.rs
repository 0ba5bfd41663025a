use serde_json::Value;

use decision_engine::ScorerFailurePolicy;

use crate::errors::PolicyError;
use crate::model::{PolicySnapshot, PolicySource};

/// Every path a layer may set. Later layers replace earlier ones.
pub(crate) const KNOWN_PATHS: [&str; 6] = [
    "scheduler.interval_ms",
    "scheduler.max_in_flight",
    "decision.block_threshold",
    "decision.scorer_timeout_ms",
    "decision.on_scorer_error",
    "actions.suppression_filter",
];

pub(crate) fn apply_override_to_snapshot(
    snapshot: &mut PolicySnapshot,
    path: &str,
    value: &Value,
    source: PolicySource,
) -> Result<(), PolicyError> {
    match path {
        "scheduler.interval_ms" => {
            snapshot.scheduler.interval_ms = to_positive_u64(path, value)?;
        }
        "scheduler.max_in_flight" => {
            snapshot.scheduler.max_in_flight = to_positive_u64(path, value)? as usize;
        }
        "decision.block_threshold" => {
            snapshot.decision.block_threshold = to_finite_f64(path, value)?;
        }
        "decision.scorer_timeout_ms" => {
            snapshot.decision.scorer_timeout_ms = to_positive_u64(path, value)?;
        }
        "decision.on_scorer_error" => {
            snapshot.decision.on_scorer_error = to_failure_policy(value)?;
        }
        "actions.suppression_filter" => {
            let filter = to_string(value)?;
            if filter.trim().is_empty() {
                return Err(PolicyError::InvalidValue(format!("{path} must not be empty")));
            }
            snapshot.actions.suppression_filter = filter;
        }
        path => return Err(PolicyError::UnsupportedPath(path.to_string())),
    }
    snapshot.set_provenance(path, source);
    Ok(())
}

fn to_positive_u64(path: &str, value: &Value) -> Result<u64, PolicyError> {
    let parsed = value
        .as_u64()
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected integer, got {value}")))?;
    if parsed == 0 {
        return Err(PolicyError::InvalidValue(format!("{path} must be positive")));
    }
    Ok(parsed)
}

fn to_finite_f64(path: &str, value: &Value) -> Result<f64, PolicyError> {
    let parsed = match value {
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        other => other.as_f64(),
    }
    .ok_or_else(|| PolicyError::InvalidValue(format!("expected number, got {value}")))?;
    if !parsed.is_finite() {
        return Err(PolicyError::InvalidValue(format!("{path} must be finite")));
    }
    Ok(parsed)
}

fn to_string(value: &Value) -> Result<String, PolicyError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| PolicyError::InvalidValue(format!("expected string, got {value}")))
}

fn to_failure_policy(value: &Value) -> Result<ScorerFailurePolicy, PolicyError> {
    to_string(value)?
        .parse::<ScorerFailurePolicy>()
        .map_err(PolicyError::InvalidValue)
}
