use std::fmt;

use serde_json::{Number, Value};

use crate::http::outcome::RequestOutcome;

/// Largest integer a double represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug)]
pub enum RenderError {
    /// A 2xx body that is not valid JSON
    MalformedJson { source: serde_json::Error },

    /// Parsed value could not be written back out
    Serialize { source: serde_json::Error },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::MalformedJson { source } => {
                write!(f, "Success body is not valid JSON: {}", source)
            }
            RenderError::Serialize { source } => {
                write!(f, "Failed to pretty-print JSON: {}", source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::MalformedJson { source } | RenderError::Serialize { source } => Some(source),
        }
    }
}

/// Re-serialize a JSON body with 2-space indentation, keeping key order.
/// Whole-valued numbers print without a fraction (`1.0` and `1e2` become
/// `1` and `100`; `-0` becomes `0`).
pub fn pretty_json(body: &str) -> Result<String, RenderError> {
    let mut value: Value =
        serde_json::from_str(body).map_err(|e| RenderError::MalformedJson { source: e })?;
    integralize_numbers(&mut value);
    serde_json::to_string_pretty(&value).map_err(|e| RenderError::Serialize { source: e })
}

fn integralize_numbers(value: &mut Value) {
    match value {
        Value::Number(n) => {
            if !n.is_f64() {
                return;
            }
            let Some(f) = n.as_f64() else { return };
            if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                *n = Number::from(f as i64);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(integralize_numbers),
        Value::Object(map) => map.values_mut().for_each(integralize_numbers),
        _ => {}
    }
}

/// Text to place in the output slot: pretty JSON on success, the raw body
/// otherwise.
pub fn render_outcome(outcome: &RequestOutcome) -> Result<String, RenderError> {
    match outcome {
        RequestOutcome::Success { body, .. } => pretty_json(body),
        RequestOutcome::Failure { body, .. } => Ok(body.clone()),
    }
}
