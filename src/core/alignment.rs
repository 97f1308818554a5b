//! Request body to feature vector alignment.

use crate::domain::model::{FeatureSchema, FeatureVector, Payload};
use crate::utils::error::{Result, ShimError};
use serde_json::Value;

/// Parse a raw request body into a JSON object.
///
/// The content type is not consulted; anything that is not a JSON object is
/// rejected.
pub fn parse_payload(body: &[u8]) -> Result<Payload> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ShimError::malformed(format!("Failed to parse JSON body: {}", e)))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(ShimError::malformed(format!(
            "Request body must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Build the single-row vector for `payload` in schema order.
///
/// Missing names become 0 and keys outside the schema are ignored.
pub fn align(schema: &FeatureSchema, payload: &Payload) -> Result<FeatureVector> {
    let values = schema
        .names()
        .iter()
        .map(|name| match payload.get(name) {
            Some(value) => coerce(name, value),
            None => Ok(0.0),
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(FeatureVector::from_values(values))
}

/// Convert one payload value to a float.
pub fn coerce(feature: &str, value: &Value) -> Result<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            mismatch(
                feature,
                format!("Feature '{}' does not fit in a float: {}", feature, n),
            )
        })?,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| mismatch(feature, format!("could not convert string to float: '{}'", s)))?,
        other => {
            return Err(mismatch(
                feature,
                format!(
                    "Feature '{}' must be numeric, got {}",
                    feature,
                    json_type_name(other)
                ),
            ))
        }
    };

    if !number.is_finite() {
        return Err(mismatch(feature, "Input X contains NaN or infinity".to_string()));
    }

    Ok(number)
}

fn mismatch(feature: &str, message: String) -> ShimError {
    ShimError::TypeMismatch {
        feature: feature.to_string(),
        message,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
