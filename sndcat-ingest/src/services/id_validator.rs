//! Candidate identifier validation
//!
//! Accepts non-negative integers and strings of decimal digits (after
//! trimming); everything else is rejected with a reason. Rejection is never
//! fatal: the pipeline logs it and moves on to the next candidate.

use serde_json::{Number, Value};
use thiserror::Error;

/// Largest integer an f64 represents exactly (2^53 - 1)
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_991.0;

/// Why a candidate id was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidId {
    #[error("empty identifier")]
    Empty,

    #[error("negative number")]
    Negative,

    #[error("fractional or out-of-range number")]
    NotIntegral,

    #[error("non-numeric string")]
    NotNumeric,

    #[error("unsupported value type: {0}")]
    WrongType(&'static str),
}

/// Validate a raw candidate value, returning the canonical digit string
pub fn validate(raw: &Value) -> Result<String, InvalidId> {
    match raw {
        Value::Number(n) => validate_number(n),
        Value::String(s) => validate_str(s),
        Value::Null => Err(InvalidId::WrongType("null")),
        Value::Bool(_) => Err(InvalidId::WrongType("bool")),
        Value::Array(_) => Err(InvalidId::WrongType("array")),
        Value::Object(_) => Err(InvalidId::WrongType("object")),
    }
}

/// Validate a textual identifier: one or more ASCII digits after trimming
///
/// Leading zeros are kept as given.
pub fn validate_str(raw: &str) -> Result<String, InvalidId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InvalidId::Empty);
    }
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidId::NotNumeric);
    }
    Ok(trimmed.to_string())
}

fn validate_number(n: &Number) -> Result<String, InvalidId> {
    if let Some(value) = n.as_u64() {
        return Ok(value.to_string());
    }
    if n.as_i64().is_some() {
        return Err(InvalidId::Negative);
    }

    // Floats: accept only exactly-representable non-negative integers (42.0)
    match n.as_f64() {
        Some(f) if f.is_finite() && f < 0.0 => Err(InvalidId::Negative),
        Some(f) if f.is_finite() && f.fract() == 0.0 && f <= MAX_EXACT_FLOAT_INT => {
            Ok((f as u64).to_string())
        }
        _ => Err(InvalidId::NotIntegral),
    }
}
