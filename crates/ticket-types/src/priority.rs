//! Priority coercion
//!
//! Priorities arrive as arbitrary JSON from browser forms (which send `"2"`)
//! and scripts (which send `2`). Both are accepted; anything that does not
//! convert to an integer is rejected rather than silently defaulted.

use serde_json::Value;
use thiserror::Error;

/// Reasons a JSON value cannot be used as a priority
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PriorityError {
    #[error("priority must not be null")]
    Null,

    #[error("priority is not an integer: {0:?}")]
    NotAnInteger(String),

    #[error("priority is out of range: {0}")]
    OutOfRange(String),

    #[error("priority cannot be a JSON {0}")]
    UnsupportedType(&'static str),
}

/// Convert a JSON value to an integer priority.
///
/// Integers pass through, floats are truncated toward zero, booleans map to
/// 0/1 and strings are trimmed and parsed as base-10 integers.
pub fn coerce_priority(value: &Value) -> Result<i64, PriorityError> {
    match value {
        Value::Null => Err(PriorityError::Null),
        Value::Bool(flag) => Ok(i64::from(*flag)),
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Ok(int);
            }
            if number.is_u64() {
                return Err(PriorityError::OutOfRange(number.to_string()));
            }
            number
                .as_f64()
                .and_then(truncate)
                .ok_or_else(|| PriorityError::OutOfRange(number.to_string()))
        }
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| PriorityError::NotAnInteger(text.clone())),
        Value::Array(_) => Err(PriorityError::UnsupportedType("array")),
        Value::Object(_) => Err(PriorityError::UnsupportedType("object")),
    }
}

fn truncate(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    let truncated = value.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is itself out of range
    if truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return None;
    }
    Some(truncated as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_and_numeric_strings() {
        assert_eq!(coerce_priority(&json!(2)), Ok(2));
        assert_eq!(coerce_priority(&json!(-4)), Ok(-4));
        assert_eq!(coerce_priority(&json!("0")), Ok(0));
        assert_eq!(coerce_priority(&json!(" 7 ")), Ok(7));
        assert_eq!(coerce_priority(&json!("+3")), Ok(3));
    }

    #[test]
    fn test_floats_truncate_toward_zero() {
        assert_eq!(coerce_priority(&json!(2.9)), Ok(2));
        assert_eq!(coerce_priority(&json!(-2.9)), Ok(-2));
        assert!(matches!(
            coerce_priority(&json!(1e300)),
            Err(PriorityError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(coerce_priority(&json!(true)), Ok(1));
        assert_eq!(coerce_priority(&json!(false)), Ok(0));
    }

    #[test]
    fn test_rejects_non_integers() {
        assert_eq!(coerce_priority(&json!(null)), Err(PriorityError::Null));
        assert!(matches!(
            coerce_priority(&json!("high")),
            Err(PriorityError::NotAnInteger(_))
        ));
        assert!(matches!(
            coerce_priority(&json!("2.5")),
            Err(PriorityError::NotAnInteger(_))
        ));
        assert!(matches!(
            coerce_priority(&json!("")),
            Err(PriorityError::NotAnInteger(_))
        ));
        assert_eq!(
            coerce_priority(&json!([1])),
            Err(PriorityError::UnsupportedType("array"))
        );
        assert_eq!(
            coerce_priority(&json!({"level": 1})),
            Err(PriorityError::UnsupportedType("object"))
        );
    }

    #[test]
    fn test_u64_beyond_i64_is_out_of_range() {
        let value: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert!(matches!(
            coerce_priority(&value),
            Err(PriorityError::OutOfRange(_))
        ));
    }
}
