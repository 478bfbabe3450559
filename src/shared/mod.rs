pub mod color;
pub mod geo;

pub use color::*;
pub use geo::*;

use serde_json::Value;

/// Trimmed string form of a scalar JSON value. Empty strings count as missing.
pub(crate) fn coerce_string(value: Option<&Value>) -> Option<String> {
    let value = match value? {
        Value::String(value) => value.trim().to_string(),
        Value::Number(value) => value.to_string(),
        Value::Bool(value) => value.to_string(),
        _ => return None,
    };
    if value.is_empty() { None } else { Some(value) }
}

/// Finite number from a JSON number or numeric string.
pub(crate) fn coerce_f64(value: Option<&Value>) -> Option<f64> {
    let value = match value? {
        Value::Number(value) => value.as_f64()?,
        Value::String(value) => value.trim().parse().ok()?,
        _ => return None,
    };
    if value.is_finite() { Some(value) } else { None }
}

#[test]
fn coerce_string_test() {
    use serde_json::json;
    assert_eq!(coerce_string(Some(&json!("  39 "))), Some("39".to_string()));
    assert_eq!(coerce_string(Some(&json!(39))), Some("39".to_string()));
    assert_eq!(coerce_string(Some(&json!("   "))), None);
    assert_eq!(coerce_string(Some(&json!(null))), None);
    assert_eq!(coerce_string(None), None);
}

#[test]
fn coerce_f64_test() {
    use serde_json::json;
    assert_eq!(coerce_f64(Some(&json!("42.35"))), Some(42.35));
    assert_eq!(coerce_f64(Some(&json!(-71.0))), Some(-71.0));
    assert_eq!(coerce_f64(Some(&json!("NaN"))), None);
    assert_eq!(coerce_f64(Some(&json!("north"))), None);
    assert_eq!(coerce_f64(Some(&json!([1.0]))), None);
}
