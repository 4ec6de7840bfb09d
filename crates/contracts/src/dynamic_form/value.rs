//! Coercion helpers for raw JSON values coming from the backend or the DOM
//!
//! Numeric conversion follows the browser's `Number(x)` rules so that forms
//! prefilled from a backend behave the same as the inputs that edit them.

use serde_json::Value;

/// Convert a raw value to a number the way `Number(value)` does.
///
/// Returns `f64::NAN` when the value has no numeric reading.
pub fn js_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => js_number_str(s),
        // [] -> 0, [x] -> Number(String(x)), anything longer is NaN
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => js_number_str(&to_display_string(single)),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// String flavour of [`js_number`]
pub fn js_number_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let lower = trimmed.to_ascii_lowercase();
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let Some(digits) = lower.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN);
        }
    }

    // Rust accepts "inf" / "nan" spellings that the browser rejects
    if lower.contains("inf") || lower.contains("nan") {
        return f64::NAN;
    }

    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric reading of a value, `None` instead of NaN
pub fn to_number(value: &Value) -> Option<f64> {
    let n = js_number(value);
    if n.is_nan() {
        None
    } else {
        Some(n)
    }
}

/// `String(value)` for scalars; arrays are comma-joined, objects serialized
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => format_number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(to_display_string)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Print integral floats without a trailing ".0"
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// JSON number from a float; NaN and infinities become `null`
pub fn number_value(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Empty in the validation sense: null, "" or an empty list
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_js_number_strings() {
        assert_eq!(js_number(&json!("42")), 42.0);
        assert_eq!(js_number(&json!("  3.5 ")), 3.5);
        assert_eq!(js_number(&json!("")), 0.0);
        assert_eq!(js_number(&json!("0x1F")), 31.0);
        assert_eq!(js_number(&json!("-Infinity")), f64::NEG_INFINITY);
        assert!(js_number(&json!("abc")).is_nan());
        assert!(js_number(&json!("inf")).is_nan());
    }

    #[test]
    fn test_js_number_other_values() {
        assert_eq!(js_number(&Value::Null), 0.0);
        assert_eq!(js_number(&json!(true)), 1.0);
        assert_eq!(js_number(&json!([])), 0.0);
        assert_eq!(js_number(&json!(["7"])), 7.0);
        assert!(js_number(&json!([1, 2])).is_nan());
        assert!(js_number(&json!({"a": 1})).is_nan());
    }

    #[test]
    fn test_display_string() {
        assert_eq!(to_display_string(&json!(42)), "42");
        assert_eq!(to_display_string(&json!(4.5)), "4.5");
        assert_eq!(to_display_string(&json!(["a", 1])), "a,1");
        assert_eq!(to_display_string(&Value::Null), "");
    }
}
