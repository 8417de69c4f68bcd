//! Forgiving extraction of typed configuration values from a JSON object.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value has the wrong shape, the default is returned, so a
//! partial override object never fails to configure a field.

use crate::color::Srgb;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`. Non-finite values fall back to `default`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Extracts a `usize` from a non-negative JSON integer.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `String`.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a color given as a `"#rrggbb"` string.
pub fn param_color(params: &Value, name: &str, default: Srgb) -> Srgb {
    params
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| Srgb::from_hex(s).ok())
        .unwrap_or(default)
}

/// Extracts a two-element numeric array such as `[2, 2]`.
pub fn param_pair(params: &Value, name: &str, default: [f64; 2]) -> [f64; 2] {
    let Some(items) = params.get(name).and_then(Value::as_array) else {
        return default;
    };
    match items.as_slice() {
        [a, b] => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => [a, b],
            _ => default,
        },
        _ => default,
    }
}

/// Extracts a list of strings. Non-string entries are skipped.
pub fn param_string_list(params: &Value, name: &str, default: &[String]) -> Vec<String> {
    params
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_else(|| default.to_vec())
}
