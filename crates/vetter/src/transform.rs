//! Output coercion: normalizes validated values to their declared type.

use serde_json::{Number, Value};

use crate::kind::ParamKind;
use crate::rules::stringify;

/// Coerces a validated value into the canonical shape for its declared
/// type. Sequences with a scalar target are coerced element-wise;
/// `array` and `timestamp` values pass through unchanged. The coercion
/// is idempotent: transforming an already-transformed value is a no-op.
#[must_use]
pub fn transform(value: Value, kind: ParamKind) -> Value {
    if let Value::Array(items) = value {
        if kind.is_scalar() {
            return Value::Array(
                items
                    .into_iter()
                    .map(|item| transform(item, kind))
                    .collect(),
            );
        }
        return Value::Array(items);
    }
    match kind {
        ParamKind::Int => Value::from(to_i64(&value)),
        ParamKind::Float => float_value(to_f64(&value)),
        ParamKind::Bool => Value::Bool(truthy(&value)),
        ParamKind::String => match value {
            Value::Null => Value::Null,
            Value::String(s) if s == "null" => Value::Null,
            other => Value::String(stringify(&other)),
        },
        ParamKind::Array | ParamKind::Timestamp => value,
    }
}

fn to_i64(value: &Value) -> i64 {
    match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Value::String(s) => parse_i64(s),
        _ => 0,
    }
}

fn parse_i64(s: &str) -> i64 {
    let trimmed = s.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return n;
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return f.trunc() as i64;
    }
    // Leading-numeric prefix, the rest is dropped.
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (i == 0 && c == '-') {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse().unwrap_or(0)
}

fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Rounds to four decimal places, half away from zero.
fn float_value(f: f64) -> Value {
    let rounded = (f * 10_000.0).round() / 10_000.0;
    Number::from_f64(rounded).map_or(Value::Null, Value::Number)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => match s.as_str() {
            // The literal words win over emptiness.
            "true" => true,
            "false" => false,
            other => !other.is_empty() && other != "0",
        },
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
