//! Lenient readers for schemaless documents.
//!
//! Stored documents may miss fields or carry them with the wrong JSON type;
//! readers never fail, they fall back to the empty value of the target type.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::store::Fields;

pub fn string_field(data: &Fields, key: &str) -> String {
    match data.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Numeric coercion: numbers pass through, numeric strings are parsed,
/// anything else (including NaN and infinities) is `0`.
pub fn number_field(data: &Fields, key: &str) -> f64 {
    data.get(key).map(coerce_number).unwrap_or(0.0)
}

pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_number(s),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

/// Parses user input the way a numeric form field does: surrounding
/// whitespace is ignored, empty or malformed input is `0`.
pub fn parse_number(input: &str) -> f64 {
    let n = input.trim().parse::<f64>().unwrap_or(0.0);
    if n.is_finite() { n } else { 0.0 }
}

pub fn decimal_field(data: &Fields, key: &str) -> Decimal {
    match data.get(key) {
        Some(Value::String(s)) => parse_decimal(s),
        Some(value) => decimal_from_f64(coerce_number(value)),
        None => Decimal::ZERO,
    }
}

pub fn parse_decimal(input: &str) -> Decimal {
    let trimmed = input.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or_else(|_| decimal_from_f64(parse_number(trimmed)))
}

pub fn decimal_from_f64(n: f64) -> Decimal {
    Decimal::try_from(n).unwrap_or(Decimal::ZERO)
}

pub fn integer_field(data: &Fields, key: &str) -> i64 {
    number_field(data, key).trunc() as i64
}

pub fn string_list(data: &Fields, key: &str) -> Vec<String> {
    match data.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
