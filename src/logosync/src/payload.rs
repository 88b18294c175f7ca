//! Numeric parsing for heterogeneous sensor payloads.
//!
//! MQTT sensor topics deliver readings in whatever shape the device firmware
//! picked: a bare number, a JSON object with some well-known key, or a
//! human-formatted string with a trailing unit. Parsing is an ordered list
//! of pure strategies tried in sequence; the first success wins.
//!
//! The ordering is a contract — changing it changes behavior:
//! 1. plain numeric literal (trimmed),
//! 2. JSON: object keys `value`, `temperature`, `temp`, `humidity`,
//!    `reading` (in that order), then a bare JSON number or quoted numeric
//!    string,
//! 3. leading numeric prefix with trailing unit text (e.g. `"23.5°C"`).
//!
//! Every strategy is total: it returns `Option<f64>` and never panics.

use serde_json::Value;

/// Well-known JSON keys carrying the reading, tried in order.
const VALUE_KEYS: [&str; 5] = ["value", "temperature", "temp", "humidity", "reading"];

type Strategy = fn(&str) -> Option<f64>;

const STRATEGIES: [Strategy; 3] = [parse_plain_number, parse_json_payload, parse_leading_number];

/// Parse a raw sensor payload into a numeric reading, if any strategy
/// recognizes it.
pub fn parse_sensor_value(raw: &str) -> Option<f64> {
    STRATEGIES
        .iter()
        .find_map(|strategy| strategy(raw))
        .filter(|v| v.is_finite())
}

/// Strategy 1: the whole trimmed payload is a numeric literal.
fn parse_plain_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

/// Strategy 2: JSON payload, either an object with a well-known value key
/// or a bare number. Nested objects are not descended into.
fn parse_json_payload(raw: &str) -> Option<f64> {
    let value: Value = serde_json::from_str(raw.trim()).ok()?;
    match value {
        Value::Object(map) => VALUE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(coerce_number)),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Numbers arrive as JSON numbers or as quoted strings, device depending.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Strategy 3: numeric prefix with trailing unit text, like `"23.5°C"` or
/// `"1013 hPa"`. A sign is accepted; anything after the number is ignored.
fn parse_leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let mut end = 0;
    for (idx, ch) in trimmed.char_indices() {
        let accept = ch.is_ascii_digit()
            || ch == '.'
            || ((ch == '-' || ch == '+') && idx == 0);
        if accept {
            end = idx + ch.len_utf8();
        } else {
            break;
        }
    }
    if end == 0 {
        return None;
    }
    trimmed[..end].parse::<f64>().ok()
}
