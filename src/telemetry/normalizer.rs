//! # Telemetry Normalizer
//!
//! Converts a raw `telemetry` event payload into a [`TelemetrySnapshot`].
//!
//! The payload is an unordered JSON object where any field may be missing,
//! `null`, or of an unexpected type. Numbers may also arrive as numeric
//! strings. Anything that does not resolve to a finite number falls back to
//! the field default, so no `NaN` ever reaches a sink.
//!
//! | Field | Accepted | Default |
//! |-------|----------|---------|
//! | `mode` | non-empty string | `"unknown"` |
//! | `armed` | bool, number (non-zero = armed) | `false` |
//! | `battery` | finite number, clamped to 0-100; negative = unknown | absent |
//! | `lat` / `lon` | finite number inside WGS84 bounds | absent |
//! | `alt` | finite number (m) | `0.0` |
//! | `groundspeed` | finite number (m/s) | `0.0` |
//! | `fix_type` | MAVLink code or name | `Unknown` |
//! | `satellites` | finite non-negative number | `0` |
//! | `roll` / `pitch` / `yaw` | finite numbers (deg); yaw gates the triple | absent |

use serde_json::{Map, Value};

use super::snapshot::{FixType, Orientation, TelemetrySnapshot, UNKNOWN_MODE};

/// Normalize any JSON value. Non-object payloads yield the default snapshot.
pub fn normalize_value(raw: &Value) -> TelemetrySnapshot {
    match raw.as_object() {
        Some(fields) => normalize(fields),
        None => TelemetrySnapshot::default(),
    }
}

/// Normalize a raw telemetry mapping. Pure; never fails.
pub fn normalize(raw: &Map<String, Value>) -> TelemetrySnapshot {
    let latitude = finite(raw.get("lat")).filter(|lat| (-90.0..=90.0).contains(lat));
    let longitude = finite(raw.get("lon")).filter(|lon| (-180.0..=180.0).contains(lon));

    TelemetrySnapshot {
        mode: mode(raw.get("mode")),
        armed: armed(raw.get("armed")),
        battery: battery(raw.get("battery")),
        latitude,
        longitude,
        altitude: finite(raw.get("alt")).unwrap_or(0.0),
        groundspeed: finite(raw.get("groundspeed")).unwrap_or(0.0),
        fix_type: fix_type(raw.get("fix_type")),
        satellites: satellites(raw.get("satellites")),
        orientation: orientation(raw),
    }
}

/// Extract a finite `f64` from a number or numeric string.
fn finite(value: Option<&Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn mode(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => UNKNOWN_MODE.to_string(),
    }
}

fn armed(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(_)) => finite(value).map(|n| n != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "armed"),
        _ => false,
    }
}

fn battery(value: Option<&Value>) -> Option<f64> {
    // MAVLink reports -1 for "unknown"
    finite(value)
        .filter(|pct| *pct >= 0.0)
        .map(|pct| pct.min(100.0))
}

fn fix_type(value: Option<&Value>) -> FixType {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0).map(|f| f as i64))
            .map(FixType::from_code)
            .unwrap_or_default(),
        Some(Value::String(s)) => FixType::from_name(s),
        _ => FixType::Unknown,
    }
}

fn satellites(value: Option<&Value>) -> u32 {
    finite(value)
        .filter(|n| *n >= 0.0)
        .map(|n| n.floor() as u32)
        .unwrap_or(0)
}

/// Yaw is the sentinel for a full attitude triple.
fn orientation(raw: &Map<String, Value>) -> Option<Orientation> {
    let yaw = finite(raw.get("yaw"))?;
    Some(Orientation {
        roll: finite(raw.get("roll")).unwrap_or(0.0),
        pitch: finite(raw.get("pitch")).unwrap_or(0.0),
        yaw,
    })
}
