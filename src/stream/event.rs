//! # Inbound Stream Events
//!
//! Named events delivered by the transport and their decoded forms.

use serde_json::Value;
use std::borrow::Cow;

use crate::error::{GroundLinkError, Result};
use crate::sinks::SweepSample;

/// Vehicle telemetry channel
pub const TELEMETRY_EVENT: &str = "telemetry";

/// Signal sweep (waveform) channel
pub const SWEEP_EVENT: &str = "sdr";

/// A decoded event the dispatcher knows how to project
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    /// Raw telemetry payload, normalized downstream
    Telemetry(Value),
    /// One waveform sample
    Sweep(SweepSample),
}

impl InboundEvent {
    /// Decode a named event.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(event))` - a known event
    /// * `Ok(None)` - an event name this dashboard does not consume
    ///
    /// # Errors
    ///
    /// Returns error if a sweep payload lacks `t`/`value` or has the wrong types.
    /// Telemetry payloads never fail here; the normalizer defaults them.
    pub fn decode(name: &str, payload: Value) -> Result<Option<Self>> {
        match name {
            TELEMETRY_EVENT => Ok(Some(InboundEvent::Telemetry(payload))),
            SWEEP_EVENT => {
                let sample: SweepSample = serde_json::from_value(payload)
                    .map_err(|e| GroundLinkError::Decode(format!("invalid sdr payload: {}", e)))?;
                Ok(Some(InboundEvent::Sweep(sample)))
            }
            _ => Ok(None),
        }
    }
}

const NON_FINITE_LITERALS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

/// Replace bare `NaN`, `Infinity` and `-Infinity` tokens with `null`.
///
/// Python's `json` module emits these for non-finite floats; strict JSON
/// parsers reject the whole document. Text inside string literals is left
/// alone.
pub fn sanitize_non_finite(text: &str) -> Cow<'_, str> {
    if !text.contains("NaN") && !text.contains("Infinity") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(lit) = NON_FINITE_LITERALS.iter().find(|lit| rest.starts_with(**lit)) {
            out.push_str("null");
            rest = &rest[lit.len()..];
            continue;
        }

        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

/// Parse JSON, tolerating non-finite number literals.
pub fn parse_lenient(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(&sanitize_non_finite(text))?)
}
