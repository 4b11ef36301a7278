//! # Telemetry Module
//!
//! Turns raw `telemetry` events into typed vehicle state.
//!
//! This module handles:
//! - The normalized [`TelemetrySnapshot`](snapshot::TelemetrySnapshot) model
//! - Defaulting partial or malformed payloads ([`normalizer`])
//! - Recording snapshots to rotating JSONL files ([`recorder`])

pub mod normalizer;
pub mod recorder;
pub mod snapshot;

pub use normalizer::{normalize, normalize_value};
pub use snapshot::{FixType, Orientation, TelemetrySnapshot, TrailPoint};
