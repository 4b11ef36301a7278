//! # Projection Sinks
//!
//! Independent consumers of normalized state, one per visual projection.
//!
//! This module handles:
//! - Vehicle marker and flight trail ([`position`])
//! - 3D attitude and attitude readouts ([`orientation`])
//! - Rolling sweep waveform ([`waveform`])
//! - Telemetry text panel ([`panel`])
//!
//! Each sink owns its own state (trail buffer, latest attitude, waveform
//! buffer) and is the only writer of it.

pub mod orientation;
pub mod panel;
pub mod position;
pub mod waveform;

pub use orientation::OrientationSink;
pub use position::PositionSink;
pub use waveform::{SweepSample, WaveformSample, WaveformSink};
