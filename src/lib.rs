//! # GroundLink Library
//!
//! Operator dashboard core for a remotely piloted vehicle.
//!
//! This library subscribes to a live telemetry stream, normalizes each
//! telemetry event, and fans it out to independent projections (map trail,
//! 3D attitude, telemetry panel, sweep waveform) under bounded memory.
//! Operator commands (flight mode, arm/disarm) travel out-of-band through
//! the [`command`] gateway and never block the stream.

pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod render;
pub mod ring_buffer;
pub mod sinks;
pub mod stream;
pub mod telemetry;
