//! # Position Sink
//!
//! Moves the vehicle marker and extends the flight trail.
//!
//! A snapshot without a valid coordinate pair is ignored entirely: the
//! marker stays where it was and the trail keeps its history.

use tracing::trace;

use crate::render::MapRenderer;
use crate::ring_buffer::{RingBuffer, TRAIL_CAPACITY};
use crate::telemetry::{TelemetrySnapshot, TrailPoint};

/// Owns the trail buffer and the last marker position
#[derive(Debug, Clone)]
pub struct PositionSink {
    trail: RingBuffer<TrailPoint>,
    marker: Option<TrailPoint>,
}

impl Default for PositionSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionSink {
    pub fn new() -> Self {
        Self {
            trail: RingBuffer::new(TRAIL_CAPACITY),
            marker: None,
        }
    }

    /// Project one snapshot onto the map.
    ///
    /// Returns `true` if the marker and trail were updated.
    pub fn project(&mut self, snapshot: &TelemetrySnapshot, map: &mut dyn MapRenderer) -> bool {
        let Some(point) = snapshot.position() else {
            trace!("No valid coordinate; position unchanged");
            return false;
        };

        self.marker = Some(point);
        map.set_marker_position(point);

        self.trail.push(point);
        map.set_trail(&self.trail.to_ordered_vec());
        true
    }

    /// Trail points, oldest first
    pub fn trail(&self) -> Vec<TrailPoint> {
        self.trail.to_ordered_vec()
    }

    /// Last accepted coordinate
    pub fn marker(&self) -> Option<TrailPoint> {
        self.marker
    }
}
