//! Headless renderer that emits every view update as a `tracing` event.
//!
//! Used by the binary when no graphical front end is attached. High-rate
//! projections (trail, chart) log at `debug`/`trace`; status changes at
//! `info`.

use tracing::{debug, info, trace};

use super::{
    AttitudeRenderer, ChartRenderer, MapRenderer, ObjectRotation, Readout, ReadoutDisplay,
    StatusDisplay,
};
use crate::sinks::waveform::WaveformSample;
use crate::telemetry::TrailPoint;

/// Stateless `tracing`-backed renderer for every view
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRenderer;

impl LogRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl MapRenderer for LogRenderer {
    fn set_marker_position(&mut self, point: TrailPoint) {
        debug!(target: "groundlink::view", lat = point.lat, lon = point.lon, "marker moved");
    }

    fn set_trail(&mut self, points: &[TrailPoint]) {
        trace!(target: "groundlink::view", points = points.len(), "trail repainted");
    }

    fn set_view(&mut self, center: TrailPoint, zoom: u8) {
        info!(target: "groundlink::view", lat = center.lat, lon = center.lon, zoom, "map view centered");
    }
}

impl AttitudeRenderer for LogRenderer {
    fn set_object_rotation(&mut self, rotation: &ObjectRotation) {
        let q = rotation.quaternion.quaternion();
        debug!(
            target: "groundlink::view",
            roll = rotation.roll,
            pitch = rotation.pitch,
            yaw = rotation.yaw,
            qw = q.w,
            qx = q.i,
            qy = q.j,
            qz = q.k,
            "attitude updated"
        );
    }
}

impl ChartRenderer for LogRenderer {
    fn set_chart_series(&mut self, series: &[WaveformSample]) {
        if let Some(last) = series.last() {
            trace!(
                target: "groundlink::view",
                samples = series.len(),
                time = %last.time.to_rfc3339(),
                amplitude = last.amplitude,
                "waveform repainted"
            );
        }
    }
}

impl ReadoutDisplay for LogRenderer {
    fn set_readout(&mut self, readout: Readout, text: &str) {
        trace!(target: "groundlink::view", field = readout.label(), value = text, "readout");
    }
}

impl StatusDisplay for LogRenderer {
    fn set_status_text(&self, text: &str) {
        info!(target: "groundlink::view", "status: {}", text);
    }
}
