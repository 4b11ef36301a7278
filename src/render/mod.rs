//! # Rendering Collaborators
//!
//! Trait seams between the projection sinks and whatever draws the
//! dashboard (map tiles, 3D model, chart, text panel, status line).
//!
//! The core only pushes state into a renderer; it never reads anything
//! back. Each sink owns the renderer it draws to, except the status line
//! which is shared by the stream dispatcher and the command gateway and
//! therefore takes `&self`.

pub mod log;

use nalgebra::UnitQuaternion;

use crate::sinks::waveform::WaveformSample;
use crate::telemetry::TrailPoint;

pub use self::log::LogRenderer;

/// Map view: vehicle marker, flight trail, and camera
pub trait MapRenderer: Send {
    /// Move the vehicle marker
    fn set_marker_position(&mut self, point: TrailPoint);

    /// Replace the trail polyline, oldest point first
    fn set_trail(&mut self, points: &[TrailPoint]);

    /// Center the view on `center` at tile `zoom`
    fn set_view(&mut self, center: TrailPoint, zoom: u8);
}

/// Rotation handed to the 3D renderer.
///
/// Angles are radians. `quaternion` is the composed body-to-world rotation
/// (see [`crate::sinks::orientation`] for the axis order).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectRotation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub quaternion: UnitQuaternion<f64>,
}

/// 3D attitude view
pub trait AttitudeRenderer: Send {
    fn set_object_rotation(&mut self, rotation: &ObjectRotation);
}

/// Time-series chart
pub trait ChartRenderer: Send {
    /// Replace the whole series, oldest sample first
    fn set_chart_series(&mut self, series: &[WaveformSample]);
}

/// Text readouts on the telemetry panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Readout {
    Mode,
    Armed,
    Battery,
    Latitude,
    Longitude,
    Altitude,
    GroundSpeed,
    FixType,
    Satellites,
    Roll,
    Pitch,
    Yaw,
}

impl Readout {
    pub fn label(self) -> &'static str {
        match self {
            Readout::Mode => "mode",
            Readout::Armed => "armed",
            Readout::Battery => "battery",
            Readout::Latitude => "lat",
            Readout::Longitude => "lon",
            Readout::Altitude => "alt",
            Readout::GroundSpeed => "gs",
            Readout::FixType => "fix",
            Readout::Satellites => "sats",
            Readout::Roll => "roll",
            Readout::Pitch => "pitch",
            Readout::Yaw => "yaw",
        }
    }
}

/// Telemetry text panel
pub trait ReadoutDisplay: Send {
    fn set_readout(&mut self, readout: Readout, text: &str);
}

/// Single-line status indicator (connectivity and command results)
pub trait StatusDisplay: Send + Sync {
    fn set_status_text(&self, text: &str);
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Recorded map renderer state
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct MapState {
        pub marker: Option<TrailPoint>,
        pub trail: Vec<TrailPoint>,
        pub view: Option<(TrailPoint, u8)>,
        pub marker_updates: usize,
        pub trail_updates: usize,
    }

    /// Mock map renderer for testing
    #[derive(Clone, Default)]
    pub struct MockMap {
        pub state: Arc<Mutex<MapState>>,
    }

    impl MockMap {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn snapshot(&self) -> MapState {
            self.state.lock().unwrap().clone()
        }
    }

    impl MapRenderer for MockMap {
        fn set_marker_position(&mut self, point: TrailPoint) {
            let mut state = self.state.lock().unwrap();
            state.marker = Some(point);
            state.marker_updates += 1;
        }

        fn set_trail(&mut self, points: &[TrailPoint]) {
            let mut state = self.state.lock().unwrap();
            state.trail = points.to_vec();
            state.trail_updates += 1;
        }

        fn set_view(&mut self, center: TrailPoint, zoom: u8) {
            self.state.lock().unwrap().view = Some((center, zoom));
        }
    }

    /// Mock 3D renderer for testing
    #[derive(Clone, Default)]
    pub struct MockAttitude {
        pub rotations: Arc<Mutex<Vec<ObjectRotation>>>,
    }

    impl MockAttitude {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn rotations(&self) -> Vec<ObjectRotation> {
            self.rotations.lock().unwrap().clone()
        }
    }

    impl AttitudeRenderer for MockAttitude {
        fn set_object_rotation(&mut self, rotation: &ObjectRotation) {
            self.rotations.lock().unwrap().push(*rotation);
        }
    }

    /// Mock chart renderer for testing; keeps every repaint
    #[derive(Clone, Default)]
    pub struct MockChart {
        pub repaints: Arc<Mutex<Vec<Vec<WaveformSample>>>>,
    }

    impl MockChart {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn last_series(&self) -> Vec<WaveformSample> {
            self.repaints.lock().unwrap().last().cloned().unwrap_or_default()
        }

        pub fn repaint_count(&self) -> usize {
            self.repaints.lock().unwrap().len()
        }
    }

    impl ChartRenderer for MockChart {
        fn set_chart_series(&mut self, series: &[WaveformSample]) {
            self.repaints.lock().unwrap().push(series.to_vec());
        }
    }

    /// Mock readout panel for testing
    #[derive(Clone, Default)]
    pub struct MockReadouts {
        pub values: Arc<Mutex<HashMap<Readout, String>>>,
        pub updates: Arc<Mutex<usize>>,
    }

    impl MockReadouts {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get(&self, readout: Readout) -> Option<String> {
            self.values.lock().unwrap().get(&readout).cloned()
        }

        pub fn all(&self) -> HashMap<Readout, String> {
            self.values.lock().unwrap().clone()
        }

        pub fn update_count(&self) -> usize {
            *self.updates.lock().unwrap()
        }
    }

    impl ReadoutDisplay for MockReadouts {
        fn set_readout(&mut self, readout: Readout, text: &str) {
            self.values.lock().unwrap().insert(readout, text.to_string());
            *self.updates.lock().unwrap() += 1;
        }
    }

    /// Mock status line for testing
    #[derive(Clone, Default)]
    pub struct MockStatus {
        pub texts: Arc<Mutex<Vec<String>>>,
    }

    impl MockStatus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn last(&self) -> Option<String> {
            self.texts.lock().unwrap().last().cloned()
        }

        pub fn history(&self) -> Vec<String> {
            self.texts.lock().unwrap().clone()
        }
    }

    impl StatusDisplay for MockStatus {
        fn set_status_text(&self, text: &str) {
            self.texts.lock().unwrap().push(text.to_string());
        }
    }
}
