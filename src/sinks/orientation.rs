//! # Orientation Sink
//!
//! Applies the vehicle attitude to the 3D model and the attitude readouts.
//!
//! ## Rotation convention
//!
//! Angles arrive in degrees and are converted to radians. The rotation is
//! the aerospace Tait-Bryan ZYX sequence:
//!
//! | Angle | Axis | Body axis |
//! |-------|------|-----------|
//! | roll  | X | longitudinal |
//! | pitch | Y | lateral |
//! | yaw   | Z | vertical |
//!
//! Composed as `R = Rz(yaw) · Ry(pitch) · Rx(roll)`: roll is applied
//! first, then pitch, then yaw, each about the fixed frame (equivalently
//! yaw, pitch', roll'' about the moving body frame). This is the aerospace
//! ZYX reading of "roll, then pitch, then yaw", chosen on purpose over the
//! literal roll-first intrinsic order. The order never changes between
//! frames, so the same triple always produces the same attitude.
//!
//! Only snapshots carrying yaw update anything; without it the previous
//! attitude and readouts stay on screen.

use nalgebra::UnitQuaternion;
use tracing::trace;

use crate::render::{AttitudeRenderer, ObjectRotation, Readout, ReadoutDisplay};
use crate::telemetry::{Orientation, TelemetrySnapshot};

/// Convert a degree triple into the renderer rotation.
pub fn rotation_from_degrees(orientation: &Orientation) -> ObjectRotation {
    let roll = orientation.roll.to_radians();
    let pitch = orientation.pitch.to_radians();
    let yaw = orientation.yaw.to_radians();

    ObjectRotation {
        roll,
        pitch,
        yaw,
        quaternion: UnitQuaternion::from_euler_angles(roll, pitch, yaw),
    }
}

/// Holds the latest attitude; no history
#[derive(Debug, Clone, Default)]
pub struct OrientationSink {
    current: Option<Orientation>,
}

impl OrientationSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Project one snapshot onto the 3D view and attitude readouts.
    ///
    /// Returns `true` if the snapshot carried an attitude.
    pub fn project(
        &mut self,
        snapshot: &TelemetrySnapshot,
        renderer: &mut dyn AttitudeRenderer,
        panel: &mut dyn ReadoutDisplay,
    ) -> bool {
        let Some(orientation) = snapshot.orientation else {
            trace!("No yaw in snapshot; attitude unchanged");
            return false;
        };

        self.current = Some(orientation);
        renderer.set_object_rotation(&rotation_from_degrees(&orientation));

        panel.set_readout(Readout::Roll, &format!("{:.1}", orientation.roll));
        panel.set_readout(Readout::Pitch, &format!("{:.1}", orientation.pitch));
        panel.set_readout(Readout::Yaw, &format!("{:.1}", orientation.yaw));
        true
    }

    /// Latest applied attitude in degrees
    pub fn current(&self) -> Option<Orientation> {
        self.current
    }
}
