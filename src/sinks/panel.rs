//! Telemetry text panel: one readout per snapshot field.

use crate::render::{Readout, ReadoutDisplay};
use crate::telemetry::TelemetrySnapshot;

/// Readout text for every snapshot field, in panel order.
pub fn readouts(snapshot: &TelemetrySnapshot) -> [(Readout, String); 9] {
    [
        (Readout::Mode, snapshot.mode.clone()),
        (Readout::Armed, snapshot.armed_text().to_string()),
        (Readout::Battery, snapshot.battery_text()),
        (Readout::Latitude, snapshot.latitude_text()),
        (Readout::Longitude, snapshot.longitude_text()),
        (Readout::Altitude, snapshot.altitude_text()),
        (Readout::GroundSpeed, snapshot.groundspeed_text()),
        (Readout::FixType, snapshot.fix_type.to_string()),
        (Readout::Satellites, snapshot.satellites.to_string()),
    ]
}

/// Refresh every telemetry readout from `snapshot`.
pub fn project(snapshot: &TelemetrySnapshot, panel: &mut dyn ReadoutDisplay) {
    for (readout, text) in readouts(snapshot) {
        panel.set_readout(readout, &text);
    }
}
