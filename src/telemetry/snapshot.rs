//! # Telemetry Snapshot Types
//!
//! Fully-defaulted vehicle state derived from one inbound telemetry event.

use serde::Serialize;
use std::fmt;

/// Placeholder shown for values the vehicle did not report
pub const NO_VALUE: &str = "—";

/// Flight mode reported when the payload carries none
pub const UNKNOWN_MODE: &str = "unknown";

/// GPS positioning quality (MAVLink `GPS_FIX_TYPE` codes 0-8)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FixType {
    /// No GPS connected
    NoGps,
    /// GPS connected, no position fix
    NoFix,
    /// 2D position
    #[serde(rename = "FIX_2D")]
    Fix2D,
    /// 3D position
    #[serde(rename = "FIX_3D")]
    Fix3D,
    /// DGPS/SBAS aided 3D position
    Dgps,
    /// RTK float
    RtkFloat,
    /// RTK fixed
    RtkFixed,
    /// Static fixed (base stations)
    Static,
    /// Precise point positioning
    Ppp,
    /// Not reported or unrecognised
    #[default]
    Unknown,
}

impl FixType {
    /// Maps a MAVLink integer fix code.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => FixType::NoGps,
            1 => FixType::NoFix,
            2 => FixType::Fix2D,
            3 => FixType::Fix3D,
            4 => FixType::Dgps,
            5 => FixType::RtkFloat,
            6 => FixType::RtkFixed,
            7 => FixType::Static,
            8 => FixType::Ppp,
            _ => FixType::Unknown,
        }
    }

    /// Maps a textual fix name ("3D", "GPS_FIX_TYPE_3D_FIX", "rtk_fixed", ...).
    pub fn from_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let key = upper
            .strip_prefix("GPS_FIX_TYPE_")
            .unwrap_or(upper.as_str())
            .trim_end_matches("_FIX");

        if let Ok(code) = key.parse::<i64>() {
            return Self::from_code(code);
        }

        match key {
            "NO_GPS" => FixType::NoGps,
            "NO" | "NONE" | "NO_FIX" => FixType::NoFix,
            "2D" => FixType::Fix2D,
            "3D" => FixType::Fix3D,
            "DGPS" => FixType::Dgps,
            "RTK_FLOAT" | "RTK_FLOAT_FIX" => FixType::RtkFloat,
            "RTK_FIXED" => FixType::RtkFixed,
            "STATIC" => FixType::Static,
            "PPP" => FixType::Ppp,
            _ => FixType::Unknown,
        }
    }
}

impl fmt::Display for FixType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FixType::NoGps => "No GPS",
            FixType::NoFix => "No fix",
            FixType::Fix2D => "2D",
            FixType::Fix3D => "3D",
            FixType::Dgps => "DGPS",
            FixType::RtkFloat => "RTK float",
            FixType::RtkFixed => "RTK fixed",
            FixType::Static => "Static",
            FixType::Ppp => "PPP",
            FixType::Unknown => NO_VALUE,
        };
        f.write_str(label)
    }
}

/// A geographic coordinate accepted onto the position trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailPoint {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lon: f64,
}

impl TrailPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates finite and inside WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

/// Vehicle attitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Orientation {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Normalized vehicle state at one instant.
///
/// Built fresh for every telemetry event by
/// [`normalize`](crate::telemetry::normalizer::normalize). Every field
/// already holds either a reported value or its default, so sinks never
/// branch on missing input except where absence itself carries meaning
/// (`battery`, the coordinates, and `orientation`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    /// Flight mode name, `"unknown"` if not reported
    pub mode: String,
    /// Motors armed
    pub armed: bool,
    /// Remaining battery (0-100 %), absent if not reported
    pub battery: Option<f64>,
    /// Latitude in degrees, absent if not reported or invalid
    pub latitude: Option<f64>,
    /// Longitude in degrees, absent if not reported or invalid
    pub longitude: Option<f64>,
    /// Altitude in meters
    pub altitude: f64,
    /// Ground speed in m/s
    pub groundspeed: f64,
    /// GPS fix quality
    pub fix_type: FixType,
    /// Visible satellites
    pub satellites: u32,
    /// Attitude, present only when the event carried yaw
    pub orientation: Option<Orientation>,
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            mode: UNKNOWN_MODE.to_string(),
            armed: false,
            battery: None,
            latitude: None,
            longitude: None,
            altitude: 0.0,
            groundspeed: 0.0,
            fix_type: FixType::Unknown,
            satellites: 0,
            orientation: None,
        }
    }
}

impl TelemetrySnapshot {
    /// The reported coordinate, if both halves are present and valid.
    pub fn position(&self) -> Option<TrailPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                let point = TrailPoint::new(lat, lon);
                point.is_valid().then_some(point)
            }
            _ => None,
        }
    }

    pub fn battery_text(&self) -> String {
        match self.battery {
            Some(pct) if pct.is_finite() => format!("{:.0} %", pct),
            _ => NO_VALUE.to_string(),
        }
    }

    pub fn armed_text(&self) -> &'static str {
        if self.armed { "Yes" } else { "No" }
    }

    pub fn latitude_text(&self) -> String {
        format!("{:.7}", finite_or_zero(self.latitude))
    }

    pub fn longitude_text(&self) -> String {
        format!("{:.7}", finite_or_zero(self.longitude))
    }

    pub fn altitude_text(&self) -> String {
        format!("{:.1}", self.altitude)
    }

    pub fn groundspeed_text(&self) -> String {
        format!("{:.1}", self.groundspeed)
    }
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot() {
        let snapshot = TelemetrySnapshot::default();
        assert_eq!(snapshot.mode, "unknown");
        assert!(!snapshot.armed);
        assert_eq!(snapshot.battery, None);
        assert_eq!(snapshot.altitude, 0.0);
        assert_eq!(snapshot.satellites, 0);
        assert_eq!(snapshot.fix_type, FixType::Unknown);
        assert!(snapshot.orientation.is_none());
        assert!(snapshot.position().is_none());
    }

    #[test]
    fn test_battery_text_absent() {
        let snapshot = TelemetrySnapshot::default();
        assert_eq!(snapshot.battery_text(), "—");
    }

    #[test]
    fn test_battery_text_present() {
        let snapshot = TelemetrySnapshot {
            battery: Some(87.0),
            ..Default::default()
        };
        assert_eq!(snapshot.battery_text(), "87 %");
    }

    #[test]
    fn test_coordinate_text_defaults_to_zero() {
        let snapshot = TelemetrySnapshot::default();
        assert_eq!(snapshot.latitude_text(), "0.0000000");
        assert_eq!(snapshot.longitude_text(), "0.0000000");
    }

    #[test]
    fn test_position_requires_both_finite() {
        let snapshot = TelemetrySnapshot {
            latitude: Some(f64::NAN),
            longitude: Some(-99.1),
            ..Default::default()
        };
        assert!(snapshot.position().is_none());

        let snapshot = TelemetrySnapshot {
            latitude: Some(19.43),
            longitude: None,
            ..Default::default()
        };
        assert!(snapshot.position().is_none());

        let snapshot = TelemetrySnapshot {
            latitude: Some(19.43),
            longitude: Some(-99.13),
            ..Default::default()
        };
        assert_eq!(snapshot.position(), Some(TrailPoint::new(19.43, -99.13)));
    }

    #[test]
    fn test_trail_point_bounds() {
        assert!(TrailPoint::new(90.0, 180.0).is_valid());
        assert!(!TrailPoint::new(90.5, 0.0).is_valid());
        assert!(!TrailPoint::new(0.0, -180.1).is_valid());
        assert!(!TrailPoint::new(f64::INFINITY, 0.0).is_valid());
    }

    #[test]
    fn test_fix_type_codes() {
        assert_eq!(FixType::from_code(0), FixType::NoGps);
        assert_eq!(FixType::from_code(3), FixType::Fix3D);
        assert_eq!(FixType::from_code(6), FixType::RtkFixed);
        assert_eq!(FixType::from_code(42), FixType::Unknown);
        assert_eq!(FixType::from_code(-1), FixType::Unknown);
    }

    #[test]
    fn test_fix_type_names() {
        assert_eq!(FixType::from_name("3D"), FixType::Fix3D);
        assert_eq!(FixType::from_name("GPS_FIX_TYPE_3D_FIX"), FixType::Fix3D);
        assert_eq!(FixType::from_name("GPS_FIX_TYPE_2D_FIX"), FixType::Fix2D);
        assert_eq!(FixType::from_name("rtk_fixed"), FixType::RtkFixed);
        assert_eq!(FixType::from_name("GPS_FIX_TYPE_NO_FIX"), FixType::NoFix);
        assert_eq!(FixType::from_name("4"), FixType::Dgps);
        assert_eq!(FixType::from_name("banana"), FixType::Unknown);
    }

    #[test]
    fn test_fix_type_display() {
        assert_eq!(FixType::Fix3D.to_string(), "3D");
        assert_eq!(FixType::Unknown.to_string(), "—");
    }
}
