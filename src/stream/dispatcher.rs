//! # Stream Dispatcher
//!
//! Routes transport events to the normalizer and projection sinks.
//!
//! ## Routing
//!
//! | Event | Handling |
//! |-------|----------|
//! | connectivity established | status = Connected, status line updated |
//! | connectivity lost | status = Disconnected, status line updated |
//! | `telemetry` | normalize, then panel, position, and orientation sinks (all of them, every event) |
//! | `sdr` | waveform sink |
//! | anything else | ignored |
//!
//! There is no queue: each event is projected completely before the next
//! one is pulled from the transport.

use tracing::{debug, info, warn};

use super::event::InboundEvent;
use super::{Transport, TransportEvent};
use crate::context::DashboardContext;
use crate::sinks::{panel, OrientationSink, PositionSink, SweepSample, WaveformSink};
use crate::telemetry::recorder::TelemetryRecorder;
use crate::telemetry::{normalize_value, TelemetrySnapshot, TrailPoint};

/// Status line text while the stream is live
pub const CONNECTED_TEXT: &str = "✅ Connected to backend";

/// Status line text after the stream drops
pub const DISCONNECTED_TEXT: &str = "❌ Disconnected";

/// Transport connectivity as last signalled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    Connected,
    #[default]
    Disconnected,
}

/// Event counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchStats {
    pub telemetry_events: u64,
    pub sweep_events: u64,
    pub ignored_events: u64,
    pub dropped_events: u64,
    pub connects: u64,
    pub disconnects: u64,
}

/// Owns the sinks and routes every transport event to them
pub struct StreamDispatcher {
    ctx: DashboardContext,
    status: ConnectionStatus,
    position: PositionSink,
    orientation: Option<OrientationSink>,
    waveform: WaveformSink,
    recorder: Option<TelemetryRecorder>,
    stats: DispatchStats,
}

impl std::fmt::Debug for StreamDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamDispatcher")
            .field("status", &self.status)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl StreamDispatcher {
    /// Create a dispatcher drawing to `ctx`.
    ///
    /// The orientation sink is only installed when the context carries a
    /// 3D view.
    pub fn new(ctx: DashboardContext) -> Self {
        let orientation = ctx.has_attitude_view().then(OrientationSink::new);
        Self {
            ctx,
            status: ConnectionStatus::Disconnected,
            position: PositionSink::new(),
            orientation,
            waveform: WaveformSink::new(),
            recorder: None,
            stats: DispatchStats::default(),
        }
    }

    /// Record every normalized snapshot with `recorder`.
    pub fn with_recorder(mut self, recorder: TelemetryRecorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Pump `transport` until it closes.
    ///
    /// If the transport ends while connected, a final disconnect is applied.
    pub async fn run<T: Transport + ?Sized>(&mut self, transport: &mut T) -> DispatchStats {
        while let Some(event) = transport.next_event().await {
            self.handle(event);
        }

        if self.status == ConnectionStatus::Connected {
            self.on_disconnected();
        }
        info!("Stream closed: {:?}", self.stats);
        self.stats
    }

    /// Project one transport event synchronously.
    pub fn handle(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => self.on_connected(),
            TransportEvent::Disconnected => self.on_disconnected(),
            TransportEvent::Message { name, payload } => match InboundEvent::decode(&name, payload) {
                Ok(Some(InboundEvent::Telemetry(raw))) => {
                    let snapshot = normalize_value(&raw);
                    self.on_telemetry(&snapshot);
                }
                Ok(Some(InboundEvent::Sweep(sample))) => self.on_sweep(&sample),
                Ok(None) => {
                    debug!("Ignoring event '{}'", name);
                    self.stats.ignored_events += 1;
                }
                Err(e) => {
                    warn!("Dropping '{}' event: {}", name, e);
                    self.stats.dropped_events += 1;
                }
            },
        }
    }

    fn on_connected(&mut self) {
        if self.status != ConnectionStatus::Connected {
            info!("Telemetry stream connected");
        }
        self.status = ConnectionStatus::Connected;
        self.stats.connects += 1;
        self.ctx.status.set_status_text(CONNECTED_TEXT);
    }

    fn on_disconnected(&mut self) {
        if self.status != ConnectionStatus::Disconnected {
            warn!("Telemetry stream disconnected");
        }
        self.status = ConnectionStatus::Disconnected;
        self.stats.disconnects += 1;
        self.ctx.status.set_status_text(DISCONNECTED_TEXT);
    }

    /// Fan one snapshot out to every telemetry projection.
    pub fn on_telemetry(&mut self, snapshot: &TelemetrySnapshot) {
        self.stats.telemetry_events += 1;

        panel::project(snapshot, self.ctx.panel.as_mut());
        self.position.project(snapshot, self.ctx.map.as_mut());

        if let (Some(sink), Some(renderer)) = (self.orientation.as_mut(), self.ctx.attitude.as_mut()) {
            sink.project(snapshot, renderer.as_mut(), self.ctx.panel.as_mut());
        }

        if let Some(recorder) = self.recorder.as_mut() {
            if let Err(e) = recorder.record(snapshot) {
                warn!("Telemetry recording stopped: {}", e);
                self.recorder = None;
            }
        }
    }

    /// Chart one sweep sample.
    pub fn on_sweep(&mut self, sample: &SweepSample) {
        self.stats.sweep_events += 1;
        if !self.waveform.project(sample, self.ctx.chart.as_mut()) {
            self.stats.dropped_events += 1;
        }
    }

    /// Place the marker at `home` and center the view there.
    ///
    /// Used once at startup, before any telemetry arrives. The trail is
    /// not touched.
    pub fn show_home(&mut self, home: TrailPoint, zoom: u8) {
        self.ctx.map.set_marker_position(home);
        self.ctx.map.set_view(home, zoom);
    }

    /// Recenter the map view. Marker and trail are unchanged.
    pub fn center_view(&mut self, center: TrailPoint, zoom: u8) {
        self.ctx.map.set_view(center, zoom);
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn position(&self) -> &PositionSink {
        &self.position
    }

    pub fn orientation(&self) -> Option<&OrientationSink> {
        self.orientation.as_ref()
    }

    pub fn waveform(&self) -> &WaveformSink {
        &self.waveform
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::mocks::{MockAttitude, MockChart, MockMap, MockReadouts, MockStatus};
    use crate::render::Readout;
    use crate::stream::ScriptedTransport;
    use serde_json::json;
    use std::sync::Arc;

    struct Fixture {
        map: MockMap,
        attitude: MockAttitude,
        chart: MockChart,
        panel: MockReadouts,
        status: MockStatus,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                map: MockMap::new(),
                attitude: MockAttitude::new(),
                chart: MockChart::new(),
                panel: MockReadouts::new(),
                status: MockStatus::new(),
            }
        }

        fn dispatcher(&self, with_attitude: bool) -> StreamDispatcher {
            let attitude: Option<Box<dyn crate::render::AttitudeRenderer>> = if with_attitude {
                Some(Box::new(self.attitude.clone()))
            } else {
                None
            };
            StreamDispatcher::new(DashboardContext::new(
                Box::new(self.map.clone()),
                attitude,
                Box::new(self.chart.clone()),
                Box::new(self.panel.clone()),
                Arc::new(self.status.clone()),
            ))
        }
    }

    fn telemetry(payload: serde_json::Value) -> TransportEvent {
        TransportEvent::message("telemetry", payload)
    }

    #[test]
    fn test_connectivity_updates_status() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);
        assert_eq!(dispatcher.connection_status(), ConnectionStatus::Disconnected);

        dispatcher.handle(TransportEvent::Connected);
        assert_eq!(dispatcher.connection_status(), ConnectionStatus::Connected);
        assert_eq!(fx.status.last().as_deref(), Some(CONNECTED_TEXT));

        dispatcher.handle(TransportEvent::Disconnected);
        assert_eq!(dispatcher.connection_status(), ConnectionStatus::Disconnected);
        assert_eq!(fx.status.last().as_deref(), Some(DISCONNECTED_TEXT));
    }

    #[test]
    fn test_telemetry_reaches_every_sink() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);

        dispatcher.handle(telemetry(json!({
            "mode": "GUIDED",
            "lat": 19.4326,
            "lon": -99.1332,
            "yaw": 90.0
        })));

        assert_eq!(fx.map.snapshot().marker, Some(TrailPoint::new(19.4326, -99.1332)));
        assert_eq!(fx.attitude.rotations().len(), 1);
        assert_eq!(fx.panel.get(Readout::Mode).as_deref(), Some("GUIDED"));
        assert_eq!(fx.panel.get(Readout::Yaw).as_deref(), Some("90.0"));
        assert_eq!(dispatcher.stats().telemetry_events, 1);
    }

    #[test]
    fn test_telemetry_without_position_still_updates_orientation() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);

        dispatcher.handle(telemetry(json!({ "lat": null, "lon": -99.1, "yaw": 10.0 })));

        assert_eq!(fx.map.snapshot().marker_updates, 0);
        assert_eq!(fx.attitude.rotations().len(), 1);
    }

    #[test]
    fn test_without_attitude_view_orientation_is_skipped() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(false);
        assert!(dispatcher.orientation().is_none());

        dispatcher.handle(telemetry(json!({ "lat": 1.0, "lon": 2.0, "yaw": 10.0 })));

        assert!(fx.attitude.rotations().is_empty());
        assert!(fx.panel.get(Readout::Yaw).is_none());
        assert_eq!(fx.map.snapshot().marker_updates, 1);
    }

    #[test]
    fn test_sweep_reaches_waveform_only() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);

        dispatcher.handle(TransportEvent::message("sdr", json!({ "t": 1700000000.0, "value": 0.8 })));

        assert_eq!(fx.chart.repaint_count(), 1);
        assert_eq!(fx.map.snapshot().marker_updates, 0);
        assert_eq!(fx.panel.update_count(), 0);
        assert_eq!(dispatcher.stats().sweep_events, 1);
    }

    #[test]
    fn test_malformed_sweep_is_dropped() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);

        dispatcher.handle(TransportEvent::message("sdr", json!({ "value": 0.8 })));

        assert_eq!(fx.chart.repaint_count(), 0);
        assert_eq!(dispatcher.stats().dropped_events, 1);
    }

    #[test]
    fn test_unknown_event_is_ignored() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);

        dispatcher.handle(TransportEvent::message("chat", json!({ "text": "hi" })));

        assert_eq!(dispatcher.stats().ignored_events, 1);
        assert!(fx.status.history().is_empty());
    }

    #[test]
    fn test_show_home_and_center_view() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);
        let home = TrailPoint::new(19.4326, -99.1332);

        dispatcher.show_home(home, 15);
        let state = fx.map.snapshot();
        assert_eq!(state.marker, Some(home));
        assert_eq!(state.view, Some((home, 15)));
        assert!(state.trail.is_empty());

        let target = TrailPoint::new(20.0, -100.0);
        dispatcher.center_view(target, 17);
        let state = fx.map.snapshot();
        assert_eq!(state.view, Some((target, 17)));
        assert_eq!(state.marker, Some(home));
    }

    #[tokio::test]
    async fn test_run_drains_transport_in_order() {
        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true);
        let mut transport = ScriptedTransport::new([
            TransportEvent::Connected,
            telemetry(json!({ "lat": 1.0, "lon": 1.0 })),
            telemetry(json!({ "lat": 2.0, "lon": 2.0 })),
            telemetry(json!({ "lat": 3.0, "lon": 3.0 })),
        ]);

        let stats = dispatcher.run(&mut transport).await;

        assert_eq!(stats.telemetry_events, 3);
        assert_eq!(
            fx.map.snapshot().trail,
            vec![TrailPoint::new(1.0, 1.0), TrailPoint::new(2.0, 2.0), TrailPoint::new(3.0, 3.0)]
        );
        // Transport ended while connected
        assert_eq!(dispatcher.connection_status(), ConnectionStatus::Disconnected);
        assert_eq!(fx.status.last().as_deref(), Some(DISCONNECTED_TEXT));
    }

    #[test]
    fn test_recorder_receives_snapshots() {
        use crate::config::RecordingConfig;
        use tempfile::TempDir;

        let tmp = TempDir::new().unwrap();
        let recorder = TelemetryRecorder::new(&RecordingConfig {
            enabled: true,
            log_dir: tmp.path().to_string_lossy().into_owned(),
            ..Default::default()
        })
        .unwrap();

        let fx = Fixture::new();
        let mut dispatcher = fx.dispatcher(true).with_recorder(recorder);
        assert!(dispatcher.is_recording());

        dispatcher.handle(telemetry(json!({ "mode": "AUTO" })));
        dispatcher.handle(telemetry(json!({ "mode": "RTL" })));
        drop(dispatcher);

        let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
