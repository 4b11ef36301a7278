//! # Dashboard Context
//!
//! The set of renderers the pipeline draws to, built once at startup and
//! handed to the stream dispatcher and command gateway. Nothing in the
//! crate reaches for a renderer any other way.

use std::sync::Arc;

use crate::render::{
    AttitudeRenderer, ChartRenderer, LogRenderer, MapRenderer, ReadoutDisplay, StatusDisplay,
};

/// Renderer handles for every projection
pub struct DashboardContext {
    pub map: Box<dyn MapRenderer>,
    /// Optional 3D view; without it attitude is not projected
    pub attitude: Option<Box<dyn AttitudeRenderer>>,
    pub chart: Box<dyn ChartRenderer>,
    pub panel: Box<dyn ReadoutDisplay>,
    /// Shared with the command gateway
    pub status: Arc<dyn StatusDisplay>,
}

impl std::fmt::Debug for DashboardContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardContext")
            .field("attitude", &self.attitude.is_some())
            .finish_non_exhaustive()
    }
}

impl DashboardContext {
    pub fn new(
        map: Box<dyn MapRenderer>,
        attitude: Option<Box<dyn AttitudeRenderer>>,
        chart: Box<dyn ChartRenderer>,
        panel: Box<dyn ReadoutDisplay>,
        status: Arc<dyn StatusDisplay>,
    ) -> Self {
        Self {
            map,
            attitude,
            chart,
            panel,
            status,
        }
    }

    /// Every view rendered through `tracing`
    pub fn headless() -> Self {
        Self::new(
            Box::new(LogRenderer),
            Some(Box::new(LogRenderer)),
            Box::new(LogRenderer),
            Box::new(LogRenderer),
            Arc::new(LogRenderer),
        )
    }

    /// Whether a 3D attitude view is attached
    pub fn has_attitude_view(&self) -> bool {
        self.attitude.is_some()
    }
}
