//! # Waveform Sink
//!
//! Rolling amplitude chart fed by `sdr` sweep events.
//!
//! Every repaint hands the renderer the full buffer, so evicted samples
//! disappear from the chart on the same tick they leave the buffer.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::render::ChartRenderer;
use crate::ring_buffer::{RingBuffer, WAVEFORM_CAPACITY};

/// Raw sweep event: `{"t": <unix seconds>, "value": <amplitude>}`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SweepSample {
    /// Unix time in seconds
    pub t: f64,
    /// Amplitude
    pub value: f64,
}

/// One charted point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformSample {
    pub time: DateTime<Utc>,
    pub amplitude: f64,
}

impl WaveformSample {
    /// Convert a sweep event; `None` if the timestamp or amplitude cannot be charted.
    pub fn from_sweep(sweep: &SweepSample) -> Option<Self> {
        if !sweep.t.is_finite() || !sweep.value.is_finite() {
            return None;
        }

        let millis = (sweep.t * 1000.0).round();
        if millis.abs() > i64::MAX as f64 {
            return None;
        }

        let time = DateTime::from_timestamp_millis(millis as i64)?;
        Some(Self {
            time,
            amplitude: sweep.value,
        })
    }
}

/// Owns the waveform buffer
#[derive(Debug, Clone)]
pub struct WaveformSink {
    series: RingBuffer<WaveformSample>,
}

impl Default for WaveformSink {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveformSink {
    pub fn new() -> Self {
        Self {
            series: RingBuffer::new(WAVEFORM_CAPACITY),
        }
    }

    /// Append one sweep sample and repaint the chart.
    ///
    /// Returns `false` (and leaves the chart alone) if the sample is not chartable.
    pub fn project(&mut self, sweep: &SweepSample, chart: &mut dyn ChartRenderer) -> bool {
        let Some(sample) = WaveformSample::from_sweep(sweep) else {
            warn!("Dropping unchartable sweep sample t={} value={}", sweep.t, sweep.value);
            return false;
        };

        self.series.push(sample);
        chart.set_chart_series(&self.series.to_ordered_vec());
        true
    }

    /// Charted samples, oldest first
    pub fn series(&self) -> Vec<WaveformSample> {
        self.series.to_ordered_vec()
    }
}
