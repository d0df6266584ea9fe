use serde::{Deserialize, Serialize};

use crate::error::{Result, SeeError};

/// Fixed latency between the acquisition trigger and the PZT source actually
/// firing, in seconds. Subtracted from every recorded time value.
pub const PZT_ACTIVATION_DELAY: f64 = 2.0e-6;

/// Voltage-to-displacement conversion factor of the laser vibrometer,
/// in meters per volt (from the laser datasheet: 50 nm/V).
pub const DISPLACEMENT_PER_VOLT: f64 = 50e-9;

/// Kind of signal recorded on a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Laser-vibrometry displacement signal
    Seismic,
    /// Electric-potential signal
    Electric,
}

impl ChannelKind {
    /// Scope channel the signal is recorded on. The seismic signal is always
    /// acquired on channel 8 and the electric potential on channel 1.
    pub fn channel_number(&self) -> &'static str {
        match self {
            ChannelKind::Seismic => "8",
            ChannelKind::Electric => "1",
        }
    }

    pub fn is_seismic(&self) -> bool {
        matches!(self, ChannelKind::Seismic)
    }
}

/// Loader configuration carrying the instrument calibration constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// PZT activation delay in seconds, subtracted from the time axis
    pub pzt_activation_delay: f64,
    /// Vibrometer conversion factor in m/V, applied to seismic channels
    pub displacement_per_volt: f64,
    /// Low-pass cutoff in Hz, applied to electric channels
    pub lowpass_cutoff: f64,
    /// Butterworth filter order for the electric-channel low-pass
    pub filter_order: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            pzt_activation_delay: PZT_ACTIVATION_DELAY,
            displacement_per_volt: DISPLACEMENT_PER_VOLT,
            lowpass_cutoff: 600e3,
            filter_order: 3,
        }
    }
}

/// Per-channel acquisition metadata read from the container attributes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Time-axis origin (s)
    pub x_org: f64,
    /// Amplitude origin (V)
    pub y_org: f64,
    /// Sample spacing (s)
    pub x_inc: f64,
    /// Amplitude quantization step (V per count)
    pub y_inc: f64,
    /// Number of recorded samples
    pub num_points: usize,
}

impl ChannelInfo {
    pub fn sample_rate(&self) -> f64 {
        1.0 / self.x_inc
    }

    pub fn duration(&self) -> f64 {
        self.x_inc * self.num_points as f64
    }
}

/// One recorded waveform: a time axis and an amplitude sequence of equal
/// length, with uniform sample spacing `dt`.
///
/// A trace is produced fully formed by the loader and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Timestamps in seconds, strictly increasing, uniform spacing
    pub time: Vec<f32>,
    /// Amplitude samples, physical units, same length as `time`
    pub amplitude: Vec<f32>,
    /// Sample spacing, `time[1] - time[0]`
    pub dt: f32,
}

impl Trace {
    pub fn new(time: Vec<f32>, amplitude: Vec<f32>) -> Result<Self> {
        if time.len() != amplitude.len() {
            return Err(SeeError::DataFormat(format!(
                "time/amplitude length mismatch: {} vs {}",
                time.len(),
                amplitude.len()
            )));
        }
        if time.len() < 2 {
            return Err(SeeError::DataFormat(format!(
                "trace needs at least 2 samples, got {}",
                time.len()
            )));
        }

        let dt = time[1] - time[0];
        Ok(Self {
            time,
            amplitude,
            dt,
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_derives_dt_from_first_two_timestamps() {
        let trace = Trace::new(vec![0.0, 0.5, 1.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(trace.dt, 0.5);
        assert_eq!(trace.len(), 3);
    }

    #[test]
    fn trace_rejects_length_mismatch() {
        let result = Trace::new(vec![0.0, 1.0], vec![1.0]);
        assert!(matches!(result, Err(SeeError::DataFormat(_))));
    }

    #[test]
    fn trace_rejects_single_sample() {
        let result = Trace::new(vec![0.0], vec![1.0]);
        assert!(matches!(result, Err(SeeError::DataFormat(_))));
    }

    #[test]
    fn channel_numbers_follow_acquisition_convention() {
        assert_eq!(ChannelKind::Seismic.channel_number(), "8");
        assert_eq!(ChannelKind::Electric.channel_number(), "1");
    }

    #[test]
    fn default_config_carries_instrument_constants() {
        let config = LoaderConfig::default();
        assert_eq!(config.pzt_activation_delay, PZT_ACTIVATION_DELAY);
        assert_eq!(config.displacement_per_volt, 50e-9);
        assert_eq!(config.lowpass_cutoff, 600e3);
        assert_eq!(config.filter_order, 3);
    }

    #[test]
    fn channel_info_derived_quantities() {
        let info = ChannelInfo {
            x_org: -1e-3,
            y_org: 0.5,
            x_inc: 1e-6,
            y_inc: 1e-4,
            num_points: 1000,
        };
        assert_eq!(info.sample_rate(), 1e6);
        assert!((info.duration() - 1e-3).abs() < 1e-12);
    }
}
