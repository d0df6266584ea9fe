//! Keysight H5 waveform loading.
//!
//! Keysight scopes store one group per channel under `Waveforms/Channel {n}`,
//! with the acquisition geometry in scalar attributes (`XOrg`, `YOrg`,
//! `XInc`, `YInc`, `NumPoints`) and the raw samples in a sibling data node
//! `Channel {n}Data`. Loading reconstructs the physical-unit trace:
//!
//! 1. `amplitude = YInc * raw + YOrg`, `time = XInc * index + XOrg`
//! 2. subtract the PZT activation delay from the time axis
//! 3. zero the amplitude origin (DC offset at the first sample)
//! 4. seismic channels: scale volts to meters; electric channels: zero-phase
//!    low-pass, then linear detrend
//! 5. narrow to f32 for storage

use std::collections::BTreeMap;
use std::path::Path;

use hdf5::File as H5File;
use ndarray::Array1;

use crate::classifier::{ChannelClassifier, PrefixChannelClassifier};
use crate::error::{Result, SeeError};
use crate::signal_processing::{detrend_linear, lowpass_zero_phase};
use crate::types::{ChannelInfo, ChannelKind, LoaderConfig, Trace};

/// Open Keysight H5 container.
///
/// Holds the file handle for the duration of the loading call; the handle is
/// released on drop, never retained past it.
pub struct KeysightReader {
    file: H5File,
    path: String,
}

impl KeysightReader {
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SeeError::FileNotFound(path.display().to_string()));
        }

        let file = H5File::open(path).map_err(|e| {
            SeeError::DataFormat(format!("Failed to open {}: {}", path.display(), e))
        })?;

        Ok(Self {
            file,
            path: path.display().to_string(),
        })
    }

    /// Names of the channel groups present under `Waveforms`.
    pub fn channel_names(&self) -> Result<Vec<String>> {
        let waveforms = self.file.group("Waveforms").map_err(|e| {
            SeeError::DataFormat(format!("No Waveforms group in {}: {}", self.path, e))
        })?;
        waveforms
            .member_names()
            .map_err(|e| SeeError::DataFormat(format!("Failed to list channels: {}", e)))
    }

    /// Acquisition metadata for one channel.
    pub fn channel_info(&self, channel: &str) -> Result<ChannelInfo> {
        let group = self.channel_group(channel)?;

        let num_points = read_attr(&group, "NumPoints")?;
        if !num_points.is_finite() || num_points < 0.0 {
            return Err(SeeError::DataFormat(format!(
                "Invalid NumPoints on channel {}: {}",
                channel, num_points
            )));
        }

        let x_inc = read_attr(&group, "XInc")?;
        if !(x_inc > 0.0) {
            return Err(SeeError::DataFormat(format!(
                "Non-positive XInc on channel {}: {}",
                channel, x_inc
            )));
        }

        Ok(ChannelInfo {
            x_org: read_attr(&group, "XOrg")?,
            y_org: read_attr(&group, "YOrg")?,
            x_inc,
            y_inc: read_attr(&group, "YInc")?,
            num_points: num_points as usize,
        })
    }

    /// Load one channel as a physical-unit trace.
    pub fn read_trace(
        &self,
        channel: &str,
        kind: ChannelKind,
        config: &LoaderConfig,
    ) -> Result<Trace> {
        let info = self.channel_info(channel)?;
        let raw = self.read_raw(channel)?;

        if raw.len() != info.num_points {
            return Err(SeeError::DataFormat(format!(
                "Channel {} has {} samples but NumPoints is {}",
                channel,
                raw.len(),
                info.num_points
            )));
        }
        if raw.is_empty() {
            return Err(SeeError::DataFormat(format!(
                "Channel {} holds no samples",
                channel
            )));
        }

        log::debug!(
            "Loading channel {} from {} ({:?}, {} samples at {:.3e} Hz)",
            channel,
            self.path,
            kind,
            info.num_points,
            info.sample_rate()
        );

        // Reconstruct physical units from the quantized samples
        let mut amplitude: Vec<f64> = raw.iter().map(|&v| info.y_inc * v + info.y_org).collect();
        let time: Vec<f64> = (0..info.num_points)
            .map(|i| info.x_inc * i as f64 + info.x_org - config.pzt_activation_delay)
            .collect();

        // Zero the amplitude origin
        let origin = amplitude[0];
        for v in amplitude.iter_mut() {
            *v -= origin;
        }

        match kind {
            ChannelKind::Seismic => {
                // Volts to meters via the vibrometer conversion factor
                for v in amplitude.iter_mut() {
                    *v *= config.displacement_per_volt;
                }
            }
            ChannelKind::Electric => {
                // Electric potential is heavily polluted by high-frequency
                // noise; smooth it, then remove the baseline drift.
                let filtered = lowpass_zero_phase(
                    &amplitude,
                    config.lowpass_cutoff,
                    info.sample_rate(),
                    config.filter_order,
                )?;
                amplitude = detrend_linear(&filtered);
            }
        }

        Trace::new(
            time.into_iter().map(|v| v as f32).collect(),
            amplitude.into_iter().map(|v| v as f32).collect(),
        )
    }

    fn channel_group(&self, channel: &str) -> Result<hdf5::Group> {
        let waveforms = self.file.group("Waveforms").map_err(|e| {
            SeeError::DataFormat(format!("No Waveforms group in {}: {}", self.path, e))
        })?;
        let name = format!("Channel {}", channel);
        waveforms
            .group(&name)
            .map_err(|_| SeeError::ChannelNotFound(format!("{} in {}", name, self.path)))
    }

    fn read_raw(&self, channel: &str) -> Result<Vec<f64>> {
        let group = self.channel_group(channel)?;
        let data_name = format!("Channel {}Data", channel);
        let dataset = group.dataset(&data_name).map_err(|e| {
            SeeError::DataFormat(format!(
                "No data node {} on channel {}: {}",
                data_name, channel, e
            ))
        })?;

        let raw: Array1<f64> = dataset.read_1d::<f64>().map_err(|e| {
            SeeError::DataFormat(format!("Failed to read channel {} samples: {}", channel, e))
        })?;

        Ok(raw.to_vec())
    }
}

/// Read one scalar acquisition attribute from a channel group.
fn read_attr(group: &hdf5::Group, name: &str) -> Result<f64> {
    group
        .attr(name)
        .and_then(|a| a.read_scalar::<f64>())
        .map_err(|e| {
            SeeError::DataFormat(format!(
                "Missing or invalid attribute {} on {}: {}",
                name,
                group.name(),
                e
            ))
        })
}

/// Load one recording as a trace, selecting the scope channel from the
/// signal kind (seismic ⇒ channel 8, electric ⇒ channel 1).
pub fn read_trace(path: &Path, kind: ChannelKind, config: &LoaderConfig) -> Result<Trace> {
    let reader = KeysightReader::open(path)?;
    reader.read_trace(kind.channel_number(), kind, config)
}

/// Load every `*.h5` recording in a directory, keyed by file base name.
///
/// Channel kinds are inferred with the default prefix policy. Loading is
/// sequential and fail-fast: the first malformed file aborts the whole load.
pub fn read_directory(dir: &Path, config: &LoaderConfig) -> Result<BTreeMap<String, Trace>> {
    read_directory_with(dir, &PrefixChannelClassifier::default(), config)
}

/// Same as [`read_directory`], with a caller-supplied classification policy.
pub fn read_directory_with(
    dir: &Path,
    classifier: &dyn ChannelClassifier,
    config: &LoaderConfig,
) -> Result<BTreeMap<String, Trace>> {
    if !dir.is_dir() {
        return Err(SeeError::FileNotFound(dir.display().to_string()));
    }

    let pattern = dir.join("*.h5");
    let pattern = pattern.to_string_lossy();
    let mut traces = BTreeMap::new();

    for entry in glob::glob(&pattern)
        .map_err(|e| SeeError::DataFormat(format!("Bad glob pattern {}: {}", pattern, e)))?
    {
        let path = entry.map_err(|e| SeeError::Io(e.into_error()))?;
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };

        let kind = classifier.classify(file_name);
        let trace = read_trace(&path, kind, config)?;
        traces.insert(base_name(file_name).to_string(), trace);
    }

    log::info!("Loaded {} trace(s) from {}", traces.len(), dir.display());
    Ok(traces)
}

/// Portion of a file name before the first `.`.
fn base_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_from_first_dot() {
        assert_eq!(base_name("source1.h5"), "source1");
        assert_eq!(base_name("shot.raw.h5"), "shot");
        assert_eq!(base_name("noext"), "noext");
    }

    #[test]
    fn missing_file_is_reported_as_such() {
        let result = KeysightReader::open(Path::new("/nonexistent/recording.h5"));
        assert!(matches!(result, Err(SeeError::FileNotFound(_))));
    }

    #[test]
    fn missing_directory_is_reported_as_such() {
        let result = read_directory(Path::new("/nonexistent/dir"), &LoaderConfig::default());
        assert!(matches!(result, Err(SeeError::FileNotFound(_))));
    }
}
