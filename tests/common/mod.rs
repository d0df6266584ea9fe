#![allow(dead_code)]

use std::path::Path;

/// Write a minimal Keysight-layout recording: one channel group under
/// `Waveforms` with the scalar acquisition attributes and the raw data node.
pub fn write_recording(
    path: &Path,
    channel: &str,
    x_org: f64,
    y_org: f64,
    x_inc: f64,
    y_inc: f64,
    raw: &[f32],
) -> hdf5::Result<()> {
    let file = hdf5::File::create(path)?;
    let waveforms = file.create_group("Waveforms")?;
    let group = waveforms.create_group(&format!("Channel {}", channel))?;

    write_attr(&group, "XOrg", x_org)?;
    write_attr(&group, "YOrg", y_org)?;
    write_attr(&group, "XInc", x_inc)?;
    write_attr(&group, "YInc", y_inc)?;
    write_attr(&group, "NumPoints", raw.len() as f64)?;

    let data_name = format!("Channel {}Data", channel);
    group
        .new_dataset_builder()
        .with_data(raw)
        .create(data_name.as_str())?;

    Ok(())
}

pub fn write_attr(group: &hdf5::Group, name: &str, value: f64) -> hdf5::Result<()> {
    group.new_attr::<f64>().create(name)?.write_scalar(&value)
}

/// Synthetic raw samples: a slow oscillation with an index-linear drift.
pub fn synthetic_raw(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| (i as f32 * 0.02).sin() * 100.0 + i as f32 * 0.05)
        .collect()
}
