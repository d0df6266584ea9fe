use thiserror::Error;

#[derive(Error, Debug)]
pub enum SeeError {
    #[error("Input file not found: {0}")]
    FileNotFound(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Malformed recording: {0}")]
    DataFormat(String),

    #[error("Invalid filter design: {0}")]
    FilterDesign(String),

    #[error("Empty waveform: {0}")]
    EmptyWaveform(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

pub type Result<T> = std::result::Result<T, SeeError>;
