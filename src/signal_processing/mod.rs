//! Signal conditioning for recorded waveforms:
//! - zero-phase Butterworth low-pass (second-order sections)
//! - least-squares linear detrending
//! - cross-correlation delay estimation

mod delay;
mod detrend;
mod filters;
mod nearest;

pub use delay::{cross_correlate, relative_delay};
pub use detrend::detrend_linear;
pub use filters::{lowpass_zero_phase, BiquadCoeffs, BiquadFilter, ButterworthFilter, SosFilter};
pub use nearest::find_nearest;
