//! Low-pass filtering.
//!
//! Butterworth design as cascaded second-order sections (biquads) for
//! numerical stability, applied forward and backward for zero phase.

use std::f64::consts::PI;

use crate::error::{Result, SeeError};

/// Second-order section (biquad) coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

/// State for a single biquad section (Direct Form II Transposed)
#[derive(Debug, Clone, Default)]
struct BiquadState {
    z1: f64,
    z2: f64,
}

/// Single biquad filter section
#[derive(Debug, Clone)]
pub struct BiquadFilter {
    coeffs: BiquadCoeffs,
    state: BiquadState,
}

impl BiquadFilter {
    pub fn new(coeffs: BiquadCoeffs) -> Self {
        Self {
            coeffs,
            state: BiquadState::default(),
        }
    }

    /// Process a single sample using Direct Form II Transposed
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.coeffs.b0 * input + self.state.z1;
        self.state.z1 = self.coeffs.b1 * input - self.coeffs.a1 * output + self.state.z2;
        self.state.z2 = self.coeffs.b2 * input - self.coeffs.a2 * output;
        output
    }

    /// Reset filter state
    pub fn reset(&mut self) {
        self.state = BiquadState::default();
    }
}

/// Cascaded second-order sections filter
#[derive(Debug, Clone)]
pub struct SosFilter {
    sections: Vec<BiquadFilter>,
}

impl SosFilter {
    pub fn new(sections: Vec<BiquadCoeffs>) -> Self {
        Self {
            sections: sections.into_iter().map(BiquadFilter::new).collect(),
        }
    }

    /// Process a single sample through all sections
    #[inline]
    pub fn process(&mut self, input: f64) -> f64 {
        let mut output = input;
        for section in &mut self.sections {
            output = section.process(output);
        }
        output
    }

    /// Process an entire signal array in-place
    pub fn process_signal(&mut self, signal: &mut [f64]) {
        for sample in signal.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Process a signal and return a new array (original unchanged)
    pub fn filter(&mut self, signal: &[f64]) -> Vec<f64> {
        signal.iter().map(|&s| self.process(s)).collect()
    }

    /// Reset all section states
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}

/// Butterworth filter designer
pub struct ButterworthFilter;

impl ButterworthFilter {
    /// Design a Butterworth lowpass filter.
    ///
    /// Fails with `FilterDesign` when the cutoff is not strictly between
    /// zero and Nyquist, or when the order is zero.
    pub fn lowpass(cutoff: f64, sample_rate: f64, order: usize) -> Result<SosFilter> {
        if !(sample_rate > 0.0) {
            return Err(SeeError::FilterDesign(format!(
                "Sample rate must be positive, got {} Hz",
                sample_rate
            )));
        }
        let nyquist = sample_rate / 2.0;
        if !(cutoff > 0.0) || cutoff >= nyquist {
            return Err(SeeError::FilterDesign(format!(
                "Cutoff frequency ({} Hz) must be between 0 and Nyquist ({} Hz)",
                cutoff, nyquist
            )));
        }
        if order == 0 {
            return Err(SeeError::FilterDesign(
                "Filter order must be at least 1".to_string(),
            ));
        }

        let wn = Self::prewarp(cutoff, sample_rate);
        Ok(SosFilter::new(Self::design_lowpass(wn, order)))
    }

    /// Prewarp frequency for bilinear transform
    fn prewarp(freq: f64, sample_rate: f64) -> f64 {
        (PI * freq / sample_rate).tan()
    }

    /// Design lowpass second-order sections
    fn design_lowpass(wn: f64, order: usize) -> Vec<BiquadCoeffs> {
        let num_sections = (order + 1) / 2;
        let mut sections = Vec::with_capacity(num_sections);

        for k in 0..num_sections {
            let theta = PI * (2.0 * k as f64 + 1.0) / (2.0 * order as f64);
            let alpha = -2.0 * theta.cos();

            // For odd order, last section is first-order
            if order % 2 == 1 && k == num_sections - 1 {
                // First-order section: H(s) = wn / (s + wn)
                let k_coeff = wn / (1.0 + wn);
                sections.push(BiquadCoeffs {
                    b0: k_coeff,
                    b1: k_coeff,
                    b2: 0.0,
                    a1: (wn - 1.0) / (wn + 1.0),
                    a2: 0.0,
                });
            } else {
                // Second-order section via bilinear transform
                let wn2 = wn * wn;
                let denom = 1.0 + alpha * wn + wn2;

                let b0 = wn2 / denom;
                let b1 = 2.0 * wn2 / denom;
                let b2 = wn2 / denom;
                let a1 = 2.0 * (wn2 - 1.0) / denom;
                let a2 = (1.0 - alpha * wn + wn2) / denom;

                sections.push(BiquadCoeffs { b0, b1, b2, a1, a2 });
            }
        }

        sections
    }
}

/// Zero-phase Butterworth low-pass: the signal is filtered forward, then
/// backward, doubling the effective order and cancelling the phase shift.
///
/// Both ends are extended with an odd (mirror) reflection before filtering
/// to keep startup transients out of the returned samples. Output has the
/// same length as the input; the input is left untouched.
pub fn lowpass_zero_phase(
    data: &[f64],
    cutoff: f64,
    sample_rate: f64,
    order: usize,
) -> Result<Vec<f64>> {
    let mut filter = ButterworthFilter::lowpass(cutoff, sample_rate, order)?;

    let n = data.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let padlen = (3 * (order + 1)).min(n - 1);
    let mut extended = Vec::with_capacity(n + 2 * padlen);
    for i in (1..=padlen).rev() {
        extended.push(2.0 * data[0] - data[i]);
    }
    extended.extend_from_slice(data);
    for i in 1..=padlen {
        extended.push(2.0 * data[n - 1] - data[n - 1 - i]);
    }

    // Forward pass
    filter.process_signal(&mut extended);

    // Backward pass over the reversed forward output
    extended.reverse();
    filter.reset();
    filter.process_signal(&mut extended);
    extended.reverse();

    Ok(extended[padlen..padlen + n].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowpass_passes_dc() {
        let mut filter = ButterworthFilter::lowpass(10.0, 100.0, 2).unwrap();

        // DC should pass through once the transient settles
        let mut out = 0.0;
        for _ in 0..200 {
            out = filter.process(1.0);
        }
        assert!((out - 1.0).abs() < 0.01);
    }

    #[test]
    fn lowpass_rejects_invalid_cutoff() {
        assert!(ButterworthFilter::lowpass(60.0, 100.0, 3).is_err());
        assert!(ButterworthFilter::lowpass(50.0, 100.0, 3).is_err());
        assert!(ButterworthFilter::lowpass(0.0, 100.0, 3).is_err());
        assert!(ButterworthFilter::lowpass(-5.0, 100.0, 3).is_err());
        assert!(ButterworthFilter::lowpass(10.0, 100.0, 0).is_err());
        assert!(ButterworthFilter::lowpass(10.0, 0.0, 3).is_err());
    }

    #[test]
    fn zero_phase_preserves_length() {
        let signal: Vec<f64> = (0..500).map(|i| (i as f64 * 0.05).sin()).collect();
        let filtered = lowpass_zero_phase(&signal, 10.0, 100.0, 3).unwrap();
        assert_eq!(filtered.len(), signal.len());
    }

    #[test]
    fn zero_phase_attenuates_high_frequency() {
        let sample_rate = 1000.0;
        // 5 Hz carrier polluted with a 200 Hz tone
        let signal: Vec<f64> = (0..2000)
            .map(|i| {
                let t = i as f64 / sample_rate;
                (2.0 * PI * 5.0 * t).sin() + 0.5 * (2.0 * PI * 200.0 * t).sin()
            })
            .collect();
        let clean: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 5.0 * (i as f64 / sample_rate)).sin())
            .collect();

        let filtered = lowpass_zero_phase(&signal, 30.0, sample_rate, 3).unwrap();

        // Residual against the clean carrier should be far below the noise level
        let rms = |xs: &[f64]| (xs.iter().map(|x| x * x).sum::<f64>() / xs.len() as f64).sqrt();
        let residual: Vec<f64> = filtered
            .iter()
            .zip(clean.iter())
            .map(|(f, c)| f - c)
            .collect();
        let noise: Vec<f64> = signal.iter().zip(clean.iter()).map(|(s, c)| s - c).collect();

        assert!(rms(&residual) < rms(&noise) * 0.2);
    }

    #[test]
    fn zero_phase_does_not_shift_the_signal() {
        let sample_rate = 1000.0;
        let signal: Vec<f64> = (0..2000)
            .map(|i| (2.0 * PI * 5.0 * (i as f64 / sample_rate)).sin())
            .collect();

        let filtered = lowpass_zero_phase(&signal, 50.0, sample_rate, 3).unwrap();

        // A 5 Hz tone well below the 50 Hz cutoff comes back nearly unchanged,
        // in particular without phase lag.
        for (f, s) in filtered.iter().zip(signal.iter()).skip(100).take(1800) {
            assert!((f - s).abs() < 0.05, "sample drifted: {} vs {}", f, s);
        }
    }

    #[test]
    fn zero_phase_is_deterministic() {
        let signal: Vec<f64> = (0..256).map(|i| ((i * 37) % 97) as f64 * 0.1).collect();
        let a = lowpass_zero_phase(&signal, 10.0, 100.0, 3).unwrap();
        let b = lowpass_zero_phase(&signal, 10.0, 100.0, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_phase_handles_empty_input() {
        let filtered = lowpass_zero_phase(&[], 10.0, 100.0, 3).unwrap();
        assert!(filtered.is_empty());
    }

    #[test]
    fn odd_order_produces_expected_section_count() {
        // order 3 = one biquad + one first-order section
        let filter = ButterworthFilter::lowpass(600e3, 2e6, 3).unwrap();
        assert_eq!(filter.sections.len(), 2);
    }
}
