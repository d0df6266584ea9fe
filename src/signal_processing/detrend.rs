//! Linear detrending.

/// Subtract the least-squares straight line fitted over the sample index
/// axis, correcting baseline drift. Sequences shorter than two samples come
/// back unchanged. Output has the same length as the input.
pub fn detrend_linear(data: &[f64]) -> Vec<f64> {
    let n = data.len();
    if n < 2 {
        return data.to_vec();
    }

    // Closed-form least squares of y = intercept + slope * i
    let n_f = n as f64;
    let mean_x = (n_f - 1.0) / 2.0;
    let mean_y = data.iter().sum::<f64>() / n_f;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (i, &y) in data.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    data.iter()
        .enumerate()
        .map(|(i, &y)| y - (intercept + slope * i as f64))
        .collect()
}
