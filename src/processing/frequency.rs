// src/processing/frequency.rs
//! Dominant-frequency estimation over a captured batch

use super::window::hann_window;
use rustfft::num_complex::Complex64;
use rustfft::FftPlanner;

/// Fewest samples from which an estimate is attempted.
const MIN_SAMPLES: usize = 4;

/// Estimate the dominant frequency of `values` captured at `timestamps`.
///
/// The effective sample rate is taken as `(count − 1) / span`; the batch is
/// not assumed evenly spaced, but the transform treats it as if it were.
/// The mean is removed, a symmetric Hann window applied, and the peak of the
/// magnitude spectrum over the non-negative frequency bins is returned, ties
/// resolving to the lowest bin.
///
/// Returns `0.0` for fewer than 4 samples or a non-positive time span; an
/// under-populated batch right after start is a normal transient, not an
/// error.
///
/// This is an estimator, not an exact measurement: accuracy is bounded by
/// the bin width `rate / count` plus window leakage.
pub fn estimate_dominant_frequency(timestamps: &[f64], values: &[f64]) -> f64 {
    let n = timestamps.len().min(values.len());
    if n < MIN_SAMPLES {
        return 0.0;
    }
    let span = timestamps[n - 1] - timestamps[0];
    if span <= 0.0 {
        return 0.0;
    }
    let effective_rate = (n - 1) as f64 / span;

    let mean = values[..n].iter().sum::<f64>() / n as f64;
    let window = hann_window(n);
    let mut buffer: Vec<Complex64> = values[..n]
        .iter()
        .zip(window.iter())
        .map(|(&v, &w)| Complex64::new((v - mean) * w, 0.0))
        .collect();

    let mut planner = FftPlanner::<f64>::new();
    planner.plan_fft_forward(n).process(&mut buffer);

    // Non-negative frequency bins of a real-valued input are 0..=n/2.
    let mut peak_bin = 0usize;
    let mut peak_mag = buffer[0].norm();
    for (k, c) in buffer.iter().enumerate().take(n / 2 + 1).skip(1) {
        let mag = c.norm();
        if mag > peak_mag {
            peak_mag = mag;
            peak_bin = k;
        }
    }
    peak_bin as f64 * effective_rate / n as f64
}
