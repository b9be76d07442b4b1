// src/processing/window.rs
//! Window functions for spectral analysis

use std::f64::consts::TAU;

/// Symmetric Hann window of length `size`.
///
/// Endpoints are zero, peak at the center; lengths 0 and 1 degenerate to
/// the empty and all-ones windows.
pub fn hann_window(size: usize) -> Vec<f64> {
    match size {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => (0..size)
            .map(|i| 0.5 * (1.0 - (TAU * i as f64 / (size - 1) as f64).cos()))
            .collect(),
    }
}
