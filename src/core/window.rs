//! Window functions for frame-based resynthesis.

use std::f64::consts::PI;

/// Generates a Hann window of `size` samples.
///
/// Sizes 0 and 1 have nothing to taper and return all-ones.
#[inline]
pub fn hann_window(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0; size];
    }
    let denom = (size - 1) as f64;
    (0..size)
        .map(|i| (0.5 * (1.0 - (2.0 * PI * i as f64 / denom).cos())) as f32)
        .collect()
}
