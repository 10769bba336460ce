//! Pitch shifting via Hann-windowed overlap-add resynthesis.

use crate::core::resample::resample_linear;
use crate::core::window::hann_window;

/// Analysis frame size in samples.
const FRAME_SIZE: usize = 2048;
/// Hop between analysis frame starts in samples.
const HOP_SIZE: usize = 512;
/// Shifts smaller than this many semitones return the input unchanged.
const IDENTITY_EPSILON: f64 = 0.01;
/// Accumulated window weight below which output samples stay silent.
const WEIGHT_EPSILON: f32 = 0.001;

/// Overlap-add pitch shifter with a precomputed analysis window.
///
/// Construction allocates the Hann window once; one instance is meant to be
/// reused across every segment of a run.
pub struct PitchShifter {
    frame_size: usize,
    hop_size: usize,
    window: Vec<f32>,
}

impl PitchShifter {
    /// Creates a shifter with the standard 2048/512 framing.
    pub fn new() -> Self {
        Self {
            frame_size: FRAME_SIZE,
            hop_size: HOP_SIZE,
            window: hann_window(FRAME_SIZE),
        }
    }

    /// Returns the analysis frame size in samples.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Returns the analysis hop size in samples.
    #[inline]
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Shifts a mono buffer by the given number of semitones.
    ///
    /// Windowed input frames are re-laid at `round(hop_size / pitch_factor)`
    /// spacing while both the windowed signal and the window weights are
    /// accumulated; each output sample is then divided by its accumulated
    /// weight to even out overlap coverage, and the result is resampled back
    /// to the input length.
    ///
    /// `|semitones| < 0.01` returns the input unchanged, and inputs shorter
    /// than one analysis frame fall back to a plain rate resample. The
    /// output always has exactly `input.len()` samples; silence stays
    /// silence, and no clipping is applied at this stage.
    pub fn shift(&self, input: &[f32], semitones: f64) -> Vec<f32> {
        if semitones.abs() < IDENTITY_EPSILON {
            return input.to_vec();
        }

        let pitch_factor = 2f64.powf(semitones / 12.0);
        if input.len() < self.frame_size {
            return rate_shift(input, pitch_factor);
        }

        let output_hop = ((self.hop_size as f64 / pitch_factor).round() as usize).max(1);
        let num_frames = (input.len() - self.frame_size) / self.hop_size + 1;
        let output_len = (num_frames - 1) * output_hop + self.frame_size;

        let mut output = vec![0.0f32; output_len];
        let mut weight = vec![0.0f32; output_len];

        for frame in 0..num_frames {
            let input_start = frame * self.hop_size;
            let output_start = frame * output_hop;

            for (i, &w) in self.window.iter().enumerate() {
                output[output_start + i] += input[input_start + i] * w;
                weight[output_start + i] += w;
            }
        }

        for (sample, &w) in output.iter_mut().zip(weight.iter()) {
            if w > WEIGHT_EPSILON {
                *sample /= w;
            }
        }

        resample_linear(&output, input.len())
    }
}

impl Default for PitchShifter {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheap playback-rate shift for inputs shorter than one analysis frame.
///
/// Reads the input at `pitch_factor` speed, clamping reads past the end to
/// the final sample, so the output keeps the input's length.
fn rate_shift(input: &[f32], pitch_factor: f64) -> Vec<f32> {
    if input.is_empty() {
        return Vec::new();
    }
    let last = input.len() - 1;
    (0..input.len())
        .map(|i| {
            let pos = i as f64 * pitch_factor;
            let idx = (pos as usize).min(last);
            let next = (idx + 1).min(last);
            let frac = (pos - idx as f64) as f32;
            input[idx] * (1.0 - frac) + input[next] * frac
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(freq: f32, sample_rate: u32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_shift_zero_semitones_is_identity() {
        let input = sine(220.0, 44100, 8192, 0.9);
        let shifter = PitchShifter::new();
        assert_eq!(shifter.shift(&input, 0.0), input);
    }

    #[test]
    fn test_shift_below_epsilon_is_identity() {
        let input = sine(220.0, 44100, 4096, 0.9);
        let shifter = PitchShifter::new();
        assert_eq!(shifter.shift(&input, 0.009), input);
        assert_eq!(shifter.shift(&input, -0.009), input);
    }

    #[test]
    fn test_shift_preserves_length() {
        let input = sine(220.0, 44100, 22050, 0.9);
        let shifter = PitchShifter::new();
        for &semitones in &[-12.0, -5.0, 1.0, 7.0, 12.0] {
            let shifted = shifter.shift(&input, semitones);
            assert_eq!(shifted.len(), input.len(), "semitones {semitones}");
        }
    }

    #[test]
    fn test_shift_silence_stays_silent() {
        let input = vec![0.0f32; 8192];
        let shifter = PitchShifter::new();
        let shifted = shifter.shift(&input, 7.0);
        assert_eq!(shifted.len(), input.len());
        assert!(shifted.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_shift_stays_within_input_peak() {
        // Weight normalization averages overlapping windowed samples, so the
        // shifted signal cannot exceed the input's peak.
        let input = sine(220.0, 44100, 16384, 1.0);
        let shifter = PitchShifter::new();
        for &semitones in &[-12.0, -3.0, 3.0, 12.0] {
            let shifted = shifter.shift(&input, semitones);
            assert!(shifted.iter().all(|&s| s.abs() <= 1.0001));
        }
    }

    #[test]
    fn test_shift_changes_voiced_signal() {
        let input = sine(220.0, 44100, 8192, 0.9);
        let shifter = PitchShifter::new();
        let shifted = shifter.shift(&input, 7.0);
        let max_diff = input
            .iter()
            .zip(shifted.iter())
            .map(|(&a, &b)| (a - b).abs())
            .fold(0.0f32, f32::max);
        assert!(max_diff > 1e-3);
    }

    #[test]
    fn test_shift_short_input_falls_back() {
        let shifter = PitchShifter::new();
        let input = sine(440.0, 44100, 100, 0.9);
        assert!(input.len() < shifter.frame_size());

        let shifted = shifter.shift(&input, 12.0);
        assert_eq!(shifted.len(), input.len());
        assert!(shifted.iter().all(|s| s.is_finite()));

        let shifted_down = shifter.shift(&input, -12.0);
        assert_eq!(shifted_down.len(), input.len());
    }

    #[test]
    fn test_rate_shift_holds_last_sample_past_end() {
        let input = vec![0.0, 0.25, 0.5, 0.75];
        let shifted = rate_shift(&input, 2.0);
        assert_eq!(shifted.len(), 4);
        assert_eq!(shifted[0], 0.0);
        assert_eq!(shifted[1], 0.5);
        // Positions 4 and 6 read past the end and clamp
        assert_eq!(shifted[2], 0.75);
        assert_eq!(shifted[3], 0.75);
    }

    #[test]
    fn test_rate_shift_empty() {
        assert!(rate_shift(&[], 2.0).is_empty());
    }
}
