//! Time-domain pitch estimation.
//!
//! Estimates the dominant fundamental of a frame by scoring candidate
//! periods with a normalized mean-absolute-difference autocorrelation.
//! Quadratic in the frame length, which is fine for the offline 2048-sample
//! analysis frames this crate uses.

/// Shortest candidate period in samples.
const MIN_LAG: usize = 20;

/// Score a candidate period must exceed to count as a pitch.
const CORRELATION_THRESHOLD: f64 = 0.9;

/// Largest correction applied when matching pitches, in semitones.
const MAX_SEMITONE_SHIFT: f64 = 12.0;

/// Note names within an octave, starting at C.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Estimate the dominant fundamental frequency of a mono frame, in Hz.
///
/// Candidate periods run from [`MIN_LAG`] up to half the frame length; each
/// is scored as `1 - mean(|frame[i] - frame[i + lag]|)`. The scan keeps the
/// best score and stops at the first drop after any candidate clears the
/// threshold, so the first strong local maximum wins. Returns `None` when no
/// candidate clears the threshold, including for frames too short to scan.
pub fn estimate_pitch(frame: &[f32], sample_rate: u32) -> Option<f64> {
    let max_lag = frame.len() / 2;
    if max_lag <= MIN_LAG {
        return None;
    }

    let mut best_lag = None;
    let mut best_score = 0.0f64;
    let mut found_candidate = false;

    for lag in MIN_LAG..max_lag {
        let mut diff_sum = 0.0f64;
        for i in 0..max_lag {
            diff_sum += (frame[i] - frame[i + lag]).abs() as f64;
        }
        let score = 1.0 - diff_sum / max_lag as f64;

        if score > CORRELATION_THRESHOLD && score > best_score {
            best_score = score;
            best_lag = Some(lag);
            found_candidate = true;
        } else if found_candidate {
            break;
        }
    }

    best_lag.map(|lag| sample_rate as f64 / lag as f64)
}

/// Whole-semitone shift that takes `from_hz` to `to_hz`, clamped to one
/// octave in either direction.
pub fn semitone_shift(from_hz: f64, to_hz: f64) -> f64 {
    let semitones = 12.0 * (to_hz / from_hz).log2();
    semitones
        .clamp(-MAX_SEMITONE_SHIFT, MAX_SEMITONE_SHIFT)
        .round()
}

/// Scientific pitch name for a frequency ("A4", "G#3").
///
/// Frequencies below 20 Hz map to `"-"`.
pub fn note_name(frequency: f64) -> String {
    if frequency < 20.0 {
        return "-".to_string();
    }
    let c0 = 440.0 * 2f64.powf(-4.75);
    let half_steps = (12.0 * (frequency / c0).log2()).round() as usize;
    let octave = half_steps / 12;
    format!("{}{}", NOTE_NAMES[half_steps % 12], octave)
}
