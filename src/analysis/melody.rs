//! Melody extraction over hop-aligned analysis frames.

use crate::analysis::pitch::estimate_pitch;
use crate::core::types::{MelodyParams, Sample};
use crate::error::MixError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Frames quieter than this RMS produce no observation.
const SILENCE_RMS: f64 = 0.01;

/// Minimum confidence for an observation to vote on the base pitch.
const MEDIAN_MIN_CONFIDENCE: f32 = 0.01;

/// Base pitch assumed when no observation qualifies, in Hz.
pub const DEFAULT_BASE_PITCH: f64 = 200.0;

/// A single pitch observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MelodyPoint {
    /// Frame start time in seconds.
    pub time: f64,
    /// Estimated fundamental in Hz.
    pub pitch: f64,
    /// Frame RMS energy, used as a confidence weight.
    pub confidence: f32,
}

/// Extract a pitch contour from a mono signal.
///
/// Slides a `frame_size` window by `hop_size` and emits one observation per
/// voiced frame. Frames below the silence gate, or whose estimate falls
/// outside the open interval `(min_frequency, max_frequency)`, are skipped,
/// so the contour may have gaps. Observations are ordered by time.
pub fn extract_melody(
    samples: &[Sample],
    sample_rate: u32,
    params: &MelodyParams,
) -> Vec<MelodyPoint> {
    let num_frames = samples.len().saturating_sub(params.frame_size) / params.hop_size;
    let mut melody = Vec::new();

    for frame_index in 0..num_frames {
        let start = frame_index * params.hop_size;
        let frame = &samples[start..start + params.frame_size];

        let rms = frame_rms(frame);
        if rms < SILENCE_RMS {
            continue;
        }

        if let Some(pitch) = estimate_pitch(frame, sample_rate) {
            if pitch > params.min_frequency && pitch < params.max_frequency {
                melody.push(MelodyPoint {
                    time: start as f64 / sample_rate as f64,
                    pitch,
                    confidence: rms as f32,
                });
            }
        }
    }

    melody
}

/// Median pitch across confident observations, in Hz.
///
/// Observations with non-positive pitch or confidence at or below 0.01 do
/// not vote. Even-length sets take the upper middle element. Returns
/// [`DEFAULT_BASE_PITCH`] when nothing qualifies.
pub fn median_pitch(melody: &[MelodyPoint]) -> f64 {
    let mut pitches: Vec<f64> = melody
        .iter()
        .filter(|p| p.pitch > 0.0 && p.confidence > MEDIAN_MIN_CONFIDENCE)
        .map(|p| p.pitch)
        .collect();
    if pitches.is_empty() {
        return DEFAULT_BASE_PITCH;
    }
    pitches.sort_by(f64::total_cmp);
    pitches[pitches.len() / 2]
}

fn frame_rms(frame: &[Sample]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / frame.len() as f64).sqrt()
}

/// Serializable record of a melody extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MelodyArtifact {
    /// Sample rate the melody was extracted at.
    pub sample_rate: u32,
    /// Analysis frame size in samples.
    pub frame_size: usize,
    /// Hop between frame starts in samples.
    pub hop_size: usize,
    /// Median pitch of the confident observations, in Hz.
    pub median_pitch: f64,
    /// The extracted contour.
    #[serde(default)]
    pub points: Vec<MelodyPoint>,
}

impl MelodyArtifact {
    /// Build an artifact from an extraction run.
    pub fn new(sample_rate: u32, params: &MelodyParams, points: Vec<MelodyPoint>) -> Self {
        Self {
            sample_rate,
            frame_size: params.frame_size,
            hop_size: params.hop_size,
            median_pitch: median_pitch(&points),
            points,
        }
    }
}

/// Writes a melody artifact as JSON.
pub fn write_melody_json(path: &Path, artifact: &MelodyArtifact) -> Result<(), MixError> {
    let json = serde_json::to_string_pretty(artifact)
        .map_err(|e| MixError::IoError(format!("failed to serialize melody artifact: {}", e)))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Reads a melody artifact from JSON.
pub fn read_melody_json(path: &Path) -> Result<MelodyArtifact, MixError> {
    let data = std::fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| {
        MixError::DecodeFailure(format!(
            "failed to parse melody artifact from {}: {}",
            path.display(),
            e
        ))
    })
}
