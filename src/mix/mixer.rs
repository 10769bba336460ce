//! Melody-following mixer.
//!
//! The mixer walks the reference in 100 ms segments. For each segment it
//! reads the next slice of the voice sample (wrapping around when the voice
//! is shorter than the reference), shifts it toward the melody pitch nearest
//! the segment's start time, and crossfades it into a mono voice track. The
//! voice track is then mixed under every reference channel and each channel
//! is peak normalized.

use crate::analysis::{extract_melody, median_pitch, semitone_shift, MelodyPoint};
use crate::core::{AudioBuffer, MelodyParams, MixParams, Sample};
use crate::error::MixError;
use crate::mix::progress::{ProgressSink, ProgressUpdate};
use crate::shift::PitchShifter;

/// Length of one transform segment in seconds.
const SEGMENT_DURATION: f64 = 0.1;
/// Analysis hop for the reference melody, in samples.
const REFERENCE_HOP_SIZE: usize = 1024;
const REFERENCE_MIN_FREQUENCY: f64 = 80.0;
const REFERENCE_MAX_FREQUENCY: f64 = 800.0;
/// Analysis hop for the voice base pitch, in samples.
const VOICE_HOP_SIZE: usize = 2048;
const VOICE_MIN_FREQUENCY: f64 = 80.0;
const VOICE_MAX_FREQUENCY: f64 = 500.0;
/// The melody lookup stops scanning this far past the segment time, in
/// seconds.
const LOOKUP_HORIZON: f64 = 0.2;
/// Longest crossfade ramp, in samples.
const MAX_FADE_SAMPLES: f32 = 256.0;
/// Peak amplitude targeted by per-channel normalization.
const NORMALIZE_TARGET: f32 = 0.9;
/// Peaks at or below this level count as silence and are left unscaled.
const SILENCE_PEAK: f32 = 0.001;

/// Renders a voice sample so that it follows the melody of a reference
/// recording.
///
/// The mixer holds no per-render state, so one instance can serve any number
/// of calls.
pub struct MelodyMixer {
    params: MixParams,
    shifter: PitchShifter,
}

impl MelodyMixer {
    /// Create a mixer with the given mix parameters.
    pub fn new(params: MixParams) -> Self {
        Self {
            params,
            shifter: PitchShifter::new(),
        }
    }

    /// The mix parameters this mixer renders with.
    #[inline]
    pub fn params(&self) -> &MixParams {
        &self.params
    }

    /// Render the melody-following mix of `voice` over `reference`.
    ///
    /// The output keeps the reference's sample rate and channel count and is
    /// exactly `floor(duration * sample_rate)` frames long. Checkpoints are
    /// reported to `progress` as stages complete, ending at 90 before the
    /// final channel mix.
    ///
    /// Returns [`MixError::NoMelodyDetected`] when no pitched frames are
    /// found in the reference.
    pub fn render<P: ProgressSink>(
        &self,
        reference: &AudioBuffer,
        voice: &AudioBuffer,
        progress: &mut P,
    ) -> Result<AudioBuffer, MixError> {
        let sample_rate = reference.sample_rate;

        progress.report(ProgressUpdate {
            step: "analyzing reference melody",
            percent: 10,
        });
        let reference_mono = reference.to_mono();
        let melody = extract_melody(&reference_mono, sample_rate, &reference_melody_params());
        if melody.is_empty() {
            return Err(MixError::NoMelodyDetected);
        }

        progress.report(ProgressUpdate {
            step: "preparing voice sample",
            percent: 20,
        });
        let voice_mono = voice.to_mono();

        progress.report(ProgressUpdate {
            step: "estimating voice base pitch",
            percent: 30,
        });
        let voice_params = MelodyParams::default()
            .with_hop_size(VOICE_HOP_SIZE)
            .with_frequency_range(VOICE_MIN_FREQUENCY, VOICE_MAX_FREQUENCY);
        let voice_melody = extract_melody(&voice_mono, voice.sample_rate, &voice_params);
        let base_pitch = median_pitch(&voice_melody);

        progress.report(ProgressUpdate {
            step: "rendering segments",
            percent: 40,
        });
        let duration = reference.duration_secs();
        let output_len = (duration * sample_rate as f64).floor() as usize;
        let voice_track = self.render_voice_track(
            &voice_mono,
            &melody,
            base_pitch,
            duration,
            sample_rate,
            output_len,
            progress,
        );

        progress.report(ProgressUpdate {
            step: "mixing channels",
            percent: 90,
        });
        let mut channels = Vec::with_capacity(reference.num_channels());
        for reference_channel in &reference.channels {
            let mut mixed = Vec::with_capacity(output_len);
            for (i, &voice_sample) in voice_track.iter().enumerate() {
                let reference_sample = reference_channel.get(i).copied().unwrap_or(0.0);
                mixed.push(
                    reference_sample * self.params.reference_volume
                        + voice_sample * self.params.voice_volume,
                );
            }
            normalize_peak(&mut mixed);
            channels.push(mixed);
        }

        Ok(AudioBuffer::new(channels, sample_rate))
    }

    /// Build the mono voice track that follows the reference melody.
    fn render_voice_track<P: ProgressSink>(
        &self,
        voice: &[Sample],
        melody: &[MelodyPoint],
        base_pitch: f64,
        duration: f64,
        sample_rate: u32,
        output_len: usize,
        progress: &mut P,
    ) -> Vec<Sample> {
        let mut track = vec![0.0; output_len];
        let segment_samples = (SEGMENT_DURATION * sample_rate as f64).floor() as usize;
        if voice.is_empty() || segment_samples == 0 {
            return track;
        }

        let num_segments = (duration / SEGMENT_DURATION).ceil() as usize;
        let mut cursor = 0;

        for index in 0..num_segments {
            if index % 20 == 0 {
                let percent = (40 + index * 50 / num_segments) as u8;
                progress.report(ProgressUpdate {
                    step: "rendering segments",
                    percent,
                });
            }

            let segment_start = index * segment_samples;
            let segment_end = (segment_start + segment_samples).min(output_len);
            let current_time = index as f64 * SEGMENT_DURATION;

            if let Some(target_pitch) = melody_pitch_at(melody, current_time) {
                if segment_end > segment_start {
                    let semitones = semitone_shift(base_pitch, target_pitch);
                    let segment = extract_looped(voice, cursor, segment_samples);
                    let shifted = self.shifter.shift(&segment, semitones);
                    mix_segment(&mut track, &shifted, segment_start, segment_end - segment_start);
                }
            }

            // The cursor advances once per segment, mixed or not.
            cursor = (cursor + segment_samples) % voice.len();
        }

        track
    }
}

/// Melody extraction parameters applied to the reference signal.
///
/// Callers exporting a melody artifact get the same points the mixer
/// follows.
pub fn reference_melody_params() -> MelodyParams {
    MelodyParams::default()
        .with_hop_size(REFERENCE_HOP_SIZE)
        .with_frequency_range(REFERENCE_MIN_FREQUENCY, REFERENCE_MAX_FREQUENCY)
}

/// Find the melody pitch nearest `time`.
///
/// The melody is time ordered, so the scan stops once it has passed the
/// lookup horizon beyond `time`.
fn melody_pitch_at(melody: &[MelodyPoint], time: f64) -> Option<f64> {
    let mut closest = None;
    let mut min_diff = f64::INFINITY;

    for point in melody {
        let diff = (point.time - time).abs();
        if diff < min_diff {
            min_diff = diff;
            closest = Some(point.pitch);
        }
        if point.time > time + LOOKUP_HORIZON {
            break;
        }
    }

    closest
}

/// Read `length` samples from `source` starting at `start`, wrapping to the
/// beginning whenever the read runs past the end.
///
/// Returns an empty vector when `source` is empty.
pub fn extract_looped(source: &[Sample], start: usize, length: usize) -> Vec<Sample> {
    if source.is_empty() {
        return Vec::new();
    }
    let mut segment = Vec::with_capacity(length);
    for i in 0..length {
        segment.push(source[(start + i) % source.len()]);
    }
    segment
}

/// Add `segment` into `output` at `start`, ramping the first and last
/// quarter-segment (capped at [`MAX_FADE_SAMPLES`]) so neighboring segments
/// splice without clicks.
fn mix_segment(output: &mut [Sample], segment: &[Sample], start: usize, length: usize) {
    if segment.is_empty() || start >= output.len() {
        return;
    }
    let span = length.min(output.len() - start);
    let fade = (length as f32 / 4.0).min(MAX_FADE_SAMPLES);
    let last = segment.len() - 1;

    for i in 0..span {
        let position = i as f32;
        let mut gain = 1.0;
        if position < fade {
            gain = position / fade;
        } else if position > length as f32 - fade {
            gain = (length as f32 - position) / fade;
        }
        output[start + i] += segment[i.min(last)] * gain;
    }
}

/// Scale `samples` so the absolute peak lands at the normalization target.
/// Near-silent channels are left untouched.
fn normalize_peak(samples: &mut [Sample]) {
    let mut peak = 0.0f32;
    for &sample in samples.iter() {
        peak = peak.max(sample.abs());
    }
    if peak > SILENCE_PEAK {
        let gain = NORMALIZE_TARGET / peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}
