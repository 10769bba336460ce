#![forbid(unsafe_code)]
//! Voice melody mixer: pitch-shifts a voice sample to follow the melody of a
//! reference recording, then mixes the two into one track.
//!
//! `pitchmix` tracks the reference melody with an autocorrelation pitch
//! estimator, measures the voice's base pitch, and walks the reference in
//! 100 ms segments. Each segment reads the next slice of the voice (looping
//! back when the voice is shorter than the reference), shifts it toward the
//! melody pitch with an overlap-add resynthesizer, and crossfades it into a
//! voice track. That track is mixed under every reference channel and the
//! result is peak normalized and encoded as 16-bit WAV.
//!
//! # Quick Start
//!
//! ```
//! use pitchmix::{AudioBuffer, MixParams, ProgressUpdate};
//!
//! // Half a second of 220 Hz reference and a short 150 Hz voice
//! let reference = AudioBuffer::from_mono(
//!     (0..22050)
//!         .map(|i| 0.9 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin())
//!         .collect(),
//!     44100,
//! );
//! let voice = AudioBuffer::from_mono(
//!     (0..13230)
//!         .map(|i| 0.8 * (2.0 * std::f32::consts::PI * 150.0 * i as f32 / 44100.0).sin())
//!         .collect(),
//!     44100,
//! );
//!
//! let mut sink = |update: ProgressUpdate| {
//!     eprintln!("{:>3}% {}", update.percent, update.step);
//! };
//! let params = MixParams::default();
//! let wav = pitchmix::transform(&reference, &voice, &params, &mut sink).unwrap();
//! assert_eq!(&wav[0..4], b"RIFF");
//! ```
//!
//! Callers that do not track progress pass [`NullProgress`] instead of a
//! closure.
//!
//! # Files
//!
//! [`transform_wav_file`] runs the same pipeline directly on WAV paths:
//!
//! ```no_run
//! use pitchmix::MixParams;
//! use std::path::Path;
//!
//! pitchmix::transform_wav_file(
//!     Path::new("reference.wav"),
//!     Path::new("voice.wav"),
//!     Path::new("mixed.wav"),
//!     &MixParams::default().with_reference_volume(0.25),
//! )
//! .unwrap();
//! ```

pub mod analysis;
pub mod core;
pub mod error;
pub mod io;
pub mod mix;
pub mod shift;

pub use analysis::{MelodyArtifact, MelodyPoint};
pub use core::types::{AudioBuffer, MelodyParams, MixParams, Sample};
pub use error::MixError;
pub use mix::{MelodyMixer, NullProgress, ProgressSink, ProgressUpdate};
pub use shift::PitchShifter;

use std::path::Path;

/// Renders the melody-following mix and encodes it as a 16-bit WAV file.
///
/// This is the main one-shot entry point. The returned bytes are a complete
/// WAV file at the reference's sample rate and channel count. A final
/// checkpoint at 100 is reported once encoding finishes.
///
/// # Errors
///
/// Returns [`MixError::NoMelodyDetected`] if no pitched frames are found in
/// the reference.
///
/// # Example
///
/// ```
/// use pitchmix::{AudioBuffer, MixParams, NullProgress};
///
/// let reference = AudioBuffer::from_mono(
///     (0..22050)
///         .map(|i| 0.9 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin())
///         .collect(),
///     44100,
/// );
/// let voice = AudioBuffer::from_mono(
///     (0..13230)
///         .map(|i| 0.8 * (2.0 * std::f32::consts::PI * 150.0 * i as f32 / 44100.0).sin())
///         .collect(),
///     44100,
/// );
///
/// let wav = pitchmix::transform(&reference, &voice, &MixParams::default(), &mut NullProgress)
///     .unwrap();
/// assert_eq!(wav.len(), 44 + 22050 * 2);
/// ```
pub fn transform<P: ProgressSink>(
    reference: &AudioBuffer,
    voice: &AudioBuffer,
    params: &MixParams,
    progress: &mut P,
) -> Result<Vec<u8>, MixError> {
    let rendered = render(reference, voice, params, progress)?;
    let wav = io::wav::write_wav_16bit(&rendered);
    progress.report(ProgressUpdate {
        step: "complete",
        percent: 100,
    });
    Ok(wav)
}

/// Renders the melody-following mix and returns it as an [`AudioBuffer`].
///
/// Same pipeline as [`transform`] without the WAV encoding step; progress
/// stops at 90.
///
/// # Errors
///
/// Returns [`MixError::NoMelodyDetected`] if no pitched frames are found in
/// the reference.
pub fn render<P: ProgressSink>(
    reference: &AudioBuffer,
    voice: &AudioBuffer,
    params: &MixParams,
    progress: &mut P,
) -> Result<AudioBuffer, MixError> {
    MelodyMixer::new(*params).render(reference, voice, progress)
}

/// Reads a reference and a voice WAV file, renders the mix, and writes the
/// result to `output_path` as 16-bit PCM.
///
/// Returns the rendered buffer so callers can inspect what was written.
///
/// # Errors
///
/// Returns [`MixError::IoError`] if any file cannot be read or written,
/// [`MixError::DecodeFailure`] if an input is not valid WAV, or
/// [`MixError::NoMelodyDetected`] if the reference has no pitched frames.
pub fn transform_wav_file(
    reference_path: &Path,
    voice_path: &Path,
    output_path: &Path,
    params: &MixParams,
) -> Result<AudioBuffer, MixError> {
    let reference = io::wav::read_wav_file(reference_path)?;
    let voice = io::wav::read_wav_file(voice_path)?;
    let rendered = render(&reference, &voice, params, &mut NullProgress)?;
    io::wav::write_wav_file_16bit(output_path, &rendered)?;
    Ok(rendered)
}

/// Extracts the melody of a buffer after folding it to mono.
///
/// Convenience wrapper around [`analysis::extract_melody`] for callers
/// holding an [`AudioBuffer`].
pub fn extract_melody_buffer(buffer: &AudioBuffer, params: &MelodyParams) -> Vec<MelodyPoint> {
    let mono = buffer.to_mono();
    analysis::extract_melody(&mono, buffer.sample_rate, params)
}
