//! WAV round-trip integration tests.
//!
//! Exercise encode and decode at the byte level, then through the full
//! transform: synth signal → WAV bytes → decode → render → encode → decode.

mod common;

use common::gen_sine;
use pitchmix::io::{read_wav, write_wav_16bit};
use pitchmix::{render, transform, AudioBuffer, MixParams, NullProgress};

const SAMPLE_RATE: u32 = 44100;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn max_abs_diff(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y).abs())
        .fold(0.0f32, f32::max)
}

// ── 16-bit round trips ───────────────────────────────────────────────────────

#[test]
fn test_wav_16bit_roundtrip_mono_identity() {
    let samples = gen_sine(440.0, SAMPLE_RATE, SAMPLE_RATE as usize, |_| 0.9);
    let original = AudioBuffer::from_mono(samples, SAMPLE_RATE);

    let wav = write_wav_16bit(&original);
    let decoded = read_wav(&wav).unwrap();

    assert_eq!(decoded.sample_rate, SAMPLE_RATE);
    assert_eq!(decoded.num_channels(), 1);
    assert_eq!(decoded.num_frames(), original.num_frames());

    // 16-bit quantization error stays below 1/32768 with rounding slack
    let max_err = max_abs_diff(decoded.channel(0).unwrap(), original.channel(0).unwrap());
    assert!(max_err < 0.001, "max round-trip error {}", max_err);
}

#[test]
fn test_wav_roundtrip_48khz_stereo() {
    let left = gen_sine(440.0, 48000, 24000, |_| 0.8);
    let right = gen_sine(880.0, 48000, 24000, |_| 0.8);
    let original = AudioBuffer::new(vec![left, right], 48000);

    let wav = write_wav_16bit(&original);
    let decoded = read_wav(&wav).unwrap();

    assert_eq!(decoded.sample_rate, 48000);
    assert_eq!(decoded.num_channels(), 2);
    assert_eq!(decoded.num_frames(), 24000);
    for channel in 0..2 {
        let max_err = max_abs_diff(
            decoded.channel(channel).unwrap(),
            original.channel(channel).unwrap(),
        );
        assert!(max_err < 0.001, "channel {} error {}", channel, max_err);
    }

    // the channels carry different tones and must stay separate
    let avg_diff: f32 = decoded
        .channel(0)
        .unwrap()
        .iter()
        .zip(decoded.channel(1).unwrap().iter())
        .map(|(&l, &r)| (l - r).abs())
        .sum::<f32>()
        / 24000.0;
    assert!(avg_diff > 0.1, "channels collapsed, avg diff {}", avg_diff);
}

#[test]
fn test_wav_zeros_roundtrip_and_header() {
    let original = AudioBuffer::new(vec![vec![0.0; 1000], vec![0.0; 1000]], SAMPLE_RATE);
    let wav = write_wav_16bit(&original);

    assert_eq!(wav.len(), 44 + 1000 * 2 * 2);
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(u16_le(&wav, 22), 2, "channel count");
    assert_eq!(u32_le(&wav, 24), SAMPLE_RATE, "sample rate");
    assert_eq!(u16_le(&wav, 34), 16, "bit depth");
    assert_eq!(u32_le(&wav, 40), 1000 * 2 * 2, "data length");

    let decoded = read_wav(&wav).unwrap();
    assert_eq!(decoded.num_frames(), 1000);
    assert_eq!(decoded.num_channels(), 2);
    for channel in &decoded.channels {
        assert!(channel.iter().all(|&s| s == 0.0));
    }
}

// ── Lenient decoding ─────────────────────────────────────────────────────────

#[test]
fn test_wav_tolerates_truncated_data() {
    let samples = gen_sine(440.0, SAMPLE_RATE, SAMPLE_RATE as usize, |_| 0.9);
    let original = AudioBuffer::from_mono(samples, SAMPLE_RATE);
    let mut wav = write_wav_16bit(&original);

    // chop off the tail; the declared data size now overshoots the file
    wav.truncate(wav.len() - 1001);
    let decoded = read_wav(&wav).unwrap();

    assert!(decoded.num_frames() > 43000);
    assert!(decoded.num_frames() < original.num_frames());
    let max_err = max_abs_diff(
        &decoded.channel(0).unwrap()[..1000],
        &original.channel(0).unwrap()[..1000],
    );
    assert!(max_err < 0.001, "truncated prefix diverged: {}", max_err);
}

// ── Transform through the codec ──────────────────────────────────────────────

#[test]
fn test_transform_blob_decodes_to_render_output() {
    let reference = AudioBuffer::from_mono(
        gen_sine(220.0, SAMPLE_RATE, 22050, |_| 0.9),
        SAMPLE_RATE,
    );
    let voice = AudioBuffer::from_mono(
        gen_sine(150.0, SAMPLE_RATE, 13230, |_| 0.8),
        SAMPLE_RATE,
    );
    let params = MixParams::default();

    let rendered = render(&reference, &voice, &params, &mut NullProgress).unwrap();
    let blob = transform(&reference, &voice, &params, &mut NullProgress).unwrap();
    let decoded = read_wav(&blob).unwrap();

    assert_eq!(decoded.sample_rate, rendered.sample_rate);
    assert_eq!(decoded.num_channels(), rendered.num_channels());
    assert_eq!(decoded.num_frames(), rendered.num_frames());
    let max_err = max_abs_diff(decoded.channel(0).unwrap(), rendered.channel(0).unwrap());
    assert!(max_err < 0.001, "blob diverged from render: {}", max_err);
}

#[test]
fn test_render_from_decoded_inputs() {
    // quantization from a 16-bit trip must not break pitch tracking
    let reference = AudioBuffer::from_mono(
        gen_sine(220.0, SAMPLE_RATE, 22050, |_| 0.9),
        SAMPLE_RATE,
    );
    let voice = AudioBuffer::from_mono(
        gen_sine(150.0, SAMPLE_RATE, 13230, |_| 0.8),
        SAMPLE_RATE,
    );

    let reference = read_wav(&write_wav_16bit(&reference)).unwrap();
    let voice = read_wav(&write_wav_16bit(&voice)).unwrap();

    let output = render(&reference, &voice, &MixParams::default(), &mut NullProgress).unwrap();
    assert_eq!(output.num_frames(), 22050);
    assert_eq!(output.num_channels(), 1);
}
