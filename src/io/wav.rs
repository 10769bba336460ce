//! WAV decode and encode.
//!
//! The reader walks RIFF chunks and accepts 16-bit PCM, 24-bit PCM, and
//! 32-bit float data with any channel count. The writer always produces
//! 16-bit PCM, which is what the transform hands back to callers.

use crate::core::types::{AudioBuffer, Sample};
use crate::error::MixError;
use std::io::{Read, Write};
use std::path::Path;

/// WAV audio format codes.
const WAV_FORMAT_PCM: u16 = 1;
const WAV_FORMAT_IEEE_FLOAT: u16 = 3;

/// Decodes a WAV file from a byte slice.
pub fn read_wav(data: &[u8]) -> Result<AudioBuffer, MixError> {
    let mut cursor = 0;

    // RIFF header
    if data.len() < 44 {
        return Err(MixError::DecodeFailure("WAV file too short".to_string()));
    }

    let riff = &data[0..4];
    if riff != b"RIFF" {
        return Err(MixError::DecodeFailure("missing RIFF header".to_string()));
    }
    cursor += 4;

    let _file_size = read_u32_le(data, cursor);
    cursor += 4;

    let wave = &data[cursor..cursor + 4];
    if wave != b"WAVE" {
        return Err(MixError::DecodeFailure(
            "missing WAVE identifier".to_string(),
        ));
    }
    cursor += 4;

    // Find fmt and data chunks
    let mut format_code: u16 = 0;
    let mut num_channels: u16 = 0;
    let mut sample_rate: u32 = 0;
    let mut bits_per_sample: u16 = 0;
    let mut audio_data: &[u8] = &[];

    while cursor + 8 <= data.len() {
        let chunk_id = &data[cursor..cursor + 4];
        cursor += 4;
        let chunk_size = read_u32_le(data, cursor) as usize;
        cursor += 4;

        if chunk_id == b"fmt " {
            if cursor + 16 > data.len() {
                return Err(MixError::DecodeFailure("fmt chunk too short".to_string()));
            }
            format_code = read_u16_le(data, cursor);
            num_channels = read_u16_le(data, cursor + 2);
            sample_rate = read_u32_le(data, cursor + 4);
            // skip byte rate (4 bytes) and block align (2 bytes)
            bits_per_sample = read_u16_le(data, cursor + 14);
        } else if chunk_id == b"data" {
            if cursor + chunk_size > data.len() {
                // Use whatever data is available
                audio_data = &data[cursor..];
            } else {
                audio_data = &data[cursor..cursor + chunk_size];
            }
        }

        cursor += chunk_size;
        // WAV chunks are word-aligned
        if chunk_size % 2 != 0 {
            cursor += 1;
        }
    }

    if sample_rate == 0 {
        return Err(MixError::DecodeFailure("no fmt chunk found".to_string()));
    }
    if num_channels == 0 {
        return Err(MixError::DecodeFailure(
            "fmt chunk declares zero channels".to_string(),
        ));
    }

    // Convert audio data to interleaved f32 samples
    let samples: Vec<Sample> = match (format_code, bits_per_sample) {
        (WAV_FORMAT_PCM, 16) => {
            let num_samples = audio_data.len() / 2;
            let mut result = Vec::with_capacity(num_samples);
            for i in 0..num_samples {
                let raw = read_i16_le(audio_data, i * 2);
                result.push(raw as f32 / 32768.0);
            }
            result
        }
        (WAV_FORMAT_PCM, 24) => {
            let num_samples = audio_data.len() / 3;
            let mut result = Vec::with_capacity(num_samples);
            for i in 0..num_samples {
                let offset = i * 3;
                let raw = (audio_data[offset] as i32)
                    | ((audio_data[offset + 1] as i32) << 8)
                    | ((audio_data[offset + 2] as i32) << 16);
                // Sign extend
                let raw = if raw & 0x800000 != 0 {
                    raw | !0xFFFFFF
                } else {
                    raw
                };
                result.push(raw as f32 / 8388608.0);
            }
            result
        }
        (WAV_FORMAT_IEEE_FLOAT, 32) => {
            let num_samples = audio_data.len() / 4;
            let mut result = Vec::with_capacity(num_samples);
            for i in 0..num_samples {
                let bytes = [
                    audio_data[i * 4],
                    audio_data[i * 4 + 1],
                    audio_data[i * 4 + 2],
                    audio_data[i * 4 + 3],
                ];
                result.push(f32::from_le_bytes(bytes));
            }
            result
        }
        (fmt, bits) => {
            return Err(MixError::DecodeFailure(format!(
                "unsupported WAV format: code={}, bits={}",
                fmt, bits
            )))
        }
    };

    // De-interleave into planar channels, dropping any trailing partial frame
    let num_channels = num_channels as usize;
    let num_frames = samples.len() / num_channels;
    let mut channels: Vec<Vec<Sample>> = (0..num_channels)
        .map(|_| Vec::with_capacity(num_frames))
        .collect();
    for frame in 0..num_frames {
        for (ch, channel) in channels.iter_mut().enumerate() {
            channel.push(samples[frame * num_channels + ch]);
        }
    }

    Ok(AudioBuffer::new(channels, sample_rate))
}

/// Decodes a WAV file from disk.
pub fn read_wav_file(path: &Path) -> Result<AudioBuffer, MixError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| MixError::IoError(format!("{}: {}", path.display(), e)))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(|e| MixError::IoError(format!("{}: {}", path.display(), e)))?;
    read_wav(&data)
}

/// Encodes an audio buffer as a 16-bit PCM WAV file.
///
/// Samples are clamped to [-1.0, 1.0] before quantization. Negative values
/// scale by 32768 and non-negative values by 32767 so that both rails map
/// onto the full 16-bit range.
pub fn write_wav_16bit(buffer: &AudioBuffer) -> Vec<u8> {
    let num_channels = buffer.num_channels() as u16;
    let num_frames = buffer.num_frames();
    let bits_per_sample: u16 = 16;
    let byte_rate = buffer.sample_rate * num_channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = num_channels * (bits_per_sample / 8);
    let data_size = (num_frames * num_channels as usize * 2) as u32;
    let file_size = 36 + data_size;

    let mut out = Vec::with_capacity(file_size as usize + 8);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&file_size.to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    out.extend_from_slice(&WAV_FORMAT_PCM.to_le_bytes());
    out.extend_from_slice(&num_channels.to_le_bytes());
    out.extend_from_slice(&buffer.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());

    for frame in 0..num_frames {
        for channel in &buffer.channels {
            let clamped = channel[frame].clamp(-1.0, 1.0);
            let raw = if clamped < 0.0 {
                (clamped * 32768.0) as i16
            } else {
                (clamped * 32767.0) as i16
            };
            out.extend_from_slice(&raw.to_le_bytes());
        }
    }

    out
}

/// Encodes a buffer and writes it to disk as 16-bit PCM.
pub fn write_wav_file_16bit(path: &Path, buffer: &AudioBuffer) -> Result<(), MixError> {
    let data = write_wav_16bit(buffer);
    let mut file = std::fs::File::create(path)
        .map_err(|e| MixError::IoError(format!("{}: {}", path.display(), e)))?;
    file.write_all(&data)
        .map_err(|e| MixError::IoError(format!("{}: {}", path.display(), e)))?;
    Ok(())
}

#[inline]
fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

#[inline]
fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[inline]
fn read_i16_le(data: &[u8], offset: usize) -> i16 {
    i16::from_le_bytes([data[offset], data[offset + 1]])
}
