/// A single audio sample (32-bit float, range -1.0 to 1.0).
pub type Sample = f32;

/// Buffer holding decoded audio in planar format.
///
/// Each channel is stored as its own sample vector, all of equal length:
/// `channels[0]` is the first (or only) channel, `channels[1]` the second,
/// and so on.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Per-channel sample data.
    pub channels: Vec<Vec<Sample>>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from planar channel data.
    pub fn new(channels: Vec<Vec<Sample>>, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
        }
    }

    /// Create a single-channel buffer.
    pub fn from_mono(samples: Vec<Sample>, sample_rate: u32) -> Self {
        Self {
            channels: vec![samples],
            sample_rate,
        }
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn num_frames(&self) -> usize {
        self.channels.iter().map(Vec::len).min().unwrap_or(0)
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    /// Returns true if the buffer contains no samples.
    pub fn is_empty(&self) -> bool {
        self.num_frames() == 0
    }

    /// Borrow a single channel's samples, or `None` if out of range.
    pub fn channel(&self, index: usize) -> Option<&[Sample]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Fold all channels down to mono by averaging.
    ///
    /// A single-channel buffer is copied as-is.
    pub fn to_mono(&self) -> Vec<Sample> {
        if self.channels.len() == 1 {
            return self.channels[0].clone();
        }
        let num_frames = self.num_frames();
        let scale = 1.0 / self.channels.len().max(1) as f32;
        let mut mono = vec![0.0; num_frames];
        for channel in &self.channels {
            for (out, &sample) in mono.iter_mut().zip(channel.iter()) {
                *out += sample;
            }
        }
        for out in &mut mono {
            *out *= scale;
        }
        mono
    }
}

/// Parameters controlling melody extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MelodyParams {
    /// Analysis frame size in samples (default: 2048).
    pub frame_size: usize,
    /// Hop between frame starts in samples (default: 512).
    pub hop_size: usize,
    /// Lowest pitch accepted, exclusive, in Hz (default: 80.0).
    pub min_frequency: f64,
    /// Highest pitch accepted, exclusive, in Hz (default: 2000.0).
    pub max_frequency: f64,
}

impl Default for MelodyParams {
    fn default() -> Self {
        Self {
            frame_size: 2048,
            hop_size: 512,
            min_frequency: 80.0,
            max_frequency: 2000.0,
        }
    }
}

impl MelodyParams {
    /// Set the hop size.
    pub fn with_hop_size(mut self, hop_size: usize) -> Self {
        self.hop_size = hop_size.max(1);
        self
    }

    /// Set the accepted frequency band (exclusive bounds).
    pub fn with_frequency_range(mut self, min_frequency: f64, max_frequency: f64) -> Self {
        self.min_frequency = min_frequency;
        self.max_frequency = max_frequency;
        self
    }
}

/// Parameters controlling the final mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixParams {
    /// Gain applied to the reference signal (0.0 to 1.0, default: 0.3).
    pub reference_volume: f32,
    /// Gain applied to the resynthesized voice (0.0 to 1.0, default: 1.0).
    pub voice_volume: f32,
}

impl Default for MixParams {
    fn default() -> Self {
        Self {
            reference_volume: 0.3,
            voice_volume: 1.0,
        }
    }
}

impl MixParams {
    /// Set the reference gain, clamped to 0.0..=1.0.
    pub fn with_reference_volume(mut self, volume: f32) -> Self {
        self.reference_volume = volume.clamp(0.0, 1.0);
        self
    }

    /// Set the voice gain, clamped to 0.0..=1.0.
    pub fn with_voice_volume(mut self, volume: f32) -> Self {
        self.voice_volume = volume.clamp(0.0, 1.0);
        self
    }
}
