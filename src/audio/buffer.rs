//! In-memory sample buffer shared by the PCM decoder and WAV encoder.

use crate::error::{DaemonError, Result};

/// Decoded audio: a sample rate plus one sequence of normalized samples per channel.
///
/// Samples are expected to lie in [-1.0, 1.0]; the encoder clamps anything
/// outside that range. All channels always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Creates a single-channel buffer.
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::from_channels(vec![samples], sample_rate)
    }

    /// Creates a two-channel buffer from left and right channel samples.
    pub fn stereo(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Result<Self> {
        Self::from_channels(vec![left, right], sample_rate)
    }

    /// Creates a buffer from any number of channels.
    ///
    /// Channel counts above 2 are accepted here so that callers get a clear
    /// `UNSUPPORTED_CHANNEL_LAYOUT` from the encoder rather than a lossy buffer.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DaemonError::invalid_sample_buffer("sample rate must be > 0"));
        }

        let Some(first) = channels.first() else {
            return Err(DaemonError::invalid_sample_buffer("at least one channel is required"));
        };

        let frames = first.len();
        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != frames)
        {
            return Err(DaemonError::invalid_sample_buffer(format!(
                "channel {} has {} samples, expected {}",
                index,
                channel.len(),
                frames
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the samples of one channel.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Playback duration in seconds.
    pub fn duration_sec(&self) -> f32 {
        self.len() as f32 / self.sample_rate as f32
    }
}
