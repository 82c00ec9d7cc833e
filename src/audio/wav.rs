//! WAV encoder for rendered dialogue audio.
//!
//! Serializes a [`SampleBuffer`] into a canonical 44-byte-header RIFF/WAVE
//! container holding interleaved 16-bit PCM, using the hound crate.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::error::{DaemonError, ErrorCode, Result};

use super::buffer::SampleBuffer;

/// Size of the canonical RIFF/WAVE header in bytes.
pub const WAV_HEADER_LEN: usize = 44;

/// MIME type for encoded WAV output.
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Bit depth of encoded samples.
pub const BITS_PER_SAMPLE: u16 = 16;

const BYTES_PER_SAMPLE: u16 = BITS_PER_SAMPLE / 8;

/// Header bytes counted by the RIFF chunk size in addition to the data.
const RIFF_OVERHEAD: u32 = 36;

/// Encodes a mono or stereo buffer as a 16-bit PCM WAV file.
///
/// Stereo frames are interleaved left/right. Samples are clamped to
/// [-1.0, 1.0] and quantized with [`quantize_sample`]. An empty buffer is
/// not rejected and encodes to a bare 44-byte header.
///
/// # Errors
///
/// `UNSUPPORTED_CHANNEL_LAYOUT` for anything other than 1 or 2 channels.
/// `INVALID_SAMPLE_BUFFER` if the data does not fit the 32-bit RIFF size fields.
///
/// # Example
///
/// ```ignore
/// use linguadrama_daemon::audio::{encode_wav, SampleBuffer};
///
/// let buffer = SampleBuffer::mono(vec![0.0, 0.5, -0.5], 24000)?;
/// let bytes = encode_wav(&buffer)?;
/// assert_eq!(bytes.len(), 44 + 6);
/// ```
pub fn encode_wav(buffer: &SampleBuffer) -> Result<Vec<u8>> {
    let channels = buffer.num_channels();
    let interleaved: Vec<f32> = match (buffer.channel(0), buffer.channel(1)) {
        (Some(mono), None) if channels == 1 => mono.to_vec(),
        (Some(left), Some(right)) if channels == 2 => left
            .iter()
            .zip(right)
            .flat_map(|(&l, &r)| [l, r])
            .collect(),
        _ => return Err(DaemonError::unsupported_channel_layout(channels)),
    };

    let data_len = u32::try_from(interleaved.len() * BYTES_PER_SAMPLE as usize)
        .ok()
        .filter(|len| len.checked_add(RIFF_OVERHEAD).is_some())
        .ok_or_else(|| {
            DaemonError::invalid_sample_buffer(format!(
                "{} samples exceed the RIFF size limit",
                interleaved.len()
            ))
        })?;

    // channels is 1 or 2 here
    let num_channels = channels as u16;
    if buffer
        .sample_rate()
        .checked_mul(u32::from(num_channels * BYTES_PER_SAMPLE))
        .is_none()
    {
        return Err(DaemonError::invalid_sample_buffer(format!(
            "sample rate {} overflows the byte rate field",
            buffer.sample_rate()
        )));
    }

    let spec = WavSpec {
        channels: num_channels,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    };

    let mut out = Vec::with_capacity(WAV_HEADER_LEN + data_len as usize);
    let mut writer = WavWriter::new(Cursor::new(&mut out), spec).map_err(|e| {
        DaemonError::with_source(
            ErrorCode::InvalidSampleBuffer,
            "Failed to create WAV writer",
            e,
        )
    })?;

    for sample in interleaved {
        writer.write_sample(quantize_sample(sample)).map_err(|e| {
            DaemonError::with_source(
                ErrorCode::InvalidSampleBuffer,
                "Failed to write sample",
                e,
            )
        })?;
    }

    writer.finalize().map_err(|e| {
        DaemonError::with_source(
            ErrorCode::InvalidSampleBuffer,
            "Failed to finalize WAV data",
            e,
        )
    })?;

    debug!(
        channels,
        sample_rate = buffer.sample_rate(),
        bytes = out.len(),
        "Encoded WAV"
    );

    Ok(out)
}

/// Converts a normalized sample to 16-bit PCM.
///
/// Negative values scale by 32768 and non-negative values by 32767, so both
/// -1.0 and 1.0 map onto the ends of the i16 range. NaN maps to 0.
pub fn quantize_sample(sample: f32) -> i16 {
    let s = sample.clamp(-1.0, 1.0);
    let scaled = if s < 0.0 { s * 32768.0 } else { s * 32767.0 };
    scaled.round() as i16
}

/// Encodes a buffer and writes it to a WAV file.
pub fn write_wav(buffer: &SampleBuffer, path: &Path) -> Result<()> {
    let bytes = encode_wav(buffer)?;
    std::fs::write(path, bytes)
        .map_err(|e| DaemonError::export_failed(path.display().to_string(), e))
}
