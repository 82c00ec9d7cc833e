//! Decoder for base64-encoded raw PCM speech payloads.
//!
//! The speech service returns mono 16-bit signed little-endian PCM as base64
//! text without any container, so the sample rate has to come from the caller.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;

use crate::error::{DaemonError, Result};

use super::buffer::SampleBuffer;

/// Sample rate of the speech service's PCM output (24kHz).
pub const DEFAULT_SAMPLE_RATE: u32 = 24000;

/// Divisor mapping an i16 sample onto [-1.0, 1.0).
pub const PCM16_DECODE_SCALE: f32 = 32768.0;

/// Standard alphabet, padding optional, stray trailing bits tolerated.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decodes a base64 PCM16 payload into a mono sample buffer.
///
/// `sample_rate` defaults to [`DEFAULT_SAMPLE_RATE`] when `None`. ASCII
/// whitespace inside the payload is ignored.
///
/// # Errors
///
/// `MALFORMED_PAYLOAD` if the payload is empty, is not valid base64, or
/// decodes to an odd number of bytes. `INVALID_SAMPLE_BUFFER` for a zero
/// sample rate.
pub fn decode_base64_pcm(payload: &str, sample_rate: Option<u32>) -> Result<SampleBuffer> {
    let sample_rate = sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE);

    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    if compact.is_empty() {
        return Err(DaemonError::malformed_payload("payload is empty"));
    }

    let bytes = PAYLOAD_ENGINE
        .decode(compact.as_bytes())
        .map_err(|e| DaemonError::malformed_payload(format!("invalid base64: {}", e)))?;

    let samples = pcm16_to_f32(&bytes)?;
    debug!(
        samples = samples.len(),
        sample_rate, "Decoded PCM payload"
    );

    SampleBuffer::mono(samples, sample_rate)
}

/// Converts little-endian PCM16 bytes into normalized f32 samples.
pub fn pcm16_to_f32(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 2 != 0 {
        return Err(DaemonError::malformed_payload(format!(
            "byte length {} is not a whole number of 16-bit samples",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f32::from(i16::from_le_bytes([pair[0], pair[1]])) / PCM16_DECODE_SCALE)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use base64::engine::general_purpose::STANDARD;

    fn encode_i16(samples: &[i16]) -> String {
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        STANDARD.encode(bytes)
    }

    #[test]
    fn decodes_known_samples() {
        let payload = encode_i16(&[0, 16384, -16384, 32767, -32768]);
        let buffer = decode_base64_pcm(&payload, None).unwrap();

        assert_eq!(buffer.num_channels(), 1);
        assert_eq!(buffer.sample_rate(), DEFAULT_SAMPLE_RATE);
        assert_eq!(
            buffer.channel(0).unwrap(),
            &[0.0, 0.5, -0.5, 32767.0 / 32768.0, -1.0]
        );
    }

    #[test]
    fn uses_caller_sample_rate() {
        let payload = encode_i16(&[1, 2, 3]);
        let buffer = decode_base64_pcm(&payload, Some(16000)).unwrap();
        assert_eq!(buffer.sample_rate(), 16000);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn decoding_is_deterministic() {
        let payload = encode_i16(&[-12345, 0, 321, 32000, -1]);
        let a = decode_base64_pcm(&payload, None).unwrap();
        let b = decode_base64_pcm(&payload, None).unwrap();

        let bits_a: Vec<u32> = a.channel(0).unwrap().iter().map(|s| s.to_bits()).collect();
        let bits_b: Vec<u32> = b.channel(0).unwrap().iter().map(|s| s.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn odd_byte_length_rejected() {
        for len in [1usize, 3, 5, 101] {
            let payload = STANDARD.encode(vec![0x7fu8; len]);
            let err = decode_base64_pcm(&payload, None).unwrap_err();
            assert_eq!(err.code, ErrorCode::MalformedPayload, "len {}", len);
        }
    }

    #[test]
    fn invalid_base64_rejected() {
        let err = decode_base64_pcm("not*base64!", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedPayload);
    }

    #[test]
    fn empty_payload_rejected() {
        let err = decode_base64_pcm("  \n", None).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedPayload);
    }

    #[test]
    fn whitespace_and_missing_padding_tolerated() {
        // [0x00, 0x40] = 16384 little-endian; "AEA=" without padding, wrapped
        let buffer = decode_base64_pcm(" AE\nA ", None).unwrap();
        assert_eq!(buffer.channel(0).unwrap(), &[0.5]);
    }

    #[test]
    fn zero_sample_rate_rejected() {
        let payload = encode_i16(&[0]);
        let err = decode_base64_pcm(&payload, Some(0)).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSampleBuffer);
    }
}
