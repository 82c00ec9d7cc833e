//! Audio codec module.
//!
//! Decodes base64 PCM speech payloads into sample buffers and encodes
//! sample buffers as downloadable WAV files.

pub mod buffer;
pub mod pcm;
pub mod wav;

// Re-export commonly used items
pub use buffer::SampleBuffer;
pub use pcm::{decode_base64_pcm, pcm16_to_f32, DEFAULT_SAMPLE_RATE};
pub use wav::{encode_wav, quantize_sample, write_wav, WAV_HEADER_LEN, WAV_MIME_TYPE};
