//! Generation pipeline for audio dramas.
//!
//! Orchestrates the generative client and the audio codec: notes become a
//! validated script, and a script becomes a decoded sample buffer plus its
//! WAV encoding.

use tracing::info;

use crate::audio::{decode_base64_pcm, encode_wav, SampleBuffer, WAV_MIME_TYPE};
use crate::error::{DaemonError, Result};
use crate::types::GeneratedScript;

use super::client::GenerativeClient;

/// Audio rendered for a script, ready for playback and download.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedAudio {
    /// Decoded samples for playback.
    pub buffer: SampleBuffer,

    /// The same samples encoded as a WAV file.
    pub wav: Vec<u8>,
}

impl RenderedAudio {
    /// Encodes a buffer into a rendered audio artifact.
    pub fn from_buffer(buffer: SampleBuffer) -> Result<Self> {
        let wav = encode_wav(&buffer)?;
        Ok(Self { buffer, wav })
    }

    /// MIME type of the encoded bytes.
    pub fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }

    /// Playback duration in seconds.
    pub fn duration_sec(&self) -> f32 {
        self.buffer.duration_sec()
    }
}

/// Turns notes into scripts and scripts into audio using an injected client.
pub struct DramaPipeline {
    client: Box<dyn GenerativeClient>,
    sample_rate: u32,
}

impl DramaPipeline {
    /// Creates a pipeline.
    ///
    /// `sample_rate` is used for speech payloads that do not report their
    /// own rate.
    pub fn new(client: Box<dyn GenerativeClient>, sample_rate: u32) -> Self {
        Self {
            client,
            sample_rate,
        }
    }

    /// Fallback sample rate for speech payloads.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Generates a dialogue script from notes.
    ///
    /// # Errors
    ///
    /// `EMPTY_NOTES` for blank notes, `SCRIPT_GENERATION_FAILED` if the
    /// client fails or returns an invalid script.
    pub fn script_from_notes(&self, notes: &str) -> Result<GeneratedScript> {
        if notes.trim().is_empty() {
            return Err(DaemonError::empty_notes());
        }

        let script = self.client.generate_script(notes)?;
        if let Some(reason) = script.validate() {
            return Err(DaemonError::script_generation_failed(reason));
        }

        info!(
            topic = %script.topic,
            lines = script.lines.len(),
            "Script generated"
        );
        Ok(script)
    }

    /// Speaks a script and decodes the result.
    ///
    /// # Errors
    ///
    /// `AUDIO_GENERATION_FAILED` if the client fails, `MALFORMED_PAYLOAD` if
    /// the returned audio cannot be decoded.
    pub fn render_audio(&self, script: &GeneratedScript) -> Result<RenderedAudio> {
        let payload = self.client.generate_speech(script)?;
        let sample_rate = payload.sample_rate_hint().unwrap_or(self.sample_rate);

        let buffer = decode_base64_pcm(&payload.audio_base64, Some(sample_rate))?;
        let audio = RenderedAudio::from_buffer(buffer)?;

        info!(
            samples = audio.buffer.len(),
            sample_rate,
            duration_sec = audio.duration_sec(),
            "Audio rendered"
        );
        Ok(audio)
    }
}
