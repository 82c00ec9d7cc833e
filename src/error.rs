//! Error types for the linguadrama daemon.
//!
//! Defines all error codes and types used throughout the daemon for
//! consistent error handling and reporting.

use std::fmt;

/// Error codes returned by the daemon in error responses.
///
/// These codes are used in JSON-RPC error responses and allow clients
/// to programmatically handle specific error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Speech payload could not be decoded into PCM samples.
    /// Trigger: Invalid base64, empty payload, or odd byte count.
    MalformedPayload,

    /// Sample buffer has a channel layout the WAV encoder cannot write.
    /// Trigger: Channel count other than 1 or 2.
    UnsupportedChannelLayout,

    /// Sample buffer violates its structural invariants.
    /// Trigger: Unequal channel lengths, zero sample rate, oversized data.
    InvalidSampleBuffer,

    /// Notes document has no usable text.
    /// Trigger: Empty or whitespace-only notes.
    EmptyNotes,

    /// Notes document format is not supported.
    /// Trigger: File extension other than .txt or .md.
    UnsupportedDocument,

    /// Notes document could not be read.
    /// Trigger: Missing file, permission error, invalid UTF-8.
    DocumentReadFailed,

    /// No API key configured for the generative API.
    /// Trigger: GEMINI_API_KEY and API_KEY both unset.
    MissingApiKey,

    /// Script generation call failed or returned an unusable script.
    /// Trigger: Network error, API error, malformed JSON response.
    ScriptGenerationFailed,

    /// Speech generation call failed or returned no audio.
    /// Trigger: Network error, API error, missing inline audio data.
    AudioGenerationFailed,

    /// Requested action is not valid in the current session state.
    /// Trigger: e.g. generating audio before a script exists.
    InvalidTransition,

    /// Writing an exported script or audio file failed.
    /// Trigger: Unwritable output directory, disk full.
    ExportFailed,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MalformedPayload => "MALFORMED_PAYLOAD",
            ErrorCode::UnsupportedChannelLayout => "UNSUPPORTED_CHANNEL_LAYOUT",
            ErrorCode::InvalidSampleBuffer => "INVALID_SAMPLE_BUFFER",
            ErrorCode::EmptyNotes => "EMPTY_NOTES",
            ErrorCode::UnsupportedDocument => "UNSUPPORTED_DOCUMENT",
            ErrorCode::DocumentReadFailed => "DOCUMENT_READ_FAILED",
            ErrorCode::MissingApiKey => "MISSING_API_KEY",
            ErrorCode::ScriptGenerationFailed => "SCRIPT_GENERATION_FAILED",
            ErrorCode::AudioGenerationFailed => "AUDIO_GENERATION_FAILED",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::ExportFailed => "EXPORT_FAILED",
        }
    }

    /// Returns a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::MalformedPayload => "Speech payload is not valid base64 16-bit PCM",
            ErrorCode::UnsupportedChannelLayout => "WAV encoding supports only mono or stereo audio",
            ErrorCode::InvalidSampleBuffer => "Sample buffer is structurally invalid",
            ErrorCode::EmptyNotes => "Notes content is empty",
            ErrorCode::UnsupportedDocument => "Notes document format is not supported",
            ErrorCode::DocumentReadFailed => "Failed to read notes document",
            ErrorCode::MissingApiKey => "No API key configured for the generative API",
            ErrorCode::ScriptGenerationFailed => "Failed to generate a dialogue script",
            ErrorCode::AudioGenerationFailed => "Failed to generate dialogue audio",
            ErrorCode::InvalidTransition => "Action is not valid in the current session state",
            ErrorCode::ExportFailed => "Failed to write exported file",
        }
    }

    /// Returns a recovery hint suggesting how to resolve this error.
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            ErrorCode::MalformedPayload => {
                "Regenerate the audio; the speech service returned an unusable payload"
            }
            ErrorCode::UnsupportedChannelLayout => {
                "Downmix the audio to mono or stereo before encoding"
            }
            ErrorCode::InvalidSampleBuffer => {
                "Ensure all channels have equal length and the sample rate is positive"
            }
            ErrorCode::EmptyNotes => "Provide a notes document containing vocabulary or grammar topics",
            ErrorCode::UnsupportedDocument => {
                "Save the notes as plain text (.txt) or Markdown (.md) and try again"
            }
            ErrorCode::DocumentReadFailed => {
                "Check that the file exists, is readable, and is UTF-8 encoded"
            }
            ErrorCode::MissingApiKey => "Set GEMINI_API_KEY (or API_KEY) in the environment",
            ErrorCode::ScriptGenerationFailed => {
                "Check network access and API quota, then submit the notes again"
            }
            ErrorCode::AudioGenerationFailed => {
                "Check network access and API quota, then request audio again"
            }
            ErrorCode::InvalidTransition => "Call get_state to inspect the session, or reset it",
            ErrorCode::ExportFailed => "Check that the output directory is writable and has free space",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for daemon operations.
#[derive(Debug)]
pub struct DaemonError {
    /// The error code identifying the type of error.
    pub code: ErrorCode,
    /// Human-readable error message with context.
    pub message: String,
    /// Optional underlying cause of the error.
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DaemonError {
    /// Creates a new DaemonError with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new DaemonError with an underlying cause.
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a MALFORMED_PAYLOAD error.
    pub fn malformed_payload(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::MalformedPayload,
            format!("Malformed PCM payload: {}", reason.into()),
        )
    }

    /// Creates an UNSUPPORTED_CHANNEL_LAYOUT error.
    pub fn unsupported_channel_layout(channels: usize) -> Self {
        Self::new(
            ErrorCode::UnsupportedChannelLayout,
            format!("Unsupported channel count: {} (expected 1 or 2)", channels),
        )
    }

    /// Creates an INVALID_SAMPLE_BUFFER error.
    pub fn invalid_sample_buffer(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InvalidSampleBuffer,
            format!("Invalid sample buffer: {}", reason.into()),
        )
    }

    /// Creates an EMPTY_NOTES error.
    pub fn empty_notes() -> Self {
        Self::new(ErrorCode::EmptyNotes, "Notes content is empty")
    }

    /// Creates an UNSUPPORTED_DOCUMENT error.
    pub fn unsupported_document(path: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::UnsupportedDocument,
            format!("Unsupported notes document: {}", path.into()),
        )
    }

    /// Creates a DOCUMENT_READ_FAILED error.
    pub fn document_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::with_source(
            ErrorCode::DocumentReadFailed,
            format!("Failed to read {}: {}", path, source),
            source,
        )
    }

    /// Creates a MISSING_API_KEY error.
    pub fn missing_api_key() -> Self {
        Self::new(
            ErrorCode::MissingApiKey,
            "No API key found in GEMINI_API_KEY or API_KEY",
        )
    }

    /// Creates a SCRIPT_GENERATION_FAILED error.
    pub fn script_generation_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ScriptGenerationFailed,
            format!("Script generation failed: {}", reason.into()),
        )
    }

    /// Creates an AUDIO_GENERATION_FAILED error.
    pub fn audio_generation_failed(reason: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::AudioGenerationFailed,
            format!("Audio generation failed: {}", reason.into()),
        )
    }

    /// Creates an INVALID_TRANSITION error.
    pub fn invalid_transition(from: impl fmt::Display, event: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidTransition,
            format!("Cannot apply '{}' in state '{}'", event, from),
        )
    }

    /// Creates an EXPORT_FAILED error.
    pub fn export_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        Self::with_source(
            ErrorCode::ExportFailed,
            format!("Failed to write {}: {}", path, source),
            source,
        )
    }
}

impl fmt::Display for DaemonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}. Recovery: {}",
            self.code,
            self.message,
            self.code.recovery_hint()
        )
    }
}

impl std::error::Error for DaemonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Result type alias using DaemonError.
pub type Result<T> = std::result::Result<T, DaemonError>;
