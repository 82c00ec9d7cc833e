//! linguadrama-daemon: German audio dramas from study notes.
//!
//! This library turns a notes document into a two-character German dialogue
//! script using a generative language model, speaks it with a generative
//! speech model, and packages the result as a script document and a WAV file.
//!
//! # Modules
//!
//! - [`audio`]: Base64 PCM decoding and WAV encoding (SampleBuffer)
//! - [`generation`]: Generative client seam, Gemini client, DramaPipeline
//! - [`session`]: Explicit session state machine
//! - [`document`]: Notes reading and artifact export
//! - [`cache`]: Rendered audio cache
//! - [`rpc`]: JSON-RPC server over stdio
//! - [`types`]: Script types (GeneratedScript, ScriptLine, Speaker)
//! - [`config`]: Runtime configuration (DaemonConfig, VoiceConfig)
//! - [`error`]: Error types and codes (DaemonError, ErrorCode)
//!
//! # Example
//!
//! ```rust,ignore
//! use linguadrama_daemon::{
//!     audio::{decode_base64_pcm, encode_wav},
//!     config::DaemonConfig,
//!     generation::{DramaPipeline, GeminiClient},
//!     session::Session,
//! };
//!
//! let config = DaemonConfig::from_env();
//! let client = GeminiClient::new(&config)?;
//! let pipeline = DramaPipeline::new(Box::new(client), config.sample_rate);
//!
//! let mut session = Session::new();
//! session.submit_notes(&pipeline, "Wechselpräpositionen: in, an, auf")?;
//!
//! // Offline: raw speech payload to a WAV file
//! let buffer = decode_base64_pcm("AAAAQADA/38=", Some(24000))?;
//! let wav = encode_wav(&buffer)?;
//! ```

pub mod audio;
pub mod cache;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod generation;
pub mod rpc;
pub mod session;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use audio::{decode_base64_pcm, encode_wav, SampleBuffer};
pub use config::{DaemonConfig, VoiceConfig};
pub use error::{DaemonError, ErrorCode, Result};
pub use generation::{DramaPipeline, GenerativeClient};
pub use session::{Session, SessionEvent, SessionState};
pub use types::{compute_script_id, GeneratedScript, ScriptLine, Speaker};
