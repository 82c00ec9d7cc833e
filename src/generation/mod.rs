//! Script and speech generation module.
//!
//! Provides the generative client seam, the Gemini implementation, and the
//! pipeline that ties generation to the audio codec.

pub mod client;
pub mod gemini;
pub mod pipeline;

// Re-export commonly used items
pub use client::{GenerativeClient, SpeechPayload};
pub use gemini::GeminiClient;
pub use pipeline::{DramaPipeline, RenderedAudio};
