//! Core types for the linguadrama daemon.
//!
//! This module re-exports the dialogue script types:
//! - [`GeneratedScript`]: A topic plus the ordered dialogue lines
//! - [`ScriptLine`]: One spoken line with stage direction and translation
//! - [`Speaker`]: The two characters of the drama

mod script;

// Re-export all types at the module level
pub use script::{compute_script_id, GeneratedScript, ScriptLine, Speaker, FILE_STEM_PREFIX};
