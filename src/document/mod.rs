//! Document module.
//!
//! Reads notes documents and exports generated scripts and audio.

pub mod export;
pub mod notes;

// Re-export commonly used items
pub use export::{export_audio, export_script, render_script_markdown};
pub use notes::{read_notes, SUPPORTED_EXTENSIONS};
