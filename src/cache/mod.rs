//! Cache module for rendered audio.
//!
//! Provides LRU-based caching keyed by script id.

pub mod audio;

// Re-export commonly used types
pub use audio::AudioCache;
