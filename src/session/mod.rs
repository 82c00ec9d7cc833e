//! Session module.
//!
//! Explicit state machine for the notes → script → audio flow.

pub mod state;
pub mod workflow;

// Re-export commonly used types
pub use state::{SessionEvent, SessionState};
pub use workflow::{Session, SessionFailure};
