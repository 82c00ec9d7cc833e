//! Session states and the transition table.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the user is in the notes-to-drama flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Waiting for notes.
    #[default]
    Idle,
    /// Script generation in flight.
    ProcessingText,
    /// Script ready for the user to review.
    ReviewScript,
    /// Speech generation in flight.
    ProcessingAudio,
    /// Audio ready to play and download.
    Playback,
    /// Something failed; only `Reset` leaves this state.
    Error,
}

/// Inputs that move a session between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    NotesSubmitted,
    ScriptReady,
    AudioRequested,
    AudioReady,
    Failed,
    Reset,
}

impl SessionState {
    /// Returns the state name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::ProcessingText => "processing_text",
            SessionState::ReviewScript => "review_script",
            SessionState::ProcessingAudio => "processing_audio",
            SessionState::Playback => "playback",
            SessionState::Error => "error",
        }
    }

    /// Returns the state reached by applying `event`, or None if the
    /// transition is not allowed.
    pub fn next(self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::Reset) => Some(S::Idle),
            (_, E::Failed) => Some(S::Error),
            (S::Idle, E::NotesSubmitted) => Some(S::ProcessingText),
            (S::ProcessingText, E::ScriptReady) => Some(S::ReviewScript),
            (S::ReviewScript, E::AudioRequested) => Some(S::ProcessingAudio),
            (S::ProcessingAudio, E::AudioReady) => Some(S::Playback),
            _ => None,
        }
    }

    /// Returns true while a generation call is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::ProcessingText | SessionState::ProcessingAudio)
    }
}

impl SessionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionEvent::NotesSubmitted => "notes_submitted",
            SessionEvent::ScriptReady => "script_ready",
            SessionEvent::AudioRequested => "audio_requested",
            SessionEvent::AudioReady => "audio_ready",
            SessionEvent::Failed => "failed",
            SessionEvent::Reset => "reset",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
