//! Session driver.
//!
//! A `Session` owns the artifacts of one notes-to-drama run and moves through
//! [`SessionState`] only via the transition table, calling the pipeline at
//! the processing steps.

use tracing::{debug, warn};

use crate::cache::AudioCache;
use crate::error::{DaemonError, ErrorCode, Result};
use crate::generation::{DramaPipeline, RenderedAudio};
use crate::types::{compute_script_id, GeneratedScript};

use super::state::{SessionEvent, SessionState};

/// The failure that put a session into the error state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&DaemonError> for SessionFailure {
    fn from(err: &DaemonError) -> Self {
        Self {
            code: err.code,
            message: err.message.clone(),
        }
    }
}

/// One user's run from notes to playback.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    script: Option<GeneratedScript>,
    script_id: Option<String>,
    audio: Option<RenderedAudio>,
    last_error: Option<SessionFailure>,
}

impl Session {
    /// Creates an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The current script, once generated.
    pub fn script(&self) -> Option<&GeneratedScript> {
        self.script.as_ref()
    }

    /// Content hash of the current script.
    pub fn script_id(&self) -> Option<&str> {
        self.script_id.as_deref()
    }

    /// The rendered audio, once generated.
    pub fn audio(&self) -> Option<&RenderedAudio> {
        self.audio.as_ref()
    }

    /// The failure recorded when the session entered the error state.
    pub fn last_error(&self) -> Option<&SessionFailure> {
        self.last_error.as_ref()
    }

    /// Applies an event and returns the new state.
    ///
    /// # Errors
    ///
    /// `INVALID_TRANSITION` if the table has no entry for the current state
    /// and `event`; the state is left unchanged.
    pub fn apply(&mut self, event: SessionEvent) -> Result<SessionState> {
        let next = self
            .state
            .next(event)
            .ok_or_else(|| DaemonError::invalid_transition(self.state, event))?;
        debug!(from = %self.state, %event, to = %next, "Session transition");
        self.state = next;
        Ok(next)
    }

    /// Generates a script from notes.
    ///
    /// Moves Idle → ProcessingText → ReviewScript, or into Error if the
    /// pipeline fails.
    pub fn submit_notes(&mut self, pipeline: &DramaPipeline, notes: &str) -> Result<&GeneratedScript> {
        self.apply(SessionEvent::NotesSubmitted)?;

        let script = match pipeline.script_from_notes(notes) {
            Ok(script) => script,
            Err(err) => return Err(self.fail(err)),
        };

        self.script_id = Some(compute_script_id(&script));
        self.apply(SessionEvent::ScriptReady)?;
        Ok(&*self.script.insert(script))
    }

    /// Renders audio for the current script.
    ///
    /// Moves ReviewScript → ProcessingAudio → Playback. A render already in
    /// `cache` for the same script is reused without calling the pipeline.
    pub fn render_audio(
        &mut self,
        pipeline: &DramaPipeline,
        cache: &mut AudioCache,
    ) -> Result<&RenderedAudio> {
        self.apply(SessionEvent::AudioRequested)?;

        let (Some(script), Some(script_id)) = (self.script.clone(), self.script_id.clone()) else {
            let err = DaemonError::audio_generation_failed("No script to render");
            return Err(self.fail(err));
        };

        let audio = if let Some(cached) = cache.get(&script_id) {
            debug!(script_id = %script_id, "Audio cache hit");
            cached.clone()
        } else {
            match pipeline.render_audio(&script) {
                Ok(audio) => {
                    cache.put(script_id, audio.clone());
                    audio
                }
                Err(err) => return Err(self.fail(err)),
            }
        };

        self.apply(SessionEvent::AudioReady)?;
        Ok(&*self.audio.insert(audio))
    }

    /// Records a failure and moves to the error state. Returns the error so
    /// callers can propagate it.
    pub fn fail(&mut self, err: DaemonError) -> DaemonError {
        warn!(code = %err.code, message = %err.message, from = %self.state, "Session failed");
        self.last_error = Some(SessionFailure::from(&err));
        self.state = SessionState::Error;
        err
    }

    /// Discards all artifacts and returns to Idle.
    pub fn reset(&mut self) {
        debug!(from = %self.state, "Session reset");
        *self = Self::default();
    }
}
