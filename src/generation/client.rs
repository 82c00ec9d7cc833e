//! Generative client abstraction.
//!
//! Script and speech generation are delegated to an external generative API.
//! The pipeline only depends on this trait, so the concrete client is
//! constructed once at startup and passed in explicitly.

use crate::error::Result;
use crate::types::GeneratedScript;

/// Raw speech returned by the speech model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechPayload {
    /// Base64 text of mono 16-bit little-endian PCM.
    pub audio_base64: String,

    /// MIME type reported by the service, e.g. `audio/L16;codec=pcm;rate=24000`.
    pub mime_type: Option<String>,
}

impl SpeechPayload {
    /// Creates a payload without a reported MIME type.
    pub fn new(audio_base64: impl Into<String>) -> Self {
        Self {
            audio_base64: audio_base64.into(),
            mime_type: None,
        }
    }

    /// Returns the sample rate from the MIME type's `rate` parameter, if any.
    pub fn sample_rate_hint(&self) -> Option<u32> {
        let mime = self.mime_type.as_deref()?;
        mime.split(';').skip(1).find_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("rate") {
                value.trim().parse::<u32>().ok().filter(|rate| *rate > 0)
            } else {
                None
            }
        })
    }
}

/// A client able to write dialogue scripts and speak them.
pub trait GenerativeClient {
    /// Writes a two-speaker dialogue script from the given notes.
    fn generate_script(&self, notes: &str) -> Result<GeneratedScript>;

    /// Speaks the script with one voice per speaker.
    fn generate_speech(&self, script: &GeneratedScript) -> Result<SpeechPayload>;
}

#[cfg(test)]
pub mod testing {
    //! In-memory client for tests.

    use std::cell::Cell;
    use std::rc::Rc;

    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    use super::*;
    use crate::error::DaemonError;
    use crate::types::{ScriptLine, Speaker};

    /// Returns canned responses and counts calls.
    ///
    /// The counters are shared so tests can keep a handle after boxing the client.
    pub struct FakeClient {
        pub script: Option<GeneratedScript>,
        pub speech: Option<SpeechPayload>,
        pub script_calls: Rc<Cell<usize>>,
        pub speech_calls: Rc<Cell<usize>>,
    }

    impl FakeClient {
        /// A client that succeeds with [`sample_script`] and [`sample_speech`].
        pub fn working() -> Self {
            Self {
                script: Some(sample_script()),
                speech: Some(sample_speech()),
                script_calls: Rc::default(),
                speech_calls: Rc::default(),
            }
        }

        /// A client whose every call fails.
        pub fn failing() -> Self {
            Self {
                script: None,
                speech: None,
                script_calls: Rc::default(),
                speech_calls: Rc::default(),
            }
        }
    }

    impl GenerativeClient for FakeClient {
        fn generate_script(&self, _notes: &str) -> Result<GeneratedScript> {
            self.script_calls.set(self.script_calls.get() + 1);
            self.script
                .clone()
                .ok_or_else(|| DaemonError::script_generation_failed("fake outage"))
        }

        fn generate_speech(&self, _script: &GeneratedScript) -> Result<SpeechPayload> {
            self.speech_calls.set(self.speech_calls.get() + 1);
            self.speech
                .clone()
                .ok_or_else(|| DaemonError::audio_generation_failed("fake outage"))
        }
    }

    pub fn sample_script() -> GeneratedScript {
        GeneratedScript {
            topic: "Wegbeschreibung".to_string(),
            lines: vec![
                ScriptLine {
                    speaker: Speaker::Lukas,
                    german: "Biegen Sie an der Ampel links ab.".to_string(),
                    stage_direction: "ruhig".to_string(),
                    english: "Turn left at the traffic light.".to_string(),
                },
                ScriptLine {
                    speaker: Speaker::Felix,
                    german: "Und dann immer geradeaus?".to_string(),
                    stage_direction: String::new(),
                    english: "And then straight ahead?".to_string(),
                },
            ],
        }
    }

    /// Four PCM16 samples at 16kHz.
    pub fn sample_speech() -> SpeechPayload {
        let bytes: Vec<u8> = [0i16, 16384, -16384, 32767]
            .iter()
            .flat_map(|s| s.to_le_bytes())
            .collect();
        SpeechPayload {
            audio_base64: STANDARD.encode(bytes),
            mime_type: Some("audio/L16;codec=pcm;rate=16000".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_mime(mime: &str) -> SpeechPayload {
        SpeechPayload {
            audio_base64: String::new(),
            mime_type: Some(mime.to_string()),
        }
    }

    #[test]
    fn sample_rate_hint_parses_rate_parameter() {
        assert_eq!(
            with_mime("audio/L16;codec=pcm;rate=24000").sample_rate_hint(),
            Some(24000)
        );
        assert_eq!(with_mime("audio/L16; RATE = 16000").sample_rate_hint(), Some(16000));
    }

    #[test]
    fn sample_rate_hint_absent_or_invalid() {
        assert_eq!(SpeechPayload::new("AAAA").sample_rate_hint(), None);
        assert_eq!(with_mime("audio/L16;codec=pcm").sample_rate_hint(), None);
        assert_eq!(with_mime("audio/L16;rate=zero").sample_rate_hint(), None);
        assert_eq!(with_mime("audio/L16;rate=0").sample_rate_hint(), None);
    }
}
