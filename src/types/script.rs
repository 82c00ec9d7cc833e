//! Dialogue script types.
//!
//! A GeneratedScript is the structured output of the script generation step:
//! a topic plus an ordered list of lines spoken by the two characters.
//! Scripts are identified by a deterministic script_id computed from their content.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Prefix for exported file names.
pub const FILE_STEM_PREFIX: &str = "linguadrama_";

/// Instruction placed ahead of the dialogue in the speech request.
const SPEECH_PROMPT_HEADER: &str =
    "Perform the following dialogue naturally, with the requested emotional tones:";

/// The two characters of the drama.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    /// Calm, authoritative mentor.
    Lukas,
    /// Playful, charismatic friend.
    Felix,
}

impl Speaker {
    /// All speakers, in voice-config order.
    pub const ALL: [Speaker; 2] = [Speaker::Lukas, Speaker::Felix];

    /// Returns the speaker's name as used in prompts and documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Lukas => "Lukas",
            Speaker::Felix => "Felix",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One line of dialogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptLine {
    /// Who speaks the line.
    pub speaker: Speaker,

    /// The spoken German text.
    pub german: String,

    /// Acting note such as "laughing softly". Empty when absent.
    #[serde(default)]
    pub stage_direction: String,

    /// English translation of the German text.
    pub english: String,
}

/// A complete dialogue script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedScript {
    /// Main topic identified from the notes.
    pub topic: String,

    /// Dialogue lines in speaking order.
    pub lines: Vec<ScriptLine>,
}

impl GeneratedScript {
    /// Validates that the script is usable for audio generation.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.topic.trim().is_empty() {
            return Some("Script topic cannot be empty".to_string());
        }

        if self.lines.is_empty() {
            return Some("Script has no dialogue lines".to_string());
        }

        if let Some(index) = self.lines.iter().position(|l| l.german.trim().is_empty()) {
            return Some(format!("Line {} has no German text", index + 1));
        }

        None
    }

    /// Renders the dialogue as `Speaker: text` lines for the speech model.
    pub fn dialogue(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("{}: {}", line.speaker, line.german))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Builds the full prompt for multi-speaker speech generation.
    pub fn speech_prompt(&self) -> String {
        format!("{}\n{}", SPEECH_PROMPT_HEADER, self.dialogue())
    }

    /// Returns the file name stem for exported artifacts.
    ///
    /// Whitespace runs in the topic become a single underscore, path
    /// separators are replaced, and the result is lower-cased.
    pub fn file_stem(&self) -> String {
        let slug = self
            .topic
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .replace(['/', '\\'], "_")
            .to_lowercase();
        format!("{}{}", FILE_STEM_PREFIX, slug)
    }
}

/// Computes a deterministic script ID from the script content.
///
/// The script ID is the first 16 hex characters of the SHA256 hash of the
/// script's JSON serialization, so identical scripts share an ID.
pub fn compute_script_id(script: &GeneratedScript) -> String {
    // Serializing plain strings and unit variants cannot fail
    let input = serde_json::to_vec(script).unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(&input);
    let result = hasher.finalize();
    // Take first 8 bytes (16 hex chars)
    to_hex(&result[..8])
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_script() -> GeneratedScript {
        GeneratedScript {
            topic: "Im Café bestellen".to_string(),
            lines: vec![
                ScriptLine {
                    speaker: Speaker::Lukas,
                    german: "Was möchtest du trinken?".to_string(),
                    stage_direction: "leise".to_string(),
                    english: "What would you like to drink?".to_string(),
                },
                ScriptLine {
                    speaker: Speaker::Felix,
                    german: "Einen Kaffee, bitte.".to_string(),
                    stage_direction: String::new(),
                    english: "A coffee, please.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn parses_model_json() {
        let json = r#"{
            "topic": "Reisen",
            "lines": [
                {"speaker": "Felix", "stageDirection": "lachend", "german": "Hallo!", "english": "Hello!"},
                {"speaker": "Lukas", "german": "Servus.", "english": "Hi."}
            ]
        }"#;
        let script: GeneratedScript = serde_json::from_str(json).unwrap();
        assert_eq!(script.lines[0].speaker, Speaker::Felix);
        assert_eq!(script.lines[0].stage_direction, "lachend");
        assert_eq!(script.lines[1].stage_direction, "");
        assert!(script.validate().is_none());
    }

    #[test]
    fn unknown_speaker_rejected() {
        let json = r#"{"topic":"x","lines":[{"speaker":"Anna","german":"Hi","english":"Hi"}]}"#;
        assert!(serde_json::from_str::<GeneratedScript>(json).is_err());
    }

    #[test]
    fn validation() {
        assert!(sample_script().validate().is_none());

        let mut no_lines = sample_script();
        no_lines.lines.clear();
        assert!(no_lines.validate().is_some());

        let mut blank_topic = sample_script();
        blank_topic.topic = "  ".to_string();
        assert!(blank_topic.validate().is_some());

        let mut blank_line = sample_script();
        blank_line.lines[1].german = String::new();
        assert_eq!(
            blank_line.validate().as_deref(),
            Some("Line 2 has no German text")
        );
    }

    #[test]
    fn dialogue_format() {
        assert_eq!(
            sample_script().dialogue(),
            "Lukas: Was möchtest du trinken?\nFelix: Einen Kaffee, bitte."
        );
        assert!(sample_script()
            .speech_prompt()
            .starts_with("Perform the following dialogue naturally"));
    }

    #[test]
    fn file_stem_slug() {
        assert_eq!(sample_script().file_stem(), "linguadrama_im_café_bestellen");

        let mut script = sample_script();
        script.topic = "  Modal  Verben / Perfekt ".to_string();
        assert_eq!(script.file_stem(), "linguadrama_modal_verben___perfekt");
    }

    #[test]
    fn script_id_deterministic() {
        let id1 = compute_script_id(&sample_script());
        let id2 = compute_script_id(&sample_script());
        assert_eq!(id1, id2);
        assert_eq!(id1.len(), 16);
        assert!(id1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn script_id_varies_with_content() {
        let mut changed = sample_script();
        changed.lines[0].german.push('!');
        assert_ne!(compute_script_id(&sample_script()), compute_script_id(&changed));
    }
}
