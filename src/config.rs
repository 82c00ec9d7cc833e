//! Daemon configuration module.
//!
//! Contains the runtime configuration for the linguadrama daemon, including
//! generative API settings, voice selection, and output paths.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::audio::DEFAULT_SAMPLE_RATE;
use crate::types::Speaker;

/// Default Gemini REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for script generation.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Default model for multi-speaker speech generation.
pub const DEFAULT_TTS_MODEL: &str = "gemini-2.5-pro-preview-tts";

/// Default HTTP timeout for generative API calls.
pub const DEFAULT_TIMEOUT_SEC: u64 = 300;

/// Prebuilt voice assignment for the two speakers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Voice for Lukas (authoritative, masculine).
    pub lukas: String,

    /// Voice for Felix (smooth baritone).
    pub felix: String,
}

impl VoiceConfig {
    /// Returns the prebuilt voice name for a speaker.
    pub fn voice_for(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Lukas => &self.lukas,
            Speaker::Felix => &self.felix,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            lukas: "Fenrir".to_string(),
            felix: "Charon".to_string(),
        }
    }
}

/// Runtime configuration for the daemon.
///
/// This configuration is typically loaded from environment variables at
/// startup and then passed explicitly to the components that need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// API key for the generative API. Never serialized.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Base URL of the generative API.
    pub api_base: String,

    /// Model used to write the dialogue script.
    pub text_model: String,

    /// Model used to speak the dialogue.
    pub tts_model: String,

    /// Voice assignment for the speakers.
    pub voices: VoiceConfig,

    /// Sample rate assumed for speech payloads that do not report one.
    pub sample_rate: u32,

    /// Directory for exported scripts and audio.
    /// If None, uses the platform-specific default data location.
    pub output_path: Option<PathBuf>,

    /// HTTP timeout for generative API calls in seconds.
    pub timeout_sec: u64,
}

impl DaemonConfig {
    /// Creates a new DaemonConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a DaemonConfig from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `GEMINI_API_KEY` (or `API_KEY`) - API key for the generative API
    /// - `LINGUADRAMA_API_BASE` - Base URL of the generative API
    /// - `LINGUADRAMA_TEXT_MODEL` - Script generation model
    /// - `LINGUADRAMA_TTS_MODEL` - Speech generation model
    /// - `LINGUADRAMA_VOICE_LUKAS` - Prebuilt voice for Lukas
    /// - `LINGUADRAMA_VOICE_FELIX` - Prebuilt voice for Felix
    /// - `LINGUADRAMA_SAMPLE_RATE` - Fallback speech sample rate in Hz
    /// - `LINGUADRAMA_OUTPUT_PATH` - Directory for exported files
    /// - `LINGUADRAMA_TIMEOUT_SEC` - HTTP timeout in seconds
    ///
    /// Falls back to defaults for unset or invalid variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        config.api_key = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY"));

        if let Some(base) = non_empty("LINGUADRAMA_API_BASE") {
            config.api_base = base.trim_end_matches('/').to_string();
        }

        if let Some(model) = non_empty("LINGUADRAMA_TEXT_MODEL") {
            config.text_model = model;
        }

        if let Some(model) = non_empty("LINGUADRAMA_TTS_MODEL") {
            config.tts_model = model;
        }

        if let Some(voice) = non_empty("LINGUADRAMA_VOICE_LUKAS") {
            config.voices.lukas = voice;
        }

        if let Some(voice) = non_empty("LINGUADRAMA_VOICE_FELIX") {
            config.voices.felix = voice;
        }

        if let Some(rate_str) = non_empty("LINGUADRAMA_SAMPLE_RATE") {
            if let Ok(rate) = rate_str.trim().parse::<u32>() {
                if (8000..=192_000).contains(&rate) {
                    config.sample_rate = rate;
                }
            }
        }

        if let Some(path) = non_empty("LINGUADRAMA_OUTPUT_PATH") {
            config.output_path = Some(PathBuf::from(path));
        }

        if let Some(timeout_str) = non_empty("LINGUADRAMA_TIMEOUT_SEC") {
            if let Ok(timeout) = timeout_str.trim().parse::<u64>() {
                if timeout > 0 {
                    config.timeout_sec = timeout;
                }
            }
        }

        config
    }

    /// Returns the effective output path, using platform defaults if not specified.
    pub fn effective_output_path(&self) -> PathBuf {
        if let Some(ref path) = self.output_path {
            path.clone()
        } else {
            default_output_path()
        }
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Validates the configuration.
    ///
    /// Returns an error message if validation fails, None otherwise.
    pub fn validate(&self) -> Option<String> {
        if self.sample_rate == 0 {
            return Some("sample_rate must be > 0".to_string());
        }

        if self.timeout_sec == 0 {
            return Some("timeout_sec must be > 0".to_string());
        }

        if !self.api_base.starts_with("http://") && !self.api_base.starts_with("https://") {
            return Some(format!("api_base must be an http(s) URL: {}", self.api_base));
        }

        if self.voices.lukas == self.voices.felix {
            return Some(format!(
                "Lukas and Felix must use different voices (both are {})",
                self.voices.lukas
            ));
        }

        None
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voices: VoiceConfig::default(),
            sample_rate: DEFAULT_SAMPLE_RATE,
            output_path: None,
            timeout_sec: DEFAULT_TIMEOUT_SEC,
        }
    }
}

/// Returns the platform-specific default output path.
///
/// Uses the `directories` crate to find appropriate locations:
/// - macOS: ~/Library/Application Support/linguadrama/dramas
/// - Linux: ~/.local/share/linguadrama/dramas
/// - Windows: C:\Users\<user>\AppData\Roaming\linguadrama\data\dramas
fn default_output_path() -> PathBuf {
    if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "linguadrama") {
        proj_dirs.data_dir().join("dramas")
    } else {
        // Fallback to current directory
        PathBuf::from("./dramas")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = DaemonConfig::new();
        assert!(config.api_key.is_none());
        assert_eq!(config.text_model, "gemini-2.5-flash");
        assert_eq!(config.tts_model, "gemini-2.5-pro-preview-tts");
        assert_eq!(config.voices.voice_for(Speaker::Lukas), "Fenrir");
        assert_eq!(config.voices.voice_for(Speaker::Felix), "Charon");
        assert_eq!(config.sample_rate, 24000);
        assert!(config.validate().is_none());
    }

    #[test]
    fn from_lookup_reads_overrides() {
        let config = DaemonConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "secret"),
            ("LINGUADRAMA_API_BASE", "http://localhost:8080/v1/"),
            ("LINGUADRAMA_VOICE_FELIX", "Puck"),
            ("LINGUADRAMA_SAMPLE_RATE", "16000"),
            ("LINGUADRAMA_OUTPUT_PATH", "/tmp/dramas"),
            ("LINGUADRAMA_TIMEOUT_SEC", "30"),
        ]));

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.api_base, "http://localhost:8080/v1");
        assert_eq!(config.voices.felix, "Puck");
        assert_eq!(config.sample_rate, 16000);
        assert_eq!(config.effective_output_path(), PathBuf::from("/tmp/dramas"));
        assert_eq!(config.timeout_sec, 30);
    }

    #[test]
    fn api_key_falls_back_to_legacy_variable() {
        let config = DaemonConfig::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", " "),
            ("API_KEY", "legacy"),
        ]));
        assert_eq!(config.api_key.as_deref(), Some("legacy"));
        assert!(config.has_api_key());
    }

    #[test]
    fn invalid_values_fall_back_to_defaults() {
        let config = DaemonConfig::from_lookup(lookup_from(&[
            ("LINGUADRAMA_SAMPLE_RATE", "fast"),
            ("LINGUADRAMA_TIMEOUT_SEC", "0"),
        ]));
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
        assert_eq!(config.timeout_sec, DEFAULT_TIMEOUT_SEC);
    }

    #[test]
    fn config_validation() {
        let mut config = DaemonConfig::new();
        config.voices.felix = config.voices.lukas.clone();
        assert!(config.validate().is_some());

        let mut config = DaemonConfig::new();
        config.api_base = "ftp://example.com".to_string();
        assert!(config.validate().is_some());

        let mut config = DaemonConfig::new();
        config.sample_rate = 0;
        assert!(config.validate().is_some());
    }

    #[test]
    fn api_key_not_serialized() {
        let mut config = DaemonConfig::new();
        config.api_key = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn effective_output_path_default() {
        let config = DaemonConfig::new();
        assert!(!config.effective_output_path().as_os_str().is_empty());
    }
}
