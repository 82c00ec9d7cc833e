//! Gemini REST client for script and speech generation.
//!
//! Uses the `generateContent` endpoint for both steps: a JSON-schema
//! constrained text call for the script, and an audio-modality call with a
//! multi-speaker voice config for the speech.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::DaemonConfig;
use crate::error::{DaemonError, Result};
use crate::types::{GeneratedScript, Speaker};

use super::client::{GenerativeClient, SpeechPayload};

/// System instruction for the script writer.
pub const SYSTEM_PROMPT: &str = r#"
Act as a Creative Director for a German Audio Learning Drama.
Your task is to create a dialogue script between two male characters, Lukas and Felix, based on the vocabulary and grammar topics found in the user's provided notes.

**Characters:**
1.  **Lukas**: Masculine, calm, authoritative, perhaps a bit serious or mentor-like.
2.  **Felix**: Smooth, velvety Baritone. Charismatic, playful, intimate friend.

**Scenario & Tone:**
-   **Setting**: A relaxed, intimate setting (e.g., late-night coffee, workshop, walking home).
-   **Tone**: Natural, warm, close friendship, but strictly professional regarding language quality.
-   **Objective**: Do NOT write a conversation *about* the notes. Analyze the *topic* and write a roleplay scene where they USE the vocabulary in a real-life situation.

**Output Requirements:**
-   Ensure German is B1 level.
-   Avoid childish phrasing.
-   You must output strictly valid JSON.

**JSON Structure:**
{
  "topic": "The main topic identified from the notes",
  "lines": [
    {
      "speaker": "Lukas",
      "stageDirection": "laughing softly",
      "german": "German dialogue line...",
      "english": "English translation..."
    }
  ]
}
"#;

/// Client for the Gemini `generateContent` API.
pub struct GeminiClient {
    http: reqwest::blocking::Client,
    api_key: String,
    config: DaemonConfig,
}

impl GeminiClient {
    /// Creates a client from the daemon configuration.
    ///
    /// Fails with `MISSING_API_KEY` when no key is configured.
    pub fn new(config: &DaemonConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(DaemonError::missing_api_key)?;

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .map_err(|e| {
                DaemonError::script_generation_failed(format!(
                    "Failed to create HTTP client: {}",
                    e
                ))
            })?;

        Ok(Self {
            http,
            api_key,
            config: config.clone(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.config.api_base, model)
    }

    /// Posts a request body and parses the response envelope.
    ///
    /// Errors are reported as plain strings; callers wrap them in the
    /// error code for their step.
    fn post(&self, model: &str, body: &Value) -> std::result::Result<GenerateContentResponse, String> {
        let url = self.endpoint(model);
        debug!(%url, "Calling generative API");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .map_err(|e| format!("request to {} failed: {}", model, e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(format!("HTTP {} from {}: {}", status, model, detail.trim()));
        }

        response
            .json::<GenerateContentResponse>()
            .map_err(|e| format!("unreadable response from {}: {}", model, e))
    }
}

impl GenerativeClient for GeminiClient {
    fn generate_script(&self, notes: &str) -> Result<GeneratedScript> {
        info!(model = %self.config.text_model, chars = notes.len(), "Generating script");

        let body = script_request(notes);
        let response = self
            .post(&self.config.text_model, &body)
            .map_err(DaemonError::script_generation_failed)?;

        let text = response
            .text()
            .ok_or_else(|| DaemonError::script_generation_failed("No response from model"))?;

        parse_script(&text)
    }

    fn generate_speech(&self, script: &GeneratedScript) -> Result<SpeechPayload> {
        info!(
            model = %self.config.tts_model,
            lines = script.lines.len(),
            "Generating speech"
        );

        let body = speech_request(script, &self.config);
        let response = self
            .post(&self.config.tts_model, &body)
            .map_err(DaemonError::audio_generation_failed)?;

        response.inline_audio().ok_or_else(|| {
            warn!("Speech response carried no inline audio");
            DaemonError::audio_generation_failed("No audio data returned from API")
        })
    }
}

/// Builds the structured-output request for script generation.
pub fn script_request(notes: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_PROMPT }] },
        "contents": [{
            "role": "user",
            "parts": [{ "text": format!("Here are the notes: \n\n{}", notes) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "topic": { "type": "STRING" },
                    "lines": {
                        "type": "ARRAY",
                        "items": {
                            "type": "OBJECT",
                            "properties": {
                                "speaker": {
                                    "type": "STRING",
                                    "enum": Speaker::ALL.iter().map(Speaker::as_str).collect::<Vec<_>>()
                                },
                                "german": { "type": "STRING" },
                                "stageDirection": { "type": "STRING" },
                                "english": { "type": "STRING" }
                            },
                            "required": ["speaker", "german", "english"]
                        }
                    }
                },
                "required": ["topic", "lines"]
            }
        }
    })
}

/// Builds the multi-speaker audio request for a script.
pub fn speech_request(script: &GeneratedScript, config: &DaemonConfig) -> Value {
    let speaker_voices: Vec<Value> = Speaker::ALL
        .iter()
        .map(|speaker| {
            json!({
                "speaker": speaker.as_str(),
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": config.voices.voice_for(*speaker) }
                }
            })
        })
        .collect();

    json!({
        "contents": [{ "parts": [{ "text": script.speech_prompt() }] }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "multiSpeakerVoiceConfig": { "speakerVoiceConfigs": speaker_voices }
            }
        }
    })
}

/// Parses and validates the model's JSON script.
pub fn parse_script(text: &str) -> Result<GeneratedScript> {
    let script: GeneratedScript = serde_json::from_str(strip_code_fence(text)).map_err(|e| {
        DaemonError::script_generation_failed(format!("Model returned invalid script JSON: {}", e))
    })?;

    if let Some(reason) = script.validate() {
        return Err(DaemonError::script_generation_failed(reason));
    }

    Ok(script)
}

/// Removes a surrounding Markdown code fence, which models occasionally add.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text of the first candidate.
    fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }

    /// First inline audio part of the first candidate.
    fn inline_audio(&self) -> Option<SpeechPayload> {
        self.first_parts()
            .iter()
            .filter_map(|p| p.inline_data.as_ref())
            .find(|data| !data.data.is_empty())
            .map(|data| SpeechPayload {
                audio_base64: data.data.clone(),
                mime_type: data.mime_type.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::generation::client::testing::sample_script;

    #[test]
    fn new_requires_api_key() {
        let err = GeminiClient::new(&DaemonConfig::new()).err().unwrap();
        assert_eq!(err.code, ErrorCode::MissingApiKey);
    }

    #[test]
    fn endpoint_uses_model_name() {
        let mut config = DaemonConfig::new();
        config.api_key = Some("k".to_string());
        config.api_base = "http://localhost:9/v1beta".to_string();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint("gemini-2.5-flash"),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn script_request_shape() {
        let body = script_request("der, die, das");
        assert_eq!(
            body["contents"][0]["parts"][0]["text"],
            "Here are the notes: \n\nder, die, das"
        );
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        let speaker = &body["generationConfig"]["responseSchema"]["properties"]["lines"]["items"]
            ["properties"]["speaker"];
        assert_eq!(speaker["enum"], json!(["Lukas", "Felix"]));
    }

    #[test]
    fn speech_request_maps_voices() {
        let config = DaemonConfig::new();
        let body = speech_request(&sample_script(), &config);
        let voices = &body["generationConfig"]["speechConfig"]["multiSpeakerVoiceConfig"]
            ["speakerVoiceConfigs"];

        assert_eq!(voices[0]["speaker"], "Lukas");
        assert_eq!(
            voices[0]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Fenrir"
        );
        assert_eq!(voices[1]["speaker"], "Felix");
        assert_eq!(
            voices[1]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
            "Charon"
        );
        assert_eq!(body["generationConfig"]["responseModalities"], json!(["AUDIO"]));
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Lukas: Biegen Sie an der Ampel links ab."));
    }

    #[test]
    fn parse_script_accepts_fenced_json() {
        let text = "```json\n{\"topic\":\"Essen\",\"lines\":[{\"speaker\":\"Lukas\",\"german\":\"Guten Appetit!\",\"english\":\"Enjoy!\"}]}\n```";
        let script = parse_script(text).unwrap();
        assert_eq!(script.topic, "Essen");
        assert_eq!(script.lines.len(), 1);
    }

    #[test]
    fn parse_script_rejects_invalid() {
        let err = parse_script("not json").unwrap_err();
        assert_eq!(err.code, ErrorCode::ScriptGenerationFailed);

        let err = parse_script(r#"{"topic":"Essen","lines":[]}"#).unwrap_err();
        assert_eq!(err.code, ErrorCode::ScriptGenerationFailed);
    }

    #[test]
    fn response_text_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn response_inline_audio() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{
                "inlineData": { "mimeType": "audio/L16;codec=pcm;rate=24000", "data": "AAA=" }
            }] } }]
        }))
        .unwrap();
        let payload = response.inline_audio().unwrap();
        assert_eq!(payload.audio_base64, "AAA=");
        assert_eq!(payload.sample_rate_hint(), Some(24000));
    }

    #[test]
    fn empty_response_has_no_content() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.text().is_none());
        assert!(response.inline_audio().is_none());
    }
}
