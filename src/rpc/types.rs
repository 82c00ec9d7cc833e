//! JSON-RPC types for the daemon protocol.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, ErrorCode};
use crate::session::{SessionFailure, SessionState};
use crate::types::GeneratedScript;

/// JSON-RPC version constant.
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC request ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RequestId {
    Integer(i64),
    String(String),
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Integer(id)
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

/// A JSON-RPC request wrapper. Requests without an id are notifications.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC response wrapper.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse<T: Serialize> {
    pub jsonrpc: &'static str,
    pub id: RequestId,
    pub result: T,
}

impl<T: Serialize> JsonRpcResponse<T> {
    pub fn new(id: RequestId, result: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result,
        }
    }
}

/// A JSON-RPC error response.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: &'static str,
    pub id: Option<RequestId>,
    pub error: JsonRpcError,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Option<RequestId>, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            error,
        }
    }
}

/// A JSON-RPC error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonRpcErrorData>,
}

/// Extended error data for application-specific errors.
#[derive(Debug, Serialize)]
pub struct JsonRpcErrorData {
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_hint: Option<String>,
}

/// Standard JSON-RPC 2.0 error codes.
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

impl JsonRpcError {
    fn standard(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::standard(PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::standard(INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::standard(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::standard(INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::standard(INTERNAL_ERROR, message)
    }
}

/// Returns the application error code (-32000 and below) for a daemon error code.
pub fn application_code(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::MalformedPayload => -32000,
        ErrorCode::UnsupportedChannelLayout => -32001,
        ErrorCode::InvalidSampleBuffer => -32002,
        ErrorCode::EmptyNotes => -32003,
        ErrorCode::UnsupportedDocument => -32004,
        ErrorCode::DocumentReadFailed => -32005,
        ErrorCode::MissingApiKey => -32006,
        ErrorCode::ScriptGenerationFailed => -32007,
        ErrorCode::AudioGenerationFailed => -32008,
        ErrorCode::InvalidTransition => -32009,
        ErrorCode::ExportFailed => -32010,
    }
}

impl From<&DaemonError> for JsonRpcError {
    fn from(err: &DaemonError) -> Self {
        Self {
            code: application_code(err.code),
            message: err.code.description().to_string(),
            data: Some(JsonRpcErrorData {
                error_code: err.code.as_str().to_string(),
                details: Some(err.message.clone()),
                recovery_hint: Some(err.code.recovery_hint().to_string()),
            }),
        }
    }
}

impl From<DaemonError> for JsonRpcError {
    fn from(err: DaemonError) -> Self {
        JsonRpcError::from(&err)
    }
}

// ============================================================================
// Method params and results
// ============================================================================

/// Parameters for `generate_script`: inline notes or a notes document path.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateScriptParams {
    pub notes: Option<String>,
    pub path: Option<PathBuf>,
}

impl GenerateScriptParams {
    /// Checks that exactly one notes source was given.
    pub fn validate(&self) -> Result<(), JsonRpcError> {
        match (&self.notes, &self.path) {
            (Some(_), Some(_)) => Err(JsonRpcError::invalid_params(
                "Pass either 'notes' or 'path', not both",
            )),
            (None, None) => Err(JsonRpcError::invalid_params(
                "Missing notes: pass 'notes' or 'path'",
            )),
            _ => Ok(()),
        }
    }
}

/// Parameters for `export_script` and `export_audio`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportParams {
    /// Target directory; defaults to the configured output path.
    pub dir: Option<PathBuf>,
}

/// Response for `generate_script`.
#[derive(Debug, Serialize)]
pub struct GenerateScriptResult {
    pub state: SessionState,
    pub script_id: String,
    pub script: GeneratedScript,
}

/// Response for `generate_audio`.
#[derive(Debug, Serialize)]
pub struct GenerateAudioResult {
    pub state: SessionState,
    pub script_id: String,
    pub duration_sec: f32,
    pub sample_rate: u32,
    pub channels: usize,
    pub wav_bytes: usize,
    pub mime_type: &'static str,
    /// True if the render came from the audio cache.
    pub cached: bool,
}

/// Response for `export_script` and `export_audio`.
#[derive(Debug, Serialize)]
pub struct ExportResult {
    pub path: String,
    pub bytes: usize,
}

/// Failure details carried in state reports.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

impl From<&SessionFailure> for ErrorInfo {
    fn from(failure: &SessionFailure) -> Self {
        Self {
            code: failure.code.as_str().to_string(),
            message: failure.message.clone(),
        }
    }
}

/// Audio details carried in state reports.
#[derive(Debug, Serialize)]
pub struct AudioInfo {
    pub duration_sec: f32,
    pub sample_rate: u32,
    pub wav_bytes: usize,
}

/// Response for `get_state`.
#[derive(Debug, Serialize)]
pub struct GetStateResult {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<GeneratedScript>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioInfo>,
}

// ============================================================================
// Notifications
// ============================================================================

/// A JSON-RPC notification (no id field).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification<T: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    pub params: T,
}

impl<T: Serialize> JsonRpcNotification<T> {
    pub fn new(method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
        }
    }
}

/// Notification sent whenever the session state changes.
#[derive(Debug, Serialize)]
pub struct StateChangedParams {
    pub state: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_from_int() {
        let id: RequestId = 42.into();
        assert_eq!(id, RequestId::Integer(42));
    }

    #[test]
    fn request_id_from_string() {
        let id: RequestId = "abc".to_string().into();
        assert_eq!(id, RequestId::String("abc".to_string()));
    }

    #[test]
    fn request_without_id_parses() {
        let request: JsonRpcRequest =
            serde_json::from_str(r#"{"jsonrpc":"2.0","method":"ping"}"#).unwrap();
        assert!(request.id.is_none());
        assert!(request.params.is_null());
    }

    #[test]
    fn generate_script_params_need_one_source() {
        assert_eq!(GenerateScriptParams::default().validate().unwrap_err().code, -32602);

        let both = GenerateScriptParams {
            notes: Some("x".to_string()),
            path: Some(PathBuf::from("notes.txt")),
        };
        assert_eq!(both.validate().unwrap_err().code, -32602);

        let notes = GenerateScriptParams {
            notes: Some("x".to_string()),
            path: None,
        };
        assert!(notes.validate().is_ok());
    }

    #[test]
    fn unknown_param_fields_are_rejected() {
        let result: Result<ExportParams, _> =
            serde_json::from_value(serde_json::json!({ "directory": "/tmp" }));
        assert!(result.is_err());
    }

    #[test]
    fn json_rpc_error_codes() {
        assert_eq!(JsonRpcError::parse_error("").code, -32700);
        assert_eq!(JsonRpcError::invalid_request("").code, -32600);
        assert_eq!(JsonRpcError::method_not_found("").code, -32601);
        assert_eq!(JsonRpcError::invalid_params("").code, -32602);
        assert_eq!(JsonRpcError::internal_error("").code, -32603);
    }

    #[test]
    fn daemon_errors_map_to_application_codes() {
        let err = JsonRpcError::from(DaemonError::empty_notes());
        assert_eq!(err.code, -32003);
        let data = err.data.unwrap();
        assert_eq!(data.error_code, "EMPTY_NOTES");
        assert!(data.recovery_hint.is_some());

        assert_eq!(application_code(ErrorCode::MalformedPayload), -32000);
        assert_eq!(application_code(ErrorCode::ExportFailed), -32010);
    }

    #[test]
    fn state_changed_omits_missing_error() {
        let params = StateChangedParams {
            state: SessionState::Idle,
            error: None,
        };
        let json = serde_json::to_value(JsonRpcNotification::new("state_changed", params)).unwrap();
        assert_eq!(json["params"], serde_json::json!({ "state": "idle" }));
        assert_eq!(json["method"], "state_changed");
    }
}
