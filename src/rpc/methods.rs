//! JSON-RPC method handlers.
//!
//! Implements the handlers for all supported JSON-RPC methods.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{export_audio, export_script, read_notes};
use crate::error::DaemonError;
use crate::session::SessionState;
use crate::types::GeneratedScript;

use super::server::ServerState;
use super::types::{
    AudioInfo, ErrorInfo, ExportParams, ExportResult, GenerateAudioResult, GenerateScriptParams,
    GenerateScriptResult, GetStateResult, JsonRpcError,
};

/// Handles a JSON-RPC method call.
pub fn handle_request(
    method: &str,
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let before = state.session.state();

    let result = match method {
        "generate_script" => handle_generate_script(params, state),
        "generate_audio" => handle_generate_audio(state),
        "export_script" => handle_export_script(params, state),
        "export_audio" => handle_export_audio(params, state),
        "get_state" => handle_get_state(state),
        "reset" => handle_reset(state),
        "ping" => handle_ping(),
        "shutdown" => handle_shutdown(state),
        _ => Err(JsonRpcError::method_not_found(method)),
    };

    if state.session.state() != before {
        state.notify_state();
    }
    result
}

/// Deserializes params, treating absent params as the default value.
fn parse_params<T: DeserializeOwned + Default>(
    params: serde_json::Value,
) -> Result<T, JsonRpcError> {
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params)
        .map_err(|e| JsonRpcError::invalid_params(format!("Invalid params: {}", e)))
}

fn to_json<T: Serialize>(result: T) -> Result<serde_json::Value, JsonRpcError> {
    serde_json::to_value(result).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}

/// Handles the ping method for health checks.
fn handle_ping() -> Result<serde_json::Value, JsonRpcError> {
    Ok(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handles the shutdown method.
fn handle_shutdown(state: &mut ServerState) -> Result<serde_json::Value, JsonRpcError> {
    state.shutdown();
    Ok(serde_json::json!({ "status": "shutting_down" }))
}

/// Handles the generate_script method.
///
/// A notes document that cannot be read is reported without touching the
/// session, so the user can pick another file.
fn handle_generate_script(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: GenerateScriptParams = parse_params(params)?;
    params.validate()?;

    let notes = match params.path {
        Some(path) => read_notes(&path)?,
        None => params.notes.unwrap_or_default(),
    };

    let script = state
        .session
        .submit_notes(&state.pipeline, &notes)
        .map(GeneratedScript::clone)?;

    to_json(GenerateScriptResult {
        state: state.session.state(),
        script_id: state.session.script_id().unwrap_or_default().to_string(),
        script,
    })
}

/// Handles the generate_audio method.
fn handle_generate_audio(state: &mut ServerState) -> Result<serde_json::Value, JsonRpcError> {
    let cached = state
        .session
        .script_id()
        .is_some_and(|id| state.cache.contains(id));

    let mut result = {
        let audio = state
            .session
            .render_audio(&state.pipeline, &mut state.cache)?;
        GenerateAudioResult {
            state: SessionState::Playback,
            script_id: String::new(),
            duration_sec: audio.duration_sec(),
            sample_rate: audio.buffer.sample_rate(),
            channels: audio.buffer.num_channels(),
            wav_bytes: audio.wav.len(),
            mime_type: audio.mime_type(),
            cached,
        }
    };
    result.state = state.session.state();
    result.script_id = state.session.script_id().unwrap_or_default().to_string();

    to_json(result)
}

/// Handles the export_script method.
fn handle_export_script(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: ExportParams = parse_params(params)?;
    let dir = params
        .dir
        .unwrap_or_else(|| state.config.effective_output_path());

    let script = state
        .session
        .script()
        .ok_or_else(|| DaemonError::invalid_transition(state.session.state(), "export_script"))?;

    let path = export_script(script, &dir)?;
    let bytes = std::fs::metadata(&path)
        .map(|m| m.len() as usize)
        .unwrap_or_default();

    to_json(ExportResult {
        path: path.to_string_lossy().to_string(),
        bytes,
    })
}

/// Handles the export_audio method.
fn handle_export_audio(
    params: serde_json::Value,
    state: &mut ServerState,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: ExportParams = parse_params(params)?;
    let dir = params
        .dir
        .unwrap_or_else(|| state.config.effective_output_path());

    let (Some(script), Some(audio)) = (state.session.script(), state.session.audio()) else {
        return Err(DaemonError::invalid_transition(state.session.state(), "export_audio").into());
    };

    let path = export_audio(&audio.wav, script, &dir)?;

    to_json(ExportResult {
        path: path.to_string_lossy().to_string(),
        bytes: audio.wav.len(),
    })
}

/// Handles the get_state method.
fn handle_get_state(state: &ServerState) -> Result<serde_json::Value, JsonRpcError> {
    let session = &state.session;

    to_json(GetStateResult {
        state: session.state(),
        error: session.last_error().map(ErrorInfo::from),
        script_id: session.script_id().map(str::to_string),
        script: session.script().cloned(),
        audio: session.audio().map(|audio| AudioInfo {
            duration_sec: audio.duration_sec(),
            sample_rate: audio.buffer.sample_rate(),
            wav_bytes: audio.wav.len(),
        }),
    })
}

/// Handles the reset method.
fn handle_reset(state: &mut ServerState) -> Result<serde_json::Value, JsonRpcError> {
    state.session.reset();
    Ok(serde_json::json!({ "state": state.session.state() }))
}
