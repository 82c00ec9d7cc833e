//! JSON-RPC server over stdin/stdout.
//!
//! Implements the JSON-RPC 2.0 protocol for daemon communication. One request
//! per line; responses and notifications are written one per line.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::AudioCache;
use crate::config::DaemonConfig;
use crate::error::Result;
use crate::generation::DramaPipeline;
use crate::session::Session;

use super::methods::handle_request;
use super::types::{
    ErrorInfo, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, StateChangedParams, JSONRPC_VERSION,
};

/// State shared across all request handlers.
pub struct ServerState {
    /// The user's current run.
    pub session: Session,
    /// Script and speech generation.
    pub pipeline: DramaPipeline,
    /// Rendered audio cache.
    pub cache: AudioCache,
    /// Daemon configuration.
    pub config: DaemonConfig,
    /// Serialized notifications waiting to be written.
    outbox: Vec<String>,
    /// Flag to signal server shutdown.
    shutdown: Arc<AtomicBool>,
}

impl ServerState {
    /// Creates new server state with an idle session.
    pub fn new(config: DaemonConfig, pipeline: DramaPipeline) -> Self {
        Self {
            session: Session::new(),
            pipeline,
            cache: AudioCache::new(),
            config,
            outbox: Vec::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signals the server to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }

    /// Returns true if shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Queues a notification for the client.
    pub fn notify<T: Serialize>(&mut self, method: &'static str, params: T) {
        match serde_json::to_string(&JsonRpcNotification::new(method, params)) {
            Ok(json) => self.outbox.push(json),
            Err(e) => warn!(method, error = %e, "Failed to serialize notification"),
        }
    }

    /// Queues a `state_changed` notification for the current session state.
    pub fn notify_state(&mut self) {
        let params = StateChangedParams {
            state: self.session.state(),
            error: self.session.last_error().map(ErrorInfo::from),
        };
        self.notify("state_changed", params);
    }

    /// Drains queued notifications.
    pub fn take_notifications(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }
}

/// Runs the JSON-RPC server, reading from stdin and writing to stdout.
pub fn run_server(state: ServerState) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(state, stdin.lock(), stdout.lock());
    Ok(())
}

/// Serves requests from `reader` until EOF or shutdown.
pub fn serve(mut state: ServerState, reader: impl BufRead, mut writer: impl Write) {
    info!("JSON-RPC server started, waiting for requests");

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "Error reading input");
                break;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }

        let response = process_request(&line, &mut state);

        // Notifications describe the state the response leaves behind
        for notification in state.take_notifications() {
            writeln!(writer, "{}", notification).ok();
        }
        if let Some(response) = response {
            writeln!(writer, "{}", response).ok();
        }
        writer.flush().ok();

        if state.is_shutdown() {
            info!("Server shutdown requested");
            break;
        }
    }

    info!("JSON-RPC server stopped");
}

/// Processes a single JSON-RPC request line.
///
/// Returns the serialized response, or None for client notifications.
pub(crate) fn process_request(line: &str, state: &mut ServerState) -> Option<String> {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                None,
                JsonRpcError::parse_error(format!("Invalid JSON: {}", e)),
            );
            return Some(serde_json::to_string(&error).unwrap_or_default());
        }
    };

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                None,
                JsonRpcError::invalid_request(format!("Invalid request: {}", e)),
            );
            return Some(serde_json::to_string(&error).unwrap_or_default());
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        let error = JsonRpcErrorResponse::new(
            request.id,
            JsonRpcError::invalid_request("Invalid JSON-RPC version (expected 2.0)"),
        );
        return Some(serde_json::to_string(&error).unwrap_or_default());
    }

    debug!(method = %request.method, "Handling request");
    let result = handle_request(&request.method, request.params, state);

    let id = request.id?;
    let json = match result {
        Ok(value) => serde_json::to_string(&JsonRpcResponse::new(id, value)),
        Err(error) => {
            debug!(method = %request.method, code = error.code, "Request failed");
            serde_json::to_string(&JsonRpcErrorResponse::new(Some(id), error))
        }
    };
    Some(json.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::client::testing::FakeClient;

    fn test_state() -> ServerState {
        let pipeline = DramaPipeline::new(Box::new(FakeClient::working()), 24000);
        ServerState::new(DaemonConfig::new(), pipeline)
    }

    #[test]
    fn server_state_new() {
        let state = test_state();
        assert!(!state.is_shutdown());
        assert!(state.cache.is_empty());
    }

    #[test]
    fn server_state_shutdown() {
        let state = test_state();
        state.shutdown();
        assert!(state.is_shutdown());
    }

    #[test]
    fn process_invalid_json() {
        let mut state = test_state();
        let response = process_request("not json", &mut state).unwrap();
        assert!(response.contains("-32700"));
    }

    #[test]
    fn process_missing_method() {
        let mut state = test_state();
        let response = process_request(r#"{"jsonrpc":"2.0","id":1}"#, &mut state).unwrap();
        assert!(response.contains("-32600"));
    }

    #[test]
    fn process_invalid_version() {
        let mut state = test_state();
        let request = r#"{"jsonrpc":"1.0","method":"test","id":1}"#;
        let response = process_request(request, &mut state).unwrap();
        assert!(response.contains("-32600"));
    }

    #[test]
    fn process_unknown_method() {
        let mut state = test_state();
        let request = r#"{"jsonrpc":"2.0","method":"unknown","id":1}"#;
        let response = process_request(request, &mut state).unwrap();
        assert!(response.contains("-32601"));
    }

    #[test]
    fn client_notification_gets_no_response() {
        let mut state = test_state();
        let request = r#"{"jsonrpc":"2.0","method":"ping"}"#;
        assert!(process_request(request, &mut state).is_none());
    }

    #[test]
    fn serve_writes_notifications_before_response() {
        let state = test_state();
        let input = concat!(
            r#"{"jsonrpc":"2.0","method":"generate_script","params":{"notes":"Verben"},"id":1}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","method":"shutdown","id":2}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"ping","id":3}"#,
            "\n",
        );
        let mut output = Vec::new();
        serve(state, input.as_bytes(), &mut output);

        let lines: Vec<serde_json::Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["method"], "state_changed");
        assert_eq!(lines[0]["params"]["state"], "review_script");
        assert_eq!(lines[1]["id"], 1);
        assert_eq!(lines[1]["result"]["state"], "review_script");
        assert_eq!(lines[2]["id"], 2);
    }
}
