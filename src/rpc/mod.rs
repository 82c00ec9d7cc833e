//! JSON-RPC module for daemon communication.
//!
//! Provides the JSON-RPC 2.0 server implementation for:
//! - `generate_script`: Write a dialogue script from notes or a notes file
//! - `generate_audio`: Speak the current script
//! - `export_script` / `export_audio`: Write the downloadable artifacts
//! - `get_state`, `reset`, `ping`, `shutdown`
//!
//! Notifications:
//! - `state_changed`: The session moved to a new state

pub mod methods;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use server::{run_server, serve, ServerState};
pub use types::{
    application_code, JsonRpcError, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcResponse, RequestId, StateChangedParams,
};
