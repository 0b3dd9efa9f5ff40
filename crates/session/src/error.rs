//! Error types for the session client.
//!
//! Caller-attributed by design: every `send_command` invocation owns its
//! own failure. Framing errors never reach callers - the reader loop logs
//! and skips them so one bad frame cannot take down the session.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CdpError>;

#[derive(Debug, Error)]
pub enum CdpError {
    #[error("invalid debugging endpoint {0}")]
    InvalidEndpoint(String),

    #[error("WebSocket error: {0}")]
    Connection(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed frame: {0}")]
    Frame(String),

    #[error("protocol error {code}: {message}")]
    Protocol {
        code: i32,
        message: String,
        data: Option<Value>,
    },

    #[error("timed out waiting for response to {method} (id {id})")]
    Timeout { method: String, id: u64 },

    #[error("connection closed")]
    Closed,

    #[error("no page target available to attach")]
    NoPageTarget,
}
