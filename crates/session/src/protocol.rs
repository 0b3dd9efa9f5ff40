//! Wire message types.
//!
//! These are the fundamental shapes of CDP traffic. Keep them untyped at
//! the `params`/`result` level - domain payloads are data, not types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Command id - monotonically increasing, never reused on a connection.
pub type CommandId = u64;

/// Target id assigned by the browser.
pub type TargetId = String;

/// Session id scoping commands to an attached target.
pub type SessionId = String;

/// Outbound command expecting exactly one response.
#[derive(Debug, Clone, Serialize)]
pub struct CdpCommand {
    pub id: CommandId,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
}

/// Inbound response, correlated to a command by id.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
    pub id: CommandId,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorPayload>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<SessionId>,
}

/// Error body of a failed command, preserved verbatim for the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Inbound event pushed by the browser. No id field.
#[derive(Debug, Clone, Deserialize)]
pub struct CdpEvent {
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(rename = "sessionId", default)]
    pub session_id: Option<SessionId>,
}

/// Unified inbound message. Responses carry an id, events do not, which
/// is what the untagged deserialization keys on.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CdpMessage {
    Response(CdpResponse),
    Event(CdpEvent),
}

/// One entry of `Target.getTargets`.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetInfo {
    #[serde(rename = "targetId")]
    pub target_id: TargetId,
    #[serde(rename = "type")]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub attached: bool,
}

/// Result of `Target.attachToTarget`.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachToTargetResult {
    #[serde(rename = "sessionId")]
    pub session_id: SessionId,
}
