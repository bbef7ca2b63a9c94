//! Core types and error definitions shared across the Gateling crates.
//!
//! Gateling is a client for an OpenAI-compatible AI gateway. This crate holds
//! the foundational types: error handling, conversation messages, and the
//! tool-call request/result pair.
//!
//! # Main types
//!
//! - [`GatelingError`] — Unified error enum for all Gateling subsystems.
//! - [`GatelingResult`] — Convenience alias for `Result<T, GatelingError>`.
//! - [`Role`] — Message role (user, assistant, system, tool).
//! - [`Message`] — A single message within a conversation.
//! - [`ToolCall`] — A completed request from the model to invoke a tool.
//! - [`ToolResult`] — The result returned after executing a tool call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// --- Error types ---

/// Top-level error type for the Gateling client.
#[derive(Debug, thiserror::Error)]
pub enum GatelingError {
    /// An error from an outbound HTTP request to the gateway.
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// An error while reading or framing the response stream.
    #[error("Stream error: {0}")]
    Stream(String),

    /// An error during tool lookup or invocation.
    #[error("Tool error: {0}")]
    Tool(String),

    /// An error from the chat follow-up loop.
    #[error("Chat error: {0}")]
    Chat(String),

    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`GatelingError`].
pub type GatelingResult<T> = Result<T, GatelingError>;

// --- Message types ---

/// The role of the participant that authored a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human end-user.
    User,
    /// The AI assistant.
    Assistant,
    /// A system-level instruction or prompt.
    System,
    /// Output produced by a tool invocation.
    Tool,
}

/// A single message exchanged within a conversation.
///
/// Assistant messages may carry the tool calls the model requested; tool
/// messages reference the call they answer via [`Message::tool_call_id`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    pub id: Uuid,
    /// The role of the message author.
    pub role: Role,
    /// The textual content of the message.
    pub content: String,
    /// Tool calls requested by the assistant, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages: the id of the [`ToolCall`] being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool messages: the name of the function that produced the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    /// UTC timestamp of when the message was created.
    pub timestamp: DateTime<Utc>,
    /// Arbitrary key-value metadata attached to the message.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Message {
    /// Creates a new message with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
            timestamp: Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Creates a new message with [`Role::User`].
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates a new message with [`Role::Assistant`].
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Creates a new message with [`Role::System`].
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates an assistant message carrying the tool calls the model asked
    /// for, alongside any text content produced in the same turn.
    pub fn assistant_tool_use(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let mut msg = Self::new(Role::Assistant, content);
        msg.tool_calls = tool_calls;
        msg
    }

    /// Creates a [`Role::Tool`] message answering the call with the given id.
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let mut msg = Self::new(Role::Tool, content);
        msg.tool_call_id = Some(call_id.into());
        msg.tool_name = Some(tool_name.into());
        msg
    }
}

// --- Tool types ---

/// A completed request from the model to invoke a specific tool.
///
/// `arguments` is kept as the raw JSON string exactly as accumulated from the
/// response stream. Nothing is validated here: when a stream was interrupted
/// the string may be incomplete JSON, and it is the dispatcher's job to parse
/// it (see [`ToolCall::parse_arguments`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier assigned by the model for this tool call.
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// Raw JSON-encoded arguments, as concatenated from the stream.
    pub arguments: String,
}

impl ToolCall {
    /// Parses the accumulated argument string as JSON.
    pub fn parse_arguments(&self) -> GatelingResult<serde_json::Value> {
        Ok(serde_json::from_str(&self.arguments)?)
    }
}

/// The result returned after executing a [`ToolCall`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The ID of the [`ToolCall`] this result corresponds to.
    pub call_id: String,
    /// The textual output produced by the tool (usually serialized JSON).
    pub content: String,
    /// Whether the tool execution ended in an error.
    pub is_error: bool,
}

impl ToolResult {
    /// Creates a successful tool result.
    pub fn success(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Creates an error tool result.
    pub fn error(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.tool_calls.is_empty());
        assert!(msg.tool_call_id.is_none());
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::user("test");
        let json = serde_json::to_string(&msg).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.content, "test");
        assert_eq!(deserialized.role, Role::User);
    }

    #[test]
    fn test_tool_result_message_references_call() {
        let msg = Message::tool_result("call_abc", "get_weather", "{\"temperature\":\"22°C\"}");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_abc"));
        assert_eq!(msg.tool_name.as_deref(), Some("get_weather"));
    }

    #[test]
    fn test_plain_message_omits_tool_fields() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("tool_call_id").is_none());
    }

    #[test]
    fn test_tool_call_parse_arguments() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "get_weather".to_string(),
            arguments: "{\"location\":\"Tokyo\"}".to_string(),
        };
        let args = call.parse_arguments().unwrap();
        assert_eq!(args["location"], "Tokyo");
    }

    #[test]
    fn test_tool_call_incomplete_arguments_fail_to_parse() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "get_weather".to_string(),
            arguments: "{\"loc".to_string(),
        };
        assert!(call.parse_arguments().is_err());
    }

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("call_1", "output");
        assert!(!result.is_error);
        assert_eq!(result.content, "output");
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("call_1", "failed");
        assert!(result.is_error);
    }
}
