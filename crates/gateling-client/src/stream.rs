use serde::{Deserialize, Serialize};

/// Events emitted while a streamed gateway response is being consumed.
///
/// These let consumers (the CLI, a WebSocket handler) render partial results
/// live, while the accumulator builds the final aggregated outcome in the
/// background.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A chunk of text content from the assistant.
    TextDelta {
        /// The incremental text.
        text: String,
    },

    /// A new tool call has been introduced.
    ToolCallStart {
        /// Call identifier assigned by the model.
        id: String,
        /// Function name, empty if the introducing fragment omitted it.
        name: String,
    },

    /// An incremental fragment of tool call arguments (JSON string delta).
    ToolCallDelta {
        /// Identifier of the call this delta belongs to.
        id: String,
        /// The argument chunk.
        arguments_delta: String,
    },

    /// A tool call's arguments are now complete.
    ToolCallEnd {
        /// Identifier of the completed call.
        id: String,
    },

    /// The stream has finished successfully.
    Done,

    /// An error occurred during streaming.
    Error {
        /// Human-readable description.
        message: String,
    },
}
