//! Wire types for one streamed chat-completion chunk.
//!
//! Shape on the wire, per SSE `data:` line:
//!
//! ```json
//! {"choices":[{"delta":{"content":"...","tool_calls":[
//!     {"index":0,"id":"call_x","function":{"name":"f","arguments":"{\"a\""}}
//! ]},"finish_reason":null}]}
//! ```
//!
//! Tool-call fragments carry `id` and `function.name` only on the fragment
//! that introduces a new `index`; later fragments for the same index carry
//! only argument chunks.

use serde::Deserialize;

/// One parsed SSE chunk of a streamed chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    /// Choices carried by this chunk (the gateway sends exactly one).
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
}

impl ChatChunk {
    /// The delta of the first choice, if present.
    pub fn delta(&self) -> Option<&ChunkDelta> {
        self.choices.first().map(|c| &c.delta)
    }

    /// The finish reason of the first choice, if the chunk carries one.
    pub fn finish_reason(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.finish_reason.as_deref())
    }
}

/// One choice within a [`ChatChunk`].
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    /// Incremental payload for this choice.
    #[serde(default)]
    pub delta: ChunkDelta,
    /// Set on the final chunk of the choice (`"stop"`, `"tool_calls"`, ...).
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// One stream fragment: optional incremental text plus zero or more tool-call
/// fragments, in the order the model emitted them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    /// Incremental assistant text, if any.
    #[serde(default)]
    pub content: Option<String>,
    /// Tool-call fragments carried by this delta.
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallFragment>>,
}

/// A partial update to the tool call at `index`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallFragment {
    /// Stable identity of the tool call within this response.
    pub index: u32,
    /// Call identifier, present only on the introducing fragment.
    #[serde(default)]
    pub id: Option<String>,
    /// Partial function data.
    #[serde(default)]
    pub function: FunctionFragment,
}

/// The function part of a [`ToolCallFragment`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FunctionFragment {
    /// Function name, present only on the introducing fragment.
    #[serde(default)]
    pub name: Option<String>,
    /// A chunk of the JSON-encoded arguments object.
    #[serde(default)]
    pub arguments: Option<String>,
}
