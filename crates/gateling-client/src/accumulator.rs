//! Reassembles streamed response fragments into a complete result.

use crate::chunk::{ChunkDelta, ToolCallFragment};
use gateling_core::ToolCall;
use std::collections::BTreeMap;

/// Folds stream fragments into the full assistant text and the complete set
/// of tool calls.
///
/// Tool-call fragments are merged by their `index`: the first fragment seen
/// for an index creates the entry and fixes its id and function name; every
/// fragment's argument chunk is appended in arrival order. Multiple indices
/// may interleave across fragments, so [`finish`](Self::finish) returns calls
/// sorted by ascending index rather than arrival order.
///
/// The accumulator never validates the argument strings. A fully drained
/// stream is expected to leave valid JSON behind; an abandoned one leaves
/// whatever prefix was delivered.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    calls: BTreeMap<u32, PendingCall>,
}

#[derive(Debug)]
struct PendingCall {
    id: String,
    name: String,
    arguments: String,
}

impl StreamAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one stream fragment into the accumulated state.
    pub fn push(&mut self, delta: &ChunkDelta) {
        if let Some(text) = &delta.content {
            self.push_text(text);
        }
        if let Some(fragments) = &delta.tool_calls {
            for fragment in fragments {
                self.push_fragment(fragment);
            }
        }
    }

    /// Appends incremental assistant text to the content buffer.
    pub fn push_text(&mut self, text: &str) {
        self.content.push_str(text);
    }

    /// Merges one tool-call fragment into the entry for its index.
    ///
    /// An unknown index always creates a new entry, even when the fragment
    /// carries no id or name; id and name are captured exactly once, on that
    /// first sighting, and later fragments never overwrite them.
    pub fn push_fragment(&mut self, fragment: &ToolCallFragment) {
        let call = self.calls.entry(fragment.index).or_insert_with(|| PendingCall {
            id: fragment.id.clone().unwrap_or_default(),
            name: fragment.function.name.clone().unwrap_or_default(),
            arguments: String::new(),
        });
        if let Some(chunk) = &fragment.function.arguments {
            call.arguments.push_str(chunk);
        }
    }

    /// The assistant text accumulated so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The call id captured for `index`, if that index has been sighted.
    /// Empty when the introducing fragment carried no id.
    pub fn call_id(&self, index: u32) -> Option<&str> {
        self.calls.get(&index).map(|c| c.id.as_str())
    }

    /// The function name captured for `index`, if that index has been sighted.
    pub fn call_name(&self, index: u32) -> Option<&str> {
        self.calls.get(&index).map(|c| c.name.as_str())
    }

    /// Ids of all calls sighted so far, ascending by index.
    pub fn call_ids(&self) -> Vec<String> {
        self.calls.values().map(|c| c.id.clone()).collect()
    }

    /// Whether any tool-call fragment has been seen.
    pub fn has_tool_calls(&self) -> bool {
        !self.calls.is_empty()
    }

    /// Consumes the accumulator once the stream is exhausted, returning the
    /// full content and the tool calls sorted by ascending index.
    pub fn finish(self) -> (String, Vec<ToolCall>) {
        let calls = self
            .calls
            .into_values()
            .map(|call| ToolCall {
                id: call.id,
                name: call.name,
                arguments: call.arguments,
            })
            .collect();
        (self.content, calls)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::chunk::FunctionFragment;

    fn text(content: &str) -> ChunkDelta {
        ChunkDelta {
            content: Some(content.to_string()),
            tool_calls: None,
        }
    }

    fn fragment(
        index: u32,
        id: Option<&str>,
        name: Option<&str>,
        arguments: Option<&str>,
    ) -> ChunkDelta {
        ChunkDelta {
            content: None,
            tool_calls: Some(vec![ToolCallFragment {
                index,
                id: id.map(String::from),
                function: FunctionFragment {
                    name: name.map(String::from),
                    arguments: arguments.map(String::from),
                },
            }]),
        }
    }

    #[test]
    fn test_text_only_stream_concatenates_in_arrival_order() {
        let mut acc = StreamAccumulator::new();
        for delta in [text("Hel"), text("lo, "), text("world")] {
            acc.push(&delta);
        }
        let (content, calls) = acc.finish();
        assert_eq!(content, "Hello, world");
        assert!(calls.is_empty());
    }

    #[test]
    fn test_arguments_split_across_three_fragments() {
        let mut acc = StreamAccumulator::new();
        acc.push(&fragment(0, Some("call_1"), Some("get_weather"), Some("{\"loc")));
        acc.push(&fragment(0, None, None, Some("ation\":")));
        acc.push(&fragment(0, None, None, Some("\"Tokyo\"}")));

        let (_, calls) = acc.finish();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].arguments, "{\"location\":\"Tokyo\"}");
        let parsed = calls[0].parse_arguments().unwrap();
        assert_eq!(parsed["location"], "Tokyo");
    }

    #[test]
    fn test_interleaved_indices_sorted_ascending() {
        let mut acc = StreamAccumulator::new();
        acc.push(&fragment(1, Some("call_b"), Some("get_local_time"), None));
        acc.push(&fragment(0, Some("call_a"), Some("get_weather"), None));
        acc.push(&fragment(1, None, None, Some("{\"location\":\"Tokyo\"}")));
        acc.push(&fragment(0, None, None, Some("{\"location\":\"Osaka\"}")));

        let (_, calls) = acc.finish();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments, "{\"location\":\"Osaka\"}");
        assert_eq!(calls[1].id, "call_b");
        assert_eq!(calls[1].arguments, "{\"location\":\"Tokyo\"}");
    }

    #[test]
    fn test_id_and_name_fixed_on_first_sighting() {
        let mut acc = StreamAccumulator::new();
        acc.push(&fragment(0, Some("call_1"), Some("get_weather"), Some("{}")));
        // Later fragments with non-empty id/name must not overwrite.
        acc.push(&fragment(0, Some("call_9"), Some("other_tool"), None));

        let (_, calls) = acc.finish();
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].name, "get_weather");
    }

    #[test]
    fn test_unknown_index_without_intro_still_creates_entry() {
        let mut acc = StreamAccumulator::new();
        acc.push(&fragment(3, None, None, Some("{\"x\":1}")));

        let (_, calls) = acc.finish();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, "");
        assert_eq!(calls[0].name, "");
        assert_eq!(calls[0].arguments, "{\"x\":1}");
    }

    #[test]
    fn test_text_and_tool_fragments_mix() {
        let mut acc = StreamAccumulator::new();
        acc.push(&text("Checking"));
        acc.push(&fragment(0, Some("call_1"), Some("get_weather"), None));
        acc.push(&text(" the weather."));
        acc.push(&fragment(0, None, None, Some("{\"location\":\"Tokyo\"}")));

        assert!(acc.has_tool_calls());
        let (content, calls) = acc.finish();
        assert_eq!(content, "Checking the weather.");
        assert_eq!(calls.len(), 1);
    }

    #[test]
    fn test_empty_argument_pieces_are_noop_appends() {
        let mut acc = StreamAccumulator::new();
        acc.push(&fragment(0, Some("call_1"), Some("get_weather"), Some("")));
        acc.push(&fragment(0, None, None, None));
        acc.push(&fragment(0, None, None, Some("{}")));

        let (_, calls) = acc.finish();
        assert_eq!(calls[0].arguments, "{}");
    }

    #[test]
    fn test_abandoned_stream_leaves_partial_arguments() {
        let mut acc = StreamAccumulator::new();
        acc.push(&fragment(0, Some("call_1"), Some("get_weather"), Some("{\"loc")));
        // Stream interrupted here; partial state is whatever arrived.
        let (_, calls) = acc.finish();
        assert_eq!(calls[0].arguments, "{\"loc");
        assert!(calls[0].parse_arguments().is_err());
    }
}
