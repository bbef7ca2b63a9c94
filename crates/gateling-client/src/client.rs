//! HTTP and SSE transport against the gateway's chat-completions surface.

use crate::accumulator::StreamAccumulator;
use crate::chunk::ChatChunk;
use crate::config::GatewayConfig;
use crate::stream::StreamEvent;
use crate::tools::ToolDescriptor;
use futures_util::StreamExt;
use gateling_core::{GatelingError, GatelingResult, Message, Role, ToolCall};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Aggregated result of one chat request.
#[derive(Debug)]
pub enum ChatOutcome {
    /// The assistant answered with text only.
    Done(String),
    /// The assistant requested tool invocations, possibly alongside text.
    ToolUse {
        /// Text content produced in the same turn, if any.
        content: Option<String>,
        /// Completed tool calls, ascending by stream index.
        tool_calls: Vec<ToolCall>,
    },
}

/// Client for an OpenAI-compatible AI gateway.
///
/// The gateway handles provider routing, model selection, and real auth;
/// this client only speaks the request/response and request/stream contract.
pub struct GatewayClient {
    config: GatewayConfig,
    http: reqwest::Client,
}

impl GatewayClient {
    /// Creates a client for the given gateway configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn build_messages(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
    ) -> Vec<serde_json::Value> {
        let mut api_messages: Vec<serde_json::Value> = Vec::new();

        if let Some(sys) = system_prompt {
            api_messages.push(serde_json::json!({
                "role": "system",
                "content": sys
            }));
        }

        for m in messages {
            match m.role {
                Role::System => continue,
                Role::Tool => {
                    api_messages.push(serde_json::json!({
                        "role": "tool",
                        "tool_call_id": m.tool_call_id,
                        "name": m.tool_name,
                        "content": m.content
                    }));
                }
                Role::Assistant if !m.tool_calls.is_empty() => {
                    let calls: Vec<serde_json::Value> =
                        m.tool_calls.iter().map(wire_tool_call).collect();
                    api_messages.push(serde_json::json!({
                        "role": "assistant",
                        "content": m.content,
                        "tool_calls": calls
                    }));
                }
                Role::User | Role::Assistant => {
                    api_messages.push(serde_json::json!({
                        "role": match m.role {
                            Role::User => "user",
                            _ => "assistant",
                        },
                        "content": m.content
                    }));
                }
            }
        }

        api_messages
    }

    fn build_tools(&self, tools: &[ToolDescriptor]) -> Vec<serde_json::Value> {
        tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect()
    }

    fn build_body(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": self.build_messages(system_prompt, messages),
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::json!(self.build_tools(tools));
        }
        body
    }

    /// Non-streaming chat completion.
    pub async fn chat(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> GatelingResult<ChatOutcome> {
        let body = self.build_body(system_prompt, messages, tools);

        let resp = self
            .http
            .post(self.config.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatelingError::Gateway(e.to_string()))?;

        let status = resp.status();
        let resp_body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GatelingError::Gateway(e.to_string()))?;

        if !status.is_success() {
            return Err(GatelingError::Gateway(format!(
                "Gateway error {status}: {resp_body}"
            )));
        }

        parse_chat_response(&resp_body)
    }

    /// Streaming chat completion.
    ///
    /// Returns a receiver yielding [`StreamEvent`]s as fragments arrive, plus
    /// a join handle resolving to the aggregated [`ChatOutcome`] once the
    /// stream is drained. Dropping the receiver only stops event delivery;
    /// accumulation still runs to completion.
    pub async fn chat_stream(
        &self,
        system_prompt: Option<&str>,
        messages: &[Message],
        tools: &[ToolDescriptor],
    ) -> GatelingResult<(
        mpsc::Receiver<StreamEvent>,
        JoinHandle<GatelingResult<ChatOutcome>>,
    )> {
        let mut body = self.build_body(system_prompt, messages, tools);
        body["stream"] = serde_json::json!(true);

        let resp = self
            .http
            .post(self.config.endpoint())
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatelingError::Gateway(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(GatelingError::Gateway(format!(
                "Gateway error {status}: {error_body}"
            )));
        }

        let (tx, rx) = mpsc::channel::<StreamEvent>(256);
        let mut byte_stream = resp.bytes_stream();

        let handle = tokio::spawn(async move {
            let mut buffer = String::new();
            let mut accumulator = StreamAccumulator::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        let _ = tx
                            .send(StreamEvent::Error {
                                message: format!("Stream read error: {e}"),
                            })
                            .await;
                        return Err(GatelingError::Stream(format!("Stream read error: {e}")));
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&bytes));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    let Some(data) = line.strip_prefix("data: ") else {
                        continue;
                    };

                    if data == "[DONE]" {
                        let _ = tx.send(StreamEvent::Done).await;
                        continue;
                    }

                    let chunk: ChatChunk = match serde_json::from_str(data) {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            debug!(error = %e, "Skipping unparseable stream chunk");
                            continue;
                        }
                    };

                    if let Some("tool_calls") = chunk.finish_reason() {
                        for id in accumulator.call_ids() {
                            let _ = tx.send(StreamEvent::ToolCallEnd { id }).await;
                        }
                    }

                    let Some(delta) = chunk.delta() else {
                        continue;
                    };

                    if let Some(text) = &delta.content {
                        if !text.is_empty() {
                            accumulator.push_text(text);
                            let _ = tx
                                .send(StreamEvent::TextDelta {
                                    text: text.clone(),
                                })
                                .await;
                        }
                    }

                    for fragment in delta.tool_calls.iter().flatten() {
                        let known = accumulator.call_id(fragment.index).is_some();
                        accumulator.push_fragment(fragment);

                        let id = accumulator
                            .call_id(fragment.index)
                            .unwrap_or_default()
                            .to_string();
                        if !known {
                            let name = accumulator
                                .call_name(fragment.index)
                                .unwrap_or_default()
                                .to_string();
                            let _ = tx.send(StreamEvent::ToolCallStart { id: id.clone(), name }).await;
                        }
                        if let Some(args) = &fragment.function.arguments {
                            if !args.is_empty() {
                                let _ = tx
                                    .send(StreamEvent::ToolCallDelta {
                                        id,
                                        arguments_delta: args.clone(),
                                    })
                                    .await;
                            }
                        }
                    }
                }
            }

            if accumulator.has_tool_calls() {
                let (content, tool_calls) = accumulator.finish();
                Ok(ChatOutcome::ToolUse {
                    content: if content.is_empty() {
                        None
                    } else {
                        Some(content)
                    },
                    tool_calls,
                })
            } else {
                let (content, _) = accumulator.finish();
                Ok(ChatOutcome::Done(content))
            }
        });

        Ok((rx, handle))
    }
}

/// Serializes a completed tool call into its wire form.
pub fn wire_tool_call(call: &ToolCall) -> serde_json::Value {
    serde_json::json!({
        "id": call.id,
        "type": "function",
        "function": {
            "name": call.name,
            "arguments": call.arguments,
        }
    })
}

/// Parses a non-streaming chat-completion response body.
pub fn parse_chat_response(body: &serde_json::Value) -> GatelingResult<ChatOutcome> {
    let choice = &body["choices"][0];
    let message = &choice["message"];
    let content = message["content"].as_str().unwrap_or_default().to_string();

    if let Some(tool_calls_json) = message["tool_calls"].as_array() {
        let tool_calls: Vec<ToolCall> = tool_calls_json
            .iter()
            .filter_map(|tc| {
                let id = tc["id"].as_str()?.to_string();
                let name = tc["function"]["name"].as_str()?.to_string();
                let arguments = tc["function"]["arguments"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                Some(ToolCall {
                    id,
                    name,
                    arguments,
                })
            })
            .collect();

        Ok(ChatOutcome::ToolUse {
            content: if content.is_empty() {
                None
            } else {
                Some(content)
            },
            tool_calls,
        })
    } else {
        Ok(ChatOutcome::Done(content))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tool_call_shape() {
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "get_weather".to_string(),
            arguments: "{\"location\":\"Tokyo\"}".to_string(),
        };
        let wire = wire_tool_call(&call);
        assert_eq!(wire["type"], "function");
        assert_eq!(wire["id"], "call_1");
        assert_eq!(wire["function"]["name"], "get_weather");
        assert_eq!(wire["function"]["arguments"], "{\"location\":\"Tokyo\"}");
    }

    #[test]
    fn test_parse_text_response() {
        let body = serde_json::json!({
            "choices": [{"message": {"content": "Hi there"}, "finish_reason": "stop"}]
        });
        match parse_chat_response(&body).unwrap() {
            ChatOutcome::Done(text) => assert_eq!(text, "Hi there"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_parse_tool_use_response_keeps_raw_arguments() {
        let body = serde_json::json!({
            "choices": [{"message": {
                "content": "",
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": "get_weather", "arguments": "{\"location\":\"Tokyo\"}"}
                }]
            }, "finish_reason": "tool_calls"}]
        });
        match parse_chat_response(&body).unwrap() {
            ChatOutcome::ToolUse {
                content,
                tool_calls,
            } => {
                assert!(content.is_none());
                assert_eq!(tool_calls.len(), 1);
                assert_eq!(tool_calls[0].arguments, "{\"location\":\"Tokyo\"}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_build_messages_maps_tool_roles() {
        let client = GatewayClient::new(GatewayConfig::default());
        let call = ToolCall {
            id: "call_1".to_string(),
            name: "get_weather".to_string(),
            arguments: "{}".to_string(),
        };
        let messages = vec![
            Message::user("What's the weather in Tokyo?"),
            Message::assistant_tool_use("", vec![call]),
            Message::tool_result("call_1", "get_weather", "{\"temperature\":\"22°C\"}"),
        ];
        let wire = client.build_messages(Some("Be helpful."), &messages);

        assert_eq!(wire.len(), 4);
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[1]["role"], "user");
        assert_eq!(wire[2]["role"], "assistant");
        assert_eq!(wire[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(wire[3]["role"], "tool");
        assert_eq!(wire[3]["tool_call_id"], "call_1");
        assert_eq!(wire[3]["name"], "get_weather");
    }
}
