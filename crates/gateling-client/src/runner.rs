//! The chat follow-up loop: request, execute tool calls, re-request.

use crate::client::{ChatOutcome, GatewayClient};
use crate::config::GatewayConfig;
use crate::context::ContextWindow;
use crate::tools::{ToolDescriptor, ToolRegistry};
use gateling_core::{GatelingError, GatelingResult, Message};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Drives a conversation to completion: prompt → gateway → tool calls →
/// execute → backfill results → repeat, until the model answers with text.
pub struct ChatRunner {
    client: GatewayClient,
    tools: Arc<ToolRegistry>,
    max_turns: u32,
}

impl ChatRunner {
    /// Creates a runner for the given gateway and tool registry.
    pub fn new(config: GatewayConfig, tools: Arc<ToolRegistry>) -> Self {
        let max_turns = config.max_turns;
        Self {
            client: GatewayClient::new(config),
            tools,
            max_turns,
        }
    }

    /// The underlying gateway client.
    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    /// Runs the loop for one user input. Returns the final assistant text.
    pub async fn run(
        &self,
        context: &mut ContextWindow,
        user_input: &str,
    ) -> GatelingResult<String> {
        context.push(Message::user(user_input));

        let descriptors: Vec<ToolDescriptor> =
            self.tools.descriptors().into_iter().cloned().collect();

        info!(tools = descriptors.len(), "Starting chat loop");

        for turn in 0..self.max_turns {
            info!(turn, "Chat loop turn");

            let outcome = self
                .client
                .chat(context.system_prompt(), context.messages(), &descriptors)
                .await?;

            match outcome {
                ChatOutcome::Done(text) => {
                    context.push(Message::assistant(&text));
                    info!(turns = turn + 1, "Chat loop completed");
                    return Ok(text);
                }

                ChatOutcome::ToolUse {
                    content,
                    tool_calls,
                } => {
                    context.push(Message::assistant_tool_use(
                        content.unwrap_or_default(),
                        tool_calls.clone(),
                    ));

                    for call in &tool_calls {
                        info!(tool = %call.name, call_id = %call.id, "Executing tool call");

                        match self.tools.execute(call).await {
                            Ok(result) => {
                                context.push(Message::tool_result(
                                    &result.call_id,
                                    &call.name,
                                    &result.content,
                                ));
                            }
                            Err(e) => {
                                error!(error = %e, tool = %call.name, "Tool execution failed");
                                context.push(Message::tool_result(
                                    &call.id,
                                    &call.name,
                                    format!("Tool error: {e}"),
                                ));
                            }
                        }
                    }
                }
            }
        }

        warn!(max_turns = self.max_turns, "Chat loop reached max turns");

        Err(GatelingError::Chat(format!(
            "Chat loop exceeded maximum of {} turns",
            self.max_turns
        )))
    }
}
