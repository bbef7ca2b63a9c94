//! Tool dispatch: a registry mapping function names to handlers.

use async_trait::async_trait;
use gateling_core::{GatelingError, GatelingResult, ToolCall, ToolResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Metadata describing a tool's interface, advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Function name the model uses to address this tool.
    pub name: String,
    /// Natural-language description of what the tool does.
    pub description: String,
    /// JSON Schema for the tool's arguments object.
    pub parameters: serde_json::Value,
}

/// A callable tool: one `invoke(arguments) -> result` capability.
///
/// Adding a tool means registering another implementation, not branching on
/// names at the call site.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The descriptor advertised to the model.
    fn descriptor(&self) -> &ToolDescriptor;

    /// Invokes the tool with already-parsed JSON arguments.
    async fn invoke(&self, arguments: serde_json::Value) -> GatelingResult<serde_json::Value>;
}

/// Central registry for all available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tool under its descriptor name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.descriptor().name.clone();
        info!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Descriptors for every registered tool.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Executes an accumulated tool call.
    ///
    /// An unknown name is a dispatch failure surfaced to the caller. The
    /// argument string is parsed as JSON here, not during accumulation; a
    /// parse failure becomes an error result tied to the call id, so the
    /// conversation can carry it back to the model.
    pub async fn execute(&self, call: &ToolCall) -> GatelingResult<ToolResult> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| GatelingError::Tool(format!("Unknown tool: {}", call.name)))?;

        let arguments = match call.parse_arguments() {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Malformed tool arguments");
                return Ok(ToolResult::error(
                    &call.id,
                    format!("Invalid arguments for '{}': {}", call.name, e),
                ));
            }
        };

        match tool.invoke(arguments).await {
            Ok(value) => Ok(ToolResult::success(&call.id, value.to_string())),
            Err(e) => Ok(ToolResult::error(&call.id, e.to_string())),
        }
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }
}
