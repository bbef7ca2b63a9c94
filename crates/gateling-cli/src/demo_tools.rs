//! Mock tools for the `tools` demo: canned weather and local-time lookups.

use async_trait::async_trait;
use gateling_client::{Tool, ToolDescriptor, ToolRegistry};
use gateling_core::GatelingResult;
use std::sync::Arc;

struct WeatherTool {
    descriptor: ToolDescriptor,
}

impl WeatherTool {
    fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "get_weather".to_string(),
                description: "Get current temperature for a given location.".to_string(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "City and country e.g. Bogotá, Colombia"
                        }
                    },
                    "required": ["location"],
                    "additionalProperties": false
                }),
            },
        }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: serde_json::Value) -> GatelingResult<serde_json::Value> {
        let location = arguments["location"].as_str().unwrap_or("unknown");
        Ok(serde_json::json!({
            "temperature": "22°C",
            "description": format!("Sunny in {location}")
        }))
    }
}

struct LocalTimeTool {
    descriptor: ToolDescriptor,
}

impl LocalTimeTool {
    fn new() -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "get_local_time".to_string(),
                description: "Get the current time in a given location.".to_string(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {
                        "location": {
                            "type": "string",
                            "description": "City and country e.g. New York, USA"
                        }
                    },
                    "required": ["location"],
                    "additionalProperties": false
                }),
            },
        }
    }
}

#[async_trait]
impl Tool for LocalTimeTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, arguments: serde_json::Value) -> GatelingResult<serde_json::Value> {
        Ok(serde_json::json!({
            "time": "14:30",
            "timezone": "UTC+2",
            "location": arguments["location"]
        }))
    }
}

/// Registers the demo tools.
pub fn register(registry: &mut ToolRegistry) {
    registry.register(Arc::new(WeatherTool::new()));
    registry.register(Arc::new(LocalTimeTool::new()));
}
