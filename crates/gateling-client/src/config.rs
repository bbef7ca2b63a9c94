//! Gateway connection and chat defaults.

use serde::{Deserialize, Serialize};

/// Configuration for talking to the AI gateway.
///
/// Every field has a serde default matching the local development setup, so
/// an empty TOML table (or `GatewayConfig::default()`) yields a working
/// configuration for a gateway on `localhost:8080`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway's OpenAI-compatible surface.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API key sent as a bearer token. The gateway handles real auth; a
    /// placeholder satisfies SDK-style clients in local setups.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Model identifier, `provider/model` style.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Upper bound on request/follow-up rounds in the chat runner.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

fn default_base_url() -> String {
    "http://localhost:8080/ai".to_string()
}

fn default_api_key() -> String {
    "fake-api-key".to_string()
}

fn default_model() -> String {
    "openai/gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    400
}

fn default_max_turns() -> u32 {
    8
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_turns: default_max_turns(),
        }
    }
}

impl GatewayConfig {
    /// The chat-completions endpoint under the configured base URL.
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_local_gateway() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/ai");
        assert_eq!(config.api_key, "fake-api-key");
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.max_tokens, 400);
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = GatewayConfig {
            base_url: "http://localhost:8080/ai/".to_string(),
            ..GatewayConfig::default()
        };
        assert_eq!(config.endpoint(), "http://localhost:8080/ai/chat/completions");
    }

    #[test]
    fn test_toml_deserialization_with_defaults() {
        let toml_str = r#"
            model = "openai/gpt-4o"
        "#;
        let config: GatewayConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model, "openai/gpt-4o");
        assert_eq!(config.base_url, "http://localhost:8080/ai"); // default
        assert_eq!(config.max_turns, 8); // default
    }
}
