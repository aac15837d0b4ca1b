//! Global configuration types for Haven.
//!
//! `GlobalConfig` represents the top-level `config.toml` that controls the
//! assistant model and the simulated counselor reply delay.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Haven portal.
///
/// Loaded from `~/.haven/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Generative endpoint settings for the AI assistant.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Delay before a simulated counselor reply appears, in milliseconds.
    #[serde(default = "default_counselor_reply_delay_ms")]
    pub counselor_reply_delay_ms: u64,
}

fn default_counselor_reply_delay_ms() -> u64 {
    3_000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            assistant: AssistantConfig::default(),
            counselor_reply_delay_ms: default_counselor_reply_delay_ms(),
        }
    }
}

/// Settings for the generative-text endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Override for the endpoint base URL (proxies, tests).
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_max_tokens() -> u32 {
    1_024
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: None,
            base_url: None,
        }
    }
}
