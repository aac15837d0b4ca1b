//! LLM provider implementations.
//!
//! [`create_provider`] builds the assistant's provider from config and the
//! API key; [`UnavailableProvider`] stands in when no key is configured so
//! the assistant degrades to its fallback reply instead of failing startup.

pub mod gemini;

use secrecy::SecretString;

use haven_core::llm::box_provider::BoxLlmProvider;
use haven_core::llm::provider::LlmProvider;
use haven_types::config::AssistantConfig;
use haven_types::llm::{CompletionRequest, CompletionResponse, LlmError};

use self::gemini::GeminiProvider;

/// Create the assistant's provider.
///
/// # Errors
///
/// `AuthenticationFailed` when no API key is given.
pub fn create_provider(
    config: &AssistantConfig,
    api_key: Option<&str>,
) -> Result<BoxLlmProvider, LlmError> {
    let key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or(LlmError::AuthenticationFailed)?;
    let provider = GeminiProvider::new(SecretString::from(key.to_string()), config.base_url.clone())?;
    Ok(BoxLlmProvider::new(provider))
}

/// Provider used when the generative endpoint is not configured. Every call fails.
pub struct UnavailableProvider;

impl LlmProvider for UnavailableProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::AuthenticationFailed)
    }
}
