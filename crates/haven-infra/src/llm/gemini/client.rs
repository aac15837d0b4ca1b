//! GeminiProvider: concrete [`LlmProvider`] for Google Gemini.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and only exposed when
//! building the request URL. Request URLs are never logged.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use haven_core::llm::provider::LlmProvider;
use haven_types::llm::{CompletionRequest, CompletionResponse, LlmError, MessageRole};

use super::types::{GeminiContent, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
    /// Create a provider. `base_url` overrides the public endpoint (proxies, tests).
    pub fn new(api_key: SecretString, base_url: Option<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Convert a generic [`CompletionRequest`] into a [`GeminiRequest`].
    ///
    /// Gemini has no separate system slot on this endpoint, so the system
    /// instruction is prefixed to the first user turn.
    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        let mut instruction = request.system.as_deref().filter(|s| !s.is_empty());

        let mut contents: Vec<GeminiContent> = request
            .messages
            .iter()
            .map(|m| {
                let (role, text) = match m.role {
                    MessageRole::User => match instruction.take() {
                        Some(system) => ("user", format!("{system}\n\n{}", m.content)),
                        None => ("user", m.content.clone()),
                    },
                    MessageRole::Assistant => ("model", m.content.clone()),
                };
                GeminiContent {
                    role: Some(role.to_string()),
                    parts: vec![GeminiPart { text: Some(text) }],
                }
            })
            .collect();

        // No user turn to carry it: send the instruction on its own.
        if let Some(system) = instruction {
            contents.insert(
                0,
                GeminiContent {
                    role: Some("user".to_string()),
                    parts: vec![GeminiPart {
                        text: Some(system.to_string()),
                    }],
                },
            );
        }

        GeminiRequest {
            contents,
            generation_config: Some(GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            }),
        }
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        if request.messages.is_empty() {
            return Err(LlmError::InvalidRequest("no messages provided".to_string()));
        }

        let body = Self::to_gemini_request(request);
        tracing::debug!(
            model = %request.model,
            turns = body.contents.len(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(self.url(&request.model))
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                // without_url keeps the key out of the message
                message: format!("HTTP request failed: {}", e.without_url()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                400 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let gemini_resp: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {}", e.without_url()))
        })?;

        Ok(CompletionResponse {
            content: gemini_resp.first_text().unwrap_or_default().to_string(),
            model: gemini_resp
                .model_version
                .clone()
                .unwrap_or_else(|| request.model.clone()),
        })
    }
}
