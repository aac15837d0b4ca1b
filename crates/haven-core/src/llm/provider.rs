//! LlmProvider trait definition.
//!
//! The abstraction the generative-text endpoint is reached through. Uses
//! RPITIT for `complete`; `BoxLlmProvider` erases the concrete type.

use haven_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for LLM provider backends (Gemini, test doubles).
///
/// Implementations live in haven-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
