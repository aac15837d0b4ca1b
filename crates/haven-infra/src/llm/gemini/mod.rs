//! Google Gemini provider for the AI assistant.
//!
//! [`GeminiProvider`] implements the
//! [`LlmProvider`](haven_core::llm::provider::LlmProvider) trait against the
//! `generateContent` endpoint.

pub mod client;
pub mod types;

pub use client::GeminiProvider;
