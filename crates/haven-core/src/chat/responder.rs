//! Reply sources for both chats.
//!
//! - Canned answers for the three quick options, which never reach the model
//! - `AssistantResponder`, which forwards the history to the generative endpoint
//! - Fixed counselor texts released after a `ReplyDelay`

use std::future::Future;
use std::time::Duration;

use haven_types::chat::ChatMessage;
use haven_types::config::AssistantConfig;
use haven_types::llm::{CompletionRequest, Message};
use serde::Serialize;
use tracing::{debug, warn};

use crate::llm::box_provider::BoxLlmProvider;

pub const AI_GREETING: &str = "Hello! I'm here to support you. You can chat with me about how you're feeling, or connect with a VIT counselor. Everything you share is completely anonymous.";

/// Topic restriction sent with every assistant request.
pub const COUNSELOR_SCOPE_INSTRUCTION: &str = "For this act as a psychotherapist, counsellor who can give advice for students, on their personal and academic goals. When asked anything other than this, directly refuse to answer. Give answers only to questions which can be asked to a counselor, doctor by students - about mental, personal, health, stress, exam, or academic goals.";

/// Used when the endpoint answers without any text.
pub const EMPTY_COMPLETION_FALLBACK: &str =
    "I'm sorry, I couldn't process your request at this time.";

/// Used when the endpoint call fails outright.
pub const ASSISTANT_ERROR_FALLBACK: &str =
    "I'm having trouble processing your request. Please try again later.";

pub const SIMULATED_COUNSELOR_REPLY: &str = "Thank you for your message. A counselor will respond soon. This is a simulated response for demonstration purposes.";

pub const HANDOVER_NOTICE: &str = "Connecting you to a VIT counselor. Please wait a moment while we find someone available to chat with you anonymously...";

pub const HANDOVER_GREETING: &str = "Hello, I'm a counselor from VIT's Student Wellness Office. I'm here to support you. Feel free to share what's on your mind, and remember this conversation is completely anonymous.";

/// A quick-reply option offered at the start of the AI chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChatOption {
    pub id: &'static str,
    pub text: &'static str,
    #[serde(skip)]
    pub response: &'static str,
}

pub const CHAT_OPTIONS: [ChatOption; 3] = [
    ChatOption {
        id: "stress",
        text: "I'm feeling stressed about exams",
        response: "Exam stress is completely normal. Some things that might help include: creating a study schedule, taking short breaks, practicing deep breathing, and getting enough sleep. Would you like to talk more about specific strategies, or would you prefer to connect with a VIT counselor who specializes in academic stress?",
    },
    ChatOption {
        id: "lonely",
        text: "I'm feeling lonely or isolated",
        response: "I'm sorry you're feeling this way. Many students experience loneliness, especially in new environments. Consider joining campus clubs, study groups, or attending events that interest you. Would you like me to provide more specific social connection strategies, or would you prefer to speak with a VIT counselor about these feelings?",
    },
    ChatOption {
        id: "anxious",
        text: "I've been feeling anxious lately",
        response: "Anxiety can be challenging to deal with. Some helpful techniques include mindfulness practices, regular exercise, limiting caffeine, and talking to someone you trust. Would you like to explore specific anxiety-management techniques, or would you prefer to connect with a VIT counselor who specializes in anxiety support?",
    },
];

pub fn find_option(id: &str) -> Option<&'static ChatOption> {
    CHAT_OPTIONS.iter().find(|o| o.id == id)
}

/// The canned answer for a message that is exactly one of the option texts.
pub fn canned_response(text: &str) -> Option<&'static str> {
    CHAT_OPTIONS
        .iter()
        .find(|o| o.text == text.trim())
        .map(|o| o.response)
}

/// Pause before a simulated counselor message is released.
pub trait ReplyDelay: Send + Sync {
    fn wait(&self) -> impl Future<Output = ()> + Send;
}

/// Real wall-clock delay.
#[derive(Debug, Clone, Copy)]
pub struct TokioDelay {
    duration: Duration,
}

impl TokioDelay {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

impl ReplyDelay for TokioDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.duration).await;
    }
}

/// Releases replies immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl ReplyDelay for NoDelay {
    async fn wait(&self) {}
}

/// Answers free-text messages in the AI chat through the generative endpoint.
pub struct AssistantResponder {
    provider: BoxLlmProvider,
    config: AssistantConfig,
}

impl AssistantResponder {
    pub fn new(provider: BoxLlmProvider, config: AssistantConfig) -> Self {
        Self { provider, config }
    }

    /// Reply to the conversation so far, ending with the user's message.
    ///
    /// Never fails: endpoint errors are logged and replaced by a fixed
    /// apology so the chat stays usable.
    pub async fn reply(&self, history: &[ChatMessage]) -> String {
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages: history.iter().map(Message::from).collect(),
            system: Some(COUNSELOR_SCOPE_INSTRUCTION.to_string()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        match self.provider.complete(&request).await {
            Ok(response) if response.content.trim().is_empty() => {
                debug!(model = %response.model, "Assistant returned no text");
                EMPTY_COMPLETION_FALLBACK.to_string()
            }
            Ok(response) => response.content,
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Assistant request failed");
                ASSISTANT_ERROR_FALLBACK.to_string()
            }
        }
    }
}
