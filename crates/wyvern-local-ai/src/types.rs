//! Chat types shared by every backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LocalAIError, RequestError};

/// Speaker of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A chat completion request, independent of the backend serving it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Conversation in chronological order.
    pub messages: Vec<ChatMessage>,
    /// Model identifier; each backend applies its own default when unset.
    pub model: Option<String>,
    /// Sampling temperature in `0.0..=2.0`.
    pub temperature: f32,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Ask the server to stream the reply.
    pub stream: bool,
}

impl CompletionRequest {
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;
    pub const DEFAULT_MAX_TOKENS: u32 = 2048;

    /// Create a non-streaming request with default sampling settings.
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: Self::DEFAULT_MAX_TOKENS,
            stream: false,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Check the request invariants before anything goes over the wire.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.messages.is_empty() {
            return Err(RequestError::EmptyMessages);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(RequestError::TemperatureOutOfRange(self.temperature));
        }
        if self.max_tokens == 0 {
            return Err(RequestError::ZeroMaxTokens);
        }
        Ok(())
    }
}

/// A successful completion with its generation metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub tokens_generated: u32,
    pub generation_time: Duration,
}

impl Completion {
    /// Render an error the way older callers expect it: an `"Error: "`
    /// prefixed text with zeroed metadata.
    ///
    /// This form is lossy. A reply that legitimately starts with `"Error:"`
    /// looks identical, so branch on the `Result` instead of the text.
    pub fn from_error(error: &LocalAIError) -> Self {
        Self {
            text: format!("Error: {}", error),
            tokens_generated: 0,
            generation_time: Duration::ZERO,
        }
    }

    /// Collapse a completion result into the legacy single-shape form.
    pub fn flatten(result: Result<Completion, LocalAIError>) -> Self {
        result.unwrap_or_else(|e| Self::from_error(&e))
    }

    pub fn generation_time_seconds(&self) -> f64 {
        self.generation_time.as_secs_f64()
    }
}
