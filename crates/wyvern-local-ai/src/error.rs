//! Error types for local AI operations.

use thiserror::Error;

/// Errors that can occur during local AI operations.
#[derive(Debug, Error)]
pub enum LocalAIError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned an error response or an unusable body.
    #[error("API error: {0}")]
    Api(String),

    /// Server is not running or not reachable.
    #[error("Server not running at {0}. Start it with: wyvern launch <model.gguf>")]
    ServerNotRunning(String),

    /// Server process could not be spawned.
    #[error("Failed to start server: {0}")]
    ServerStartFailed(String),

    /// The request was rejected before being sent.
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A `CompletionRequest` that violates one of its invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("a completion request needs at least one message")]
    EmptyMessages,

    #[error("temperature {0} is outside 0.0..=2.0")]
    TemperatureOutOfRange(f32),

    #[error("max_tokens must be positive")]
    ZeroMaxTokens,
}
