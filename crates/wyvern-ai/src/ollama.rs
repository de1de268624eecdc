//! Ollama API client, used when llama-server is not available.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use wyvern_local_ai::{ChatMessage, Completion, CompletionRequest, RequestError};

/// Default Ollama server URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model used when a request does not name one.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama2";

/// Ollama API client.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: Duration,
}

/// Errors from the Ollama client.
#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Ollama API error: {0}")]
    Api(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Ollama server not running at {0}. Start it with: ollama serve")]
    ServerNotRunning(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
}

/// Request to Ollama chat API.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// Response from Ollama chat API.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
    #[serde(default)]
    eval_count: u32,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    pub fn new() -> Self {
        Self::with_config(DEFAULT_OLLAMA_URL, DEFAULT_OLLAMA_MODEL)
    }

    /// Create a new Ollama client with custom URL and model.
    pub fn with_config(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Set the default model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the base URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a conversation to `/api/chat` and return the reply.
    ///
    /// Always non-streaming. Only the model and messages are forwarded;
    /// sampling settings in `request` are left to the server's defaults.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<Completion, OllamaError> {
        request.validate()?;

        let body = OllamaChatRequest {
            model: request.model.as_deref().unwrap_or(&self.model),
            messages: &request.messages,
            stream: false,
        };

        let url = format!("{}/api/chat", self.base_url);
        debug!("POST {} (model {})", url, body.model);

        let start = Instant::now();

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    OllamaError::ServerNotRunning(self.base_url.clone())
                } else {
                    OllamaError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api(format!("{}: {}", status, text)));
        }

        let response: OllamaChatResponse = serde_json::from_str(&response.text().await?)?;

        if let Some(error) = response.error {
            return Err(OllamaError::Api(error));
        }

        let message = response
            .message
            .ok_or_else(|| OllamaError::Api("Response has no message".to_string()))?;

        Ok(Completion {
            text: message.content,
            tokens_generated: response.eval_count,
            generation_time: start.elapsed(),
        })
    }

    /// Get the default model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client() {
        let client = OllamaClient::new();
        assert_eq!(client.base_url(), DEFAULT_OLLAMA_URL);
        assert_eq!(client.model(), DEFAULT_OLLAMA_MODEL);
    }

    #[test]
    fn test_custom_config() {
        let client = OllamaClient::with_config("http://localhost:8081/", "mistral:7b");
        assert_eq!(client.base_url(), "http://localhost:8081");
        assert_eq!(client.model(), "mistral:7b");
    }

    #[test]
    fn test_builder_pattern() {
        let client = OllamaClient::new()
            .with_url("http://myserver:11434")
            .with_model("qwen2.5:7b");
        assert_eq!(client.base_url(), "http://myserver:11434");
        assert_eq!(client.model(), "qwen2.5:7b");
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::user("hi")];
        let body = OllamaChatRequest {
            model: "phi3",
            messages: &messages,
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "phi3",
                "messages": [{"role": "user", "content": "hi"}],
                "stream": false
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"model":"llama2","message":{"role":"assistant","content":"Hudson here."},"done":true,"eval_count":12}"#;
        let response: OllamaChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.message.unwrap().content, "Hudson here.");
        assert_eq!(response.eval_count, 12);
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_invalid_request_is_rejected_locally() {
        let client = OllamaClient::new();
        let result = client.complete(&CompletionRequest::new(vec![])).await;
        assert!(matches!(
            result,
            Err(OllamaError::InvalidRequest(RequestError::EmptyMessages))
        ));
    }
}
